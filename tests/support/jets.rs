use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use toptag::event::{Event, Jet, Particle};

/// A cluster of `count` particles sharing `pt` around (`eta`, `phi`).
pub fn prong(rng: &mut StdRng, pt: f64, eta: f64, phi: f64, count: usize) -> Vec<Particle> {
    let share = pt / count as f64;
    (0..count)
        .map(|_| {
            Particle::from_pt_eta_phi(
                share * rng.random_range(0.6..1.4),
                eta + rng.random_range(-0.03..0.03),
                phi + rng.random_range(-0.03..0.03),
            )
        })
        .collect()
}

/// Soft radiation spread over the jet cone.
pub fn soft_spray(rng: &mut StdRng, count: usize) -> Vec<Particle> {
    (0..count)
        .map(|_| {
            Particle::from_pt_eta_phi(
                rng.random_range(0.2..1.5),
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
            )
        })
        .collect()
}

/// Three well separated hard prongs plus soft radiation.
pub fn top_like_jet(seed: u64) -> Jet {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut particles = prong(&mut rng, 150.0, 0.0, 0.0, 8);
    particles.extend(prong(&mut rng, 120.0, 0.8, 0.0, 6));
    particles.extend(prong(&mut rng, 100.0, 0.4, 0.75, 6));
    particles.extend(soft_spray(&mut rng, 20));
    Jet::new(particles)
}

/// One narrow hard core with no other structure.
pub fn narrow_core_jet(seed: u64) -> Jet {
    let mut rng = StdRng::seed_from_u64(seed);
    Jet::new(prong(&mut rng, 400.0, 0.2, -0.4, 12))
}

/// Only constituents below the adapter threshold.
pub fn soft_only_jet() -> Jet {
    Jet::new(vec![
        Particle::from_pt_eta_phi(0.004, 0.0, 0.0),
        Particle::from_pt_eta_phi(0.009, 0.3, 0.1),
    ])
}

/// Events with a mix of jet shapes, including degenerate ones.
pub fn mixed_events(collection: &str, count: u64) -> Vec<Event> {
    (0..count)
        .map(|idx| {
            let mut jets = vec![top_like_jet(idx), narrow_core_jet(idx + 1_000)];
            if idx % 3 == 0 {
                jets.push(Jet::default());
            }
            if idx % 5 == 0 {
                jets.push(soft_only_jet());
            }
            Event::new(1, idx).with_collection(collection, jets)
        })
        .collect()
}
