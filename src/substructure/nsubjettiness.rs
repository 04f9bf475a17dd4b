use crate::jet::{ClusterSequence, JetAlgorithm, JetDefinition, PseudoJet};

/// Smallest opening angle used when weighting particles sitting on an axis.
const MIN_AXIS_DISTANCE: f64 = 1e-8;

/// N-subjettiness with one-pass kT axes and the normalized measure.
///
/// `τ_N = Σ_i pt_i · min_k ΔR_ik^β / Σ_i pt_i · R0^β`, with ΔR measured in
/// the rapidity-azimuth plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nsubjettiness {
    pub beta: f64,
    pub r0: f64,
    /// Upper bound on axis-refinement iterations.
    pub max_iterations: usize,
    /// Refinement stops once τ changes by less than this.
    pub precision: f64,
}

impl Default for Nsubjettiness {
    fn default() -> Self {
        Self {
            beta: 1.0,
            r0: 1.5,
            max_iterations: 100,
            precision: 1e-4,
        }
    }
}

impl Nsubjettiness {
    /// τ_N of `particles`; zero when there are no more particles than axes.
    pub fn tau(&self, n: usize, particles: &[PseudoJet]) -> f64 {
        if particles.len() <= n {
            return 0.0;
        }
        let axes = self.refine(self.seed_axes(n, particles), particles);
        self.tau_with_axes(&axes, particles)
    }

    /// τ3/τ2 with plain floating-point division.
    pub fn tau32(&self, particles: &[PseudoJet]) -> f64 {
        self.tau(3, particles) / self.tau(2, particles)
    }

    fn seed_axes(&self, n: usize, particles: &[PseudoJet]) -> Vec<PseudoJet> {
        let definition = JetDefinition::new(JetAlgorithm::Kt, JetDefinition::MAX_ALLOWABLE_R);
        let sequence = ClusterSequence::new(particles, definition);
        sequence
            .exclusive_jets(n)
            .iter()
            .map(|jet| *jet.momentum())
            .collect()
    }

    fn refine(&self, seeds: Vec<PseudoJet>, particles: &[PseudoJet]) -> Vec<PseudoJet> {
        let mut axes = seeds;
        let mut tau = self.tau_with_axes(&axes, particles);
        for _ in 0..self.max_iterations {
            let updated = self.update_axes(&axes, particles);
            let new_tau = self.tau_with_axes(&updated, particles);
            axes = updated;
            let converged = (new_tau - tau).abs() < self.precision;
            tau = new_tau;
            if converged {
                break;
            }
        }
        axes
    }

    /// One Lloyd step: each axis moves to the weighted centre of the
    /// particles closest to it, with weights `pt · ΔR^(β-2)`.
    fn update_axes(&self, axes: &[PseudoJet], particles: &[PseudoJet]) -> Vec<PseudoJet> {
        let mut sums = vec![(0.0_f64, 0.0_f64, 0.0_f64, 0.0_f64); axes.len()];
        for particle in particles {
            let Some((k, dist2)) = nearest_axis(axes, particle) else {
                continue;
            };
            let dist = dist2.sqrt().max(MIN_AXIS_DISTANCE);
            let weight = particle.pt() * dist.powf(self.beta - 2.0);
            let axis = &axes[k];
            let phi = axis.phi() + axis.delta_phi_to(particle);
            let entry = &mut sums[k];
            entry.0 += weight * particle.rap();
            entry.1 += weight * phi;
            entry.2 += weight;
            entry.3 += particle.pt();
        }
        axes.iter()
            .zip(sums)
            .map(|(axis, (rap_sum, phi_sum, weight, pt))| {
                if weight > 0.0 {
                    PseudoJet::from_pt_rap_phi_m(pt, rap_sum / weight, phi_sum / weight, 0.0)
                } else {
                    *axis
                }
            })
            .collect()
    }

    fn tau_with_axes(&self, axes: &[PseudoJet], particles: &[PseudoJet]) -> f64 {
        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for particle in particles {
            let pt = particle.pt();
            if let Some((_, dist2)) = nearest_axis(axes, particle) {
                numerator += pt * dist2.sqrt().powf(self.beta);
            }
            denominator += pt * self.r0.powf(self.beta);
        }
        if denominator > 0.0 {
            numerator / denominator
        } else {
            0.0
        }
    }
}

fn nearest_axis(axes: &[PseudoJet], particle: &PseudoJet) -> Option<(usize, f64)> {
    axes.iter()
        .enumerate()
        .map(|(k, axis)| (k, axis.squared_distance(particle)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prong(pt: f64, rap: f64, phi: f64, spread: f64, count: usize) -> Vec<PseudoJet> {
        (0..count)
            .map(|k| {
                let offset = spread * (k as f64 - (count as f64 - 1.0) / 2.0);
                PseudoJet::from_pt_rap_phi_m(pt, rap + offset, phi - offset, 0.0)
            })
            .collect()
    }

    #[test]
    fn tau_is_zero_with_too_few_particles() {
        let particles = prong(10.0, 0.0, 0.0, 0.1, 2);
        let nsub = Nsubjettiness::default();
        assert_eq!(nsub.tau(2, &particles), 0.0);
        assert_eq!(nsub.tau(3, &particles), 0.0);
    }

    #[test]
    fn tau32_of_two_particles_is_nan() {
        let particles = prong(10.0, 0.0, 0.0, 0.3, 2);
        assert!(Nsubjettiness::default().tau32(&particles).is_nan());
    }

    #[test]
    fn three_prong_jet_has_small_tau32() {
        let mut particles = prong(30.0, 0.0, 0.0, 0.01, 3);
        particles.extend(prong(30.0, 0.6, 0.2, 0.01, 3));
        particles.extend(prong(30.0, 0.1, 0.7, 0.01, 3));
        let nsub = Nsubjettiness::default();
        let tau2 = nsub.tau(2, &particles);
        let tau3 = nsub.tau(3, &particles);
        assert!(tau2 > 0.0);
        assert!(tau3 < 0.2 * tau2, "tau3={tau3} tau2={tau2}");
    }

    #[test]
    fn tau_decreases_with_more_axes() {
        let mut particles = prong(40.0, 0.0, 0.0, 0.05, 4);
        particles.extend(prong(20.0, 0.5, 0.5, 0.05, 4));
        let nsub = Nsubjettiness::default();
        let tau1 = nsub.tau(1, &particles);
        let tau2 = nsub.tau(2, &particles);
        assert!(tau1 > tau2);
    }
}
