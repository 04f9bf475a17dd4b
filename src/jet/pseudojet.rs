use std::f64::consts::PI;
use std::ops::Add;

/// Rapidity assigned to momenta travelling exactly along the beam axis.
pub const MAX_RAP: f64 = 1e5;
/// `user_index` carried by ghost particles added for area measurement.
pub const GHOST_USER_INDEX: i64 = -1;
/// `user_index` of 4-vectors that do not correspond to a single input.
pub const NO_USER_INDEX: i64 = -2;

const TWO_PI: f64 = 2.0 * PI;

/// Four-momentum used throughout clustering, grooming and substructure.
///
/// Rapidity, azimuth and squared transverse momentum are cached at
/// construction so distance computations stay cheap inside clustering loops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PseudoJet {
    px: f64,
    py: f64,
    pz: f64,
    e: f64,
    pt2: f64,
    rap: f64,
    phi: f64,
    user_index: i64,
}

impl PseudoJet {
    /// Build a 4-vector from Cartesian components.
    pub fn new(px: f64, py: f64, pz: f64, e: f64) -> Self {
        let pt2 = px * px + py * py;
        let phi = if pt2 == 0.0 {
            0.0
        } else {
            let phi = py.atan2(px);
            if phi < 0.0 { phi + TWO_PI } else { phi }
        };
        let rap = if e == pz.abs() && pt2 == 0.0 {
            let max_rap = MAX_RAP + pz.abs();
            if pz >= 0.0 { max_rap } else { -max_rap }
        } else {
            let m2 = (e + pz) * (e - pz) - pt2;
            let e_plus_pz = e + pz.abs();
            let rap = 0.5 * ((pt2 + m2.max(0.0)) / (e_plus_pz * e_plus_pz)).ln();
            if pz > 0.0 { -rap } else { rap }
        };
        Self {
            px,
            py,
            pz,
            e,
            pt2,
            rap,
            phi,
            user_index: NO_USER_INDEX,
        }
    }

    /// Build a 4-vector from transverse momentum, rapidity, azimuth and mass.
    pub fn from_pt_rap_phi_m(pt: f64, rap: f64, phi: f64, m: f64) -> Self {
        let mt = (pt * pt + m * m).sqrt();
        let mut jet = Self::new(
            pt * phi.cos(),
            pt * phi.sin(),
            mt * rap.sinh(),
            mt * rap.cosh(),
        );
        // Keep the requested coordinates exactly; they would otherwise carry
        // round-off from the Cartesian conversion.
        jet.rap = rap;
        jet.phi = phi.rem_euclid(TWO_PI);
        jet
    }

    /// Return a copy tagged with `user_index`.
    pub fn with_user_index(mut self, user_index: i64) -> Self {
        self.user_index = user_index;
        self
    }

    pub fn user_index(&self) -> i64 {
        self.user_index
    }

    pub fn px(&self) -> f64 {
        self.px
    }

    pub fn py(&self) -> f64 {
        self.py
    }

    pub fn pz(&self) -> f64 {
        self.pz
    }

    pub fn e(&self) -> f64 {
        self.e
    }

    pub fn pt2(&self) -> f64 {
        self.pt2
    }

    pub fn pt(&self) -> f64 {
        self.pt2.sqrt()
    }

    /// Rapidity `y`.
    pub fn rap(&self) -> f64 {
        self.rap
    }

    /// Azimuth in `[0, 2π)`.
    pub fn phi(&self) -> f64 {
        self.phi
    }

    /// Pseudorapidity `η`.
    pub fn eta(&self) -> f64 {
        if self.pt2 == 0.0 {
            let max_rap = MAX_RAP + self.pz.abs();
            return if self.pz >= 0.0 { max_rap } else { -max_rap };
        }
        (self.pz / self.pt()).asinh()
    }

    pub fn m2(&self) -> f64 {
        (self.e + self.pz) * (self.e - self.pz) - self.pt2
    }

    /// Invariant mass; negative when `m²` is negative.
    pub fn m(&self) -> f64 {
        let m2 = self.m2();
        if m2 < 0.0 { -(-m2).sqrt() } else { m2.sqrt() }
    }

    /// Signed azimuthal separation folded into `[-π, π]`.
    pub fn delta_phi_to(&self, other: &PseudoJet) -> f64 {
        let mut dphi = other.phi - self.phi;
        if dphi > PI {
            dphi -= TWO_PI;
        } else if dphi < -PI {
            dphi += TWO_PI;
        }
        dphi
    }

    /// Squared distance in the rapidity-azimuth plane.
    pub fn squared_distance(&self, other: &PseudoJet) -> f64 {
        let dphi = self.delta_phi_to(other);
        let drap = self.rap - other.rap;
        drap * drap + dphi * dphi
    }

    /// Distance in the rapidity-azimuth plane.
    pub fn delta_r(&self, other: &PseudoJet) -> f64 {
        self.squared_distance(other).sqrt()
    }

    /// Distance in the pseudorapidity-azimuth plane.
    pub fn delta_r_eta(&self, other: &PseudoJet) -> f64 {
        let dphi = self.delta_phi_to(other);
        let deta = self.eta() - other.eta();
        (deta * deta + dphi * dphi).sqrt()
    }
}

impl Add for PseudoJet {
    type Output = PseudoJet;

    fn add(self, rhs: PseudoJet) -> PseudoJet {
        PseudoJet::new(
            self.px + rhs.px,
            self.py + rhs.py,
            self.pz + rhs.pz,
            self.e + rhs.e,
        )
    }
}

/// E-scheme sum of a set of 4-vectors.
pub fn join(jets: &[PseudoJet]) -> PseudoJet {
    let (px, py, pz, e) = jets.iter().fold((0.0, 0.0, 0.0, 0.0), |acc, jet| {
        (acc.0 + jet.px, acc.1 + jet.py, acc.2 + jet.pz, acc.3 + jet.e)
    });
    PseudoJet::new(px, py, pz, e)
}

/// Sort in place by descending transverse momentum.
///
/// The sort is stable, so equal-pt entries keep their input order.
pub fn sort_by_pt_desc(jets: &mut [PseudoJet]) {
    jets.sort_by(|a, b| b.pt2.total_cmp(&a.pt2));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn massless_vector_round_trips_coordinates() {
        let jet = PseudoJet::from_pt_rap_phi_m(50.0, 1.2, 0.4, 0.0);
        let rebuilt = PseudoJet::new(jet.px(), jet.py(), jet.pz(), jet.e());
        assert!((rebuilt.rap() - 1.2).abs() < 1e-12);
        assert!((rebuilt.phi() - 0.4).abs() < 1e-12);
        assert!((rebuilt.pt() - 50.0).abs() < 1e-9);
        assert!(rebuilt.m().abs() < 1e-5);
    }

    #[test]
    fn azimuth_wraps_into_positive_range() {
        let jet = PseudoJet::new(1.0, -1.0, 0.0, 2.0);
        assert!((jet.phi() - 1.75 * PI).abs() < 1e-12);
    }

    #[test]
    fn distance_uses_shortest_azimuthal_path() {
        let a = PseudoJet::from_pt_rap_phi_m(1.0, 0.0, 0.1, 0.0);
        let b = PseudoJet::from_pt_rap_phi_m(1.0, 0.0, TWO_PI - 0.1, 0.0);
        assert!((a.delta_r(&b) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn beam_axis_momentum_gets_capped_rapidity() {
        let jet = PseudoJet::new(0.0, 0.0, 10.0, 10.0);
        assert!(jet.rap() > MAX_RAP);
        assert!(jet.eta() > MAX_RAP);
    }

    #[test]
    fn two_back_to_back_massless_particles_have_expected_mass() {
        let a = PseudoJet::new(10.0, 0.0, 0.0, 10.0);
        let b = PseudoJet::new(-10.0, 0.0, 0.0, 10.0);
        assert!(((a + b).m() - 20.0).abs() < 1e-12);
        assert!((join(&[a, b]).m() - 20.0).abs() < 1e-12);
    }

    #[test]
    fn sort_by_pt_is_descending() {
        let mut jets = vec![
            PseudoJet::new(1.0, 0.0, 0.0, 1.0),
            PseudoJet::new(3.0, 0.0, 0.0, 3.0),
            PseudoJet::new(2.0, 0.0, 0.0, 2.0),
        ];
        sort_by_pt_desc(&mut jets);
        let pts: Vec<f64> = jets.iter().map(PseudoJet::pt).collect();
        assert_eq!(pts, vec![3.0, 2.0, 1.0]);
    }
}
