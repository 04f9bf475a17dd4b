use super::PseudoJet;
use super::cluster::{ClusterSequence, ClusteredJet};

/// Soft-drop grooming in grooming mode (β ≥ 0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoftDrop {
    pub beta: f64,
    pub z_cut: f64,
    /// Radius used to normalise the opening angle.
    pub r0: f64,
}

impl Default for SoftDrop {
    fn default() -> Self {
        Self {
            beta: 1.0,
            z_cut: 0.15,
            r0: 1.5,
        }
    }
}

/// Result of grooming one clustered jet.
#[derive(Debug, Clone, PartialEq)]
pub struct GroomedJet {
    pub momentum: PseudoJet,
    /// Surviving non-ghost constituents, descending pt.
    pub constituents: Vec<PseudoJet>,
    pub area: f64,
    /// Opening angle of the branching that passed; zero if none did.
    pub delta_r: f64,
    /// Momentum sharing of the branching that passed; zero if none did.
    pub symmetry: f64,
}

impl GroomedJet {
    pub fn mass(&self) -> f64 {
        self.momentum.m()
    }
}

impl SoftDrop {
    /// Decluster `jet`, following the harder branch, until a branching
    /// satisfies `z > z_cut·(ΔR/R0)^β`. A jet that declusters down to a
    /// single particle is returned as that particle.
    pub fn groom(&self, sequence: &ClusterSequence, jet: &ClusteredJet) -> GroomedJet {
        let mut current = *jet;
        let mut delta_r = 0.0;
        let mut symmetry = 0.0;
        while let Some((a, b)) = sequence.parents(&current) {
            let (harder, softer) = if a.momentum().pt2() >= b.momentum().pt2() {
                (a, b)
            } else {
                (b, a)
            };
            let pt_sum = harder.pt() + softer.pt();
            let z = if pt_sum > 0.0 { softer.pt() / pt_sum } else { 0.0 };
            let dr = harder.momentum().delta_r(softer.momentum());
            if z > self.z_cut * (dr / self.r0).powf(self.beta) {
                delta_r = dr;
                symmetry = z;
                break;
            }
            current = harder;
        }
        GroomedJet {
            momentum: *current.momentum(),
            constituents: sequence.constituents_sorted(&current),
            area: sequence.area(&current),
            delta_r,
            symmetry,
        }
    }
}
