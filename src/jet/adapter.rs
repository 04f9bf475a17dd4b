use crate::event::Constituent;

use super::PseudoJet;

/// Constituents softer than this are dropped before clustering.
pub const MIN_CONSTITUENT_PT: f64 = 0.01;

/// Convert a constituent list into clustering inputs.
///
/// Each emitted 4-vector carries the constituent's position in the input
/// list as its `user_index`. An empty result is valid.
pub fn to_pseudojets<P: Constituent>(constituents: &[P]) -> Vec<PseudoJet> {
    constituents
        .iter()
        .enumerate()
        .filter(|(_, particle)| particle.pt() >= MIN_CONSTITUENT_PT)
        .map(|(idx, particle)| {
            PseudoJet::new(particle.px(), particle.py(), particle.pz(), particle.energy())
                .with_user_index(idx as i64)
        })
        .collect()
}
