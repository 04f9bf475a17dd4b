//! Shape observables computed from groomed jet constituents.

pub mod ecf;
pub mod nsubjettiness;
pub mod ratios;

pub use ecf::{BETA_GRID, EcfCatalog};
pub use nsubjettiness::Nsubjettiness;
pub use ratios::{ECF_RATIOS, EcfIndex, EcfRatio, N_ECF_RATIOS, compute_ratios};

use crate::jet::PseudoJet;

/// ECFs are computed over at most this many of the hardest constituents.
pub const MAX_ECF_CONSTITUENTS: usize = 100;

/// The leading (at most [`MAX_ECF_CONSTITUENTS`]) entries of a pt-sorted list.
pub fn ecf_inputs(sorted_constituents: &[PseudoJet]) -> &[PseudoJet] {
    let keep = sorted_constituents.len().min(MAX_ECF_CONSTITUENTS);
    &sorted_constituents[..keep]
}
