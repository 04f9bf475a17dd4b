//! Jet building blocks: 4-vectors, constituent adaptation, reclustering and
//! grooming.

pub mod adapter;
pub mod cluster;
pub mod grooming;
mod pseudojet;

pub use adapter::{MIN_CONSTITUENT_PT, to_pseudojets};
pub use cluster::{
    AreaDefinition, ClusterSequence, ClusteredJet, GhostedAreaSpec, JetAlgorithm, JetDefinition,
};
pub use grooming::{GroomedJet, SoftDrop};
pub use pseudojet::{GHOST_USER_INDEX, MAX_RAP, PseudoJet, join, sort_by_pt_desc};
