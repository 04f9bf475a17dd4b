//! Boosted decision-tree classifiers and the registry that serves them.
//!
//! Models are plain JSON files validated on load. A model is only accepted
//! when its declared variables and spectators match the feature schema the
//! pipeline produces.

pub mod bdt;
pub mod registry;

use std::path::PathBuf;

use thiserror::Error;

pub use bdt::{BDT_MODEL_VERSION, BdtModel, BoostType, Node, Tree};
pub use registry::{FeatureSchema, ModelRegistry, ModelSpec, NamedModel, OUTPUT_PREFIX};

/// Errors raised while loading or checking classifiers.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Failed to read model {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse model {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid model {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
    #[error("Model {name} is invalid: {reason}")]
    Rejected { name: String, reason: String },
    #[error("Model {name} variables {found:?} do not match {expected:?}")]
    SchemaMismatch {
        name: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("Model {name} spectators {found:?} do not match {expected:?}")]
    SpectatorMismatch {
        name: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("Model name {name} is configured twice")]
    DuplicateName { name: String },
}
