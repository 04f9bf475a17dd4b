//! Per-jet feature extraction and scoring.
//!
//! Each jet is reclustered with ghosts, groomed, measured and handed to every
//! registered classifier. Work buffers live in a [`JetScratch`] owned by the
//! caller so one producer can serve several worker threads.

pub mod features;
pub mod producer;
pub mod scratch;
pub mod version;

pub use features::{
    FEATURE_NAMES, FEATURE_VECTOR_LEN, FEATURE_VERSION, SPECTATOR_NAMES, Spectators,
    TOP_TAG_SCHEMA, fill_feature_vector,
};
pub use producer::{
    CLUSTER_RADIUS, DEGENERATE_SCORE, EventOutput, JetDiagnostics, MIN_JET_PT, ProducerError,
    TopTagProducer,
};
pub use scratch::{JetScratch, ObservableSet};
pub use version::{feature_version, feature_version_for};
