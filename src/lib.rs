//! Library exports for reuse in benchmarks and tests.
/// Per-user application directories.
pub mod app_dirs;
/// Runner configuration persisted as TOML.
pub mod config;
/// Host-facing event, jet and particle types.
pub mod event;
/// Jet clustering, areas and grooming.
pub mod jet;
/// File and stderr logging setup.
pub mod logging;
/// Boosted decision tree classifiers and the model registry.
pub mod ml;
/// Per-jet observable computation and scoring.
pub mod pipeline;
/// JSON-lines batch runner.
pub mod runner;
/// Energy correlation functions and N-subjettiness.
pub mod substructure;
/// HEPTopTagger top candidate reconstruction.
pub mod toptagger;
