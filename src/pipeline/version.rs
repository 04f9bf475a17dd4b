use std::sync::LazyLock;

use super::features::{FEATURE_NAMES, FEATURE_VERSION, SPECTATOR_NAMES};
use super::producer::{CLUSTER_RADIUS, MIN_JET_PT};
use crate::jet::{GhostedAreaSpec, MIN_CONSTITUENT_PT, SoftDrop};
use crate::substructure::{BETA_GRID, MAX_ECF_CONSTITUENTS, Nsubjettiness};
use crate::toptagger::HepTopTaggerConfig;

/// Identifier of the feature computation with its default parameters.
///
/// Any change to a fixed algorithm parameter or to the schema changes it.
pub fn feature_version() -> &'static str {
    &FEATURE_VERSION_ID
}

/// Identifier for the feature computation with `tagger` settings.
pub fn feature_version_for(tagger: &HepTopTaggerConfig) -> String {
    let area = GhostedAreaSpec::default();
    let soft_drop = SoftDrop::default();
    let nsub = Nsubjettiness::default();
    let payload = format!(
        "features={FEATURE_VERSION}|names={}|spectators={}|min_pt={MIN_CONSTITUENT_PT}|\
         ca_r={CLUSTER_RADIUS}|jet_pt={MIN_JET_PT}|ghost_rap={}|ghost_area={}|repeat={}|\
         grid_scatter={}|pt_scatter={}|ghost_pt={}|seed={}|sd_beta={}|sd_zcut={}|sd_r0={}|\
         nsub_beta={}|nsub_r0={}|nsub_iter={}|nsub_precision={}|ecf_beta={:?}|ecf_max={MAX_ECF_CONSTITUENTS}|\
         htt={tagger:?}",
        FEATURE_NAMES.join(","),
        SPECTATOR_NAMES.join(","),
        area.ghost_max_rap,
        area.ghost_area,
        area.repeat,
        area.grid_scatter,
        area.pt_scatter,
        area.mean_ghost_pt,
        area.seed,
        soft_drop.beta,
        soft_drop.z_cut,
        soft_drop.r0,
        nsub.beta,
        nsub.r0,
        nsub.max_iterations,
        nsub.precision,
        BETA_GRID,
    );
    let hash = blake3::hash(payload.as_bytes());
    format!("features_v{FEATURE_VERSION}_{}", hash.to_hex())
}

static FEATURE_VERSION_ID: LazyLock<String> =
    LazyLock::new(|| feature_version_for(&HepTopTaggerConfig::default()));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_stable_and_prefixed() {
        assert_eq!(feature_version(), feature_version());
        assert!(feature_version().starts_with("features_v1_"));
    }

    #[test]
    fn tagger_settings_change_the_version() {
        let tweaked = HepTopTaggerConfig {
            mass_drop: 0.7,
            ..HepTopTaggerConfig::default()
        };
        assert_ne!(feature_version_for(&tweaked), feature_version());
    }
}
