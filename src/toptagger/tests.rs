use super::triplets::{frec, hard_substructure, passes_mass_ratio};
use super::*;
use crate::jet::{JetAlgorithm, JetDefinition, join};

fn prong(pt: f64, rap: f64, phi: f64) -> Vec<PseudoJet> {
    [(-0.02, 0.01), (0.0, 0.0), (0.02, -0.01)]
        .into_iter()
        .map(|(dy, dphi)| PseudoJet::from_pt_rap_phi_m(pt / 3.0, rap + dy, phi + dphi, 0.0))
        .collect()
}

/// Three prongs: two 0.8 apart, the third 0.75 away from their midpoint.
fn three_prong_particles() -> Vec<PseudoJet> {
    let mut particles = prong(130.0, 0.0, 0.0);
    particles.extend(prong(130.0, 0.8, 0.0));
    particles.extend(prong(130.0, 0.4, 0.75));
    particles
}

fn leading(particles: &[PseudoJet]) -> (ClusterSequence, ClusteredJet) {
    let definition = JetDefinition::new(JetAlgorithm::CambridgeAachen, 1.5);
    let sequence = ClusterSequence::new(particles, definition);
    let jet = sequence.inclusive_jets_sorted(0.0)[0];
    (sequence, jet)
}

#[test]
fn finds_three_hard_substructures() {
    let (sequence, jet) = leading(&three_prong_particles());
    let parts = hard_substructure(&HepTopTaggerConfig::default(), &sequence, &jet);
    assert_eq!(parts.len(), 3);
    assert!(parts.iter().all(|part| part.m() < 30.0));
}

#[test]
fn reconstructs_three_prong_candidate() {
    let particles = three_prong_particles();
    let (sequence, jet) = leading(&particles);
    let tagger = HepTopTagger::new(HepTopTaggerConfig {
        optimal_r: false,
        ..HepTopTaggerConfig::default()
    })
    .unwrap();
    let candidate = tagger.result(&sequence, &jet).expect("candidate");
    assert!((candidate.top_mass() - join(&particles).m()).abs() < 1e-6);
    assert!(candidate.subjets[0].pt() >= candidate.subjets[1].pt());
    assert!(candidate.subjets[1].pt() >= candidate.subjets[2].pt());
    let expected = frec(tagger.config(), &candidate.subjets);
    assert_eq!(candidate.frec, expected);
    assert!(candidate.frec.is_finite() && candidate.frec >= 0.0);
    assert_eq!(candidate.r_opt, 1.5);
}

#[test]
fn optimal_r_stops_before_the_mass_drops() {
    let (sequence, jet) = leading(&three_prong_particles());
    let candidate = HepTopTagger::default()
        .result(&sequence, &jet)
        .expect("candidate");
    assert!((candidate.r_opt - 0.8).abs() < 1e-9, "{}", candidate.r_opt);
    assert!(candidate.top_mass() > 100.0);
}

#[test]
fn single_prong_jet_has_no_candidate() {
    let (sequence, jet) = leading(&prong(300.0, 0.0, 0.0));
    assert!(HepTopTagger::default().result(&sequence, &jet).is_none());
}

#[test]
fn two_prong_jet_has_no_candidate() {
    let mut particles = prong(200.0, 0.0, 0.0);
    particles.extend(prong(150.0, 0.6, 0.3));
    let (sequence, jet) = leading(&particles);
    assert!(HepTopTagger::default().result(&sequence, &jet).is_none());
}

#[test]
fn narrow_mass_ratio_band_rejects_symmetric_triplet() {
    let (sequence, jet) = leading(&three_prong_particles());
    let config = HepTopTaggerConfig {
        optimal_r: false,
        mass_ratio_width: 0.15,
        ..HepTopTaggerConfig::default()
    };
    let tagger = HepTopTagger::new(config.clone()).unwrap();
    assert!(tagger.result(&sequence, &jet).is_none());

    let wide = HepTopTaggerConfig::default();
    let subjets = [
        join(&prong(130.0, 0.0, 0.0)),
        join(&prong(130.0, 0.8, 0.0)),
        join(&prong(130.0, 0.4, 0.75)),
    ];
    assert!(passes_mass_ratio(&wide, &subjets));
    assert!(!passes_mass_ratio(&config, &subjets));
}

#[test]
fn candidate_mass_window_applies() {
    let (sequence, jet) = leading(&three_prong_particles());
    let tagger = HepTopTagger::new(HepTopTaggerConfig {
        optimal_r: false,
        max_candidate_mass: 50.0,
        ..HepTopTaggerConfig::default()
    })
    .unwrap();
    assert!(tagger.result(&sequence, &jet).is_none());
}

#[test]
fn all_modes_find_the_only_triplet() {
    let (sequence, jet) = leading(&three_prong_particles());
    for mode in [
        TaggerMode::EarlyMassRatioSortMass,
        TaggerMode::LateMassRatioSortMass,
        TaggerMode::EarlyMassRatioSortModDjade,
        TaggerMode::LateMassRatioSortModDjade,
        TaggerMode::TwoStepFilter,
    ] {
        let tagger = HepTopTagger::new(HepTopTaggerConfig {
            optimal_r: false,
            mode,
            ..HepTopTaggerConfig::default()
        })
        .unwrap();
        assert!(tagger.result(&sequence, &jet).is_some(), "{mode:?}");
    }
}

#[test]
fn reject_min_r_drops_results_at_smallest_radius() {
    let mut particles = prong(200.0, 0.0, 0.0);
    particles.extend(prong(200.0, 0.3, 0.0));
    particles.extend(prong(200.0, 0.15, 0.3));
    let (sequence, jet) = leading(&particles);
    let keep = HepTopTagger::default().result(&sequence, &jet);
    assert!(keep.as_ref().is_some_and(|c| (c.r_opt - 0.5).abs() < 1e-9));
    let tagger = HepTopTagger::new(HepTopTaggerConfig {
        reject_min_r: true,
        ..HepTopTaggerConfig::default()
    })
    .unwrap();
    assert!(tagger.result(&sequence, &jet).is_none());
}

#[test]
fn validation_rejects_bad_parameters() {
    let quark = HepTopTaggerConfig {
        quark_mode: true,
        ..HepTopTaggerConfig::default()
    };
    assert_eq!(
        HepTopTagger::new(quark).unwrap_err(),
        TaggerConfigError::QuarkModeUnsupported
    );
    let filter = HepTopTaggerConfig {
        filter_subjets: 2,
        ..HepTopTaggerConfig::default()
    };
    assert!(matches!(
        filter.validate(),
        Err(TaggerConfigError::InvalidParameter {
            name: "filter_subjets",
            ..
        })
    ));
    let scan = HepTopTaggerConfig {
        min_fatjet_r: 2.0,
        ..HepTopTaggerConfig::default()
    };
    assert!(matches!(
        scan.validate(),
        Err(TaggerConfigError::InvalidScan { .. })
    ));
}

#[test]
fn scan_radii_run_from_large_to_small() {
    let radii = HepTopTaggerConfig::default().scan_radii();
    assert_eq!(radii.len(), 11);
    assert_eq!(radii[0], 1.5);
    assert!((radii[10] - 0.5).abs() < 1e-12);
    assert!(radii.windows(2).all(|w| w[0] > w[1]));
}

#[test]
fn config_reads_partial_toml() {
    let config: HepTopTaggerConfig = toml::from_str("mode = \"late_mass_ratio_sort_mass\"\nfilter_subjets = 4\n").unwrap();
    assert_eq!(config.mode, TaggerMode::LateMassRatioSortMass);
    assert_eq!(config.filter_subjets, 4);
    assert_eq!(config.max_subjet_mass, 30.0);
}
