mod support;

use support::jets::{mixed_events, narrow_core_jet, soft_only_jet, top_like_jet};
use support::models::{COLLECTION, producer};
use toptag::event::{Event, Jet, Particle};
use toptag::jet::PseudoJet;
use toptag::pipeline::{DEGENERATE_SCORE, EventOutput, JetScratch};
use toptag::substructure::{EcfCatalog, compute_ratios, ecf_inputs};

fn score_bits(out: &EventOutput) -> Vec<(String, Vec<u32>)> {
    out.scores
        .iter()
        .map(|(label, scores)| (label.clone(), scores.iter().map(|s| s.to_bits()).collect()))
        .collect()
}

fn single_jet_event(jet: Jet) -> Event {
    Event::new(7, 11).with_collection(COLLECTION, vec![jet])
}

#[test]
fn repeated_runs_are_bit_identical() {
    for event in mixed_events(COLLECTION, 6) {
        let first = producer()
            .produce(&event, &mut JetScratch::new())
            .expect("first run");
        let second = producer()
            .produce(&event, &mut JetScratch::new())
            .expect("second run");
        assert_eq!(score_bits(&first), score_bits(&second));
    }
}

#[test]
fn every_model_gets_the_sentinel_for_degenerate_jets() {
    let event =
        Event::new(1, 1).with_collection(COLLECTION, vec![Jet::default(), soft_only_jet()]);
    let out = producer()
        .produce(&event, &mut JetScratch::new())
        .expect("produce");
    assert_eq!(out.scores.len(), 2);
    for scores in out.scores.values() {
        assert_eq!(scores, &vec![DEGENERATE_SCORE, DEGENERATE_SCORE]);
    }
}

fn column_bits(out: &EventOutput, label: &str) -> Vec<u32> {
    out.scores[label].iter().map(|s| s.to_bits()).collect()
}

#[test]
fn each_position_matches_its_jet_scored_alone() {
    let producer = producer();
    let jets = vec![
        top_like_jet(3),
        narrow_core_jet(4),
        soft_only_jet(),
        Jet::default(),
    ];
    let alone: Vec<EventOutput> = jets
        .iter()
        .map(|jet| producer.tag_jets(1, 1, std::slice::from_ref(jet), &mut JetScratch::new()))
        .collect();

    let order = [2usize, 3, 1, 0];
    let permuted: Vec<Jet> = order.iter().map(|&idx| jets[idx].clone()).collect();
    let together = producer.tag_jets(1, 1, &permuted, &mut JetScratch::new());

    for label in ["topTagv0", "topTaggrad"] {
        let column = column_bits(&together, label);
        assert_eq!(column.len(), jets.len());
        for (position, &idx) in order.iter().enumerate() {
            assert_eq!(
                column[position],
                column_bits(&alone[idx], label)[0],
                "{label} position {position}"
            );
        }
    }
}

#[test]
fn empty_jet_after_top_jet_matches_empty_jet_alone() {
    let producer = producer();
    let empty_alone = producer.tag_jets(1, 1, &[Jet::default()], &mut JetScratch::new());
    let pair = producer.tag_jets(1, 1, &[top_like_jet(8), Jet::default()], &mut JetScratch::new());
    for label in ["topTagv0", "topTaggrad"] {
        assert_eq!(column_bits(&pair, label)[1], column_bits(&empty_alone, label)[0]);
        assert_eq!(pair.scores[label][1], DEGENERATE_SCORE);
    }
}

#[test]
fn reused_scratch_does_not_leak_between_jets() {
    let producer = producer().with_diagnostics(true);
    let narrow = single_jet_event(narrow_core_jet(9));

    let mut shared = JetScratch::new();
    producer
        .produce(&single_jet_event(top_like_jet(9)), &mut shared)
        .expect("top jet");
    let after_top = producer.produce(&narrow, &mut shared).expect("after top");
    let alone = producer
        .produce(&narrow, &mut JetScratch::new())
        .expect("alone");

    assert_eq!(score_bits(&after_top), score_bits(&alone));
    let lhs = &after_top.diagnostics.as_ref().expect("diagnostics")[0];
    let rhs = &alone.diagnostics.as_ref().expect("diagnostics")[0];
    assert_eq!(lhs.observables.htt_mass, rhs.observables.htt_mass);
    assert_eq!(lhs.observables.htt_frec, rhs.observables.htt_frec);
    assert_eq!(
        lhs.observables.tau32_sd.to_bits(),
        rhs.observables.tau32_sd.to_bits()
    );
    for (a, b) in lhs.observables.ecf_ratios.iter().zip(rhs.observables.ecf_ratios) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
}

#[test]
fn narrow_core_has_no_top_candidate() {
    let producer = producer().with_diagnostics(true);
    let out = producer
        .produce(&single_jet_event(narrow_core_jet(5)), &mut JetScratch::new())
        .expect("produce");
    let diag = &out.diagnostics.as_ref().expect("diagnostics")[0];
    assert!(!diag.degenerate);
    assert_eq!(diag.observables.htt_mass, 0.0);
    assert_eq!(diag.observables.htt_frec, 0.0);
    assert_eq!(diag.htt_r_opt, None);
}

#[test]
fn three_prong_jet_reconstructs_a_top_candidate() {
    let producer = producer().with_diagnostics(true);
    let out = producer
        .produce(&single_jet_event(top_like_jet(5)), &mut JetScratch::new())
        .expect("produce");
    let diag = &out.diagnostics.as_ref().expect("diagnostics")[0];
    let mass = diag.observables.htt_mass;
    assert!((140.0..220.0).contains(&mass), "candidate mass {mass}");
    assert!(diag.observables.htt_frec >= 0.0);
    assert!(diag.htt_r_opt.is_some());
    assert!(diag.msd > 0.0);
}

#[test]
fn lone_hard_particle_covers_the_cone_area() {
    let producer = producer().with_diagnostics(true);
    let jet = Jet::new(vec![Particle::from_pt_eta_phi(250.0, 0.3, 1.2)]);
    let out = producer
        .produce(&single_jet_event(jet), &mut JetScratch::new())
        .expect("produce");
    let diag = &out.diagnostics.as_ref().expect("diagnostics")[0];
    let nominal = std::f64::consts::PI * 1.5 * 1.5;
    assert!(
        diag.area > 0.4 * nominal && diag.area < 1.3 * nominal,
        "area {}",
        diag.area
    );
    assert!(diag.msd.abs() < 1e-3);
}

#[test]
fn ecf_ratios_only_see_the_hardest_hundred_constituents() {
    let sorted: Vec<PseudoJet> = (0..150)
        .map(|i| {
            let i = i as f64;
            PseudoJet::from_pt_rap_phi_m(200.0 - i, 0.01 * (i % 13.0), 0.02 * (i % 7.0), 0.0)
        })
        .collect();
    let all = compute_ratios(&EcfCatalog::compute(ecf_inputs(&sorted)));
    let leading = compute_ratios(&EcfCatalog::compute(ecf_inputs(&sorted[..100])));
    for (a, b) in all.iter().zip(leading) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
    let fewer = compute_ratios(&EcfCatalog::compute(ecf_inputs(&sorted[..99])));
    assert_ne!(all, fewer);
}
