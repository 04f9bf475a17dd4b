//! Single-radius reconstruction: hard substructure, triplet filtering and
//! candidate selection.

use super::config::{HepTopTaggerConfig, TaggerMode};
use crate::jet::{
    ClusterSequence, ClusteredJet, JetAlgorithm, JetDefinition, PseudoJet, join, sort_by_pt_desc,
};

/// Radius used to split a candidate into exactly three subjets.
const SUBJET_RADIUS: f64 = 3.14;

/// Best triplet found at one radius.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Attempt {
    pub candidate: PseudoJet,
    pub subjets: [PseudoJet; 3],
    pub mass_ratio_passed: bool,
}

/// Mass-drop declustering: follow the heavier branch while the node is above
/// `max_subjet_mass`, and also keep the lighter branch when the heavier one
/// drops below `mass_drop` times the node mass. Pure-ghost nodes are ignored.
pub(super) fn hard_substructure(
    config: &HepTopTaggerConfig,
    sequence: &ClusterSequence,
    jet: &ClusteredJet,
) -> Vec<ClusteredJet> {
    let mut parts = Vec::new();
    let mut stack = vec![*jet];
    while let Some(node) = stack.pop() {
        if sequence.is_pure_ghost(&node) {
            continue;
        }
        let split = if node.m() < config.max_subjet_mass {
            None
        } else {
            sequence.parents(&node)
        };
        match split {
            None => parts.push(node),
            Some((a, b)) => {
                let (heavy, light) = if a.m() < b.m() { (b, a) } else { (a, b) };
                if heavy.m() < config.mass_drop * node.m() {
                    stack.push(light);
                }
                stack.push(heavy);
            }
        }
    }
    parts
}

/// Run the triplet search on `jet`.
pub(super) fn reconstruct(
    config: &HepTopTaggerConfig,
    sequence: &ClusterSequence,
    jet: &ClusteredJet,
) -> Option<Attempt> {
    let mut parts = hard_substructure(config, sequence, jet);
    if parts.len() < 3 {
        return None;
    }
    let triplets: Vec<[usize; 3]> = if config.mode == TaggerMode::TwoStepFilter {
        parts.sort_by(|a, b| b.momentum().pt2().total_cmp(&a.momentum().pt2()));
        vec![[0, 1, 2]]
    } else {
        let n = parts.len();
        let mut all = Vec::with_capacity(n * (n - 1) * (n - 2) / 6);
        for i in 0..n {
            for j in (i + 1)..n {
                for k in (j + 1)..n {
                    all.push([i, j, k]);
                }
            }
        }
        all
    };

    let mut best: Option<(f64, Attempt)> = None;
    for triplet in triplets {
        let members = triplet.map(|idx| parts[idx]);
        let Some(attempt) = filtered_triplet(config, sequence, &members) else {
            continue;
        };
        if config.mode.early_mass_ratio() && !attempt.mass_ratio_passed {
            continue;
        }
        // Lower score wins.
        let score = if config.mode.sorts_by_djade() {
            -djade_sum(&attempt.subjets, &attempt.candidate)
        } else {
            (attempt.candidate.m() - config.top_mass).abs()
        };
        if best.as_ref().is_none_or(|(current, _)| score < *current) {
            best = Some((score, attempt));
        }
    }
    best.map(|(_, attempt)| attempt)
}

fn filtered_triplet(
    config: &HepTopTaggerConfig,
    sequence: &ClusterSequence,
    members: &[ClusteredJet; 3],
) -> Option<Attempt> {
    let [a, b, c] = members.map(|m| *m.momentum());
    let min_distance2 = a
        .squared_distance(&b)
        .min(a.squared_distance(&c))
        .min(b.squared_distance(&c));
    let filter_radius = config.filter_radius.min(0.5 * min_distance2.sqrt());
    if !(filter_radius > 0.0) {
        return None;
    }

    let constituents: Vec<PseudoJet> = members
        .iter()
        .flat_map(|member| sequence.constituents(member))
        .collect();
    let filter = ClusterSequence::new(
        &constituents,
        JetDefinition::new(JetAlgorithm::CambridgeAachen, filter_radius),
    );
    let pieces: Vec<ClusteredJet> = filter
        .inclusive_jets_sorted(0.0)
        .into_iter()
        .take(config.filter_subjets)
        .collect();
    if pieces.len() < 3 {
        return None;
    }
    let kept: Vec<PseudoJet> = pieces
        .iter()
        .flat_map(|piece| filter.constituents(piece))
        .collect();
    if kept.len() < 3 {
        return None;
    }
    let candidate = join(&kept);
    let mass = candidate.m();
    if mass < config.min_candidate_mass || config.max_candidate_mass < mass {
        return None;
    }

    let split = ClusterSequence::new(
        &kept,
        JetDefinition::new(JetAlgorithm::CambridgeAachen, SUBJET_RADIUS),
    );
    let mut subjets: Vec<PseudoJet> = split
        .exclusive_jets(3)
        .iter()
        .map(|jet| *jet.momentum())
        .collect();
    sort_by_pt_desc(&mut subjets);
    let subjets: [PseudoJet; 3] = subjets.try_into().ok()?;
    if subjets.iter().any(|s| s.pt() < config.min_subjet_pt) {
        return None;
    }

    Some(Attempt {
        mass_ratio_passed: passes_mass_ratio(config, &subjets),
        candidate,
        subjets,
    })
}

/// The A-shaped mass-plane selection on pt-ordered subjets.
pub(super) fn passes_mass_ratio(config: &HepTopTaggerConfig, subjets: &[PseudoJet; 3]) -> bool {
    let [s1, s2, s3] = *subjets;
    let m12 = (s1 + s2).m();
    let m13 = (s1 + s3).m();
    let m23 = (s2 + s3).m();
    let m123 = join(subjets).m();
    let (rmin, rmax) = config.mass_ratio_band();

    let atan1312 = (m13 / m12).atan();
    let r23 = m23 / m123;
    let r23_sq = r23 * r23;
    let (rmin2, rmax2) = (rmin * rmin, rmax * rmax);
    let m13m12 = 1.0 + (m13 / m12).powi(2);
    let m12m13 = 1.0 + (m12 / m13).powi(2);

    let w_in_23 = atan1312 > config.min_m13_cut
        && config.max_m13_cut > atan1312
        && r23 > rmin
        && rmax > r23;
    let w_in_12 = r23_sq < 1.0 - rmin2 * m13m12
        && r23_sq > 1.0 - rmax2 * m13m12
        && r23 > config.min_m23_cut;
    let w_in_13 = r23_sq < 1.0 - rmin2 * m12m13
        && r23_sq > 1.0 - rmax2 * m12m13
        && r23 > config.min_m23_cut;
    w_in_23 || w_in_12 || w_in_13
}

/// `min_ij |(m_ij/m_123)/(m_W/m_t) - 1|` over the subjet pairs.
pub(super) fn frec(config: &HepTopTaggerConfig, subjets: &[PseudoJet; 3]) -> f64 {
    let [s1, s2, s3] = *subjets;
    let m123 = join(subjets).m();
    let reference = config.w_mass / config.top_mass;
    [(s1 + s2).m(), (s1 + s3).m(), (s2 + s3).m()]
        .into_iter()
        .map(|mij| ((mij / m123) / reference - 1.0).abs())
        .fold(f64::INFINITY, f64::min)
}

fn djade_sum(subjets: &[PseudoJet; 3], reference: &PseudoJet) -> f64 {
    let [s1, s2, s3] = subjets;
    djade(s1, s2, reference) + djade(s1, s3, reference) + djade(s2, s3, reference)
}

fn djade(a: &PseudoJet, b: &PseudoJet, reference: &PseudoJet) -> f64 {
    let dr = a.delta_r(b);
    perp_to(a, reference) * perp_to(b, reference) * dr.powi(4)
}

/// Momentum of `vec` transverse to the direction of `reference`.
fn perp_to(vec: &PseudoJet, reference: &PseudoJet) -> f64 {
    let ref2 = reference.px().powi(2) + reference.py().powi(2) + reference.pz().powi(2);
    let dot = vec.px() * reference.px() + vec.py() * reference.py() + vec.pz() * reference.pz();
    let mut perp2 = vec.px().powi(2) + vec.py().powi(2) + vec.pz().powi(2);
    if ref2 > 0.0 {
        perp2 -= dot * dot / ref2;
    }
    perp2.max(0.0).sqrt()
}
