//! Optimal-R scan over progressively smaller reclusterings of the fat jet.

use super::config::HepTopTaggerConfig;
use super::triplets::{self, Attempt};
use crate::jet::{ClusterSequence, ClusteredJet};

#[derive(Debug, Clone, PartialEq)]
pub(super) struct Scan {
    pub best: Option<Attempt>,
    pub r_opt: f64,
    pub at_min_r: bool,
}

/// Reconstruction on the fat jet only.
pub(super) fn single(
    config: &HepTopTaggerConfig,
    sequence: &ClusterSequence,
    jet: &ClusteredJet,
) -> Scan {
    Scan {
        best: triplets::reconstruct(config, sequence, jet),
        r_opt: config.max_fatjet_r,
        at_min_r: false,
    }
}

/// Scan from the largest radius down. The optimal radius is the last one
/// before the candidate mass falls below `(1 - threshold)` of its value at
/// the largest radius; the smallest radius when it never does.
pub(super) fn scan(config: &HepTopTaggerConfig, sequence: &ClusterSequence, jet: &ClusteredJet) -> Scan {
    let radii = config.scan_radii();
    let mut attempts: Vec<Option<Attempt>> = Vec::with_capacity(radii.len());
    let mut reference_mass = 0.0;
    let mut chosen = None;
    for (idx, &radius) in radii.iter().enumerate() {
        let attempt = hardest_subjet(sequence, jet, radius)
            .and_then(|small| triplets::reconstruct(config, sequence, &small));
        let mass = attempt.as_ref().map_or(0.0, |a| a.candidate.m());
        tracing::trace!(radius, mass, "optimal-R step");
        if idx == 0 {
            reference_mass = mass;
        } else if mass < (1.0 - config.optimal_r_threshold) * reference_mass {
            chosen = Some(idx - 1);
            break;
        }
        attempts.push(attempt);
    }
    let last = radii.len().saturating_sub(1);
    let idx = chosen.unwrap_or(last);
    Scan {
        best: attempts.get_mut(idx).and_then(Option::take),
        r_opt: radii.get(idx).copied().unwrap_or(config.max_fatjet_r),
        at_min_r: idx == last,
    }
}

/// Split `jet` wherever two merged branches sit at least `radius` apart and
/// return the hardest non-ghost piece.
pub(super) fn hardest_subjet(
    sequence: &ClusterSequence,
    jet: &ClusteredJet,
    radius: f64,
) -> Option<ClusteredJet> {
    let mut hardest: Option<ClusteredJet> = None;
    let mut stack = vec![*jet];
    while let Some(node) = stack.pop() {
        if sequence.is_pure_ghost(&node) {
            continue;
        }
        match sequence.parents(&node) {
            Some((a, b)) if a.momentum().delta_r(b.momentum()) >= radius => {
                stack.push(b);
                stack.push(a);
            }
            _ => {
                if hardest
                    .as_ref()
                    .is_none_or(|best| node.momentum().pt2() > best.momentum().pt2())
                {
                    hardest = Some(node);
                }
            }
        }
    }
    hardest
}
