//! Sequential-recombination clustering (kt family) with optional ghost areas.
//!
//! The sequence keeps its full merge history so that jets can be
//! declustered afterwards (soft drop, mass-drop substructure search) and so
//! that exclusive jets can be read off at any stage.

mod area;
mod tiling;

use std::cmp::Ordering;
use std::collections::BinaryHeap;

pub use area::{AreaDefinition, GhostedAreaSpec};

use super::pseudojet::{GHOST_USER_INDEX, PseudoJet, sort_by_pt_desc};
use tiling::Tiling;

/// Distance measure used by the sequential recombination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JetAlgorithm {
    Kt,
    CambridgeAachen,
    AntiKt,
}

/// Algorithm plus angular radius; recombination is always the E-scheme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JetDefinition {
    pub algorithm: JetAlgorithm,
    pub radius: f64,
}

impl JetDefinition {
    /// Radius large enough that no pair ever falls outside it.
    pub const MAX_ALLOWABLE_R: f64 = 1000.0;

    pub fn new(algorithm: JetAlgorithm, radius: f64) -> Self {
        Self { algorithm, radius }
    }

    fn momentum_factor(&self, jet: &PseudoJet) -> f64 {
        match self.algorithm {
            JetAlgorithm::Kt => jet.pt2(),
            JetAlgorithm::CambridgeAachen => 1.0,
            JetAlgorithm::AntiKt => {
                if jet.pt2() > 0.0 {
                    1.0 / jet.pt2()
                } else {
                    f64::MAX
                }
            }
        }
    }
}

/// A jet produced by a [`ClusterSequence`], addressed by its history entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusteredJet {
    momentum: PseudoJet,
    history: usize,
}

impl ClusteredJet {
    pub fn momentum(&self) -> &PseudoJet {
        &self.momentum
    }

    pub fn pt(&self) -> f64 {
        self.momentum.pt()
    }

    pub fn m(&self) -> f64 {
        self.momentum.m()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    Input,
    Merge { parent1: usize, parent2: usize },
    Beam { parent: usize },
}

#[derive(Debug, Clone)]
struct HistoryEntry {
    step: Step,
    jet: Option<usize>,
    ghosts: u32,
    real: u32,
}

/// Heap entry ordered so that `BinaryHeap` pops the smallest distance first.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    dij: f64,
    jet: usize,
    generation: u32,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dij
            .total_cmp(&self.dij)
            .then_with(|| other.jet.cmp(&self.jet))
    }
}

/// Per-jet bookkeeping while the clustering runs.
struct Active {
    alive: Vec<bool>,
    tile: Vec<usize>,
    nn: Vec<Option<usize>>,
    nn_dist: Vec<f64>,
    mom: Vec<f64>,
    generation: Vec<u32>,
}

/// Full clustering history of one set of inputs.
#[derive(Debug, Clone)]
pub struct ClusterSequence {
    definition: JetDefinition,
    jets: Vec<PseudoJet>,
    history: Vec<HistoryEntry>,
    jet_history: Vec<usize>,
    ghost_area: f64,
    n_inputs: usize,
}

impl ClusterSequence {
    /// Cluster `particles` without area information.
    pub fn new(particles: &[PseudoJet], definition: JetDefinition) -> Self {
        Self::run(particles.to_vec(), definition, 0.0)
    }

    /// Cluster `particles` together with explicit ghosts for area measurement.
    pub fn with_area(
        particles: &[PseudoJet],
        definition: JetDefinition,
        area: &AreaDefinition,
    ) -> Self {
        let spec = area.ghost_spec();
        let mut inputs = particles.to_vec();
        for repeat in 0..spec.repeat.max(1) {
            inputs.extend(spec.ghosts(repeat));
        }
        Self::run(inputs, definition, spec.actual_ghost_area())
    }

    pub fn definition(&self) -> &JetDefinition {
        &self.definition
    }

    fn run(inputs: Vec<PseudoJet>, definition: JetDefinition, ghost_area: f64) -> Self {
        let n = inputs.len();
        let mut sequence = Self {
            definition,
            jets: Vec::with_capacity(2 * n),
            history: Vec::with_capacity(2 * n),
            jet_history: Vec::with_capacity(2 * n),
            ghost_area,
            n_inputs: n,
        };
        for (idx, jet) in inputs.into_iter().enumerate() {
            let ghost = jet.user_index() == GHOST_USER_INDEX;
            sequence.jets.push(jet);
            sequence.jet_history.push(idx);
            sequence.history.push(HistoryEntry {
                step: Step::Input,
                jet: Some(idx),
                ghosts: u32::from(ghost),
                real: u32::from(!ghost),
            });
        }
        sequence.cluster();
        sequence
    }

    fn cluster(&mut self) {
        let n = self.jets.len();
        if n == 0 {
            return;
        }
        let r2 = self.definition.radius * self.definition.radius;
        let mut tiling = Tiling::new(
            self.jets.iter().map(PseudoJet::rap),
            n,
            self.definition.radius,
        );
        let capacity = 2 * n;
        let mut state = Active {
            alive: vec![false; capacity],
            tile: vec![0; capacity],
            nn: vec![None; capacity],
            nn_dist: vec![r2; capacity],
            mom: vec![0.0; capacity],
            generation: vec![0; capacity],
        };
        for idx in 0..n {
            let tile = tiling.tile_of(self.jets[idx].rap(), self.jets[idx].phi());
            tiling.insert(tile, idx);
            state.alive[idx] = true;
            state.tile[idx] = tile;
            state.mom[idx] = self.definition.momentum_factor(&self.jets[idx]);
        }

        let mut heap = BinaryHeap::with_capacity(capacity);
        for idx in 0..n {
            self.find_nearest(idx, &tiling, &mut state, r2);
            heap.push(self.candidate(idx, &mut state, r2));
        }

        let mut remaining = n;
        while remaining > 0 {
            let Some(top) = heap.pop() else {
                break;
            };
            if !state.alive[top.jet] || state.generation[top.jet] != top.generation {
                continue;
            }
            let i = top.jet;
            match state.nn[i] {
                Some(j) => {
                    let k = self.merge(i, j);
                    for dead in [i, j] {
                        state.alive[dead] = false;
                        tiling.remove(state.tile[dead], dead);
                    }
                    let tile = tiling.tile_of(self.jets[k].rap(), self.jets[k].phi());
                    tiling.insert(tile, k);
                    state.alive[k] = true;
                    state.tile[k] = tile;
                    state.mom[k] = self.definition.momentum_factor(&self.jets[k]);
                    self.find_nearest(k, &tiling, &mut state, r2);
                    heap.push(self.candidate(k, &mut state, r2));

                    let mut touched = self.neighbours_of(&tiling, &[
                        state.tile[i],
                        state.tile[j],
                        tile,
                    ]);
                    touched.retain(|&m| m != k);
                    for m in touched {
                        let previous = (state.nn[m], state.nn_dist[m]);
                        if state.nn[m] == Some(i) || state.nn[m] == Some(j) {
                            self.find_nearest(m, &tiling, &mut state, r2);
                        } else {
                            let dist = self.jets[m].squared_distance(&self.jets[k]);
                            if dist < state.nn_dist[m] {
                                state.nn[m] = Some(k);
                                state.nn_dist[m] = dist;
                            }
                        }
                        if previous != (state.nn[m], state.nn_dist[m]) {
                            heap.push(self.candidate(m, &mut state, r2));
                        }
                    }
                    remaining -= 1;
                }
                None => {
                    self.history.push(HistoryEntry {
                        step: Step::Beam {
                            parent: self.jet_history[i],
                        },
                        jet: None,
                        ghosts: 0,
                        real: 0,
                    });
                    state.alive[i] = false;
                    tiling.remove(state.tile[i], i);
                    for m in self.neighbours_of(&tiling, &[state.tile[i]]) {
                        if state.nn[m] == Some(i) {
                            self.find_nearest(m, &tiling, &mut state, r2);
                            heap.push(self.candidate(m, &mut state, r2));
                        }
                    }
                    remaining -= 1;
                }
            }
        }
    }

    fn neighbours_of(&self, tiling: &Tiling, tiles: &[usize]) -> Vec<usize> {
        let mut around: Vec<usize> = tiles
            .iter()
            .flat_map(|&tile| tiling.neighbourhood(tile).iter().copied())
            .collect();
        around.sort_unstable();
        around.dedup();
        around
            .into_iter()
            .flat_map(|tile| tiling.members(tile).iter().copied())
            .collect()
    }

    fn find_nearest(&self, idx: usize, tiling: &Tiling, state: &mut Active, r2: f64) {
        let mut best = None;
        let mut best_dist = r2;
        for &tile in tiling.neighbourhood(state.tile[idx]) {
            for &other in tiling.members(tile) {
                if other == idx {
                    continue;
                }
                let dist = self.jets[idx].squared_distance(&self.jets[other]);
                if dist < best_dist {
                    best_dist = dist;
                    best = Some(other);
                }
            }
        }
        state.nn[idx] = best;
        state.nn_dist[idx] = best_dist;
    }

    /// Fresh heap entry for `idx`; older entries for the same jet go stale.
    fn candidate(&self, idx: usize, state: &mut Active, r2: f64) -> Candidate {
        let mom = match state.nn[idx] {
            Some(nn) => state.mom[idx].min(state.mom[nn]),
            None => state.mom[idx],
        };
        state.generation[idx] = state.generation[idx].wrapping_add(1);
        Candidate {
            dij: state.nn_dist[idx] / r2 * mom,
            jet: idx,
            generation: state.generation[idx],
        }
    }

    fn merge(&mut self, i: usize, j: usize) -> usize {
        let (hi, hj) = (self.jet_history[i], self.jet_history[j]);
        let (parent1, parent2) = if hi < hj { (hi, hj) } else { (hj, hi) };
        let merged = self.jets[i] + self.jets[j];
        let k = self.jets.len();
        self.jets.push(merged);
        self.jet_history.push(self.history.len());
        let ghosts = self.history[parent1].ghosts + self.history[parent2].ghosts;
        let real = self.history[parent1].real + self.history[parent2].real;
        self.history.push(HistoryEntry {
            step: Step::Merge { parent1, parent2 },
            jet: Some(k),
            ghosts,
            real,
        });
        k
    }

    fn jet_at(&self, history: usize) -> Option<ClusteredJet> {
        self.history[history].jet.map(|jet| ClusteredJet {
            momentum: self.jets[jet],
            history,
        })
    }

    /// Jets that ended up merging with the beam, above `ptmin`, without
    /// any pure-ghost jets. Returned in history order.
    pub fn inclusive_jets(&self, ptmin: f64) -> Vec<ClusteredJet> {
        let ptmin2 = ptmin * ptmin;
        self.history
            .iter()
            .filter_map(|entry| match entry.step {
                Step::Beam { parent } => Some(parent),
                _ => None,
            })
            .filter(|&parent| self.history[parent].real > 0)
            .filter_map(|parent| self.jet_at(parent))
            .filter(|jet| jet.momentum.pt2() >= ptmin2)
            .collect()
    }

    /// Inclusive jets sorted by descending transverse momentum.
    pub fn inclusive_jets_sorted(&self, ptmin: f64) -> Vec<ClusteredJet> {
        let mut jets = self.inclusive_jets(ptmin);
        jets.sort_by(|a, b| b.momentum.pt2().total_cmp(&a.momentum.pt2()));
        jets
    }

    /// The jets present when exactly `n_jets` remained. Returns every input
    /// when `n_jets` is not smaller than the number of inputs.
    pub fn exclusive_jets(&self, n_jets: usize) -> Vec<ClusteredJet> {
        if n_jets >= self.n_inputs {
            return (0..self.n_inputs).filter_map(|h| self.jet_at(h)).collect();
        }
        let stop_point = 2 * self.n_inputs - n_jets;
        let mut out = Vec::with_capacity(n_jets);
        for entry in self.history.iter().skip(stop_point) {
            let parents = match entry.step {
                Step::Merge { parent1, parent2 } => [Some(parent1), Some(parent2)],
                Step::Beam { parent } => [Some(parent), None],
                Step::Input => [None, None],
            };
            for parent in parents.into_iter().flatten() {
                if parent < stop_point
                    && let Some(jet) = self.jet_at(parent)
                {
                    out.push(jet);
                }
            }
        }
        out
    }

    /// The two jets that merged into `jet`, if it is not an input.
    pub fn parents(&self, jet: &ClusteredJet) -> Option<(ClusteredJet, ClusteredJet)> {
        match self.history[jet.history].step {
            Step::Merge { parent1, parent2 } => {
                Some((self.jet_at(parent1)?, self.jet_at(parent2)?))
            }
            _ => None,
        }
    }

    /// Non-ghost inputs contained in `jet`.
    pub fn constituents(&self, jet: &ClusteredJet) -> Vec<PseudoJet> {
        let mut out = Vec::with_capacity(self.history[jet.history].real as usize);
        let mut stack = vec![jet.history];
        while let Some(h) = stack.pop() {
            match self.history[h].step {
                Step::Input => {
                    if self.history[h].real > 0
                        && let Some(idx) = self.history[h].jet
                    {
                        out.push(self.jets[idx]);
                    }
                }
                Step::Merge { parent1, parent2 } => {
                    if self.history[parent2].real > 0 {
                        stack.push(parent2);
                    }
                    if self.history[parent1].real > 0 {
                        stack.push(parent1);
                    }
                }
                Step::Beam { .. } => {}
            }
        }
        out
    }

    /// Non-ghost constituents sorted by descending transverse momentum.
    pub fn constituents_sorted(&self, jet: &ClusteredJet) -> Vec<PseudoJet> {
        let mut out = self.constituents(jet);
        sort_by_pt_desc(&mut out);
        out
    }

    /// True when `jet` contains only ghosts.
    pub fn is_pure_ghost(&self, jet: &ClusteredJet) -> bool {
        self.history[jet.history].real == 0
    }

    /// Active area of `jet`; zero when clustered without ghosts.
    pub fn area(&self, jet: &ClusteredJet) -> f64 {
        f64::from(self.history[jet.history].ghosts) * self.ghost_area
    }
}

/// Convenience wrapper returning pt-sorted inclusive jets of `particles`.
pub fn cluster_inclusive(
    particles: &[PseudoJet],
    definition: JetDefinition,
    ptmin: f64,
) -> (ClusterSequence, Vec<ClusteredJet>) {
    let sequence = ClusterSequence::new(particles, definition);
    let jets = sequence.inclusive_jets_sorted(ptmin);
    (sequence, jets)
}
