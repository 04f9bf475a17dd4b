use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use super::features::{Spectators, TOP_TAG_SCHEMA, fill_feature_vector};
use super::scratch::{JetScratch, ObservableSet};
use crate::config::TaggerConfig;
use crate::event::{Event, JetLike};
use crate::jet::{
    AreaDefinition, ClusterSequence, GhostedAreaSpec, JetAlgorithm, JetDefinition, SoftDrop,
    to_pseudojets,
};
use crate::ml::{ModelError, ModelRegistry};
use crate::substructure::{EcfCatalog, Nsubjettiness, compute_ratios, ecf_inputs};
use crate::toptagger::{HepTopTagger, HepTopTaggerConfig, TaggerConfigError};

/// Score written for a jet with nothing left after reclustering.
pub const DEGENERATE_SCORE: f32 = -1.2;
/// Cambridge/Aachen radius of the reclustering.
pub const CLUSTER_RADIUS: f64 = 1.5;
/// Inclusive jets below this pt are discarded after reclustering.
pub const MIN_JET_PT: f64 = 0.1;

#[derive(Debug, Error)]
pub enum ProducerError {
    #[error("Event {run}:{event} has no jet collection {collection}")]
    MissingCollection {
        run: u64,
        event: u64,
        collection: String,
    },
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("Invalid top tagger settings: {0}")]
    Tagger(#[from] TaggerConfigError),
}

/// Per-jet values reported when diagnostics are on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JetDiagnostics {
    pub pt: f64,
    pub eta: f64,
    /// Soft-drop mass; zero for degenerate jets.
    pub msd: f64,
    /// Active area of the leading reclustered jet.
    pub area: f64,
    pub degenerate: bool,
    pub observables: ObservableSet,
    pub spectators: Spectators,
    /// Optimal radius of the top candidate, if one was found.
    pub htt_r_opt: Option<f64>,
}

/// Scores of one event: one column per model, one entry per input jet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventOutput {
    pub run: u64,
    pub event: u64,
    pub scores: BTreeMap<String, Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<Vec<JetDiagnostics>>,
}

/// What one jet produced before scoring.
enum JetOutcome {
    Degenerate,
    Computed,
}

/// Turns jets into classifier scores.
///
/// The producer is immutable once built; per-jet state lives in the
/// [`JetScratch`] handed to each call so several workers can share it.
#[derive(Debug, Clone)]
pub struct TopTagProducer {
    src: String,
    definition: JetDefinition,
    area: AreaDefinition,
    soft_drop: SoftDrop,
    nsubjettiness: Nsubjettiness,
    tagger: HepTopTagger,
    registry: Arc<ModelRegistry>,
    diagnostics: bool,
}

impl TopTagProducer {
    /// Build a producer reading collection `src`. Every model must declare
    /// the top-tag schema.
    pub fn new(
        src: impl Into<String>,
        registry: Arc<ModelRegistry>,
        tagger: HepTopTaggerConfig,
    ) -> Result<Self, ProducerError> {
        for named in registry.iter() {
            TOP_TAG_SCHEMA.check(&named.name, &named.model)?;
        }
        Ok(Self {
            src: src.into(),
            definition: JetDefinition::new(JetAlgorithm::CambridgeAachen, CLUSTER_RADIUS),
            area: AreaDefinition::ActiveExplicitGhosts(GhostedAreaSpec::default()),
            soft_drop: SoftDrop::default(),
            nsubjettiness: Nsubjettiness::default(),
            tagger: HepTopTagger::new(tagger)?,
            registry,
            diagnostics: false,
        })
    }

    pub fn from_config(
        config: &TaggerConfig,
        registry: Arc<ModelRegistry>,
    ) -> Result<Self, ProducerError> {
        Ok(Self::new(&config.src, registry, config.top_tagger.clone())?
            .with_diagnostics(config.diagnostics))
    }

    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Score every jet of the configured collection.
    pub fn produce(&self, event: &Event, scratch: &mut JetScratch) -> Result<EventOutput, ProducerError> {
        let jets = event
            .collection(&self.src)
            .ok_or_else(|| ProducerError::MissingCollection {
                run: event.run,
                event: event.event,
                collection: self.src.clone(),
            })?;
        Ok(self.tag_jets(event.run, event.event, jets, scratch))
    }

    /// Score `jets` in order. Works with any host jet type.
    pub fn tag_jets<J: JetLike>(
        &self,
        run: u64,
        event: u64,
        jets: &[J],
        scratch: &mut JetScratch,
    ) -> EventOutput {
        let mut scores: BTreeMap<String, Vec<f32>> = self
            .registry
            .labels()
            .map(|label| (label.to_string(), Vec::with_capacity(jets.len())))
            .collect();
        let mut diagnostics = self.diagnostics.then(|| Vec::with_capacity(jets.len()));

        for jet in jets {
            let (outcome, report) = self.analyze(jet, run, event, scratch);
            for named in self.registry.iter() {
                let score = match outcome {
                    JetOutcome::Degenerate => DEGENERATE_SCORE,
                    JetOutcome::Computed => named.model.evaluate(&scratch.features),
                };
                tracing::debug!(
                    model = %named.name,
                    pt = jet.pt(),
                    eta = jet.eta(),
                    msd = scratch.spectators.msd,
                    score,
                    "scored jet"
                );
                if let Some(column) = scores.get_mut(&named.label) {
                    column.push(score);
                }
            }
            if let Some(out) = diagnostics.as_mut() {
                out.push(report);
            }
        }
        EventOutput {
            run,
            event,
            scores,
            diagnostics,
        }
    }

    /// Compute the observables of one jet into `scratch`.
    pub fn observables<J: JetLike>(&self, jet: &J, scratch: &mut JetScratch) -> Option<ObservableSet> {
        match self.analyze(jet, 0, 0, scratch).0 {
            JetOutcome::Degenerate => None,
            JetOutcome::Computed => Some(scratch.observables),
        }
    }

    fn analyze<J: JetLike>(
        &self,
        jet: &J,
        run: u64,
        event: u64,
        scratch: &mut JetScratch,
    ) -> (JetOutcome, JetDiagnostics) {
        scratch.reset();
        let mut report = JetDiagnostics {
            pt: jet.pt(),
            eta: jet.eta(),
            msd: 0.0,
            area: 0.0,
            degenerate: true,
            observables: ObservableSet::default(),
            spectators: Spectators::default(),
            htt_r_opt: None,
        };

        let particles = to_pseudojets(jet.constituents());
        let sequence = ClusterSequence::with_area(&particles, self.definition, &self.area);
        let Some(leading) = sequence.inclusive_jets_sorted(MIN_JET_PT).into_iter().next() else {
            tracing::trace!(constituents = particles.len(), "no jet survived reclustering");
            return (JetOutcome::Degenerate, report);
        };

        let groomed = self.soft_drop.groom(&sequence, &leading);
        let observables = &mut scratch.observables;
        observables.tau32_sd = self.nsubjettiness.tau32(&groomed.constituents) as f32;
        let catalog = EcfCatalog::compute(ecf_inputs(&groomed.constituents));
        observables.ecf_ratios = compute_ratios(&catalog);

        let candidate = self.tagger.result(&sequence, &leading);
        if let Some(top) = &candidate {
            observables.htt_mass = top.top_mass() as f32;
            observables.htt_frec = top.frec as f32;
        }

        scratch.spectators = Spectators {
            event_number: event as f32,
            run_number: run as f32,
            pt: jet.pt() as f32,
            msd: groomed.mass() as f32,
        };
        fill_feature_vector(&scratch.observables, &mut scratch.features);

        report.msd = groomed.mass();
        report.area = sequence.area(&leading);
        report.degenerate = false;
        report.observables = scratch.observables;
        report.spectators = scratch.spectators;
        report.htt_r_opt = candidate.map(|top| top.r_opt);
        (JetOutcome::Computed, report)
    }
}
