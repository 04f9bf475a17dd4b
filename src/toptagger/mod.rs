//! HEPTopTagger-style top-quark reconstruction inside a large-radius jet.
//!
//! The tagger looks for hard substructure through mass-drop declustering,
//! builds filtered triplets from it and keeps the candidate that best
//! matches the selection mode. With optimal-R enabled the whole procedure is
//! repeated on progressively smaller reclustered subjets and the result at
//! the radius where the reconstructed mass starts to fall is reported.

mod config;
mod optimal_r;
mod triplets;

use thiserror::Error;

pub use config::{HepTopTaggerConfig, TaggerMode};

use crate::jet::{ClusterSequence, ClusteredJet, PseudoJet};

/// Reasons a tagger configuration is rejected.
#[derive(Debug, Error, PartialEq)]
pub enum TaggerConfigError {
    #[error("Quark mode is not supported by this tagger")]
    QuarkModeUnsupported,
    #[error("Invalid tagger parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error("Optimal-R scan must run from a larger to a smaller radius ({max} -> {min})")]
    InvalidScan { max: f64, min: f64 },
}

/// Reconstructed top candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct TopCandidate {
    /// Filtered triplet 4-momentum.
    pub momentum: PseudoJet,
    /// Three subjets of the candidate, descending pt.
    pub subjets: [PseudoJet; 3],
    /// `min_ij |(m_ij/m_123)/(m_W/m_t) - 1|`.
    pub frec: f64,
    /// Radius the result was taken at.
    pub r_opt: f64,
    /// Radius expected from the fat-jet pt.
    pub r_opt_calc: f64,
    pub mass_ratio_passed: bool,
}

impl TopCandidate {
    pub fn top_mass(&self) -> f64 {
        self.momentum.m()
    }
}

/// Configured tagger; immutable and shareable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HepTopTagger {
    config: HepTopTaggerConfig,
}

impl HepTopTagger {
    pub fn new(config: HepTopTaggerConfig) -> Result<Self, TaggerConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &HepTopTaggerConfig {
        &self.config
    }

    /// Run the tagger on `jet`, a jet of `sequence`.
    ///
    /// `None` means no candidate passed the selection; callers treat that as
    /// a zero mass and zero fRec.
    pub fn result(&self, sequence: &ClusterSequence, jet: &ClusteredJet) -> Option<TopCandidate> {
        let scan = if self.config.optimal_r {
            optimal_r::scan(&self.config, sequence, jet)
        } else {
            optimal_r::single(&self.config, sequence, jet)
        };
        let r_opt_calc = self.config.expected_r_opt(jet.pt());
        if self.config.reject_min_r && scan.at_min_r {
            tracing::trace!(r_opt = scan.r_opt, "candidate rejected at minimum radius");
            return None;
        }
        let attempt = scan.best?;
        if !attempt.mass_ratio_passed {
            return None;
        }
        if attempt.candidate.pt() < self.config.min_candidate_pt {
            return None;
        }
        Some(TopCandidate {
            frec: triplets::frec(&self.config, &attempt.subjets),
            momentum: attempt.candidate,
            subjets: attempt.subjets,
            r_opt: scan.r_opt,
            r_opt_calc,
            mass_ratio_passed: attempt.mass_ratio_passed,
        })
    }
}

#[cfg(test)]
mod tests;
