use serde::Serialize;

use super::features::{FEATURE_VECTOR_LEN, Spectators};
use crate::substructure::N_ECF_RATIOS;

/// Observables computed for one jet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ObservableSet {
    pub ecf_ratios: [f32; N_ECF_RATIOS],
    pub tau32_sd: f32,
    pub htt_mass: f32,
    pub htt_frec: f32,
}

impl ObservableSet {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Per-worker buffers reused across jets.
///
/// Everything is cleared by [`JetScratch::reset`] before a jet is processed,
/// so no value can leak from one jet into the next.
#[derive(Debug, Clone, Default)]
pub struct JetScratch {
    pub observables: ObservableSet,
    pub spectators: Spectators,
    pub features: [f32; FEATURE_VECTOR_LEN],
}

impl JetScratch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.observables.reset();
        self.spectators = Spectators::default();
        self.features = [0.0; FEATURE_VECTOR_LEN];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_every_field() {
        let mut scratch = JetScratch::new();
        scratch.observables.ecf_ratios[4] = f32::NAN;
        scratch.observables.htt_mass = 171.0;
        scratch.spectators.pt = 400.0;
        scratch.features[12] = 0.3;
        scratch.reset();
        assert_eq!(scratch.observables, ObservableSet::default());
        assert_eq!(scratch.spectators, Spectators::default());
        assert!(scratch.features.iter().all(|&v| v == 0.0));
    }
}
