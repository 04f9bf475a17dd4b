use serde::Serialize;

use super::scratch::ObservableSet;
use crate::ml::FeatureSchema;
use crate::substructure::N_ECF_RATIOS;

/// Current feature vector layout.
pub const FEATURE_VERSION: i64 = 1;
/// Number of `f32` values per feature vector.
pub const FEATURE_VECTOR_LEN: usize = N_ECF_RATIOS + 2;

/// Classifier variable names, in feature vector order.
pub const FEATURE_NAMES: [&str; FEATURE_VECTOR_LEN] = [
    "ecfN_1_2_20/pow(ecfN_1_2_10,2.00)",
    "ecfN_1_3_40/ecfN_2_3_20",
    "ecfN_3_3_10/pow(ecfN_1_3_40,0.75)",
    "ecfN_3_3_10/pow(ecfN_2_3_20,0.75)",
    "ecfN_3_3_20/pow(ecfN_3_3_40,0.50)",
    "ecfN_1_4_20/pow(ecfN_1_3_10,2.00)",
    "ecfN_1_4_40/pow(ecfN_1_3_20,2.00)",
    "ecfN_2_4_05/pow(ecfN_1_3_05,2.00)",
    "ecfN_2_4_10/pow(ecfN_1_3_10,2.00)",
    "ecfN_2_4_10/pow(ecfN_2_3_05,2.00)",
    "ecfN_2_4_20/pow(ecfN_1_3_20,2.00)",
    "tau32SD",
    "htt_frec",
];

pub const SPECTATOR_NAMES: [&str; 4] = ["eventNumber", "runNumber", "pt", "mSD"];

/// Schema every top-tag classifier must declare.
pub const TOP_TAG_SCHEMA: FeatureSchema = FeatureSchema {
    variables: &FEATURE_NAMES,
    spectators: &SPECTATOR_NAMES,
};

/// Spectator values for one jet. Carried alongside the features for
/// diagnostics only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Spectators {
    #[serde(rename = "eventNumber")]
    pub event_number: f32,
    #[serde(rename = "runNumber")]
    pub run_number: f32,
    pub pt: f32,
    #[serde(rename = "mSD")]
    pub msd: f32,
}

/// Fill `out` with the classifier inputs in [`FEATURE_NAMES`] order.
pub fn fill_feature_vector(observables: &ObservableSet, out: &mut [f32; FEATURE_VECTOR_LEN]) {
    out[..N_ECF_RATIOS].copy_from_slice(&observables.ecf_ratios);
    out[N_ECF_RATIOS] = observables.tau32_sd;
    out[N_ECF_RATIOS + 1] = observables.htt_frec;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::substructure::ECF_RATIOS;

    #[test]
    fn ratio_names_lead_the_schema() {
        for (ratio, name) in ECF_RATIOS.iter().zip(FEATURE_NAMES) {
            assert_eq!(ratio.name, name);
        }
        assert_eq!(FEATURE_NAMES[FEATURE_VECTOR_LEN - 2], "tau32SD");
        assert_eq!(FEATURE_NAMES[FEATURE_VECTOR_LEN - 1], "htt_frec");
    }

    #[test]
    fn vector_follows_schema_order() {
        let mut observables = ObservableSet::default();
        for (idx, value) in observables.ecf_ratios.iter_mut().enumerate() {
            *value = idx as f32;
        }
        observables.tau32_sd = 0.5;
        observables.htt_mass = 170.0;
        observables.htt_frec = 0.25;
        let mut out = [f32::NAN; FEATURE_VECTOR_LEN];
        fill_feature_vector(&observables, &mut out);
        assert_eq!(&out[..3], &[0.0, 1.0, 2.0]);
        assert_eq!(out[10], 10.0);
        assert_eq!(out[11], 0.5);
        assert_eq!(out[12], 0.25);
    }
}
