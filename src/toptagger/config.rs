use serde::{Deserialize, Serialize};

use super::TaggerConfigError;

/// How triplets are accepted and ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaggerMode {
    /// Mass-ratio cut inside the triplet loop, best mass wins.
    EarlyMassRatioSortMass,
    /// Best mass wins, mass-ratio cut applied to the winner.
    LateMassRatioSortMass,
    /// Mass-ratio cut inside the triplet loop, largest modified Jade distance wins.
    EarlyMassRatioSortModDjade,
    /// Largest modified Jade distance wins, mass-ratio cut applied afterwards.
    LateMassRatioSortModDjade,
    /// Only the three hardest substructures form a triplet.
    TwoStepFilter,
}

impl TaggerMode {
    pub(super) fn early_mass_ratio(self) -> bool {
        matches!(
            self,
            Self::EarlyMassRatioSortMass | Self::EarlyMassRatioSortModDjade
        )
    }

    pub(super) fn sorts_by_djade(self) -> bool {
        matches!(
            self,
            Self::EarlyMassRatioSortModDjade | Self::LateMassRatioSortModDjade
        )
    }
}

/// Tagger parameters. Defaults are the values the classifier was trained with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HepTopTaggerConfig {
    pub optimal_r: bool,
    pub quark_mode: bool,
    pub max_fatjet_r: f64,
    pub min_fatjet_r: f64,
    pub fatjet_r_step: f64,
    /// Relative mass loss that ends the optimal-R scan.
    pub optimal_r_threshold: f64,
    /// Drop candidates whose optimal radius is the smallest scanned.
    pub reject_min_r: bool,
    /// Declustering stops below this mass.
    pub max_subjet_mass: f64,
    /// Mass-drop threshold `μ`.
    pub mass_drop: f64,
    pub min_subjet_pt: f64,
    pub min_candidate_pt: f64,
    pub filter_radius: f64,
    pub filter_subjets: usize,
    pub mode: TaggerMode,
    pub min_candidate_mass: f64,
    pub max_candidate_mass: f64,
    /// Relative width `f_W` of the W/top mass-ratio band.
    pub mass_ratio_width: f64,
    pub min_m23_cut: f64,
    pub min_m13_cut: f64,
    pub max_m13_cut: f64,
    pub top_mass: f64,
    pub w_mass: f64,
}

impl Default for HepTopTaggerConfig {
    fn default() -> Self {
        Self {
            optimal_r: true,
            quark_mode: false,
            max_fatjet_r: 1.5,
            min_fatjet_r: 0.5,
            fatjet_r_step: 0.1,
            optimal_r_threshold: 0.2,
            reject_min_r: false,
            max_subjet_mass: 30.0,
            mass_drop: 0.8,
            min_subjet_pt: 0.0,
            min_candidate_pt: 0.0,
            filter_radius: 0.3,
            filter_subjets: 5,
            mode: TaggerMode::TwoStepFilter,
            min_candidate_mass: 0.0,
            max_candidate_mass: 9_999_999.0,
            mass_ratio_width: 9_999_999.0,
            min_m23_cut: 0.0,
            min_m13_cut: 0.0,
            max_m13_cut: 9_999_999.0,
            top_mass: 172.3,
            w_mass: 80.4,
        }
    }
}

impl HepTopTaggerConfig {
    pub fn validate(&self) -> Result<(), TaggerConfigError> {
        if self.quark_mode {
            return Err(TaggerConfigError::QuarkModeUnsupported);
        }
        let non_negative = [
            ("max_subjet_mass", self.max_subjet_mass),
            ("min_subjet_pt", self.min_subjet_pt),
            ("min_candidate_pt", self.min_candidate_pt),
            ("min_candidate_mass", self.min_candidate_mass),
            ("mass_ratio_width", self.mass_ratio_width),
            ("optimal_r_threshold", self.optimal_r_threshold),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(TaggerConfigError::InvalidParameter { name, value });
            }
        }
        let positive = [
            ("filter_radius", self.filter_radius),
            ("top_mass", self.top_mass),
            ("w_mass", self.w_mass),
            ("max_fatjet_r", self.max_fatjet_r),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(TaggerConfigError::InvalidParameter { name, value });
            }
        }
        if !(self.mass_drop > 0.0 && self.mass_drop <= 1.0) {
            return Err(TaggerConfigError::InvalidParameter {
                name: "mass_drop",
                value: self.mass_drop,
            });
        }
        if self.filter_subjets < 3 {
            return Err(TaggerConfigError::InvalidParameter {
                name: "filter_subjets",
                value: self.filter_subjets as f64,
            });
        }
        if self.max_candidate_mass < self.min_candidate_mass {
            return Err(TaggerConfigError::InvalidParameter {
                name: "max_candidate_mass",
                value: self.max_candidate_mass,
            });
        }
        if self.optimal_r
            && !(self.min_fatjet_r > 0.0
                && self.min_fatjet_r < self.max_fatjet_r
                && self.fatjet_r_step > 0.0)
        {
            return Err(TaggerConfigError::InvalidScan {
                max: self.max_fatjet_r,
                min: self.min_fatjet_r,
            });
        }
        Ok(())
    }

    /// Radii visited by the optimal-R scan, largest first.
    pub fn scan_radii(&self) -> Vec<f64> {
        let steps = ((self.max_fatjet_r - self.min_fatjet_r) / self.fatjet_r_step).round();
        let steps = if steps.is_finite() && steps > 0.0 {
            steps as usize
        } else {
            0
        };
        (0..=steps)
            .map(|i| self.max_fatjet_r - i as f64 * self.fatjet_r_step)
            .collect()
    }

    /// Radius a top of this transverse momentum is expected to need.
    pub fn expected_r_opt(&self, pt: f64) -> f64 {
        327.0 / pt
    }

    /// Lower and upper bounds of the `m23/m123` band.
    pub(super) fn mass_ratio_band(&self) -> (f64, f64) {
        let ratio = self.w_mass / self.top_mass;
        (
            ratio * (1.0 - self.mass_ratio_width),
            ratio * (1.0 + self.mass_ratio_width),
        )
    }
}
