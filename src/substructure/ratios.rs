use super::ecf::{BETA_GRID, EcfCatalog};

/// Number of ECF ratios fed to the classifier.
pub const N_ECF_RATIOS: usize = 11;

/// Address of one catalogue entry: 1-based `o` and `n`, 0-based beta index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcfIndex {
    pub o: usize,
    pub n: usize,
    pub beta_idx: usize,
}

const fn ecf(o: usize, n: usize, beta_idx: usize) -> EcfIndex {
    EcfIndex { o, n, beta_idx }
}

impl EcfIndex {
    /// Variable name in the `ecfN_<o>_<n>_<beta×10>` convention.
    pub fn variable_name(&self) -> String {
        let tenths = (BETA_GRID[self.beta_idx] * 10.0).round() as u32;
        format!("ecfN_{}_{}_{:02}", self.o, self.n, tenths)
    }
}

/// `numerator / denominator^power`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EcfRatio {
    pub numerator: EcfIndex,
    pub denominator: EcfIndex,
    pub power: f64,
    /// Classifier variable expression for this ratio.
    pub name: &'static str,
}

pub const ECF_RATIOS: [EcfRatio; N_ECF_RATIOS] = [
    EcfRatio {
        numerator: ecf(1, 2, 2),
        denominator: ecf(1, 2, 1),
        power: 2.0,
        name: "ecfN_1_2_20/pow(ecfN_1_2_10,2.00)",
    },
    EcfRatio {
        numerator: ecf(1, 3, 3),
        denominator: ecf(2, 3, 2),
        power: 1.0,
        name: "ecfN_1_3_40/ecfN_2_3_20",
    },
    EcfRatio {
        numerator: ecf(3, 3, 1),
        denominator: ecf(1, 3, 3),
        power: 0.75,
        name: "ecfN_3_3_10/pow(ecfN_1_3_40,0.75)",
    },
    EcfRatio {
        numerator: ecf(3, 3, 1),
        denominator: ecf(2, 3, 2),
        power: 0.75,
        name: "ecfN_3_3_10/pow(ecfN_2_3_20,0.75)",
    },
    EcfRatio {
        numerator: ecf(3, 3, 2),
        denominator: ecf(3, 3, 3),
        power: 0.5,
        name: "ecfN_3_3_20/pow(ecfN_3_3_40,0.50)",
    },
    EcfRatio {
        numerator: ecf(1, 4, 2),
        denominator: ecf(1, 3, 1),
        power: 2.0,
        name: "ecfN_1_4_20/pow(ecfN_1_3_10,2.00)",
    },
    EcfRatio {
        numerator: ecf(1, 4, 3),
        denominator: ecf(1, 3, 2),
        power: 2.0,
        name: "ecfN_1_4_40/pow(ecfN_1_3_20,2.00)",
    },
    EcfRatio {
        numerator: ecf(2, 4, 0),
        denominator: ecf(1, 3, 0),
        power: 2.0,
        name: "ecfN_2_4_05/pow(ecfN_1_3_05,2.00)",
    },
    EcfRatio {
        numerator: ecf(2, 4, 1),
        denominator: ecf(1, 3, 1),
        power: 2.0,
        name: "ecfN_2_4_10/pow(ecfN_1_3_10,2.00)",
    },
    EcfRatio {
        numerator: ecf(2, 4, 1),
        denominator: ecf(2, 3, 0),
        power: 2.0,
        name: "ecfN_2_4_10/pow(ecfN_2_3_05,2.00)",
    },
    EcfRatio {
        numerator: ecf(2, 4, 2),
        denominator: ecf(1, 3, 2),
        power: 2.0,
        name: "ecfN_2_4_20/pow(ecfN_1_3_20,2.00)",
    },
];

impl EcfRatio {
    pub fn evaluate(&self, catalog: &EcfCatalog) -> f64 {
        let num = catalog.get(self.numerator.o, self.numerator.n, self.numerator.beta_idx);
        let den = catalog.get(
            self.denominator.o,
            self.denominator.n,
            self.denominator.beta_idx,
        );
        if self.power == 1.0 {
            num / den
        } else {
            num / den.powf(self.power)
        }
    }
}

/// All ratios in classifier order, narrowed to `f32`.
pub fn compute_ratios(catalog: &EcfCatalog) -> [f32; N_ECF_RATIOS] {
    ECF_RATIOS.map(|ratio| ratio.evaluate(catalog) as f32)
}
