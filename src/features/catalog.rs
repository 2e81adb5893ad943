use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named model input.
///
/// The declaration order is the column order the scaler and model were fit
/// on. `Feature::ALL` and `Feature::index` depend on it; reordering the
/// variants changes every prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Feature {
    #[serde(rename = "LSTAT")]
    Lstat,
    #[serde(rename = "RM")]
    Rm,
    #[serde(rename = "CRIM")]
    Crim,
    #[serde(rename = "PTRATIO")]
    Ptratio,
    #[serde(rename = "INDUS")]
    Indus,
    #[serde(rename = "TAX")]
    Tax,
    #[serde(rename = "NOX")]
    Nox,
    #[serde(rename = "B")]
    B,
}

/// Number of columns in an assembled feature vector.
pub const NUM_FEATURES: usize = 8;

impl Feature {
    pub const ALL: [Feature; NUM_FEATURES] = [
        Feature::Lstat,
        Feature::Rm,
        Feature::Crim,
        Feature::Ptratio,
        Feature::Indus,
        Feature::Tax,
        Feature::Nox,
        Feature::B,
    ];

    /// Column name as it appears in requests and artifacts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Lstat => "LSTAT",
            Feature::Rm => "RM",
            Feature::Crim => "CRIM",
            Feature::Ptratio => "PTRATIO",
            Feature::Indus => "INDUS",
            Feature::Tax => "TAX",
            Feature::Nox => "NOX",
            Feature::B => "B",
        }
    }

    /// Position of this feature in the assembled vector.
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn description(&self) -> &'static str {
        match self {
            Feature::Lstat => "% lower status of the population",
            Feature::Rm => "Average number of rooms per dwelling",
            Feature::Crim => "Per capita crime rate by town",
            Feature::Ptratio => "Pupil-teacher ratio by town",
            Feature::Indus => "Proportion of non-retail business acres per town",
            Feature::Tax => "Full-value property-tax rate per $10,000",
            Feature::Nox => "Nitric oxides concentration (parts per 10 million)",
            Feature::B => "1000(Bk - 0.63)^2 where Bk is the proportion of Black residents by town",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .iter()
            .copied()
            .find(|feature| feature.as_str() == s)
            .ok_or_else(|| format!("unknown feature: {}", s))
    }
}
