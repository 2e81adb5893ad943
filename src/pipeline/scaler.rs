use serde::{Deserialize, Serialize};

use super::error::FatalConfigError;

/// Fitted per-feature transform applied before scoring.
///
/// Implementations are immutable after construction and shared across
/// threads without locking.
pub trait Scaler: Send + Sync {
    /// Width of the vectors this scaler was fit on.
    fn n_features(&self) -> usize;

    /// Transform one row. Callers pass exactly `n_features()` values.
    fn transform(&self, row: &[f64]) -> Vec<f64>;
}

/// Zero-mean, unit-variance scaling: `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, FatalConfigError> {
        let scaler = Self { mean, scale };
        scaler.check()?;
        Ok(scaler)
    }

    pub fn check(&self) -> Result<(), FatalConfigError> {
        if self.mean.len() != self.scale.len() {
            return Err(FatalConfigError::InvalidScaler(format!(
                "mean has {} entries but scale has {}",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if let Some(i) = self.mean.iter().position(|m| !m.is_finite()) {
            return Err(FatalConfigError::InvalidScaler(format!(
                "mean[{}] is not finite",
                i
            )));
        }
        if let Some(i) = self.scale.iter().position(|s| !s.is_finite() || *s < 0.0) {
            return Err(FatalConfigError::InvalidScaler(format!(
                "scale[{}] must be finite and non-negative",
                i
            )));
        }
        Ok(())
    }

    // A zero scale comes from a constant training column; leave it unscaled.
    fn effective_scale(s: f64) -> f64 {
        if s == 0.0 {
            1.0
        } else {
            s
        }
    }

    pub fn inverse_transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| x * Self::effective_scale(*s) + m)
            .collect()
    }
}

impl Scaler for StandardScaler {
    fn n_features(&self) -> usize {
        self.mean.len()
    }

    fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / Self::effective_scale(*s))
            .collect()
    }
}

fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

/// Rescale each column from `[data_min, data_max]` onto `feature_range`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub data_min: Vec<f64>,
    pub data_max: Vec<f64>,
    #[serde(default = "default_feature_range")]
    pub feature_range: (f64, f64),
}

impl MinMaxScaler {
    pub fn check(&self) -> Result<(), FatalConfigError> {
        if self.data_min.len() != self.data_max.len() {
            return Err(FatalConfigError::InvalidScaler(format!(
                "data_min has {} entries but data_max has {}",
                self.data_min.len(),
                self.data_max.len()
            )));
        }
        let (lo, hi) = self.feature_range;
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(FatalConfigError::InvalidScaler(format!(
                "feature_range ({}, {}) is not an increasing finite interval",
                lo, hi
            )));
        }
        for (i, (min, max)) in self.data_min.iter().zip(&self.data_max).enumerate() {
            if !(min.is_finite() && max.is_finite() && min <= max) {
                return Err(FatalConfigError::InvalidScaler(format!(
                    "column {} has invalid bounds [{}, {}]",
                    i, min, max
                )));
            }
        }
        Ok(())
    }
}

impl Scaler for MinMaxScaler {
    fn n_features(&self) -> usize {
        self.data_min.len()
    }

    fn transform(&self, row: &[f64]) -> Vec<f64> {
        let (lo, hi) = self.feature_range;
        row.iter()
            .zip(self.data_min.iter().zip(&self.data_max))
            .map(|(x, (min, max))| {
                let span = if max > min { max - min } else { 1.0 };
                lo + (x - min) * (hi - lo) / span
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerKind {
    Standard(StandardScaler),
    MinMax(MinMaxScaler),
}

impl Scaler for ScalerKind {
    fn n_features(&self) -> usize {
        match self {
            ScalerKind::Standard(s) => s.n_features(),
            ScalerKind::MinMax(s) => s.n_features(),
        }
    }

    fn transform(&self, row: &[f64]) -> Vec<f64> {
        match self {
            ScalerKind::Standard(s) => s.transform(row),
            ScalerKind::MinMax(s) => s.transform(row),
        }
    }
}

/// On-disk scaler: the transform plus the column names it was fit on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerArtifact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    #[serde(flatten)]
    pub scaler: ScalerKind,
}

impl ScalerArtifact {
    pub fn check(&self) -> Result<(), FatalConfigError> {
        match &self.scaler {
            ScalerKind::Standard(s) => s.check(),
            ScalerKind::MinMax(s) => s.check(),
        }
    }
}
