use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::features::{MissingFeatureError, ValidationError};

/// Per-request failure. The request is rejected; the process keeps serving.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    MissingFeature(#[from] MissingFeatureError),

    /// The payload could not be read as a flat record of numbers.
    #[error("malformed record: {0}")]
    Malformed(String),

    /// Scaling or scoring produced something unusable. `context` is for
    /// logs only and is not part of the caller-facing report.
    #[error("internal error while scoring")]
    Internal { context: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    MissingFeature,
    Malformed,
    Internal,
}

/// Caller-facing description of a `PredictionError`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    pub message: String,
}

impl PredictionError {
    pub fn internal(context: impl Into<String>) -> Self {
        PredictionError::Internal {
            context: context.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PredictionError::Validation(_) => ErrorKind::Validation,
            PredictionError::MissingFeature(_) => ErrorKind::MissingFeature,
            PredictionError::Malformed(_) => ErrorKind::Malformed,
            PredictionError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Whether the caller can fix this by changing the input.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, PredictionError::Internal { .. })
    }

    pub fn report(&self) -> ErrorReport {
        let mut report = ErrorReport {
            kind: self.kind(),
            feature: None,
            value: None,
            min: None,
            max: None,
            message: self.to_string(),
        };

        match self {
            PredictionError::Validation(err) => {
                report.feature = Some(err.feature.clone());
                report.value = Some(err.value);
                report.min = Some(err.range.min);
                report.max = Some(err.range.max);
            }
            PredictionError::MissingFeature(err) => {
                report.feature = Some(err.feature.as_str().to_string());
            }
            PredictionError::Malformed(_) | PredictionError::Internal { .. } => {}
        }

        report
    }
}

/// Startup failure: the artifacts cannot back the pipeline. Never raised
/// per request.
#[derive(Debug, Error)]
pub enum FatalConfigError {
    #[error("{artifact} artifact not found at {}", .path.display())]
    ArtifactMissing {
        artifact: &'static str,
        path: PathBuf,
    },

    #[error("failed to read {artifact} artifact at {}", .path.display())]
    Io {
        artifact: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{artifact} artifact at {} is corrupt", .path.display())]
    Corrupt {
        artifact: &'static str,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{artifact} works on {actual} features but the pipeline requires {expected}")]
    Dimension {
        artifact: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("scaler was fit on columns {found:?}, expected {expected:?}")]
    ColumnOrder {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("invalid scaler: {0}")]
    InvalidScaler(String),

    #[error("invalid model: {0}")]
    InvalidModel(String),
}
