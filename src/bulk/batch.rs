use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::features::FeatureRecord;
use crate::pipeline::{ErrorReport, PredictionError, ScoringPipeline};

/// One batch element after decoding. Elements that are not a flat object
/// of numbers are kept in place as `Malformed` failures.
pub type BatchItem = Result<FeatureRecord, PredictionError>;

/// Decode a JSON array of records.
///
/// Only the outer document must be an array; each element is decoded on its
/// own so one bad element cannot fail the rest.
pub fn parse_batch(input: &str) -> Result<Vec<BatchItem>> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(input).context("Batch input must be a JSON array of records")?;

    Ok(values
        .into_iter()
        .map(|value| {
            serde_json::from_value::<FeatureRecord>(value)
                .map_err(|e| PredictionError::Malformed(e.to_string()))
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.prediction.is_some()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub generated_at: DateTime<Utc>,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<BatchOutcome>,
}

impl BatchReport {
    /// Prices in input order, `None` where the record failed.
    pub fn predictions(&self) -> Vec<Option<f64>> {
        self.results.iter().map(|r| r.prediction).collect()
    }
}

/// Score every item independently. The report has one outcome per item, in
/// input order.
pub fn run_batch(pipeline: &ScoringPipeline, items: Vec<BatchItem>) -> BatchReport {
    let results: Vec<BatchOutcome> = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item.and_then(|record| pipeline.predict(&record)) {
            Ok(price) => BatchOutcome {
                index,
                prediction: Some(price),
                error: None,
            },
            Err(err) => BatchOutcome {
                index,
                prediction: None,
                error: Some(err.report()),
            },
        })
        .collect();

    let succeeded = results.iter().filter(|r| r.is_success()).count();
    let report = BatchReport {
        generated_at: Utc::now(),
        total: results.len(),
        succeeded,
        failed: results.len() - succeeded,
        results,
    };

    tracing::info!(
        total = report.total,
        succeeded = report.succeeded,
        failed = report.failed,
        "batch scored"
    );

    report
}
