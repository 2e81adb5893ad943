//! Offline evaluation results shipped next to the model.
//!
//! Both files are optional. A missing file reads as `None`; a file that
//! exists but cannot be parsed is an error.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::config::MetricThresholds;

/// Scores from the held-out evaluation of the trained model.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ModelMetrics {
    pub r2_score: f64,
    pub mae: f64,
    pub rmse: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bound {
    AtLeast,
    AtMost,
}

/// One metric compared against its threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCheck {
    pub metric: &'static str,
    pub value: f64,
    pub threshold: f64,
    pub bound: Bound,
    pub passed: bool,
}

impl MetricCheck {
    fn new(metric: &'static str, value: f64, threshold: f64, bound: Bound) -> Self {
        let passed = match bound {
            Bound::AtLeast => value >= threshold,
            Bound::AtMost => value <= threshold,
        };
        Self {
            metric,
            value,
            threshold,
            bound,
            passed,
        }
    }
}

/// R² must reach its threshold; the error metrics must stay under theirs.
pub fn check_metrics(metrics: &ModelMetrics, thresholds: &MetricThresholds) -> Vec<MetricCheck> {
    vec![
        MetricCheck::new("r2_score", metrics.r2_score, thresholds.r2_score, Bound::AtLeast),
        MetricCheck::new("mae", metrics.mae, thresholds.mae, Bound::AtMost),
        MetricCheck::new("rmse", metrics.rmse, thresholds.rmse, Bound::AtMost),
    ]
}

fn read_optional<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };

    let value = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(value))
}

pub fn load_metrics(path: &Path) -> Result<Option<ModelMetrics>> {
    read_optional(path)
}

/// Feature importances sorted from most to least important.
pub fn load_feature_importance(path: &Path) -> Result<Option<Vec<(String, f64)>>> {
    let Some(map) = read_optional::<BTreeMap<String, f64>>(path)? else {
        return Ok(None);
    };

    let mut ranked: Vec<(String, f64)> = map.into_iter().collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    Ok(Some(ranked))
}
