use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use super::catalog::{Feature, NUM_FEATURES};

/// A required column was not present in the submitted record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required feature: {feature}")]
pub struct MissingFeatureError {
    pub feature: Feature,
}

/// Raw inbound record: feature name to value.
///
/// Deserializes from a flat JSON object. Values must be numbers; anything
/// else is rejected by serde before the record exists. Keys that are not
/// model columns are kept so the validator can see them, and dropped at
/// assembly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureRecord(BTreeMap<String, f64>);

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) -> Option<f64> {
        self.0.insert(name.into(), value)
    }

    pub fn remove(&mut self, name: &str) -> Option<f64> {
        self.0.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Project onto the model's columns. Extra keys are ignored; the first
    /// missing column in column order is reported.
    pub fn assemble(&self) -> Result<HouseFeatures, MissingFeatureError> {
        let column = |feature: Feature| {
            self.get(feature.as_str())
                .ok_or(MissingFeatureError { feature })
        };

        Ok(HouseFeatures {
            lstat: column(Feature::Lstat)?,
            rm: column(Feature::Rm)?,
            crim: column(Feature::Crim)?,
            ptratio: column(Feature::Ptratio)?,
            indus: column(Feature::Indus)?,
            tax: column(Feature::Tax)?,
            nox: column(Feature::Nox)?,
            b: column(Feature::B)?,
        })
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for FeatureRecord {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// The eight model inputs, fully present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HouseFeatures {
    #[serde(rename = "LSTAT")]
    pub lstat: f64,
    #[serde(rename = "RM")]
    pub rm: f64,
    #[serde(rename = "CRIM")]
    pub crim: f64,
    #[serde(rename = "PTRATIO")]
    pub ptratio: f64,
    #[serde(rename = "INDUS")]
    pub indus: f64,
    #[serde(rename = "TAX")]
    pub tax: f64,
    #[serde(rename = "NOX")]
    pub nox: f64,
    #[serde(rename = "B")]
    pub b: f64,
}

impl HouseFeatures {
    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Lstat => self.lstat,
            Feature::Rm => self.rm,
            Feature::Crim => self.crim,
            Feature::Ptratio => self.ptratio,
            Feature::Indus => self.indus,
            Feature::Tax => self.tax,
            Feature::Nox => self.nox,
            Feature::B => self.b,
        }
    }

    /// Values in model column order.
    pub fn to_vector(&self) -> [f64; NUM_FEATURES] {
        Feature::ALL.map(|feature| self.get(feature))
    }
}

impl From<HouseFeatures> for FeatureRecord {
    fn from(features: HouseFeatures) -> Self {
        Feature::ALL
            .iter()
            .map(|feature| (feature.as_str(), features.get(*feature)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FeatureRecord {
        FeatureRecord::new()
            .with("LSTAT", 10.0)
            .with("RM", 6.0)
            .with("CRIM", 0.1)
            .with("PTRATIO", 15.0)
            .with("INDUS", 10.0)
            .with("TAX", 300.0)
            .with("NOX", 0.5)
            .with("B", 300.0)
    }

    #[test]
    fn test_assemble_uses_column_order() {
        let features = sample().assemble().unwrap();
        assert_eq!(
            features.to_vector(),
            [10.0, 6.0, 0.1, 15.0, 10.0, 300.0, 0.5, 300.0]
        );
    }

    #[test]
    fn test_assemble_ignores_extra_keys() {
        let record = sample().with("ZN", 18.0).with("AGE", 65.2);
        let features = record.assemble().unwrap();
        assert_eq!(features, sample().assemble().unwrap());
    }

    #[test]
    fn test_each_missing_column_is_reported() {
        for feature in Feature::ALL {
            let mut record = sample();
            record.remove(feature.as_str());
            let err = record.assemble().unwrap_err();
            assert_eq!(err.feature, feature);
        }
    }

    #[test]
    fn test_missing_column_is_not_zero_filled() {
        let record = sample().with("TAX", 0.0);
        assert!(record.assemble().is_ok());

        let mut record = sample();
        record.remove("TAX");
        assert!(record.assemble().is_err());
    }

    #[test]
    fn test_deserialize_rejects_non_numeric_values() {
        let result: Result<FeatureRecord, _> =
            serde_json::from_str(r#"{"LSTAT": "ten", "RM": 6.0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_accepts_integers() {
        let record: FeatureRecord = serde_json::from_str(r#"{"TAX": 300, "RM": 6.5}"#).unwrap();
        assert_eq!(record.get("TAX"), Some(300.0));
        assert_eq!(record.get("RM"), Some(6.5));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_house_features_into_record() {
        let features = sample().assemble().unwrap();
        let record: FeatureRecord = features.into();
        assert_eq!(record, sample());
    }

    #[test]
    fn test_house_features_serialize_with_column_names() {
        let features = sample().assemble().unwrap();
        let json = serde_json::to_value(features).unwrap();
        assert_eq!(json["PTRATIO"], 15.0);
        assert_eq!(json["B"], 300.0);
        assert_eq!(json.as_object().unwrap().len(), NUM_FEATURES);
    }
}
