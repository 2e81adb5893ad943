use thiserror::Error;

use super::catalog::Feature;
use super::ranges::{range_for, ValidationRange};
use super::record::FeatureRecord;

/// A feature value fell outside its configured range.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid value for {feature}: {value}. Expected between {} and {}", .range.min, .range.max)]
pub struct ValidationError {
    pub feature: String,
    pub value: f64,
    pub range: ValidationRange,
}

fn check(name: &str, value: f64) -> Result<(), ValidationError> {
    let range = range_for(name);
    if range.contains(value) {
        Ok(())
    } else {
        Err(ValidationError {
            feature: name.to_string(),
            value,
            range,
        })
    }
}

/// Check every value in `record` against its range.
///
/// Stops at the first violation. Model columns are checked in column order,
/// then any extra keys in name order. Missing columns are not this
/// function's concern; see `FeatureRecord::assemble`.
pub fn validate(record: &FeatureRecord) -> Result<(), ValidationError> {
    for feature in Feature::ALL {
        if let Some(value) = record.get(feature.as_str()) {
            check(feature.as_str(), value)?;
        }
    }

    for (name, value) in record.iter() {
        if name.parse::<Feature>().is_err() {
            check(name, value)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ranges::configured_range;

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
    fn test_valid_record() {
        assert!(validate(&sample()).is_ok());
    }

    #[test]
    fn test_boundaries_are_accepted() {
        for feature in Feature::ALL {
            let range = configured_range(feature.as_str()).unwrap();
            for edge in [range.min, range.max] {
                let record = sample().with(feature.as_str(), edge);
                assert!(
                    validate(&record).is_ok(),
                    "{} = {} should be accepted",
                    feature,
                    edge
                );
            }
        }
    }

    #[test]
    fn test_one_unit_outside_is_rejected() {
        for feature in Feature::ALL {
            let range = configured_range(feature.as_str()).unwrap();
            for outside in [range.min - 1.0, range.max + 1.0] {
                let record = sample().with(feature.as_str(), outside);
                let err = validate(&record).unwrap_err();
                assert_eq!(err.feature, feature.as_str());
                assert_eq!(err.value, outside);
                assert_eq!(err.range, range);
            }
        }
    }

    #[test]
    fn test_rm_out_of_range_message() {
        let record = sample().with("RM", 9.5);
        let err = validate(&record).unwrap_err();
        assert_eq!(err.feature, "RM");
        assert_eq!(err.range.min, 3.0);
        assert_eq!(err.range.max, 9.0);
        assert_eq!(
            err.to_string(),
            "invalid value for RM: 9.5. Expected between 3 and 9"
        );
    }

    #[test]
    fn test_first_violation_wins() {
        // LSTAT precedes TAX in column order.
        let record = sample().with("TAX", 10_000.0).with("LSTAT", 99.0);
        let err = validate(&record).unwrap_err();
        assert_eq!(err.feature, "LSTAT");
    }

    #[test]
    fn test_unbounded_extra_keys_are_accepted() {
        let record = sample()
            .with("ZN", 1.0e9)
            .with("AGE", -1.0e9)
            .with("DIS", 0.0);
        assert!(validate(&record).is_ok());
    }

    #[test]
    fn test_partial_record_validates_present_values_only() {
        let record = FeatureRecord::new().with("RM", 6.0);
        assert!(validate(&record).is_ok());

        let record = FeatureRecord::new().with("RM", 2.0);
        assert!(validate(&record).is_err());
    }

    #[test]
    fn test_empty_record_is_valid() {
        assert!(validate(&FeatureRecord::new()).is_ok());
    }
}
