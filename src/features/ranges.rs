use serde::Serialize;

/// Inclusive bounds for a feature value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValidationRange {
    pub min: f64,
    pub max: f64,
}

impl ValidationRange {
    pub const UNBOUNDED: ValidationRange = ValidationRange {
        min: f64::NEG_INFINITY,
        max: f64::INFINITY,
    };

    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Both ends inclusive. NaN is never contained.
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Ranges for the user-adjustable features.
///
/// Only these names are bounded. Any other name, including ones the model
/// might consume in the future, falls back to `ValidationRange::UNBOUNDED`.
const RANGE_TABLE: [(&str, ValidationRange); 8] = [
    ("CRIM", ValidationRange::new(0.0, 100.0)),
    ("RM", ValidationRange::new(3.0, 9.0)),
    ("LSTAT", ValidationRange::new(0.0, 40.0)),
    ("PTRATIO", ValidationRange::new(12.0, 22.0)),
    ("INDUS", ValidationRange::new(0.0, 30.0)),
    ("TAX", ValidationRange::new(150.0, 800.0)),
    ("NOX", ValidationRange::new(0.3, 0.9)),
    ("B", ValidationRange::new(0.0, 400.0)),
];

/// Configured range for `name`, if any.
pub fn configured_range(name: &str) -> Option<ValidationRange> {
    RANGE_TABLE
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, range)| *range)
}

/// Effective range for `name`; unbounded when nothing is configured.
pub fn range_for(name: &str) -> ValidationRange {
    configured_range(name).unwrap_or(ValidationRange::UNBOUNDED)
}

/// Whether `value` is acceptable for the feature called `name`.
pub fn is_valid_value(name: &str, value: f64) -> bool {
    range_for(name).contains(value)
}
