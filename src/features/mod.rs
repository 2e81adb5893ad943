pub mod catalog;
pub mod ranges;
pub mod record;
pub mod validation;

pub use catalog::{Feature, NUM_FEATURES};
pub use ranges::{configured_range, is_valid_value, range_for, ValidationRange};
pub use record::{FeatureRecord, HouseFeatures, MissingFeatureError};
pub use validation::{validate, ValidationError};
