//! House price estimates from a pre-trained regression model.
//!
//! A record of named features is checked against fixed ranges, projected
//! onto the model's column order, scaled with the fitted scaler, scored, and
//! mapped back from log space to a price. See [`pipeline::ScoringPipeline`].

pub mod bulk;
pub mod config;
pub mod features;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod server;

pub use features::{validate, FeatureRecord, ValidationError};
pub use pipeline::{FatalConfigError, PredictionError, ScoringPipeline};
