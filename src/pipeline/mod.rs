pub mod artifacts;
pub mod engine;
pub mod error;
pub mod model;
pub mod scaler;

pub use artifacts::{load_model, load_scaler};
pub use engine::ScoringPipeline;
pub use error::{ErrorKind, ErrorReport, FatalConfigError, PredictionError};
pub use model::{LinearModel, ModelArtifact, Regressor, TreeEnsemble};
pub use scaler::{MinMaxScaler, Scaler, ScalerArtifact, ScalerKind, StandardScaler};
