use std::path::Path;

use super::artifacts::{load_model, load_scaler};
use super::error::{FatalConfigError, PredictionError};
use super::model::Regressor;
use super::scaler::Scaler;
use crate::features::{validate, FeatureRecord, HouseFeatures, NUM_FEATURES};

/// Record → validated, scaled, scored price.
///
/// Holds the scaler and model for the life of the process. Both are read
/// only, so one pipeline can be shared by any number of threads.
pub struct ScoringPipeline {
    scaler: Box<dyn Scaler>,
    model: Box<dyn Regressor>,
}

impl std::fmt::Debug for ScoringPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringPipeline")
            .field("scaler_features", &self.scaler.n_features())
            .field("model_features", &self.model.n_features())
            .finish()
    }
}

impl ScoringPipeline {
    /// Build a pipeline around already-loaded states.
    ///
    /// Both must work on exactly `NUM_FEATURES` columns.
    pub fn new(
        scaler: impl Scaler + 'static,
        model: impl Regressor + 'static,
    ) -> Result<Self, FatalConfigError> {
        if scaler.n_features() != NUM_FEATURES {
            return Err(FatalConfigError::Dimension {
                artifact: "scaler",
                expected: NUM_FEATURES,
                actual: scaler.n_features(),
            });
        }
        if model.n_features() != NUM_FEATURES {
            return Err(FatalConfigError::Dimension {
                artifact: "model",
                expected: NUM_FEATURES,
                actual: model.n_features(),
            });
        }

        Ok(Self {
            scaler: Box::new(scaler),
            model: Box::new(model),
        })
    }

    /// Load both artifacts from disk and build the pipeline.
    pub fn load(scaler_path: &Path, model_path: &Path) -> Result<Self, FatalConfigError> {
        let scaler = load_scaler(scaler_path)?;
        let model = load_model(model_path)?;
        tracing::info!(
            scaler = %scaler_path.display(),
            model = %model_path.display(),
            summary = %model.summary(),
            "model and scaler loaded"
        );
        Self::new(scaler.scaler, model)
    }

    /// Predict the price for one record.
    ///
    /// Missing columns are reported before range violations. Neither reaches
    /// the scaler or the model.
    pub fn predict(&self, record: &FeatureRecord) -> Result<f64, PredictionError> {
        let result = record
            .assemble()
            .map_err(PredictionError::from)
            .and_then(|features| {
                validate(record)?;
                self.score(&features)
            });

        match &result {
            Ok(price) => tracing::info!(input = ?record, prediction = price, "prediction made"),
            Err(PredictionError::Internal { context }) => {
                tracing::error!(input = ?record, %context, "prediction failed")
            }
            Err(err) => tracing::warn!(input = ?record, error = %err, "prediction rejected"),
        }

        result
    }

    /// Predict each record independently; one result per record, in order.
    pub fn predict_batch(&self, records: &[FeatureRecord]) -> Vec<Result<f64, PredictionError>> {
        records.iter().map(|record| self.predict(record)).collect()
    }

    fn score(&self, features: &HouseFeatures) -> Result<f64, PredictionError> {
        let row = features.to_vector();

        let scaled = self.scaler.transform(&row);
        if scaled.len() != NUM_FEATURES {
            return Err(PredictionError::internal(format!(
                "scaler returned {} values for {} inputs",
                scaled.len(),
                NUM_FEATURES
            )));
        }

        let raw = self.model.predict(&scaled);
        if !raw.is_finite() {
            return Err(PredictionError::internal(format!(
                "model returned {} for scaled input {:?}",
                raw, scaled
            )));
        }

        // Trained on log(price).
        let price = raw.exp();
        if !price.is_finite() {
            return Err(PredictionError::internal(format!(
                "exp({}) overflowed for scaled input {:?}",
                raw, scaled
            )));
        }

        Ok(price)
    }
}
