use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use super::error::FatalConfigError;
use super::model::ModelArtifact;
use super::scaler::ScalerArtifact;
use crate::features::Feature;

fn read_artifact<T: DeserializeOwned>(
    artifact: &'static str,
    path: &Path,
) -> Result<T, FatalConfigError> {
    let bytes = fs::read(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            FatalConfigError::ArtifactMissing {
                artifact,
                path: path.to_path_buf(),
            }
        } else {
            FatalConfigError::Io {
                artifact,
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    serde_json::from_slice(&bytes).map_err(|source| FatalConfigError::Corrupt {
        artifact,
        path: path.to_path_buf(),
        source,
    })
}

/// Load and check a fitted scaler.
///
/// If the artifact records the columns it was fit on, they must match the
/// model column order exactly.
pub fn load_scaler(path: &Path) -> Result<ScalerArtifact, FatalConfigError> {
    let scaler: ScalerArtifact = read_artifact("scaler", path)?;
    scaler.check()?;

    if let Some(names) = &scaler.feature_names {
        let expected: Vec<String> = Feature::ALL.iter().map(|f| f.as_str().to_string()).collect();
        if *names != expected {
            return Err(FatalConfigError::ColumnOrder {
                expected,
                found: names.clone(),
            });
        }
    }

    Ok(scaler)
}

/// Load and structurally check a trained model.
pub fn load_model(path: &Path) -> Result<ModelArtifact, FatalConfigError> {
    let model: ModelArtifact = read_artifact("model", path)?;
    model.check()?;
    Ok(model)
}
