use super::schema::Config;

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let files = [
        ("model", &config.model),
        ("scaler", &config.scaler),
        ("metrics", &config.metrics),
        ("feature_importance", &config.feature_importance),
    ];
    for (name, path) in files {
        if path.as_os_str().is_empty() {
            errors.push(format!("{}: file name must not be empty", name));
        }
    }

    let thresholds = &config.thresholds;
    if !(0.0..=1.0).contains(&thresholds.r2_score) {
        errors.push(format!(
            "thresholds.r2_score: must be between 0 and 1, got {}",
            thresholds.r2_score
        ));
    }
    if thresholds.mae.is_nan() || thresholds.mae < 0.0 {
        errors.push(format!(
            "thresholds.mae: must be non-negative, got {}",
            thresholds.mae
        ));
    }
    if thresholds.rmse.is_nan() || thresholds.rmse < 0.0 {
        errors.push(format!(
            "thresholds.rmse: must be non-negative, got {}",
            thresholds.rmse
        ));
    }

    if config.server.socket_addr().is_err() {
        errors.push(format!(
            "server.host: not an IP address: {:?}",
            config.server.host
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_empty_model_name() {
        let config = Config {
            model: PathBuf::new(),
            ..Config::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].starts_with("model:"));
    }

    #[test]
    fn test_r2_out_of_range() {
        let mut config = Config::default();
        config.thresholds.r2_score = 1.5;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].contains("thresholds.r2_score"));
    }

    #[test]
    fn test_nan_threshold_rejected() {
        let mut config = Config::default();
        config.thresholds.mae = f64::NAN;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_nan_rmse_rejected() {
        let mut config = Config::default();
        config.thresholds.rmse = f64::NAN;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("thresholds.rmse:"));
    }

    #[test]
    fn test_zero_error_thresholds_allowed() {
        let mut config = Config::default();
        config.thresholds.mae = 0.0;
        config.thresholds.rmse = 0.0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_bad_server_host() {
        let mut config = Config::default();
        config.server.host = "localhost:80".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].starts_with("server.host:"));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = Config::default();
        config.scaler = PathBuf::new();
        config.thresholds.mae = -1.0;
        config.thresholds.rmse = -2.0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
