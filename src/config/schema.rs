use serde::{Deserialize, Serialize};
use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

/// Service configuration.
///
/// Every field is optional; absent fields use the defaults below. Artifact
/// file names are resolved against `artifacts_dir` unless absolute.
///
/// Example YAML:
/// ```yaml
/// artifacts_dir: /srv/house-price/artifacts
/// model: best_model.json
/// scaler: scaler.json
/// thresholds:
///   r2_score: 0.8
///   mae: 3.0
///   rmse: 4.0
/// server:
///   host: 127.0.0.1
///   port: 8000
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,

    #[serde(default = "default_model")]
    pub model: PathBuf,

    #[serde(default = "default_scaler")]
    pub scaler: PathBuf,

    #[serde(default = "default_metrics")]
    pub metrics: PathBuf,

    #[serde(default = "default_feature_importance")]
    pub feature_importance: PathBuf,

    #[serde(default)]
    pub thresholds: MetricThresholds,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("artifacts")
}

fn default_model() -> PathBuf {
    PathBuf::from("best_model.json")
}

fn default_scaler() -> PathBuf {
    PathBuf::from("scaler.json")
}

fn default_metrics() -> PathBuf {
    PathBuf::from("metrics.json")
}

fn default_feature_importance() -> PathBuf {
    PathBuf::from("feature_importance.json")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            artifacts_dir: default_artifacts_dir(),
            model: default_model(),
            scaler: default_scaler(),
            metrics: default_metrics(),
            feature_importance: default_feature_importance(),
            thresholds: MetricThresholds::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    fn resolve(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.artifacts_dir.join(file)
        }
    }

    pub fn model_path(&self) -> PathBuf {
        self.resolve(&self.model)
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.resolve(&self.scaler)
    }

    pub fn metrics_path(&self) -> PathBuf {
        self.resolve(&self.metrics)
    }

    pub fn feature_importance_path(&self) -> PathBuf {
        self.resolve(&self.feature_importance)
    }
}

/// Minimum acceptable offline evaluation scores for the loaded model.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MetricThresholds {
    /// Lowest acceptable R² (default: 0.8)
    #[serde(default = "default_r2")]
    pub r2_score: f64,

    /// Highest acceptable mean absolute error (default: 3.0)
    #[serde(default = "default_mae")]
    pub mae: f64,

    /// Highest acceptable root mean squared error (default: 4.0)
    #[serde(default = "default_rmse")]
    pub rmse: f64,
}

fn default_r2() -> f64 {
    0.8
}

fn default_mae() -> f64 {
    3.0
}

fn default_rmse() -> f64 {
    4.0
}

impl Default for MetricThresholds {
    fn default() -> Self {
        Self {
            r2_score: default_r2(),
            mae: default_mae(),
            rmse: default_rmse(),
        }
    }
}

/// Listen address for `house-price serve`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// IP address to bind (default: 0.0.0.0)
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port (default: 8000)
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        Ok(SocketAddr::new(self.host.parse::<IpAddr>()?, self.port))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model_path(), PathBuf::from("artifacts/best_model.json"));
        assert_eq!(config.scaler_path(), PathBuf::from("artifacts/scaler.json"));
        assert_eq!(config.thresholds.r2_score, 0.8);
    }

    #[test]
    fn test_empty_config_parse() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_config_parse() {
        let yaml = r#"
artifacts_dir: /srv/models
thresholds:
  mae: 2.5
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.model_path(), PathBuf::from("/srv/models/best_model.json"));
        assert_eq!(config.thresholds.mae, 2.5);
        assert_eq!(config.thresholds.rmse, 4.0);
    }

    #[test]
    fn test_absolute_file_overrides_dir() {
        let yaml = r#"
artifacts_dir: /srv/models
scaler: /opt/shared/scaler.json
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.scaler_path(), PathBuf::from("/opt/shared/scaler.json"));
    }

    #[test]
    fn test_server_section_parse() {
        let yaml = r#"
server:
  host: 127.0.0.1
  port: 9090
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(
            config.server.socket_addr().unwrap(),
            "127.0.0.1:9090".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_default_server_addr() {
        let addr = ServerConfig::default().socket_addr().unwrap();
        assert_eq!(addr.port(), 8000);
        assert!(addr.ip().is_unspecified());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = "model_path: foo.json\n";
        assert!(serde_saphyr::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config::default();
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: Config = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }
}
