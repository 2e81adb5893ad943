use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use house_price::config::{load_config, validate_config, Config};
use house_price::features::{Feature, FeatureRecord};
use house_price::output;
use house_price::pipeline::{load_model, PredictionError, ScoringPipeline};

const EXIT_SUCCESS: i32 = 0;
const EXIT_REJECTED: i32 = 1;
const EXIT_INTERNAL: i32 = 2;
const EXIT_IO: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Format {
    /// Human-readable output
    #[default]
    Text,
    /// JSON on stdout
    Json,
}

/// Feature values given as individual flags. Flags override values read
/// from --json or --input.
#[derive(Args, Debug, Default)]
struct FeatureArgs {
    /// % lower status of the population
    #[arg(long)]
    lstat: Option<f64>,
    /// Average number of rooms per dwelling
    #[arg(long)]
    rm: Option<f64>,
    /// Per capita crime rate by town
    #[arg(long)]
    crim: Option<f64>,
    /// Pupil-teacher ratio by town
    #[arg(long)]
    ptratio: Option<f64>,
    /// Proportion of non-retail business acres per town
    #[arg(long)]
    indus: Option<f64>,
    /// Full-value property-tax rate per $10,000
    #[arg(long)]
    tax: Option<f64>,
    /// Nitric oxides concentration (parts per 10 million)
    #[arg(long)]
    nox: Option<f64>,
    /// 1000(Bk - 0.63)^2 where Bk is the proportion of Black residents by town
    #[arg(long)]
    b: Option<f64>,
}

impl FeatureArgs {
    fn apply(&self, record: &mut FeatureRecord) {
        let values = [
            (Feature::Lstat, self.lstat),
            (Feature::Rm, self.rm),
            (Feature::Crim, self.crim),
            (Feature::Ptratio, self.ptratio),
            (Feature::Indus, self.indus),
            (Feature::Tax, self.tax),
            (Feature::Nox, self.nox),
            (Feature::B, self.b),
        ];
        for (feature, value) in values {
            if let Some(value) = value {
                record.insert(feature.as_str(), value);
            }
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Predict the price of a single house
    Predict {
        #[command(flatten)]
        features: FeatureArgs,

        /// Record as a JSON object, e.g. '{"LSTAT": 10, "RM": 6, ...}'
        #[arg(long, conflicts_with = "input")]
        json: Option<String>,

        /// Read the record from a JSON file ("-" for stdin)
        #[arg(long)]
        input: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t)]
        format: Format,
    },
    /// Predict prices for a JSON array of records
    Bulk {
        /// JSON file with an array of records ("-" for stdin)
        file: PathBuf,

        /// Write the JSON report to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t)]
        format: Format,
    },
    /// Show the model, feature ranges and evaluation metrics
    Info,
    /// Load config and artifacts and report whether the service can start
    Check,
    /// Serve POST /predict and POST /bulk_predict over HTTP
    Serve {
        /// IP address to bind (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// TCP port (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "house-price")]
#[command(about = "House price estimates from a pre-trained regression model", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/house-price/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Directory holding the model artifacts (overrides the config file)
    #[arg(long, global = true)]
    artifacts_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    house_price::logging::init(cli.verbose);
    let start_time = Instant::now();

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let mut config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };
    if let Some(dir) = cli.artifacts_dir {
        config.artifacts_dir = dir;
    }

    // Validate config at startup
    if let Err(errors) = validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let use_colors = output::should_use_colors();

    let code = match cli.command {
        Commands::Predict {
            features,
            json,
            input,
            format,
        } => run_predict(&config, &features, json, input, format, use_colors),
        Commands::Bulk {
            file,
            output: output_path,
            format,
        } => run_bulk(&config, &file, output_path.as_deref(), format, use_colors),
        Commands::Info => run_info(&config, use_colors),
        Commands::Check => run_check(&config),
        Commands::Serve { host, port } => run_serve(&config, host, port).await,
    };

    if cli.verbose {
        eprintln!("Done in {}", output::format_elapsed(start_time.elapsed()));
    }

    std::process::exit(code);
}

/// Load both artifacts. Any failure is fatal for the whole run.
fn load_pipeline(config: &Config) -> Result<ScoringPipeline, i32> {
    ScoringPipeline::load(&config.scaler_path(), &config.model_path()).map_err(|e| {
        eprintln!("Failed to load artifacts: {:#}", anyhow::Error::from(e));
        EXIT_CONFIG
    })
}

/// Read a whole file, or stdin when the path is "-".
fn read_input(path: &Path) -> anyhow::Result<String> {
    use anyhow::Context;

    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))
    }
}

fn print_failure(err: &PredictionError, format: Format, use_colors: bool) {
    let report = err.report();
    match format {
        Format::Text => eprintln!("{}", output::format_error(&report, use_colors)),
        Format::Json => println!("{}", serde_json::json!({ "error": report })),
    }
}

fn run_predict(
    config: &Config,
    features: &FeatureArgs,
    json: Option<String>,
    input: Option<PathBuf>,
    format: Format,
    use_colors: bool,
) -> i32 {
    let pipeline = match load_pipeline(config) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let raw = match (json, input) {
        (Some(json), _) => Some(json),
        (None, Some(path)) => match read_input(&path) {
            Ok(contents) => Some(contents),
            Err(e) => {
                eprintln!("{:#}", e);
                return EXIT_IO;
            }
        },
        (None, None) => None,
    };

    let mut record = match raw {
        Some(raw) => match serde_json::from_str::<FeatureRecord>(&raw) {
            Ok(record) => record,
            Err(e) => {
                print_failure(&PredictionError::Malformed(e.to_string()), format, use_colors);
                return EXIT_REJECTED;
            }
        },
        None => FeatureRecord::new(),
    };
    features.apply(&mut record);

    match pipeline.predict(&record) {
        Ok(price) => {
            match format {
                Format::Text => println!("{}", output::format_prediction(price, use_colors)),
                Format::Json => println!("{}", serde_json::json!({ "prediction": price })),
            }
            EXIT_SUCCESS
        }
        Err(err) => {
            print_failure(&err, format, use_colors);
            if err.is_rejection() {
                EXIT_REJECTED
            } else {
                EXIT_INTERNAL
            }
        }
    }
}

fn run_bulk(
    config: &Config,
    file: &Path,
    output_path: Option<&Path>,
    format: Format,
    use_colors: bool,
) -> i32 {
    let pipeline = match load_pipeline(config) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let contents = match read_input(file) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{:#}", e);
            return EXIT_IO;
        }
    };

    let items = match house_price::bulk::parse_batch(&contents) {
        Ok(items) => items,
        Err(e) => {
            eprintln!("{:#}", e);
            return EXIT_REJECTED;
        }
    };

    let report = house_price::bulk::run_batch(&pipeline, items);

    if let Some(path) = output_path {
        if let Err(e) = house_price::bulk::save_report(path, &report) {
            eprintln!("{:#}", e);
            return EXIT_IO;
        }
        eprintln!(
            "Wrote {} results ({} failed) to {}",
            report.total,
            report.failed,
            path.display()
        );
        return EXIT_SUCCESS;
    }

    match format {
        Format::Text => println!("{}", output::format_batch_table(&report, use_colors)),
        Format::Json => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize batch report: {}", e);
                return EXIT_INTERNAL;
            }
        },
    }

    EXIT_SUCCESS
}

fn run_info(config: &Config, use_colors: bool) -> i32 {
    let model_path = config.model_path();
    let model = match load_model(&model_path) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Failed to load model: {:#}", anyhow::Error::from(e));
            return EXIT_CONFIG;
        }
    };

    println!("Model: {}", model.summary());
    println!("  model:  {}", model_path.display());
    println!("  scaler: {}", config.scaler_path().display());
    println!();
    println!("Features (column order):");
    println!("{}", output::format_feature_table(use_colors));

    println!();
    match house_price::report::load_metrics(&config.metrics_path()) {
        Ok(Some(metrics)) => {
            let checks = house_price::report::check_metrics(&metrics, &config.thresholds);
            println!("Evaluation metrics:");
            println!("{}", output::format_metric_checks(&checks, use_colors));
        }
        Ok(None) => println!("Evaluation metrics: not available"),
        Err(e) => {
            eprintln!("{:#}", e);
            return EXIT_CONFIG;
        }
    }

    println!();
    match house_price::report::load_feature_importance(&config.feature_importance_path()) {
        Ok(Some(ranked)) => {
            println!("Feature importance:");
            println!("{}", output::format_importance(&ranked));
        }
        Ok(None) => println!("Feature importance: not available"),
        Err(e) => {
            eprintln!("{:#}", e);
            return EXIT_CONFIG;
        }
    }

    EXIT_SUCCESS
}

fn run_check(config: &Config) -> i32 {
    if let Err(code) = load_pipeline(config) {
        return code;
    }

    match house_price::report::load_metrics(&config.metrics_path()) {
        Ok(Some(metrics)) => {
            for check in house_price::report::check_metrics(&metrics, &config.thresholds) {
                if !check.passed {
                    tracing::warn!(
                        metric = check.metric,
                        value = check.value,
                        threshold = check.threshold,
                        "model metric outside threshold"
                    );
                }
            }
        }
        Ok(None) => tracing::debug!("no metrics file, skipping threshold checks"),
        Err(e) => tracing::warn!(error = %format!("{:#}", e), "could not read metrics"),
    }

    println!(
        "Artifacts OK: model {}, scaler {}",
        config.model_path().display(),
        config.scaler_path().display()
    );
    EXIT_SUCCESS
}

async fn run_serve(config: &Config, host: Option<String>, port: Option<u16>) -> i32 {
    let pipeline = match load_pipeline(config) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let mut server = config.server.clone();
    if let Some(host) = host {
        server.host = host;
    }
    if let Some(port) = port {
        server.port = port;
    }
    let addr = match server.socket_addr() {
        Ok(addr) => addr,
        Err(e) => {
            eprintln!("Invalid listen address {:?}: {}", server.host, e);
            return EXIT_CONFIG;
        }
    };

    match house_price::server::bind(pipeline, addr) {
        Ok((bound, running)) => {
            eprintln!("Listening on http://{}", bound);
            running.await;
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("{:#}", e);
            EXIT_IO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_artifacts() -> Config {
        Config {
            artifacts_dir: std::env::temp_dir().join("house-price-test-no-artifacts"),
            ..Config::default()
        }
    }

    fn shipped_artifacts() -> Config {
        Config {
            artifacts_dir: Path::new(env!("CARGO_MANIFEST_DIR")).join("artifacts"),
            ..Config::default()
        }
    }

    #[test]
    fn test_predict_loads_artifacts_before_reading_input() {
        let code = run_predict(
            &missing_artifacts(),
            &FeatureArgs::default(),
            Some("nope".to_string()),
            None,
            Format::Json,
            false,
        );
        assert_eq!(code, EXIT_CONFIG);
    }

    #[test]
    fn test_bulk_loads_artifacts_before_reading_input() {
        let dir = std::env::temp_dir().join("house-price-test-bulk-order");
        std::fs::create_dir_all(&dir).unwrap();
        let malformed = dir.join("bad.json");
        std::fs::write(&malformed, "{ not json").unwrap();

        let config = missing_artifacts();
        assert_eq!(
            run_bulk(&config, &malformed, None, Format::Json, false),
            EXIT_CONFIG
        );
        assert_eq!(
            run_bulk(&config, &dir.join("absent.json"), None, Format::Json, false),
            EXIT_CONFIG
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_malformed_request_rejected_once_loaded() {
        let code = run_predict(
            &shipped_artifacts(),
            &FeatureArgs::default(),
            Some("nope".to_string()),
            None,
            Format::Json,
            false,
        );
        assert_eq!(code, EXIT_REJECTED);
    }

    #[test]
    fn test_predict_from_flags() {
        let features = FeatureArgs {
            lstat: Some(10.0),
            rm: Some(6.0),
            crim: Some(0.1),
            ptratio: Some(15.0),
            indus: Some(10.0),
            tax: Some(300.0),
            nox: Some(0.5),
            b: Some(300.0),
        };
        let code = run_predict(&shipped_artifacts(), &features, None, None, Format::Json, false);
        assert_eq!(code, EXIT_SUCCESS);
    }

    #[test]
    fn test_cli_parses_serve() {
        let cli = Cli::try_parse_from(["house-price", "serve", "--port", "9000"]).unwrap();
        match cli.command {
            Commands::Serve { host, port } => {
                assert_eq!(host, None);
                assert_eq!(port, Some(9000));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_serve_fails_fast_without_artifacts() {
        assert_eq!(run_serve(&missing_artifacts(), None, Some(0)).await, EXIT_CONFIG);
    }
}
