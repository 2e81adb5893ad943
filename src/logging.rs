use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive, e.g.
/// `HOUSE_PRICE_LOG=house_price=debug`.
pub const LOG_ENV: &str = "HOUSE_PRICE_LOG";

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Build the filter: the env var wins, then `--verbose`, then warnings only.
pub fn build_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Install the global subscriber, writing to stderr so stdout stays
/// machine-readable. Safe to call more than once; later calls are ignored.
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
