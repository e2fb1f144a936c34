use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// JSON logs for CloudWatch. `RUST_LOG` overrides the default `info` filter.
/// Lambda stamps each line itself, so no timestamp is written.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .try_init();
}
