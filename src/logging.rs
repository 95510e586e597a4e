use tracing_subscriber::EnvFilter;

/// Used when `RUST_LOG` is unset, blank or unparsable.
pub const DEFAULT_DIRECTIVE: &str = "leadbot=info";

/// `RUST_LOG` wins over the default entirely, so `leadbot=debug` there
/// lowers the crate's level instead of being replaced by it.
pub fn env_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|value| !value.trim().is_empty())
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the stderr fmt subscriber filtered by `RUST_LOG`.
pub fn init() {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .init();
}
