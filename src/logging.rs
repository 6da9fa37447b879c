use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber. The default level is `info`;
/// `RUST_LOG` overrides it, and a configured filter overrides both.
/// Repeated calls are harmless.
pub fn init(filter_override: Option<&str>) {
    let filter = match filter_override {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
