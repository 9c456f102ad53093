pub mod config;
pub mod pipeline;
pub mod providers;
pub mod session;
pub mod voice;

use tracing_subscriber::EnvFilter;

/// Initialize tracing on stderr. `RUST_LOG` wins over `verbose`.
pub fn init_tracing(verbose: bool) {
    let fallback = if verbose {
        "debug"
    } else {
        config::default_log_filter()
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("{} v{} starting", config::APP_NAME, config::APP_VERSION);
}
