//! Tracing subscriber setup shared by the server and the CLI

use nlpa_core::LoggingConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise the configured level applies to the
/// nlpa crates and `tower_http`. Logs go to stderr so annotate mode keeps
/// stdout for its report.
pub fn init(config: &LoggingConfig) {
    let fallback = format!(
        "nlpa_api={level},nlpa_pipeline={level},nlpa_core={level},nlpa={level},tower_http={level}",
        level = config.level
    );
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let registry = tracing_subscriber::registry().with(filter);
    if config.json_format {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
