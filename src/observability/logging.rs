//! Structured logging.
//!
//! # Design Decisions
//! - `RUST_LOG` overrides the configured level
//! - JSON output for production, human-readable fmt otherwise

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default directives for a given level.
pub fn default_directives(level: &str) -> String {
    format!(
        "server_lifecycle={level},service_host={level},tower_http={level}",
        level = level
    )
}

/// Install the global tracing subscriber.
pub fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_cover_library_and_host() {
        let directives = default_directives("debug");
        assert!(directives.contains("server_lifecycle=debug"));
        assert!(directives.contains("service_host=debug"));
        assert!(EnvFilter::try_new(directives).is_ok());
    }
}
