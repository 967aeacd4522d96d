//! Tracing setup

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

/// Install the global tracing subscriber with the configured filter
pub fn init(config: &Config) -> bool {
    init_tracing(&config.log_filter)
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over `default_filter`. Returns false if a subscriber
/// was already installed.
pub fn init_tracing(default_filter: &str) -> bool {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_rejected() {
        init(&Config::default());
        assert!(!init_tracing("doc_annotations=trace"));
    }
}
