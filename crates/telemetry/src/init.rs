// Path: crates/telemetry/src/init.rs
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Initializes the global `tracing` subscriber for structured JSON logging
/// on stderr, filtered by `RUST_LOG` or `info`.
pub fn init_tracing() -> Result<(), anyhow::Error> {
    init_tracing_with(DEFAULT_FILTER)
}

/// Same as `init_tracing`, with the fallback filter given by the caller
/// (e.g. `"info,state=debug,evidence=debug"`).
///
/// Fails if a global subscriber or `log` logger is already installed.
pub fn init_tracing_with(default_filter: &str) -> Result<(), anyhow::Error> {
    let fmt_layer = fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339());
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)?,
    };
    let subscriber = Registry::default().with(filter).with(fmt_layer);
    tracing_log::LogTracer::init()?;
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_fallback_filter_is_reported() {
        std::env::remove_var("RUST_LOG");
        assert!(init_tracing_with("state=notalevel").is_err());
    }

    #[test]
    fn global_subscriber_installs_once() {
        // Tests share one process: whichever call runs second must fail.
        let first = init_tracing();
        let second = init_tracing();
        assert!(first.is_err() || second.is_err());
    }
}
