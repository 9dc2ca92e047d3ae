//! Tracing subscriber setup for binaries and tests that embed the core.

use anyhow::Result;
use std::sync::OnceLock;
use tracing_subscriber::{
    EnvFilter, fmt, fmt::time::UtcTime, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Outcome of the first install attempt, shared by every later call.
static LOGGER_INIT: OnceLock<Result<(), String>> = OnceLock::new();

pub const DEFAULT_LOG_DIRECTIVES: &str = "info,habitquest_core::store=debug";

/// Install a stderr fmt subscriber filtered by `RUST_LOG`, falling back to
/// `directives` (or [`DEFAULT_LOG_DIRECTIVES`]). Later calls, including
/// concurrent ones, wait for the first and return its outcome.
pub fn init_logging(directives: Option<&str>) -> Result<()> {
    LOGGER_INIT
        .get_or_init(|| install(directives).map_err(|err| format!("{err:#}")))
        .clone()
        .map_err(anyhow::Error::msg)
}

fn install(directives: Option<&str>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directives.unwrap_or(DEFAULT_LOG_DIRECTIVES)))
        .map_err(|err| anyhow::anyhow!("invalid log directives: {err}"))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_timer(UtcTime::rfc_3339()),
        )
        .try_init()
        .map_err(|err| anyhow::anyhow!("install tracing subscriber: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concurrent_first_calls_agree() {
        let outcomes: Vec<bool> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| init_logging(Some("debug")).is_ok()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(outcomes.iter().all(|ok| *ok == outcomes[0]));
        assert_eq!(init_logging(None).is_ok(), outcomes[0]);
    }
}
