//! Subscriber setup for `tracing` output.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Output format of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Install a global subscriber filtered by `RUST_LOG`, falling back to
/// `default_directive` (e.g. `"blockview=debug"`).
///
/// Returns `false` when a global subscriber was already installed; calling
/// this more than once is harmless.
pub fn init(default_directive: &str) -> bool {
    init_with_format(default_directive, LogFormat::Pretty)
}

/// [`init`] with an explicit output format
pub fn init_with_format(default_directive: &str, format: LogFormat) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let registry = tracing_subscriber::registry().with(filter);
    let installed = match format {
        LogFormat::Pretty => registry.with(fmt::layer().with_target(true)).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
    };
    installed.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let _ = init("blockview=debug");
        assert!(!init("blockview=debug"));
        assert!(!init_with_format("info", LogFormat::Json));
    }
}
