//! Diagnostic logging setup.

use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable holding the log filter, e.g.
/// `DELIVERY_FORECAST_LOG=delivery_forecast=debug`.
pub const LOG_ENV_VAR: &str = "DELIVERY_FORECAST_LOG";

static INIT: Once = Once::new();

/// Installs a stderr subscriber so report output on stdout stays clean.
///
/// The filter comes from [`LOG_ENV_VAR`]; without it, `verbose` selects
/// `debug` and otherwise only warnings are shown. Calling this more than
/// once has no effect.
pub fn init_tracing(verbose: bool) {
    INIT.call_once(|| {
        let default_level = if verbose { "debug" } else { "warn" };
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(default_level));

        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .with(filter)
            .try_init();
    });
}
