//! Log subscriber setup for the CLI.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "AVATARLIB_LOG";

/// Level used when `AVATARLIB_LOG` is unset.
pub const DEFAULT_LEVEL: LevelFilter = LevelFilter::WARN;

/// Installs a stderr subscriber filtered by `AVATARLIB_LOG`.
///
/// Does nothing if a global subscriber is already set.
pub fn init() {
    let filter = EnvFilter::builder()
        .with_default_directive(DEFAULT_LEVEL.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
}
