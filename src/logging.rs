use std::io;

use anyhow::Result;
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::AppConfig;

static INIT: OnceCell<()> = OnceCell::new();

/// Console tracing setup; `RUST_LOG` wins over the configured level.
/// Logs go to stderr so piped command output stays clean.
pub fn init_tracing(config: &AppConfig) -> Result<()> {
    INIT.get_or_try_init::<_, anyhow::Error>(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.logging.level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let console_layer = fmt::layer()
            .with_writer(io::stderr)
            .with_target(true)
            .with_ansi(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .init();

        Ok(())
    })?;
    Ok(())
}
