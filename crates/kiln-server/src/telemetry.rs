use std::str::FromStr;

use tracing::Level;

use crate::error::{ServerError, ServerResult};

/// Install the global fmt subscriber at `level`.
pub fn init_tracing(level: &str) -> ServerResult<()> {
    let level = Level::from_str(level)
        .map_err(|_| ServerError::Config(format!("invalid log level {level:?}")))?;
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init()
        .map_err(|e| ServerError::Internal(e.to_string()))
}
