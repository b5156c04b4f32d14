use tracing_subscriber::{EnvFilter, fmt};

use crate::error::MegaphoneError;

/// Installs an env-filtered fmt subscriber with crate-level `info` as the
/// default. Call once from the embedding binary; honors `RUST_LOG`.
pub fn init_logging() -> Result<(), MegaphoneError> {
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                "megaphone_sdk=info"
                    .parse()
                    .map_err(|err| MegaphoneError::config(format!("bad log directive: {err}")))?,
            ),
        )
        .init();
    Ok(())
}
