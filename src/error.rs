//! Crate-wide error taxonomy.

use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum MegaphoneError {
    /// Client options are unusable for the requested operation: missing
    /// API key, unknown network name, provider on the wrong chain.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A contract view call failed, or returned data that does not fit
    /// the client-side model.
    #[error("contract read failed: {0}")]
    ContractRead(#[source] BoxedSource),

    /// A transaction could not be submitted or confirmed.
    #[error("contract write failed: {0}")]
    ContractWrite(#[source] BoxedSource),

    /// The backend answered with a non-2xx status.
    #[error("backend request failed ({status}): {message}")]
    Backend { status: u16, message: String },

    /// The backend could not be reached or its body could not be decoded.
    #[error("backend transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend declined to authorize a rev-share purchase or returned
    /// no usable signature.
    #[error("rev-share authorization failed: {0}")]
    RevShare(String),

    /// Input rejected locally, before any chain or backend call.
    #[error("invalid input: {0}")]
    Validation(String),

    /// A timestamp outside the representable calendar range.
    #[error("timestamp {0} is outside the representable date range")]
    DateRange(i64),
}

impl MegaphoneError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub(crate) fn read(source: impl Into<BoxedSource>) -> Self {
        Self::ContractRead(source.into())
    }

    pub(crate) fn write(source: impl Into<BoxedSource>) -> Self {
        Self::ContractWrite(source.into())
    }
}
