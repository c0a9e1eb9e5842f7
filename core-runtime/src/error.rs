use thiserror::Error;

/// Errors raised while assembling a feed, before any item plays.
#[derive(Error, Debug)]
pub enum Error {
    /// A setting is missing or out of range.
    #[error("Invalid feed configuration: {0}")]
    Config(String),

    /// A host bridge required by the feed was not injected.
    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    /// The tracing subscriber could not be installed or its filter parsed.
    #[error("Logging setup failed: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, Error>;
