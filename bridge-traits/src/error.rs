use thiserror::Error;

/// Failure of a fallible bridge call.
///
/// Player and pool commands never fail synchronously, so in practice this is
/// what a [`LoggerSink`](crate::logging::LoggerSink) returns when the host log
/// pipeline refuses an entry.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Host capability not available: {0}")]
    NotAvailable(String),

    #[error("Log sink rejected entry: {0}")]
    SinkRejected(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
