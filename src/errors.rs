//! # Errors
//!
//! Error types and helper functions used in the library

use thiserror::Error;

/// Errors produced by [`crate::resp`]: the RESP3 reader, writer and raw
/// framing mode.
///
/// The protocol only distinguishes two failure kinds (a syntax violation, or
/// an encounter with the unsupported streamed-string form); I/O errors from
/// the underlying source/sink are propagated verbatim rather than wrapped in
/// a third variant of their own meaning.
#[derive(Debug, Error)]
pub enum RespError {
    /// Any framing or payload violation: a short line, a missing CRLF, an
    /// unparsable count, a negative length, a non-decimal number, a
    /// malformed boolean or null, a verbatim string shorter than 4 bytes, or
    /// a nested stream marker where a value was expected.
    #[error("invalid RESP3 syntax: {0}")]
    InvalidSyntax(String),

    /// The raw framing mode met a `$EOF:` streamed-string marker. Streamed
    /// strings are out of scope for this codec.
    #[error("streamed strings are not supported")]
    StreamingUnsupported,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RespError {
    pub(crate) fn syntax(reason: impl Into<String>) -> Self {
        RespError::InvalidSyntax(reason.into())
    }
}

/// Errors related to working with [`crate::cmd`]
#[derive(Debug, Error)]
pub enum CmdError {
    #[error(transparent)]
    Resp(#[from] RespError),

    #[error("command is not an Array")]
    CmdNotArray,

    #[error("empty command array")]
    EmptyArray,

    #[error("not all command words are blob strings")]
    NotAllBulk,

    #[error("command missing argument")]
    MissingArg,

    #[error("unrecognized command: {0}")]
    UnrecognizedCmd(String),

    #[error("wrong argument: {0}")]
    WrongArg(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors related to working with [`crate::conn`]
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Resp(#[from] RespError),

    #[error(transparent)]
    CmdError(#[from] CmdError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors related to starting and running [`crate::server::Server`]
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("timed out waiting for a connection permit: {0}")]
    ElapsedError(String),

    #[error("connection semaphore closed: {0}")]
    AcquireError(#[from] tokio::sync::AcquireError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Top-level application errors
#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    ServerError(#[from] ServerError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
