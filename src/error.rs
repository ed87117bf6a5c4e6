//! Error types for packet generation and processing.

use std::io;

use thiserror::Error;

/// Failures surfaced by the generator and processor state machines.
///
/// Every failure is returned as a value from the run call; nothing already
/// written to or read from a stream is rolled back. [`Error::EndOfFile`]
/// reports ordinary stream exhaustion and is kept distinct from the
/// structural variants so callers can tell "stream done" from "stream
/// corrupted".
#[derive(Debug, Error)]
pub enum Error {
    /// A run method was called before `initialize()`.
    #[error("instance has not been initialized")]
    Uninitialized,

    /// The state machine reached a branch that should be unreachable.
    /// Signals an implementation bug, not bad input.
    #[error("invalid state in state machine")]
    InvalidState,

    // Generator failures
    /// The requested per-packet update cap is zero or too large to
    /// represent in a 16-bit packet length.
    #[error("requested update cap outside the representable range")]
    TooManyUpdates,

    /// Writing a packet header to the sink failed.
    #[error("packet header write failed")]
    HeaderWrite(#[source] io::Error),

    /// Writing a batch of update records to the sink failed.
    #[error("update write failed")]
    UpdateWrite(#[source] io::Error),

    // Processor failures
    /// The input source reported itself closed.
    #[error("input stream is closed")]
    StreamClosed,

    /// The input source is exhausted. Expected terminal condition.
    #[error("end of stream")]
    EndOfFile,

    /// The input source failed for a reason other than exhaustion.
    #[error("input stream is bad")]
    BadStream(#[source] io::Error),

    /// Reading a packet header failed or came up short.
    #[error("packet header read failed")]
    HeaderRead(#[source] io::Error),

    /// A packet header declared a length below the header size, or one
    /// inconsistent with its update count.
    #[error("poorly formed packet header")]
    MalformedPacketHeader,

    /// Reading part of a packet body failed or came up short.
    #[error("packet body read failed")]
    BodyRead(#[source] io::Error),

    /// An update record declared a wrong length or an unknown kind.
    #[error("poorly formed update record")]
    MalformedUpdate,

    /// Writing a formatted trade line to the text sink failed.
    #[error("trade write failed")]
    TradeWrite(#[source] io::Error),
}

impl Error {
    /// Whether this is the ordinary end-of-stream signal rather than a
    /// structural or I/O failure.
    pub fn is_end_of_file(&self) -> bool {
        matches!(self, Error::EndOfFile)
    }
}

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, Error>;
