// ABOUTME: Modem engine error types covering transport, protocol state and waiter failures
// ABOUTME: Provides structured error reporting with automatic conversion from I/O and codec errors

use crate::client::types::EngineState;
use crate::codec::{ParseError, PduError};
use std::io;
use thiserror::Error;

/// Error type for modem engine operations
#[derive(Debug, Error)]
pub enum ModemError {
    /// I/O error on the underlying byte stream
    #[error("Connection error: {0}")]
    Connection(#[from] io::Error),

    /// The engine is not in a state that accepts commands
    #[error("Modem not ready (state: {0})")]
    NotReady(EngineState),

    /// A previous command has not seen its response yet
    #[error("Command already in flight: AT{command}")]
    CommandInFlight { command: String },

    /// The bare `AT` sent by `start` was never answered with `OK`
    #[error("Modem did not acknowledge the handshake")]
    HandshakeNotAcknowledged,

    /// `start` was called on an engine that is already running
    #[error("Modem engine already started")]
    AlreadyStarted,

    /// A waiter expired before a matching event arrived
    #[error("Operation timeout")]
    Timeout,

    /// The byte stream closed while the operation was pending
    #[error("Connection closed unexpectedly")]
    ConnectionClosed,

    /// A waiter's predicate failed while evaluating an event
    #[error("Predicate failed: {0}")]
    Predicate(crate::Error),

    /// The modem answered with a final error result code
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("PDU error: {0}")]
    Pdu(#[from] PduError),
}

/// Result type alias for modem operations
pub type ModemResult<T> = Result<T, ModemError>;

impl From<crate::Error> for ModemError {
    fn from(err: crate::Error) -> Self {
        match err.downcast::<io::Error>() {
            Ok(io_err) => ModemError::Connection(*io_err),
            Err(err) => ModemError::Connection(io::Error::other(err)),
        }
    }
}
