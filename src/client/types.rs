// ABOUTME: Engine event and state types shared by the modem engine, waiters and handlers
// ABOUTME: Replaces name-based event dispatch with an explicit event kind enumeration

use std::fmt;

/// Kinds of events the engine dispatches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The handshake completed and the engine accepts commands
    Ready,
    /// A non-empty line arrived from the modem
    Message,
    /// A line that completes a command: `OK`, `ERROR` or `+...`
    Response,
    /// The byte stream closed
    Close,
}

/// An event together with its payload line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    kind: EventKind,
    payload: String,
}

impl Event {
    pub fn new(kind: EventKind, payload: impl Into<String>) -> Self {
        Event {
            kind,
            payload: payload.into(),
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// The line that produced the event; empty for `Ready` and `Close`
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

/// Engine lifecycle
///
/// ```text
/// Unstarted → Initializing → Ready ⇄ AwaitingResponse
///                  any state → Closed
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineState {
    Unstarted,
    Initializing,
    Ready,
    /// A command was written and its response has not arrived
    AwaitingResponse { command: String },
    Closed,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::Unstarted => f.write_str("unstarted"),
            EngineState::Initializing => f.write_str("initializing"),
            EngineState::Ready => f.write_str("ready"),
            EngineState::AwaitingResponse { command } => {
                write!(f, "awaiting response to AT{command}")
            }
            EngineState::Closed => f.write_str("closed"),
        }
    }
}
