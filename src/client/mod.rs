// ABOUTME: Modem client module: the async AT protocol engine and its supporting types
// ABOUTME: Exports the engine, configuration, event types, waiters and error types

//! Hayes Modem Client Module
//!
//! This module drives a GSM modem over any async byte stream:
//!
//! * **Handshake** - `start` sends a bare `AT` and waits for `OK`
//! * **Serialized commands** - at most one command is in flight at a time
//! * **Line events** - every line from the modem becomes a `Message` event,
//!   and lines that complete a command also become `Response` events
//! * **Waiters** - register interest in an event before triggering it, then
//!   await it with a timeout
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hayes::client::{EventKind, Modem, ModemConfig};
//! use std::time::Duration;
//! use tokio::net::TcpStream;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let stream = TcpStream::connect("127.0.0.1:7000").await?;
//! let config = ModemConfig::new().with_command_timeout(Duration::from_secs(10));
//! let modem = Modem::with_config(stream, config);
//! modem.start().await?;
//!
//! // Register first, then issue the command that produces the event
//! let storage = modem.waiter(EventKind::Message, |e| e.payload().starts_with("+CPMS:"));
//! modem.exec_at("+CPMS?").await?;
//! let event = storage.wait(Duration::from_secs(5)).await?;
//! println!("{}", event.payload());
//!
//! // Stored messages decode straight into SMS PDUs
//! let sms = modem.read_sms(1).await?;
//! println!("{:?}: {:?}", sms.address(), sms.text());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! * `Modem` - the engine; owns the stream and spawns the line collector
//! * `Waiter` - a one-shot registration for the next matching event
//! * `EngineState` - `Unstarted → Initializing → Ready ⇄ AwaitingResponse`,
//!   any state → `Closed`
//! * `ByteStream` - the transport seam (serial port, TCP bridge, duplex pipe)

pub mod config;
pub mod error;
pub mod modem;
pub mod traits;
pub mod types;
pub mod waiter;

// Re-export the main types for easy access
pub use config::ModemConfig;
pub use error::{ModemError, ModemResult};
pub use modem::Modem;
pub use traits::ByteStream;
pub use types::{EngineState, Event, EventKind};
pub use waiter::Waiter;
