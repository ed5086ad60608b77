#[macro_use]
mod macros;

pub mod client;
pub mod codec;
pub mod connection;
pub mod datatypes;
pub mod frame;
pub mod sms;

#[cfg(test)]
mod tests;

// Re-export codec types for direct access
pub use codec::{Decodable, ParseError, PduError};

// Re-export the main client API for easy access
pub use client::{EngineState, Event, EventKind, Modem, ModemConfig, ModemError, ModemResult};
pub use datatypes::{Message, MessageKind, Parameter};
pub use sms::{Direction, Sms};

/// Error returned by the connection layer.
///
/// The line reader reports a closed stream with a partial line buffered as a
/// boxed error, alongside any I/O error from the stream itself. The engine
/// converts these into `ModemError::Connection`.
///
/// For performance reasons, boxing is avoided in any hot path. The AT grammar
/// and the PDU decoder define their own `enum` errors (`ParseError` and
/// `PduError`), both of which convert into `Box<dyn std::error::Error>`.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// A specialized `Result` type for connection-level operations.
///
/// This is defined as a convenience.
///
/// # Examples
///
/// ## Talking to a modem
///
/// ```rust,no_run
/// use hayes::client::Modem;
/// use tokio::net::TcpStream;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
///     // Any AsyncRead + AsyncWrite stream works; here a serial-over-TCP bridge
///     let stream = TcpStream::connect("127.0.0.1:7000").await?;
///     let modem = Modem::new(stream);
///
///     // `AT` / `OK` handshake
///     modem.start().await?;
///
///     // `+CSQ: <rssi>,<ber>`
///     let signal = modem.query("+CSQ").await?;
///     println!("{signal}");
///
///     modem.shutdown().await?;
///     Ok(())
/// }
/// ```
///
/// ## Decoding a PDU without a modem
///
/// ```rust
/// use hayes::sms::Sms;
///
/// let sms = Sms::decode(
///     "+CMGR: 0,,24",
///     "07911326040000F0040B911346610089F60000208062917314800CC8F71D14969741F977FD07",
///     None,
/// )
/// .unwrap();
/// assert_eq!(sms.text(), Some("How are you?"));
/// assert_eq!(sms.address().unwrap().to_string(), "+31641600986");
/// ```
pub type Result<T> = std::result::Result<T, Error>;
