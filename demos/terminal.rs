// ABOUTME: Interactive-less modem session demonstrating the engine against a serial-over-TCP bridge
// ABOUTME: Performs the handshake, runs a few queries and reads messages announced by +CMTI

//! # Modem Session
//!
//! Connects to a modem exposed over TCP (for example with `ser2net` or
//! `socat`), performs the `AT` handshake and runs a short session:
//!
//! * Prints manufacturer and signal quality
//! * Switches the modem to PDU mode
//! * Optionally reads one stored message
//! * Listens for new-message indications and decodes each message
//!
//! ## Usage
//!
//! ```bash
//! # Handshake and status queries only
//! cargo run --example terminal -- --host 192.168.1.20 --port 7000
//!
//! # Read stored message 1, then listen for new messages for 5 minutes
//! cargo run --example terminal -- --read 1 --listen 300 -d
//! ```

use argh::FromArgs;
use hayes::client::{EventKind, Modem, ModemConfig, ModemError};
use hayes::datatypes::Parameter;
use std::error::Error;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Talk to a GSM modem over a serial-over-TCP bridge
#[derive(FromArgs)]
struct CliArgs {
    /// whether or not to enable debugging
    #[argh(switch, short = 'd')]
    debugging: bool,

    /// the hostname or IP address of the bridge (default: localhost)
    #[argh(option)]
    host: Option<String>,

    /// the port of the bridge (default: 7000)
    #[argh(option, short = 'p')]
    port: Option<u32>,

    /// command timeout in seconds (default: 4)
    #[argh(option)]
    timeout: Option<u64>,

    /// read the stored message at this index
    #[argh(option, short = 'r')]
    read: Option<u32>,

    /// listen for new messages for this many seconds (default: 0)
    #[argh(option, short = 'l')]
    listen: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli_args: CliArgs = argh::from_env();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli_args.debugging { Level::DEBUG } else { Level::INFO })
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let host = cli_args.host.unwrap_or_else(|| "localhost".to_owned());
    let port = cli_args.port.unwrap_or(7000);
    let timeout = Duration::from_secs(cli_args.timeout.unwrap_or(4));

    info!("Connecting to {host}:{port}");
    let stream = TcpStream::connect(format!("{host}:{port}")).await?;
    let config = ModemConfig::new()
        .with_handshake_timeout(timeout)
        .with_command_timeout(timeout);
    let modem = Modem::with_config(stream, config);

    modem.on(EventKind::Close, |_| warn!("Modem connection closed"));
    modem.start().await?;

    match modem.query("+CGMI").await {
        Ok(manufacturer) => info!("Manufacturer: {manufacturer}"),
        Err(e) => warn!("Manufacturer query failed: {e}"),
    }
    match modem.query("+CSQ").await {
        Ok(signal) => info!("Signal quality: {:?}", signal.parameters()),
        Err(e) => warn!("Signal query failed: {e}"),
    }

    modem.query("+CMGF=0").await?;

    if let Some(index) = cli_args.read {
        print_sms(&modem, index).await;
    }

    let listen = Duration::from_secs(cli_args.listen.unwrap_or(0));
    if !listen.is_zero() {
        info!("Listening for new messages for {} seconds", listen.as_secs());
        let deadline = tokio::time::Instant::now() + listen;

        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            let indication = modem
                .wait_for(
                    EventKind::Response,
                    |e| e.payload().starts_with("+CMTI:"),
                    remaining,
                )
                .await;

            match indication {
                Ok(event) => {
                    // +CMTI: "SM",3
                    let index = event
                        .payload()
                        .parse::<hayes::Message>()
                        .ok()
                        .and_then(|m| m.parameters().get(1).and_then(Parameter::as_int));
                    match index.and_then(|i| u32::try_from(i).ok()) {
                        Some(index) => print_sms(&modem, index).await,
                        None => warn!("Unreadable indication: {}", event.payload()),
                    }
                }
                Err(ModemError::Timeout) => break,
                Err(e) => {
                    error!("Stopped listening: {e}");
                    break;
                }
            }
        }
    }

    modem.shutdown().await?;
    Ok(())
}

async fn print_sms(modem: &Modem<TcpStream>, index: u32) {
    match modem.read_sms(index).await {
        Ok(sms) => {
            let from = sms
                .address()
                .map(ToString::to_string)
                .unwrap_or_else(|| "-".to_owned());
            info!(
                "Message {index} from {from}: {}",
                sms.text().unwrap_or_default()
            );
        }
        Err(e) => error!("Could not read message {index}: {e}"),
    }
}
