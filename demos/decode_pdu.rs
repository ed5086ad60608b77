// ABOUTME: Offline SMS PDU decoder demonstrating the sms module without a modem attached
// ABOUTME: Takes a status line and hex PDU from the command line and prints the decoded fields

//! # SMS PDU Decoder
//!
//! Decodes the two lines a modem prints for a stored or received message.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --example decode_pdu -- \
//!   --status '+CMGR: 0,,24' \
//!   --pdu 07911326040000F0040B911346610089F60000208062917314800CC8F71D14969741F977FD07
//!
//! # A sent message stored on the SIM, read back with an explicit direction
//! cargo run --example decode_pdu -- --status '+CMT: ,22' --pdu ... --outgoing
//! ```

use argh::FromArgs;
use hayes::datatypes::UserDataEncoding;
use hayes::sms::{Direction, Sms};
use std::error::Error;
use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;

/// Decode an SMS PDU as reported by +CMGR, +CMGL or +CMT
#[derive(FromArgs)]
struct CliArgs {
    /// whether or not to enable debugging
    #[argh(switch, short = 'd')]
    debugging: bool,

    /// the status line preceding the PDU, e.g. "+CMGR: 0,,24"
    #[argh(option, short = 's')]
    status: String,

    /// the PDU as hex
    #[argh(option, short = 'p')]
    pdu: String,

    /// treat the PDU as travelling from the mobile to the service centre
    #[argh(switch)]
    outgoing: bool,

    /// decode user data as UCS2 when the coding scheme names no alphabet
    #[argh(switch)]
    ucs2_fallback: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli_args: CliArgs = argh::from_env();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli_args.debugging { Level::TRACE } else { Level::INFO })
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let fallback = cli_args.ucs2_fallback.then_some(UserDataEncoding::Ucs2);
    let sms = if cli_args.outgoing {
        Sms::decode_with_direction(
            &cli_args.status,
            &cli_args.pdu,
            Direction::ToServiceCentre,
            fallback,
        )?
    } else {
        Sms::decode(&cli_args.status, &cli_args.pdu, fallback)?
    };
    debug!("{:#?}", sms);

    println!("type:      {:?}", sms.kind());
    if let Some(status) = sms.status() {
        println!("status:    {:?}", status);
    }
    if let Some(smsc) = sms.smsc() {
        println!("smsc:      {smsc}");
    }
    if let Some(address) = sms.address() {
        println!("address:   {address}");
    }
    if let Some(timestamp) = sms.timestamp() {
        println!("timestamp: {timestamp}");
    }
    if let Some(user_data) = sms.user_data() {
        if let Some(part) = user_data.header().and_then(|header| header.concatenation()) {
            println!(
                "part:      {}/{} (ref {})",
                part.sequence, part.total, part.reference
            );
        }
        println!("text:      {}", user_data.text());
    }

    Ok(())
}
