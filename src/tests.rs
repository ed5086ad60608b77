//! Integration tests for the modem engine over an in-memory duplex stream

use crate::client::{EngineState, EventKind, Modem, ModemConfig, ModemError};
use crate::datatypes::{NumberingScheme, Parameter};
use crate::sms::{Direction, Sms, SmsStatus};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream, duplex};

const DELIVER: &str =
    "07911326040000F0040B911346610089F60000208062917314800CC8F71D14969741F977FD07";

const WAIT: Duration = Duration::from_secs(1);

#[cfg(test)]
mod engine_tests {
    use super::*;

    /// Read exactly `expected` from the modem side of the pipe
    async fn expect_written(device: &mut DuplexStream, expected: &str) {
        let mut buf = vec![0u8; expected.len()];
        device.read_exact(&mut buf).await.unwrap();
        assert_eq!(String::from_utf8_lossy(&buf), expected);
    }

    async fn start_with(config: ModemConfig) -> (Arc<Modem<DuplexStream>>, DuplexStream) {
        let (client, mut device) = duplex(4096);
        let modem = Arc::new(Modem::with_config(client, config));

        let starter = {
            let modem = Arc::clone(&modem);
            tokio::spawn(async move { modem.start().await })
        };
        expect_written(&mut device, "AT\r").await;
        device.write_all(b"\r\nOK\r\n").await.unwrap();
        starter.await.unwrap().unwrap();

        (modem, device)
    }

    async fn ready_modem() -> (Arc<Modem<DuplexStream>>, DuplexStream) {
        start_with(ModemConfig::default()).await
    }

    #[tokio::test]
    async fn test_handshake_reaches_ready_and_fires_ready_event() {
        let (client, mut device) = duplex(1024);
        let modem = Arc::new(Modem::new(client));
        let ready = Arc::new(Mutex::new(0));
        {
            let ready = Arc::clone(&ready);
            modem.on(EventKind::Ready, move |_| *ready.lock().unwrap() += 1);
        }
        assert_eq!(modem.state(), EngineState::Unstarted);

        let starter = {
            let modem = Arc::clone(&modem);
            tokio::spawn(async move { modem.start().await })
        };
        expect_written(&mut device, "AT\r").await;
        // Echo of the handshake precedes the result code
        device.write_all(b"AT\r\r\nOK\r\n").await.unwrap();
        starter.await.unwrap().unwrap();

        assert!(modem.is_ready());
        assert_eq!(*ready.lock().unwrap(), 1);
        assert_eq!(modem.waiter_count(), 0);
    }

    #[tokio::test]
    async fn test_start_twice_is_rejected() {
        let (modem, _device) = ready_modem().await;
        assert!(matches!(modem.start().await, Err(ModemError::AlreadyStarted)));
    }

    #[tokio::test]
    async fn test_unanswered_handshake_can_be_retried() {
        let (client, mut device) = duplex(1024);
        let config = ModemConfig::new().with_handshake_timeout(Duration::from_millis(50));
        let modem = Arc::new(Modem::with_config(client, config));

        let result = modem.start().await;
        assert!(matches!(result, Err(ModemError::HandshakeNotAcknowledged)));
        assert_eq!(modem.state(), EngineState::Initializing);
        assert_eq!(modem.waiter_count(), 0);

        let starter = {
            let modem = Arc::clone(&modem);
            tokio::spawn(async move { modem.start().await })
        };
        // The second `AT` is only written after its waiter is registered
        expect_written(&mut device, "AT\rAT\r").await;
        device.write_all(b"OK\r\n").await.unwrap();
        starter.await.unwrap().unwrap();
        assert!(modem.is_ready());
    }

    #[tokio::test]
    async fn test_timeout_after_ready_stays_timeout() {
        let config = ModemConfig::new().with_handshake_timeout(Duration::from_millis(50));
        let (modem, _device) = start_with(config).await;

        let result = modem
            .wait_for(EventKind::Message, |_| true, Duration::from_millis(20))
            .await;
        assert!(matches!(result, Err(ModemError::Timeout)));
        assert!(modem.is_ready());
    }

    #[tokio::test]
    async fn test_stream_closed_during_handshake() {
        let (client, mut device) = duplex(1024);
        let modem = Arc::new(Modem::new(client));

        let starter = {
            let modem = Arc::clone(&modem);
            tokio::spawn(async move { modem.start().await })
        };
        expect_written(&mut device, "AT\r").await;
        drop(device);

        let result = starter.await.unwrap();
        assert!(matches!(result, Err(ModemError::ConnectionClosed)));
        assert_eq!(modem.state(), EngineState::Closed);
        assert!(matches!(
            modem.start().await,
            Err(ModemError::AlreadyStarted)
        ));
    }

    #[tokio::test]
    async fn test_handshake_answered_then_closed_is_not_ready() {
        let (client, mut device) = duplex(1024);
        let modem = Modem::new(client);
        // `OK` and end of stream are both queued before the collector starts
        device.write_all(b"OK\r\n").await.unwrap();
        device.shutdown().await.unwrap();

        let result = modem.start().await;
        assert!(matches!(
            result,
            Err(ModemError::NotReady(EngineState::Closed))
        ));
        assert_eq!(modem.state(), EngineState::Closed);
    }

    #[tokio::test]
    async fn test_exec_before_start_is_not_ready() {
        let (client, _device) = duplex(1024);
        let modem = Modem::new(client);

        let result = modem.exec_at("+CSQ").await;
        assert!(matches!(
            result,
            Err(ModemError::NotReady(EngineState::Unstarted))
        ));
    }

    #[tokio::test]
    async fn test_second_command_while_awaiting_response() {
        let (modem, mut device) = ready_modem().await;

        modem.exec_at("+CSQ").await.unwrap();
        expect_written(&mut device, "AT+CSQ\r").await;
        assert_eq!(
            modem.state(),
            EngineState::AwaitingResponse {
                command: "+CSQ".to_string()
            }
        );

        match modem.exec_at("+CGMI").await {
            Err(ModemError::CommandInFlight { command }) => assert_eq!(command, "+CSQ"),
            other => panic!("expected CommandInFlight, got {other:?}"),
        }

        let ok = modem.waiter(EventKind::Response, |e| e.payload() == "OK");
        device.write_all(b"+CSQ: 20,99\r\nOK\r\n").await.unwrap();
        ok.wait(WAIT).await.unwrap();
        assert!(modem.is_ready());

        modem.exec_at("+CGMI").await.unwrap();
        expect_written(&mut device, "AT+CGMI\r").await;
    }

    #[tokio::test]
    async fn test_split_line_produces_one_message_event() {
        let (modem, mut device) = ready_modem().await;
        let mut events = modem.subscribe();

        device.write_all(b"\r\n+CS").await.unwrap();
        tokio::task::yield_now().await;
        device.write_all(b"Q: 20,99\r\n").await.unwrap();
        device.write_all(b"\r\nOK\r\n").await.unwrap();

        let kinds_and_payloads = [
            (EventKind::Message, "+CSQ: 20,99"),
            (EventKind::Response, "+CSQ: 20,99"),
            (EventKind::Message, "OK"),
            (EventKind::Response, "OK"),
        ];
        for (kind, payload) in kinds_and_payloads {
            let event = tokio::time::timeout(WAIT, events.recv())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(event.kind(), kind);
            assert_eq!(event.payload(), payload);
        }
    }

    #[tokio::test]
    async fn test_unsolicited_line_while_ready() {
        let (modem, mut device) = ready_modem().await;

        let indication = modem.waiter(EventKind::Response, |e| e.payload().starts_with("+CMTI"));
        device.write_all(b"+CMTI: \"SM\",3\r\n").await.unwrap();

        let event = indication.wait(WAIT).await.unwrap();
        assert_eq!(event.payload(), "+CMTI: \"SM\",3");
        assert!(modem.is_ready());
    }

    #[tokio::test]
    async fn test_zero_timeout_wait_removes_its_registration() {
        let (modem, _device) = ready_modem().await;

        let result = modem
            .wait_for(EventKind::Message, |_| true, Duration::ZERO)
            .await;
        assert!(matches!(result, Err(ModemError::Timeout)));
        assert_eq!(modem.waiter_count(), 0);
    }

    #[tokio::test]
    async fn test_dropped_waiter_is_unregistered() {
        let (modem, _device) = ready_modem().await;

        let waiter = modem.waiter(EventKind::Message, |_| true);
        assert_eq!(modem.waiter_count(), 1);
        drop(waiter);
        assert_eq!(modem.waiter_count(), 0);
    }

    #[tokio::test]
    async fn test_failing_predicate_only_fails_its_own_waiter() {
        let (modem, mut device) = ready_modem().await;

        let failing = modem.try_waiter(EventKind::Message, |_| Err("predicate exploded"));
        let healthy = modem.waiter(EventKind::Message, |e| e.payload() == "RING");
        device.write_all(b"RING\r\n").await.unwrap();

        match failing.wait(WAIT).await {
            Err(ModemError::Predicate(err)) => assert_eq!(err.to_string(), "predicate exploded"),
            other => panic!("expected Predicate, got {other:?}"),
        }
        assert_eq!(healthy.wait(WAIT).await.unwrap().payload(), "RING");
        assert_eq!(modem.waiter_count(), 0);
    }

    #[tokio::test]
    async fn test_waiters_resolve_in_registration_order() {
        let (modem, mut device) = ready_modem().await;

        let first = modem.waiter(EventKind::Message, |_| true);
        let second = modem.waiter(EventKind::Message, |e| e.payload() == "second");
        device.write_all(b"first\r\nsecond\r\n").await.unwrap();

        assert_eq!(first.wait(WAIT).await.unwrap().payload(), "first");
        assert_eq!(second.wait(WAIT).await.unwrap().payload(), "second");
    }

    #[tokio::test]
    async fn test_handlers_see_every_message() {
        let (modem, mut device) = ready_modem().await;
        let seen = Arc::new(Mutex::new(Vec::new()));
        {
            let seen = Arc::clone(&seen);
            modem.on(EventKind::Message, move |e| {
                seen.lock().unwrap().push(e.payload().to_string())
            });
        }

        device.write_all(b"RING\r\nRING\r\n").await.unwrap();
        let marker = modem.waiter(EventKind::Message, |e| e.payload() == "NO CARRIER");
        device.write_all(b"NO CARRIER\r\n").await.unwrap();
        marker.wait(WAIT).await.unwrap();

        let seen = seen.lock().unwrap();
        assert!(seen.len() >= 2);
        assert_eq!(&seen[..2], &["RING".to_string(), "RING".to_string()]);
    }

    #[tokio::test]
    async fn test_query_parses_information_response() {
        let (modem, mut device) = ready_modem().await;

        let responder = tokio::spawn(async move {
            expect_written(&mut device, "AT+CSQ\r").await;
            device.write_all(b"+CSQ: 20,99\r\n\r\nOK\r\n").await.unwrap();
            device
        });

        let message = modem.query("+CSQ").await.unwrap();
        assert_eq!(message.command(), "+CSQ");
        assert_eq!(
            message.parameters(),
            &[Parameter::Integer(20), Parameter::Integer(99)]
        );
        assert!(modem.is_ready());
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn test_query_error_code_is_command_failed() {
        let (modem, mut device) = ready_modem().await;

        let responder = tokio::spawn(async move {
            expect_written(&mut device, "AT+CPIN?\r").await;
            device.write_all(b"+CME ERROR: 10\r\n").await.unwrap();
            device
        });

        match modem.query("+CPIN?").await {
            Err(ModemError::CommandFailed(line)) => assert_eq!(line, "+CME ERROR: 10"),
            other => panic!("expected CommandFailed, got {other:?}"),
        }
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn test_read_sms_decodes_stored_deliver() {
        let (modem, mut device) = ready_modem().await;

        let responder = tokio::spawn(async move {
            expect_written(&mut device, "AT+CMGR=1\r").await;
            let reply = format!("AT+CMGR=1\r\r\n+CMGR: 1,,24\r\n{DELIVER}\r\n\r\nOK\r\n");
            device.write_all(reply.as_bytes()).await.unwrap();
            device
        });

        let sms = modem.read_sms(1).await.unwrap();
        assert!(matches!(sms, Sms::Deliver(_)));
        assert_eq!(sms.status(), Some(SmsStatus::ReceivedRead));
        assert_eq!(sms.status().map(|s| s.direction()), Some(Direction::ToMobile));
        assert_eq!(sms.text(), Some("How are you?"));
        assert_eq!(sms.address().unwrap().to_string(), "+31641600986");
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn test_read_sms_empty_slot_fails() {
        let (modem, mut device) = ready_modem().await;

        let responder = tokio::spawn(async move {
            expect_written(&mut device, "AT+CMGR=9\r").await;
            device.write_all(b"+CMS ERROR: 321\r\n").await.unwrap();
            device
        });

        assert!(matches!(
            modem.read_sms(9).await,
            Err(ModemError::CommandFailed(_))
        ));
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn test_phonebook_entry() {
        let (modem, mut device) = ready_modem().await;

        let responder = tokio::spawn(async move {
            expect_written(&mut device, "AT+CPBR=1\r").await;
            device
                .write_all(b"+CPBR: 1,\"+31628870634\",145,\"Alice\"\r\nOK\r\n")
                .await
                .unwrap();
            device
        });

        let entry = modem.phonebook_entry(1).await.unwrap();
        assert_eq!(entry.index, 1);
        assert_eq!(entry.number, "+31628870634");
        assert_eq!(entry.scheme, NumberingScheme::International);
        assert_eq!(entry.contact_name, "Alice");
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn test_abandon_command_returns_to_ready() {
        let (modem, _device) = ready_modem().await;

        assert_eq!(modem.abandon_command(), None);
        modem.exec_at("+COPS=?").await.unwrap();
        assert_eq!(modem.abandon_command().as_deref(), Some("+COPS=?"));
        assert!(modem.is_ready());
        assert_eq!(modem.abandon_command(), None);
    }

    #[tokio::test]
    async fn test_stream_close_fails_pending_waiters() {
        let (modem, device) = ready_modem().await;
        let closed = Arc::new(Mutex::new(false));
        {
            let closed = Arc::clone(&closed);
            modem.on(EventKind::Close, move |_| *closed.lock().unwrap() = true);
        }

        let pending = modem.waiter(EventKind::Response, |_| true);
        drop(device);

        assert!(matches!(
            pending.wait(WAIT).await,
            Err(ModemError::ConnectionClosed)
        ));
        assert_eq!(modem.state(), EngineState::Closed);
        assert!(*closed.lock().unwrap());
        assert!(matches!(
            modem.exec_at("+CSQ").await,
            Err(ModemError::NotReady(EngineState::Closed))
        ));
    }

    #[tokio::test]
    async fn test_panicking_handler_keeps_engine_running() {
        let (modem, mut device) = ready_modem().await;
        modem.on(EventKind::Message, |event| {
            if event.payload() == "BOOM" {
                panic!("handler failed on {}", event.payload());
            }
        });

        device.write_all(b"BOOM\r\n").await.unwrap();
        let ring = modem.waiter(EventKind::Message, |event| event.payload() == "RING");
        device.write_all(b"RING\r\n").await.unwrap();

        assert_eq!(ring.wait(WAIT).await.unwrap().payload(), "RING");
        assert!(modem.is_ready());
    }

    #[tokio::test]
    async fn test_panicking_predicate_fails_only_its_waiter() {
        let (modem, mut device) = ready_modem().await;
        let broken = modem.waiter(EventKind::Message, |_| -> bool { panic!("bad predicate") });
        let healthy = modem.waiter(EventKind::Message, |_| true);

        device.write_all(b"RING\r\n").await.unwrap();

        assert!(matches!(
            broken.wait(WAIT).await,
            Err(ModemError::Predicate(_))
        ));
        assert_eq!(healthy.wait(WAIT).await.unwrap().payload(), "RING");
        assert!(modem.is_ready());
    }

    #[tokio::test]
    async fn test_dropping_engine_fails_outstanding_waiters() {
        let (modem, _device) = ready_modem().await;
        let pending = modem.waiter(EventKind::Message, |_| true);

        let modem = Arc::into_inner(modem).unwrap();
        drop(modem);

        assert!(matches!(
            pending.wait(WAIT).await,
            Err(ModemError::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn test_shutdown_closes_engine() {
        let (modem, mut device) = ready_modem().await;

        let pending = modem.waiter(EventKind::Message, |_| true);
        modem.shutdown().await.unwrap();

        assert_eq!(modem.state(), EngineState::Closed);
        assert!(matches!(
            pending.wait(WAIT).await,
            Err(ModemError::ConnectionClosed)
        ));

        // Peer sees end of stream
        let mut rest = Vec::new();
        device.read_to_end(&mut rest).await.unwrap();
        assert!(rest.is_empty());
    }

    #[tokio::test]
    async fn test_typed_command_message() {
        let (modem, mut device) = ready_modem().await;

        let message: crate::datatypes::Message = "AT+CMGF=0".parse().unwrap();
        modem.exec(&message).await.unwrap();
        expect_written(&mut device, "AT+CMGF=0\r").await;
    }
}
