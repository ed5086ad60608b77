// ABOUTME: Hayes AT protocol engine: handshake, serialized command issue, line dispatch and waiters
// ABOUTME: Owns the byte stream; a background collector task frames lines and fires events

use crate::client::config::ModemConfig;
use crate::client::error::{ModemError, ModemResult};
use crate::client::traits::ByteStream;
use crate::client::types::{EngineState, Event, EventKind};
use crate::client::waiter::{PendingWaiter, Predicate, Waiter};
use crate::connection::{CommandWriter, LineReader};
use crate::datatypes::{Message, PhoneBookEntry};
use crate::frame;
use crate::sms::Sms;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::io::{AsyncRead, ReadHalf, WriteHalf};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

struct Inner {
    state: EngineState,
    // Registration order, across all event kinds
    waiters: Vec<PendingWaiter>,
    handlers: HashMap<EventKind, Vec<Handler>>,
    next_waiter_id: u64,
}

/// State shared between the engine handle, its waiters and the collector task
pub(crate) struct Shared {
    inner: Mutex<Inner>,
    events: broadcast::Sender<Event>,
}

impl Shared {
    fn new(event_channel_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_channel_capacity.max(1));
        Shared {
            inner: Mutex::new(Inner {
                state: EngineState::Unstarted,
                waiters: Vec::new(),
                handlers: HashMap::new(),
                next_waiter_id: 0,
            }),
            events,
        }
    }

    // Never held across an await; poisoning is ignored
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn register(self: &Arc<Self>, kind: EventKind, predicate: Predicate) -> Waiter {
        let (tx, rx) = oneshot::channel();
        let mut inner = self.lock();
        let id = inner.next_waiter_id;
        inner.next_waiter_id += 1;
        inner.waiters.push(PendingWaiter {
            id,
            kind,
            predicate,
            tx,
        });
        Waiter::new(id, kind, rx, Arc::clone(self))
    }

    pub(crate) fn remove_waiter(&self, id: u64) {
        self.lock().waiters.retain(|waiter| waiter.id != id);
    }

    /// Resolve matching waiters in registration order, then run handlers and
    /// publish to subscribers
    fn dispatch(&self, event: Event) {
        let handlers = {
            let mut inner = self.lock();
            let mut index = 0;
            while index < inner.waiters.len() {
                let waiter = &mut inner.waiters[index];
                if waiter.kind != event.kind() {
                    index += 1;
                    continue;
                }
                let verdict = catch_unwind(AssertUnwindSafe(|| (waiter.predicate)(&event)))
                    .unwrap_or_else(|_| Err("predicate panicked".into()));
                let outcome = match verdict {
                    Ok(false) => {
                        index += 1;
                        continue;
                    }
                    Ok(true) => Ok(event.clone()),
                    Err(err) => {
                        warn!("Waiter predicate failed on {:?}: {}", event.kind(), err);
                        Err(ModemError::Predicate(err))
                    }
                };
                let waiter = inner.waiters.remove(index);
                // The caller may have stopped waiting
                let _ = waiter.tx.send(outcome);
            }
            inner
                .handlers
                .get(&event.kind())
                .cloned()
                .unwrap_or_default()
        };

        for handler in &handlers {
            // A panicking handler must not take the collector task down with it
            if catch_unwind(AssertUnwindSafe(|| handler(&event))).is_err() {
                warn!("Handler for {:?} panicked on {:?}", event.kind(), event.payload());
            }
        }
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn handle_line(&self, line: String) {
        debug!("<<< {}", line);

        let completes = frame::is_response(&line);
        if completes {
            let mut inner = self.lock();
            if let EngineState::AwaitingResponse { command } = &inner.state {
                debug!("AT{} completed by {:?}", command, line);
                inner.state = EngineState::Ready;
            }
        }

        self.dispatch(Event::new(EventKind::Message, line.clone()));
        if completes {
            self.dispatch(Event::new(EventKind::Response, line));
        }
    }

    fn close(&self) {
        {
            let mut inner = self.lock();
            if inner.state == EngineState::Closed {
                return;
            }
            inner.state = EngineState::Closed;
        }

        self.dispatch(Event::new(EventKind::Close, ""));

        let waiters = std::mem::take(&mut self.lock().waiters);
        for waiter in waiters {
            let _ = waiter.tx.send(Err(ModemError::ConnectionClosed));
        }
    }
}

async fn collect<R: AsyncRead + Unpin>(mut reader: LineReader<R>, shared: Arc<Shared>) {
    loop {
        match reader.read_line().await {
            Ok(Some(line)) => shared.handle_line(line),
            Ok(None) => {
                warn!("Modem stream closed");
                break;
            }
            Err(err) => {
                warn!("Modem read failed: {}", err);
                break;
            }
        }
    }
    shared.close();
}

/// Hayes AT command engine over a duplex byte stream
///
/// The engine is driven through `&self`, so it can be shared behind an
/// `Arc` between a task issuing commands and tasks waiting on events.
///
/// # Example
///
/// ```rust,no_run
/// use hayes::client::{EventKind, Modem};
/// use std::time::Duration;
/// use tokio::net::TcpStream;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
/// // A serial-over-TCP bridge in front of the modem
/// let stream = TcpStream::connect("127.0.0.1:7000").await?;
/// let modem = Modem::new(stream);
/// modem.start().await?;
///
/// let signal = modem.query("+CSQ").await?;
/// println!("signal: {:?}", signal.parameters());
///
/// // Wait for the next unsolicited new-message indication
/// let event = modem
///     .wait_for(EventKind::Message, |e| e.payload().starts_with("+CMTI"), Duration::from_secs(60))
///     .await?;
/// println!("{}", event.payload());
/// # Ok(())
/// # }
/// ```
pub struct Modem<S: ByteStream> {
    shared: Arc<Shared>,
    writer: tokio::sync::Mutex<CommandWriter<WriteHalf<S>>>,
    // Taken by the collector task on start
    reader: Mutex<Option<LineReader<ReadHalf<S>>>>,
    collector: Mutex<Option<JoinHandle<()>>>,
    config: ModemConfig,
}

impl<S: ByteStream> Modem<S> {
    /// Create an engine bound to `stream` with the default configuration
    pub fn new(stream: S) -> Self {
        Self::with_config(stream, ModemConfig::default())
    }

    pub fn with_config(stream: S, config: ModemConfig) -> Self {
        let (read_half, write_half) = tokio::io::split(stream);
        Modem {
            shared: Arc::new(Shared::new(config.event_channel_capacity)),
            writer: tokio::sync::Mutex::new(CommandWriter::new(write_half)),
            reader: Mutex::new(Some(LineReader::with_capacity(
                read_half,
                config.read_buffer_capacity,
            ))),
            collector: Mutex::new(None),
            config,
        }
    }

    pub fn config(&self) -> &ModemConfig {
        &self.config
    }

    pub fn state(&self) -> EngineState {
        self.shared.lock().state.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.state() == EngineState::Ready
    }

    /// Number of registered, unresolved waiters
    pub fn waiter_count(&self) -> usize {
        self.shared.lock().waiters.len()
    }

    /// Register a handler run for every event of `kind`
    ///
    /// Handlers run on the collector task after waiters have been resolved.
    /// They must not block.
    pub fn on<F>(&self, kind: EventKind, handler: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.shared
            .lock()
            .handlers
            .entry(kind)
            .or_default()
            .push(Arc::new(handler));
    }

    /// Receive every event, in dispatch order
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.shared.events.subscribe()
    }

    /// Start the collector and perform the `AT` / `OK` handshake
    ///
    /// Calling again after `HandshakeNotAcknowledged` retries the handshake.
    pub async fn start(&self) -> ModemResult<()> {
        {
            let mut inner = self.shared.lock();
            match inner.state {
                EngineState::Unstarted => inner.state = EngineState::Initializing,
                EngineState::Initializing => {}
                _ => return Err(ModemError::AlreadyStarted),
            }
        }
        self.spawn_collector();

        let acknowledged = self.waiter(EventKind::Response, |event| event.payload() == "OK");
        debug!("AT >>> AT");
        self.writer.lock().await.write_command("").await?;

        match acknowledged.wait(self.config.handshake_timeout).await {
            Ok(_) => {
                {
                    let mut inner = self.shared.lock();
                    if inner.state != EngineState::Initializing {
                        return Err(ModemError::NotReady(inner.state.clone()));
                    }
                    inner.state = EngineState::Ready;
                }
                info!("Modem handshake complete");
                self.shared.dispatch(Event::new(EventKind::Ready, ""));
                Ok(())
            }
            Err(ModemError::Timeout) if self.state() == EngineState::Initializing => {
                warn!("Modem did not answer the handshake");
                Err(ModemError::HandshakeNotAcknowledged)
            }
            Err(err) => Err(err),
        }
    }

    fn spawn_collector(&self) {
        let reader = self
            .reader
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(reader) = reader {
            let handle = tokio::spawn(collect(reader, Arc::clone(&self.shared)));
            *self
                .collector
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = Some(handle);
        }
    }

    /// Write `AT<body>\r` and mark the command in flight
    ///
    /// Returns as soon as the command is written; use [`Modem::waiter`]
    /// registered beforehand, or [`Modem::query`], to collect the response.
    pub async fn exec_at(&self, body: &str) -> ModemResult<()> {
        {
            let mut inner = self.shared.lock();
            match &inner.state {
                EngineState::Ready => {
                    inner.state = EngineState::AwaitingResponse {
                        command: body.to_owned(),
                    }
                }
                EngineState::AwaitingResponse { command } => {
                    return Err(ModemError::CommandInFlight {
                        command: command.clone(),
                    });
                }
                other => return Err(ModemError::NotReady(other.clone())),
            }
        }

        debug!("AT >>> AT{}", body);
        let written = self.writer.lock().await.write_command(body).await;
        if let Err(err) = written {
            let mut inner = self.shared.lock();
            if matches!(&inner.state, EngineState::AwaitingResponse { command } if command == body)
            {
                inner.state = EngineState::Ready;
            }
            return Err(err.into());
        }
        Ok(())
    }

    /// Issue a typed command message
    pub async fn exec(&self, message: &Message) -> ModemResult<()> {
        self.exec_at(&message.body()).await
    }

    /// Register a waiter now, to be awaited later
    pub fn waiter<P>(&self, kind: EventKind, mut predicate: P) -> Waiter
    where
        P: FnMut(&Event) -> bool + Send + 'static,
    {
        self.shared
            .register(kind, Box::new(move |event: &Event| Ok(predicate(event))))
    }

    /// Register a waiter whose predicate may fail
    pub fn try_waiter<P, E>(&self, kind: EventKind, mut predicate: P) -> Waiter
    where
        P: FnMut(&Event) -> Result<bool, E> + Send + 'static,
        E: Into<crate::Error>,
    {
        self.shared.register(
            kind,
            Box::new(move |event: &Event| predicate(event).map_err(Into::into)),
        )
    }

    /// Wait for the next event of `kind` accepted by `predicate`
    ///
    /// Predicates run on the collector task while the waiter table is locked
    /// and must not call back into the engine.
    pub async fn wait_for<P>(
        &self,
        kind: EventKind,
        predicate: P,
        timeout: Duration,
    ) -> ModemResult<Event>
    where
        P: FnMut(&Event) -> bool + Send + 'static,
    {
        self.waiter(kind, predicate).wait(timeout).await
    }

    /// Like [`Modem::wait_for`], but a predicate error fails this wait with
    /// `ModemError::Predicate`
    pub async fn try_wait_for<P, E>(
        &self,
        kind: EventKind,
        predicate: P,
        timeout: Duration,
    ) -> ModemResult<Event>
    where
        P: FnMut(&Event) -> Result<bool, E> + Send + 'static,
        E: Into<crate::Error>,
    {
        self.try_waiter(kind, predicate).wait(timeout).await
    }

    /// Execute `body` and parse its first response line
    ///
    /// Waits for the final result code as well, so a trailing `OK` cannot be
    /// taken for the response to a later command. Final error codes (`ERROR`,
    /// `+CME ERROR`, `+CMS ERROR`) become `ModemError::CommandFailed`.
    pub async fn query(&self, body: &str) -> ModemResult<Message> {
        let response = self.waiter(EventKind::Response, |_| true);
        let final_code = self.waiter(EventKind::Response, |event| {
            event.payload() == "OK" || frame::is_error(event.payload())
        });
        self.exec_at(body).await?;

        let event = response.wait(self.config.command_timeout).await?;
        if frame::is_error(event.payload()) {
            return Err(ModemError::CommandFailed(event.payload().to_owned()));
        }
        let message: Message = event.payload().parse()?;

        let done = final_code.wait(self.config.command_timeout).await?;
        if frame::is_error(done.payload()) {
            return Err(ModemError::CommandFailed(done.payload().to_owned()));
        }
        Ok(message)
    }

    /// Read and decode the SMS stored at `index` (`AT+CMGR=<index>`)
    ///
    /// Returns once the final `OK` has arrived, so the next command is not
    /// mistaken for the one completing this read.
    pub async fn read_sms(&self, index: u32) -> ModemResult<Sms> {
        let mut events = self.subscribe();
        self.exec_at(&format!("+CMGR={index}")).await?;

        let collect = async {
            let mut status_line: Option<String> = None;
            let mut decoded: Option<Sms> = None;
            loop {
                let event = match events.recv().await {
                    Ok(event) => event,
                    Err(RecvError::Lagged(missed)) => {
                        warn!("SMS read fell behind by {} events", missed);
                        continue;
                    }
                    Err(RecvError::Closed) => return Err(ModemError::ConnectionClosed),
                };
                match event.kind() {
                    EventKind::Close => return Err(ModemError::ConnectionClosed),
                    EventKind::Message => {}
                    _ => continue,
                }

                let line = event.payload();
                if frame::is_error(line) {
                    return Err(ModemError::CommandFailed(line.to_owned()));
                }
                if let Some(sms) = decoded.take() {
                    if line == "OK" {
                        return Ok(sms);
                    }
                    decoded = Some(sms);
                } else if let Some(status) = status_line.take() {
                    match Sms::decode(&status, line, None) {
                        Ok(sms) => decoded = Some(sms),
                        Err(err) => return Err(ModemError::from(err)),
                    }
                } else if line.starts_with("+CMGR:") {
                    status_line = Some(line.to_owned());
                }
                // Anything else is the command echo or an unrelated unsolicited line
            }
        };

        tokio::time::timeout(self.config.command_timeout, collect)
            .await
            .map_err(|_| ModemError::Timeout)?
    }

    /// Read a phonebook entry (`AT+CPBR=<index>`)
    pub async fn phonebook_entry(&self, index: u32) -> ModemResult<PhoneBookEntry> {
        let message = self.query(&format!("+CPBR={index}")).await?;
        Ok(PhoneBookEntry::from_parameters(message.parameters())?)
    }

    /// Give up on a command whose response never arrived
    ///
    /// Returns the abandoned command body, or `None` if nothing was in flight.
    pub fn abandon_command(&self) -> Option<String> {
        let mut inner = self.shared.lock();
        let EngineState::AwaitingResponse { command } = &inner.state else {
            return None;
        };
        let command = command.clone();
        warn!("Abandoning AT{} without a response", command);
        inner.state = EngineState::Ready;
        Some(command)
    }

    /// Shut down the write side, stop the collector and fail pending waiters
    pub async fn shutdown(&self) -> ModemResult<()> {
        let result = self.writer.lock().await.shutdown().await;
        if let Some(handle) = self
            .collector
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
        self.shared.close();
        result.map_err(ModemError::from)
    }
}

impl<S: ByteStream> Drop for Modem<S> {
    fn drop(&mut self) {
        if let Some(handle) = self
            .collector
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
        self.shared.close();
    }
}
