// ABOUTME: Pending wait-for-event registrations and the caller-side handle that awaits them
// ABOUTME: A waiter resolves on the first matching event, its predicate failing, or its timeout

use crate::client::error::{ModemError, ModemResult};
use crate::client::modem::Shared;
use crate::client::types::{Event, EventKind};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

pub(crate) type Predicate = Box<dyn FnMut(&Event) -> Result<bool, crate::Error> + Send>;

/// Engine-side entry in the waiter table
pub(crate) struct PendingWaiter {
    pub id: u64,
    pub kind: EventKind,
    pub predicate: Predicate,
    pub tx: oneshot::Sender<ModemResult<Event>>,
}

/// A registered wait for an event
///
/// Registration happens when the handle is created, so events dispatched
/// between registration and [`Waiter::wait`] are not lost. Dropping the
/// handle removes the registration.
pub struct Waiter {
    id: u64,
    kind: EventKind,
    rx: oneshot::Receiver<ModemResult<Event>>,
    shared: Arc<Shared>,
}

impl Waiter {
    pub(crate) fn new(
        id: u64,
        kind: EventKind,
        rx: oneshot::Receiver<ModemResult<Event>>,
        shared: Arc<Shared>,
    ) -> Self {
        Waiter {
            id,
            kind,
            rx,
            shared,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Suspend until the waiter resolves or `timeout` elapses
    ///
    /// Fails with `Timeout` when the deadline passes, `Predicate` when the
    /// predicate returned an error, and `ConnectionClosed` when the stream
    /// closed first. The registration is gone afterwards in every case.
    pub async fn wait(mut self, timeout: Duration) -> ModemResult<Event> {
        match tokio::time::timeout(timeout, &mut self.rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(ModemError::ConnectionClosed),
            Err(_) => Err(ModemError::Timeout),
        }
    }
}

impl Drop for Waiter {
    fn drop(&mut self) {
        self.shared.remove_waiter(self.id);
    }
}
