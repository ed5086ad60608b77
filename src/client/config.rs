// ABOUTME: Modem engine configuration: handshake and command timeouts, buffer and channel sizes
// ABOUTME: Builder-style value with sensible defaults for typical serial-attached modems

use std::time::Duration;

/// Configuration for a [`Modem`](crate::client::Modem)
///
/// # Example
///
/// ```rust
/// use hayes::client::ModemConfig;
/// use std::time::Duration;
///
/// // Default configuration (4s handshake, 4s command timeout)
/// let config = ModemConfig::default();
///
/// // Slow modem on a long cable
/// let config = ModemConfig::new()
///     .with_handshake_timeout(Duration::from_secs(10))
///     .with_command_timeout(Duration::from_secs(30));
/// ```
#[derive(Debug, Clone)]
pub struct ModemConfig {
    /// How long `start` waits for the `OK` to the bare `AT` (default: 4 seconds)
    pub handshake_timeout: Duration,

    /// How long helpers such as `query` and `read_sms` wait for a response
    /// (default: 4 seconds)
    ///
    /// Network-bound commands like `+COPS=?` can take far longer; callers
    /// driving those should use `exec_at` with their own `wait_for`.
    pub command_timeout: Duration,

    /// Initial capacity of the line reassembly buffer (default: 1 KiB)
    pub read_buffer_capacity: usize,

    /// Capacity of the broadcast channel behind `subscribe` (default: 64)
    ///
    /// Slow subscribers that fall further behind than this miss events.
    pub event_channel_capacity: usize,
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            handshake_timeout: Duration::from_secs(4),
            command_timeout: Duration::from_secs(4),
            read_buffer_capacity: 1024,
            event_channel_capacity: 64,
        }
    }
}

impl ModemConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn with_read_buffer_capacity(mut self, capacity: usize) -> Self {
        self.read_buffer_capacity = capacity;
        self
    }

    /// Set the broadcast channel capacity; clamped to at least 1
    pub fn with_event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity.max(1);
        self
    }
}
