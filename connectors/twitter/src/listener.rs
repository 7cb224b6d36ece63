//! Record counting and the disconnect policy.
//!
//! A [`Listener`] prints each record it is handed until it has printed
//! `limit` of them. The first record that arrives after that is not printed;
//! instead the listener asks the stream client to disconnect, exactly once.
//!
//! Callbacks are synchronous and invoked from a single task, so the counter is
//! a plain field.

use std::fmt;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use crate::error::TwitterResult;

/// One raw message from the stream, without its line terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record(String);

impl Record {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Record {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for Record {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamStatus {
    /// The stream endpoint answered with a non-success HTTP status.
    Http(u16),
    /// The connection failed after the stream was established.
    Transport(String),
}

impl fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(code) => write!(f, "{code}"),
            Self::Transport(message) => f.write_str(message),
        }
    }
}

/// Receives stream callbacks.
pub trait StreamListener {
    /// Handle one record. Returning `false` asks the client to stop delivering.
    fn on_record(&mut self, record: &Record) -> TwitterResult<bool>;

    /// Handle a transport error.
    fn on_error(&mut self, status: &StreamStatus) -> TwitterResult<()>;
}

/// Capability to end a stream.
pub trait Disconnect {
    fn disconnect(&self);
}

/// Shared disconnect flag between a stream client and its listener.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct DisconnectHandle {
    requested: Arc<AtomicBool>,
}

impl DisconnectHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a disconnect has been requested through any clone.
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}

impl Disconnect for DisconnectHandle {
    fn disconnect(&self) {
        if !self.requested.swap(true, Ordering::AcqRel) {
            debug!("Disconnect requested");
        }
    }
}

/// Listener lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    /// Fewer than `limit` records have been emitted.
    Listening,
    /// `limit` records were emitted and the disconnect has been issued.
    Terminating,
}

/// Emits up to `limit` records to `out`, then disconnects.
#[derive(Debug)]
pub struct Listener<W, D> {
    out: W,
    disconnect: D,
    limit: u64,
    count: u64,
    state: ListenerState,
}

impl<W: Write, D: Disconnect> Listener<W, D> {
    #[must_use]
    pub const fn new(out: W, disconnect: D, limit: u64) -> Self {
        Self {
            out,
            disconnect,
            limit,
            count: 0,
            state: ListenerState::Listening,
        }
    }

    /// Records emitted so far.
    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }

    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    #[must_use]
    pub const fn state(&self) -> ListenerState {
        self.state
    }

    /// Give back the output writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write, D: Disconnect> StreamListener for Listener<W, D> {
    fn on_record(&mut self, record: &Record) -> TwitterResult<bool> {
        if self.state == ListenerState::Terminating {
            return Ok(false);
        }

        if self.count >= self.limit {
            info!(emitted = self.count, limit = self.limit, "Limit reached, disconnecting");
            self.state = ListenerState::Terminating;
            self.disconnect.disconnect();
            return Ok(false);
        }

        writeln!(self.out, "{record}")?;
        self.out.flush()?;
        self.count += 1;
        Ok(true)
    }

    fn on_error(&mut self, status: &StreamStatus) -> TwitterResult<()> {
        warn!(status = %status, "Stream reported an error");
        writeln!(self.out, "{status}")?;
        self.out.flush()?;
        Ok(())
    }
}
