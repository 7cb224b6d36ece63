//! Twitter/X filter stream tap
//!
//! Opens an OAuth 1.0a authenticated connection to the statuses filter
//! stream, prints each matching message verbatim, one per line, and
//! disconnects once a fixed number of messages has been printed.
//!
//! ## Pieces
//!
//! - [`Listener`] counts records and issues the disconnect
//! - [`StreamClient`] is the seam between the listener and the transport;
//!   [`TwitterStreamClient`] is the HTTP implementation
//! - [`TrackerConfig`] carries credentials, keywords and the limit
//! - [`track`] runs one session end to end

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod error;
mod listener;
mod oauth;
mod stream;
mod track;
mod tracker;

pub use config::{Credentials, DEFAULT_LIMIT, TrackerConfig};
pub use error::{TwitterError, TwitterResult};
pub use listener::{
    Disconnect, DisconnectHandle, Listener, ListenerState, Record, StreamListener, StreamStatus,
};
pub use stream::{StreamClient, StreamEnd, StreamSummary, TwitterStreamClient};
pub use track::{DEFAULT_TRACKLIST, Tracklist};
pub use tracker::{TrackReport, track};
