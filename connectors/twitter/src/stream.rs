//! Statuses filter stream client.
//!
//! Connects to the v1.1 `statuses/filter` endpoint, which answers with a
//! long-lived body of newline-delimited messages interleaved with blank
//! keep-alive lines. Each non-blank line is handed to the listener as-is.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::{Client, Response, header::AUTHORIZATION};
use tracing::{debug, info, instrument, warn};

use crate::config::{Credentials, TrackerConfig};
use crate::error::TwitterResult;
use crate::listener::{Disconnect, DisconnectHandle, Record, StreamListener, StreamStatus};
use crate::oauth::OAuthSigner;
use crate::track::Tracklist;

/// How a stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEnd {
    /// The listener (or another holder of the handle) asked to disconnect.
    Disconnected,
    /// The server ended the response body.
    Closed,
    /// The endpoint refused the connection with this HTTP status.
    Rejected(u16),
    /// Reading the body failed.
    Interrupted(String),
}

/// Outcome of [`StreamClient::open`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSummary {
    /// Records handed to the listener, including one it declined.
    pub delivered: u64,
    pub end: StreamEnd,
}

/// Opens a stream and drives a listener until the stream ends.
///
/// Callbacks are invoked sequentially from the task awaiting `open`.
#[async_trait(?Send)]
pub trait StreamClient {
    /// Handle a listener can use to end the stream from inside a callback.
    fn disconnect_handle(&self) -> DisconnectHandle;

    /// Connect and deliver records until disconnected or the stream ends.
    ///
    /// Connection setup failures are returned as errors. Errors the transport
    /// reports are passed to [`StreamListener::on_error`] instead.
    async fn open(
        &mut self,
        credentials: &Credentials,
        tracklist: &Tracklist,
        listener: &mut dyn StreamListener,
    ) -> TwitterResult<StreamSummary>;

    /// Stop delivering records.
    fn disconnect(&self) {
        self.disconnect_handle().disconnect();
    }
}

/// [`StreamClient`] for the Twitter statuses filter stream.
#[derive(Debug)]
pub struct TwitterStreamClient {
    http: Client,
    filter_url: String,
    handle: DisconnectHandle,
}

impl TwitterStreamClient {
    /// Create a client for the endpoint in `config`.
    pub fn new(config: &TrackerConfig) -> TwitterResult<Self> {
        let http = Client::builder()
            .user_agent(format!("tweet-tap/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            filter_url: config.filter_url(),
            handle: DisconnectHandle::new(),
        })
    }

    #[instrument(skip(self, credentials), fields(url = %self.filter_url))]
    async fn connect(&self, credentials: &Credentials, track: &str) -> TwitterResult<Response> {
        let params = [("track", track)];
        let auth_header = OAuthSigner::new(credentials).sign("POST", &self.filter_url, &params)?;

        info!("Connecting to filter stream");
        let response = self
            .http
            .post(&self.filter_url)
            .header(AUTHORIZATION, auth_header)
            .form(&params)
            .send()
            .await?;

        Ok(response)
    }
}

#[async_trait(?Send)]
impl StreamClient for TwitterStreamClient {
    fn disconnect_handle(&self) -> DisconnectHandle {
        self.handle.clone()
    }

    async fn open(
        &mut self,
        credentials: &Credentials,
        tracklist: &Tracklist,
        listener: &mut dyn StreamListener,
    ) -> TwitterResult<StreamSummary> {
        if self.handle.is_requested() {
            debug!("Disconnect already requested, not connecting");
            return Ok(StreamSummary {
                delivered: 0,
                end: StreamEnd::Disconnected,
            });
        }

        let response = self.connect(credentials, &tracklist.to_track_param()).await?;

        let status = response.status();
        if !status.is_success() {
            let code = status.as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!(status = code, body = %body.trim(), "Filter stream rejected the connection");
            listener.on_error(&StreamStatus::Http(code))?;
            return Ok(StreamSummary {
                delivered: 0,
                end: StreamEnd::Rejected(code),
            });
        }

        info!("Connected to filter stream");
        let summary = self.pump(response, listener).await?;
        info!(delivered = summary.delivered, end = ?summary.end, "Filter stream finished");
        Ok(summary)
    }
}

impl TwitterStreamClient {
    /// Read the body and deliver records. Dropping the response on return
    /// closes the connection.
    async fn pump(
        &self,
        response: Response,
        listener: &mut dyn StreamListener,
    ) -> TwitterResult<StreamSummary> {
        let mut body = response.bytes_stream();
        let mut lines = LineBuffer::default();
        let mut delivered = 0;

        let end = 'read: loop {
            if self.handle.is_requested() {
                break StreamEnd::Disconnected;
            }

            let chunk: Bytes = match body.next().await {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => {
                    let message = e.to_string();
                    listener.on_error(&StreamStatus::Transport(message.clone()))?;
                    break StreamEnd::Interrupted(message);
                }
                None => {
                    if lines.pending() > 0 {
                        debug!(bytes = lines.pending(), "Discarding partial message");
                    }
                    break StreamEnd::Closed;
                }
            };

            lines.extend(&chunk);
            while let Some(line) = lines.next_line() {
                if line.trim().is_empty() {
                    debug!("Received keep-alive");
                    continue;
                }

                delivered += 1;
                let keep_going = listener.on_record(&Record::from(line))?;
                if !keep_going || self.handle.is_requested() {
                    break 'read StreamEnd::Disconnected;
                }
            }
        };

        Ok(StreamSummary { delivered, end })
    }
}

/// Splits a byte stream into lines across chunk boundaries.
#[derive(Debug, Default)]
struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Next complete line without its `\n` or `\r\n` terminator.
    fn next_line(&mut self) -> Option<String> {
        let newline_pos = self.buf.iter().position(|&b| b == b'\n')?;
        let line: Vec<u8> = self.buf.drain(..=newline_pos).collect();
        let line = String::from_utf8_lossy(&line);
        Some(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn pending(&self) -> usize {
        self.buf.len()
    }
}
