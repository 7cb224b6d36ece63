//! One tap run: wire a listener to a stream client and report the result.

use std::io::Write;

use tracing::info;

use crate::config::TrackerConfig;
use crate::error::TwitterResult;
use crate::listener::Listener;
use crate::stream::{StreamClient, StreamSummary};

/// Result of [`track`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackReport {
    /// Records written to the output.
    pub emitted: u64,
    pub limit: u64,
    pub summary: StreamSummary,
}

impl TrackReport {
    /// Whether the run stopped because the limit was reached.
    #[must_use]
    pub fn limit_reached(&self) -> bool {
        self.emitted == self.limit
    }
}

/// Stream records matching `config.tracklist` into `out` until `config.limit`
/// have been written.
pub async fn track<C, W>(
    client: &mut C,
    config: &TrackerConfig,
    out: W,
) -> TwitterResult<TrackReport>
where
    C: StreamClient + ?Sized,
    W: Write,
{
    config.validate()?;

    let mut listener = Listener::new(out, client.disconnect_handle(), config.limit);
    info!(track = %config.tracklist, limit = config.limit, "Opening filter stream");

    let summary = client
        .open(&config.credentials, &config.tracklist, &mut listener)
        .await?;

    let report = TrackReport {
        emitted: listener.count(),
        limit: config.limit,
        summary,
    };
    info!(
        emitted = report.emitted,
        delivered = report.summary.delivered,
        limit_reached = report.limit_reached(),
        "Tap finished"
    );
    Ok(report)
}
