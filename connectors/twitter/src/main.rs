//! tweet-tap - print a bounded number of keyword-matching posts.
//!
//! Records go to stdout, one per line. Logs go to stderr.

#![forbid(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use tweet_tap::{TrackerConfig, Tracklist, TwitterStreamClient, track};

/// Print posts matching a keyword list from the Twitter/X filter stream,
/// then disconnect after a fixed number of them.
#[derive(Parser, Debug)]
#[command(name = "tweet-tap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON config file (credentials, stream_url, tracklist, limit).
    #[arg(long, short = 'c', env = "TWEET_TAP_CONFIG")]
    config: Option<PathBuf>,

    /// Space-separated keywords to track, e.g. "#Brexit #brexit #br".
    #[arg(long, short = 't', env = "TWEET_TAP_TRACK")]
    track: Option<String>,

    /// Number of records to print before disconnecting.
    #[arg(long, short = 'n', env = "TWEET_TAP_LIMIT")]
    limit: Option<u64>,

    /// Base URL of the streaming API.
    #[arg(long, env = "TWEET_TAP_STREAM_URL")]
    stream_url: Option<String>,

    #[arg(long, env = "TWITTER_CONSUMER_KEY", hide_env_values = true)]
    consumer_key: Option<String>,

    #[arg(long, env = "TWITTER_CONSUMER_SECRET", hide_env_values = true)]
    consumer_secret: Option<String>,

    #[arg(long, env = "TWITTER_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    #[arg(long, env = "TWITTER_ACCESS_TOKEN_SECRET", hide_env_values = true)]
    access_token_secret: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    /// Defaults, then the config file, then env and flags.
    fn into_config(self) -> Result<TrackerConfig> {
        let mut config = match &self.config {
            Some(path) => TrackerConfig::from_file(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => TrackerConfig::default(),
        };

        let credentials = &mut config.credentials;
        for (slot, value) in [
            (&mut credentials.consumer_key, self.consumer_key),
            (&mut credentials.consumer_secret, self.consumer_secret),
            (&mut credentials.access_token, self.access_token),
            (&mut credentials.access_token_secret, self.access_token_secret),
        ] {
            if let Some(value) = value {
                *slot = value;
            }
        }

        if let Some(track) = self.track {
            config.tracklist = Tracklist::parse(&track);
        }
        if let Some(limit) = self.limit {
            config.limit = limit;
        }
        if let Some(stream_url) = self.stream_url {
            config.stream_url = stream_url;
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

fn init_tracing(json_logs: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries records only
    if json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = cli.into_config()?;
    tracing::info!(
        track = %config.tracklist,
        limit = config.limit,
        credentials = ?config.credentials,
        "tweet-tap starting"
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let mut client = TwitterStreamClient::new(&config).context("building HTTP client")?;
    let report = runtime
        .block_on(track(&mut client, &config, std::io::stdout().lock()))
        .context("filter stream failed")?;

    tracing::info!(
        emitted = report.emitted,
        end = ?report.summary.end,
        "tweet-tap done"
    );
    Ok(())
}
