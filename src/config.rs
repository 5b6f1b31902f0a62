use std::time::Duration;

use clap::Parser;
use tracing::Level;

/// Serves the users resource over HTTP/1.1.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Config {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:3000")]
    pub addr: String,

    /// Mount point of the users resource.
    #[arg(long, default_value = "/users")]
    pub prefix: String,

    /// Seconds an idle connection may wait for the next request; 0 disables the timeout.
    #[arg(long, default_value_t = 10)]
    pub read_timeout: u64,

    #[arg(long, default_value_t = Level::INFO)]
    pub log_level: Level,
}

impl Config {
    pub fn read_timeout(&self) -> Option<Duration> {
        Some(self.read_timeout)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}
