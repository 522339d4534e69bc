use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;
use sockmux_core::error::{Error, Result};

/// Write queue capacity used when none is configured.
pub const DEFAULT_QUEUE_SIZE: usize = 100;

/// Upper bound on the transport close during shutdown, in milliseconds.
pub const DEFAULT_CLOSE_TIMEOUT_MS: u64 = 1000;

const MAX_QUEUE_SIZE: usize = 65536;
const MAX_CLOSE_TIMEOUT_MS: u64 = 60_000;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub version: u32,

    /// WebSocket endpoint to dial.
    pub url: String,

    #[serde(default = "default_queue_size")]
    pub queue_size: usize,

    #[serde(default = "default_close_timeout_ms")]
    pub close_timeout_ms: u64,

    /// Extra handshake headers (e.g. `Cookie`, `Authorization`).
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl ClientConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(Error::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }
        if self.url.trim().is_empty() {
            return Err(Error::Config("url must not be empty".into()));
        }
        if !(1..=MAX_QUEUE_SIZE).contains(&self.queue_size) {
            return Err(Error::Config(format!(
                "queue_size must be between 1 and {MAX_QUEUE_SIZE}"
            )));
        }
        if !(1..=MAX_CLOSE_TIMEOUT_MS).contains(&self.close_timeout_ms) {
            return Err(Error::Config(format!(
                "close_timeout_ms must be between 1 and {MAX_CLOSE_TIMEOUT_MS}"
            )));
        }
        Ok(())
    }

    pub fn conn_options(&self) -> ConnOptions {
        let base = ConnOptions::default()
            .with_queue_size(self.queue_size)
            .with_close_timeout(Duration::from_millis(self.close_timeout_ms));
        self.headers
            .iter()
            .fold(base, |o, (k, v)| o.with_header(k.clone(), v.clone()))
    }
}

fn default_queue_size() -> usize {
    DEFAULT_QUEUE_SIZE
}

fn default_close_timeout_ms() -> u64 {
    DEFAULT_CLOSE_TIMEOUT_MS
}

/// Programmatic connection options.
#[derive(Debug, Clone)]
pub struct ConnOptions {
    /// Capacity of the outbound write queue; `flush` waits when it is full.
    pub queue_size: usize,
    /// How long shutdown waits for the transport's close before dropping it.
    pub close_timeout: Duration,
    /// Headers sent with the WebSocket handshake, in insertion order.
    pub headers: Vec<(String, String)>,
}

impl Default for ConnOptions {
    fn default() -> Self {
        Self {
            queue_size: DEFAULT_QUEUE_SIZE,
            close_timeout: Duration::from_millis(DEFAULT_CLOSE_TIMEOUT_MS),
            headers: Vec::new(),
        }
    }
}

impl ConnOptions {
    pub fn with_queue_size(mut self, queue_size: usize) -> Self {
        self.queue_size = queue_size;
        self
    }

    pub fn with_close_timeout(mut self, close_timeout: Duration) -> Self {
        self.close_timeout = close_timeout;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}
