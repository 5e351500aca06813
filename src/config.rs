use std::time::Duration;

use crate::{Error, LResult, DEFAULT_PORT};

/// Where to connect and how long to wait.
///
/// Built once per [`Handle`](crate::Handle) and never changed afterwards.
/// Connecting somewhere else means building a new handle.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectOptions {
    host: String,
    port: u16,
    /// `None` means every operation may wait indefinitely.
    timeout: Option<Duration>,
}

impl ConnectOptions {
    /// Validate the raw connection parameters.
    ///
    /// A `port` of `0` selects [`DEFAULT_PORT`]. A `timeout` of `0.0` seconds
    /// disables the deadline, any other timeout is at least one nanosecond.
    /// Timeouts that are negative, not a number, or larger than `i32::MAX`
    /// seconds are rejected with [`Error::InvalidTimeout`].
    pub fn new(host: impl Into<String>, port: u16, timeout: f64) -> LResult<Self> {
        let host = host.into();
        if host.is_empty() {
            return Err(Error::InvalidHost);
        }

        // `contains` is false for NaN as well
        if !(0.0..=f64::from(i32::MAX)).contains(&timeout) {
            return Err(Error::InvalidTimeout(timeout));
        }

        let port = if port == 0 { DEFAULT_PORT } else { port };
        let timeout = (timeout > 0.0)
            .then(|| Duration::from_secs_f64(timeout).max(Duration::from_nanos(1)));

        Ok(Self {
            host,
            port,
            timeout,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// `host:port`, for logs and error messages.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
