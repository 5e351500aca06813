use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),
    /// Rejected before any socket is touched.
    #[error("invalid connect timeout `{0}`")]
    InvalidTimeout(f64),
    #[error("host must not be empty")]
    InvalidHost,
    /// The peer closed the stream, either now or on an earlier read.
    #[error("end of stream")]
    EndOfStream,
    #[error("short write, {written} of {expected} bytes sent")]
    ShortWrite { expected: usize, written: usize },
    #[error("no line terminator within {0} bytes")]
    LineTooLong(usize),
    #[error("protocol error: {0}")]
    Protocol(String),
    /// An error reply (`-`) sent by the server.
    #[error("{0}")]
    Response(String),
    #[error("not connected")]
    NotConnected,
    #[error(transparent)]
    Conversion(#[from] std::num::TryFromIntError),
}
