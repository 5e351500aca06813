pub mod config;
pub use config::ConnectOptions;

pub mod connection;
pub use connection::{Connection, Connector, TcpConnector};

pub mod error;
pub use error::Error;

pub mod frame;
pub use frame::Frame;

pub mod handle;
pub use handle::{ErrorSlot, Handle, Status};

pub mod clients;
pub use clients::Client;

pub mod cmd;
pub use cmd::Command;

pub const DEFAULT_PORT: u16 = 6379;
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Longest reply line accepted, terminator included.
pub const MAX_LINE_LEN: usize = 4096;

/// Largest bulk string accepted, the server's default `proto-max-bulk-len`.
pub const MAX_BULK_LEN: usize = 512 * 1024 * 1024;

/// Most elements an array reply may declare.
pub const MAX_ARRAY_LEN: usize = i32::MAX as usize;

pub type LResult<T> = std::result::Result<T, crate::error::Error>;
