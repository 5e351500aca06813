use std::fmt;

use bytes::Bytes;
use tracing::debug;

use crate::{
    cmd::{GetCmd, IntoCommand, PingCmd, SetCmd},
    ConnectOptions, Connector, Error, Frame, Handle, LResult, Status, TcpConnector,
};

/// Connection with a Redis server.
///
/// Backed by a single [`Handle`], `Client` provides basic network client
/// functionality (no pooling, retrying, pipelining, ...). Requests are issued
/// using the various methods of `Client`, each of which connects first if the
/// handle is not connected yet.
pub struct Client<C: Connector = TcpConnector> {
    handle: Handle<C>,
}

impl<C: Connector + fmt::Debug> fmt::Debug for Client<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("handle", &self.handle)
            .finish()
    }
}

impl Client<TcpConnector> {
    /// Establish a TCP connection with the server at `host:port`.
    ///
    /// A `port` of `0` means the default port. `timeout` is in seconds, `0.0`
    /// waits forever. Bad parameters are rejected before any socket is
    /// opened.
    pub async fn connect(host: &str, port: u16, timeout: f64) -> LResult<Self> {
        Client::connect_with(host, port, timeout, TcpConnector).await
    }
}

impl<C: Connector> Client<C> {
    /// Like [`Client::connect`], reaching the server through `connector`.
    pub async fn connect_with(host: &str, port: u16, timeout: f64, connector: C) -> LResult<Self> {
        let options = ConnectOptions::new(host, port, timeout)?;
        Client::with_connector(options, connector).await
    }

    /// Establish a connection through `connector`.
    pub async fn with_connector(options: ConnectOptions, connector: C) -> LResult<Self> {
        let mut handle = Handle::with_connector(options, connector);
        handle.ensure_open().await?;
        Ok(Client { handle })
    }

    /// Point the client at another server.
    ///
    /// The current connection is closed before the new one is attempted.
    pub async fn reconnect(&mut self, options: ConnectOptions) -> LResult<()>
    where
        C: Clone,
    {
        self.handle.close();
        self.handle = Handle::with_connector(options, self.handle.connector().clone());
        self.handle.ensure_open().await
    }

    pub fn status(&self) -> Status {
        self.handle.status()
    }

    /// Why the last failed operation failed, if it did.
    pub fn last_error(&self) -> Option<&str> {
        self.handle.last_error()
    }

    pub fn handle(&self) -> &Handle<C> {
        &self.handle
    }

    /// Ping the server.
    ///
    /// Returns the server's reply bytes, `PONG` for a Redis server.
    ///
    /// `Ok(None)` covers the outcomes that are answers rather than failures:
    /// the command could not be written (the reason is in
    /// [`last_error`](Self::last_error) and no reply is read), or the reply
    /// carried no text. Failing to connect, failing to read a reply, and an
    /// error reply from the server are returned as errors.
    #[tracing::instrument(skip(self))]
    pub async fn ping(&mut self) -> LResult<Option<Bytes>> {
        self.handle.ensure_open().await?;

        let cmd = PingCmd::new().into_command();
        if let Err(e) = self.handle.send(&cmd).await {
            debug!(error = %e, "ping not sent");
            return Ok(None);
        }

        Ok(self.read_response().await?.and_then(Frame::into_payload))
    }

    /// Get the value of key.
    ///
    /// If the key does not exist `None` is returned.
    #[tracing::instrument(skip(self))]
    pub async fn get(&mut self, key: &str) -> LResult<Option<Bytes>> {
        self.handle.ensure_open().await?;
        self.handle.send(&GetCmd::new(key).into_command()).await?;

        // Both `SimpleString` and `BulkString` are valid responses.
        // The null variants represent the key not being present.
        match self.read_response().await? {
            Some(frame @ (Frame::SimpleString(_) | Frame::BulkString(_))) => {
                Ok(frame.into_payload())
            }
            Some(Frame::NullBulkString | Frame::Null) | None => Ok(None),
            Some(frame) => Err(Error::Response(format!("unexpected frame: {frame}"))),
        }
    }

    /// Set `key` to hold the given `value`.
    ///
    /// Returns `false` when the reply could not be classified. The value is
    /// sent unquoted, so it must not contain spaces or line terminators.
    #[tracing::instrument(skip(self, value))]
    pub async fn set(&mut self, key: &str, value: Bytes) -> LResult<bool> {
        self.handle.ensure_open().await?;
        self.handle
            .send(&SetCmd::new(key, value).into_command())
            .await?;

        // `SimpleString` with a value of `OK` is the only valid response.
        match self.read_response().await? {
            Some(Frame::SimpleString(val)) if val == "OK" => Ok(true),
            None => Ok(false),
            Some(frame) => Err(Error::Response(format!("unexpected frame: {frame}"))),
        }
    }

    async fn read_response(&mut self) -> LResult<Option<Frame>> {
        let response = self.handle.read_reply().await?;
        debug!(?response);
        match response {
            Some(Frame::SimpleError(msg)) => {
                self.handle.set_error(msg.clone());
                Err(Error::Response(msg))
            }
            response => Ok(response),
        }
    }
}
