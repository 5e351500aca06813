use std::fmt;

use tracing::{debug, warn};

use crate::cmd::Command;
use crate::{ConnectOptions, Connection, Connector, Error, Frame, LResult, TcpConnector};

/// Where a [`Handle`] stands with its server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// A live connection broke. The next [`Handle::ensure_open`] reconnects.
    Failed,
    Disconnected,
    Connected,
}

/// The last diagnostic message of a handle.
///
/// Holds at most one message. Setting a new one replaces the old one.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ErrorSlot(Option<String>);

impl ErrorSlot {
    /// Store `msg`, or clear the slot when `msg` is empty.
    pub fn set(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        self.0 = (!msg.is_empty()).then_some(msg);
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }

    pub fn get(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// One client's connection to one server.
///
/// The handle owns its stream outright. The stream is present exactly while
/// the status is [`Status::Connected`], and is closed when it is taken away
/// or when the handle is dropped.
///
/// Operations take `&mut self`, so a handle never has more than one
/// request in flight.
pub struct Handle<C: Connector = TcpConnector> {
    options: ConnectOptions,
    connector: C,
    connection: Option<Connection<C::Stream>>,
    status: Status,
    error: ErrorSlot,
}

// The stream is left out, it need not be `Debug`.
impl<C: Connector + fmt::Debug> fmt::Debug for Handle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("options", &self.options)
            .field("connector", &self.connector)
            .field("status", &self.status)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl Handle<TcpConnector> {
    pub fn new(options: ConnectOptions) -> Self {
        Handle::with_connector(options, TcpConnector)
    }
}

impl<C: Connector> Handle<C> {
    /// Build a disconnected handle. Nothing is opened until
    /// [`ensure_open`](Self::ensure_open).
    pub fn with_connector(options: ConnectOptions, connector: C) -> Self {
        Self {
            options,
            connector,
            connection: None,
            status: Status::Disconnected,
            error: ErrorSlot::default(),
        }
    }

    pub fn options(&self) -> &ConnectOptions {
        &self.options
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn last_error(&self) -> Option<&str> {
        self.error.get()
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.error.set(msg);
    }

    /// Make sure the handle is connected, connecting if it is not.
    ///
    /// Does nothing when already connected. A failed attempt leaves the
    /// handle without a stream, records why in [`last_error`](Self::last_error)
    /// and returns the error.
    #[tracing::instrument(skip(self), fields(addr = %self.options.addr()))]
    pub async fn ensure_open(&mut self) -> LResult<()> {
        if self.status == Status::Connected {
            return Ok(());
        }

        let opts = &self.options;
        match self
            .connector
            .connect(opts.host(), opts.port(), opts.timeout())
            .await
        {
            Ok(stream) => {
                self.connection = Some(Connection::new(stream, opts.timeout()));
                self.status = Status::Connected;
                self.error.clear();
                debug!("connected");
                Ok(())
            }
            Err(e) => {
                debug!(error = %e, "connect failed");
                self.error.set(e.to_string());
                self.connection = None;
                self.status = Status::Disconnected;
                Err(e)
            }
        }
    }

    /// Write `cmd` to the server.
    pub async fn send(&mut self, cmd: &Command) -> LResult<()> {
        let src = cmd.encode();
        debug!(request = ?src);

        let res = self.connection()?.write(&src).await;
        self.check(res).map(|_| ())
    }

    /// Read the next reply.
    ///
    /// `Ok(None)` means a line came in but did not start with a known reply
    /// type. That leaves the stream usable.
    pub async fn read_reply(&mut self) -> LResult<Option<Frame>> {
        let res = self.connection()?.read_frame().await;
        self.check(res)
    }

    /// Drop the stream, closing the socket.
    pub fn close(&mut self) {
        if self.connection.take().is_some() {
            debug!(addr = %self.options.addr(), "connection closed");
        }
        self.status = Status::Disconnected;
    }

    fn connection(&mut self) -> LResult<&mut Connection<C::Stream>> {
        match self.connection.as_mut() {
            Some(conn) if self.status == Status::Connected => Ok(conn),
            _ => Err(Error::NotConnected),
        }
    }

    /// Record a transport failure and take the broken stream down with it.
    fn check<T>(&mut self, res: LResult<T>) -> LResult<T> {
        if let Err(e) = &res {
            warn!(addr = %self.options.addr(), error = %e, "connection failed");
            self.error.set(e.to_string());
            self.connection = None;
            self.status = Status::Failed;
        }
        res
    }
}
