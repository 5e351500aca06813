use std::future::Future;
use std::time::Duration;

use async_recursion::async_recursion;
use bytes::{Buf, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use crate::frame::{Frame, Header};
use crate::{Error, LResult, MAX_LINE_LEN};

/// Opens the byte stream a [`Connection`] runs on.
///
/// Each handle owns its connector and keeps it for its whole life, so how a
/// handle reaches its server is fixed when the handle is built.
pub trait Connector {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    fn connect(
        &self,
        host: &str,
        port: u16,
        timeout: Option<Duration>,
    ) -> impl Future<Output = LResult<Self::Stream>> + Send;
}

/// Plain TCP with Nagle's algorithm disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(
        &self,
        host: &str,
        port: u16,
        timeout: Option<Duration>,
    ) -> LResult<TcpStream> {
        // Resolution and every address attempt share the one deadline. When
        // it expires the pending socket is dropped along with the future.
        let socket = deadline(timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|e| match e {
                Error::Io(source) => Error::Connect {
                    addr: format!("{host}:{port}"),
                    source,
                },
                e => e,
            })?;
        socket.set_nodelay(true)?;
        Ok(socket)
    }
}

/// Send command bytes and receive reply lines from a remote peer.
///
/// Writes go straight to the stream, nothing is buffered on the way out.
/// Reads go through an internal buffer so a line can be cut off at its
/// terminator and whatever follows kept for the next call.
///
/// Once the peer has closed the stream, every later read or write fails with
/// [`Error::EndOfStream`] without touching the stream again.
#[derive(Debug)]
pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    eof: bool,
    /// Applies to each read and write on its own.
    timeout: Option<Duration>,
}

impl Connection<TcpStream> {
    /// Connect to `host:port` over TCP.
    pub async fn open(host: &str, port: u16, timeout: Option<Duration>) -> LResult<Self> {
        let socket = TcpConnector.connect(host, port, timeout).await?;
        Ok(Connection::new(socket, timeout))
    }
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(stream: S, timeout: Option<Duration>) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(MAX_LINE_LEN),
            eof: false,
            timeout,
        }
    }

    /// `true` once the peer has closed its side of the stream.
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Write `src` to the stream in a single call.
    ///
    /// Anything less than the whole of `src` reaching the stream is an
    /// [`Error::ShortWrite`]. The remainder is not retried.
    pub async fn write(&mut self, src: &[u8]) -> LResult<usize> {
        self.check_eof()?;

        let written = deadline(self.timeout, self.stream.write(src)).await?;
        if written < src.len() {
            return Err(Error::ShortWrite {
                expected: src.len(),
                written,
            });
        }

        Ok(written)
    }

    /// Read one line, returned without its `\r\n`.
    ///
    /// The terminator has to show up within [`MAX_LINE_LEN`] bytes.
    pub async fn read_line(&mut self) -> LResult<Bytes> {
        self.check_eof()?;

        loop {
            let window = self.buffer.len().min(MAX_LINE_LEN);
            if let Some(end) = find_crlf(&self.buffer[..window]) {
                let line = self.buffer.split_to(end).freeze();
                self.buffer.advance(2);
                return Ok(line);
            }

            if self.buffer.len() >= MAX_LINE_LEN {
                return Err(Error::LineTooLong(MAX_LINE_LEN));
            }

            self.fill_buffer().await?;
        }
    }

    /// Read exactly `len` bytes followed by `\r\n`.
    ///
    /// Bulk string bodies are length-prefixed and may contain terminators of
    /// their own, so they are never read line by line.
    pub async fn read_exact(&mut self, len: usize) -> LResult<Bytes> {
        self.check_eof()?;

        let n = len + 2;
        while self.buffer.len() < n {
            self.fill_buffer().await?;
        }

        if &self.buffer[len..n] != b"\r\n" {
            return Err(Error::Protocol(format!(
                "bulk string of {len} bytes is not followed by a line terminator"
            )));
        }

        let data = self.buffer.split_to(len).freeze();
        self.buffer.advance(2);
        Ok(data)
    }

    /// Read a single reply from the connection.
    ///
    /// # Returns
    ///
    /// The decoded frame, or `None` when the reply line does not start with
    /// a type byte this client knows. Failing to read is an error.
    pub async fn read_frame(&mut self) -> LResult<Option<Frame>> {
        let line = self.read_line().await?;
        debug!(line = ?line, "reply line");

        match Frame::classify(&line)? {
            Header::Unrecognized => Ok(None),
            header => self.complete(header).await.map(Some),
        }
    }

    /// Read one element of an array.
    ///
    /// Inside an array there is no way to skip over an unknown element, so
    /// an unrecognized line is a protocol error here.
    #[async_recursion]
    async fn read_element(&mut self) -> LResult<Frame> {
        let line = self.read_line().await?;

        match Frame::classify(&line)? {
            Header::Unrecognized => Err(Error::Protocol(format!(
                "unrecognized array element `{}`",
                String::from_utf8_lossy(&line)
            ))),
            header => self.complete(header).await,
        }
    }

    async fn complete(&mut self, header: Header) -> LResult<Frame> {
        match header {
            Header::Complete(frame) => Ok(frame),
            Header::Bulk(len) => Ok(Frame::BulkString(self.read_exact(len).await?)),
            Header::Array(len) => {
                let mut out = Vec::with_capacity(len.min(MAX_LINE_LEN));
                for _ in 0..len {
                    out.push(self.read_element().await?);
                }
                Ok(Frame::Array(out))
            }
            Header::Unrecognized => Err(Error::Protocol("unrecognized reply".into())),
        }
    }

    fn check_eof(&self) -> LResult<()> {
        if self.eof {
            return Err(Error::EndOfStream);
        }
        Ok(())
    }

    async fn fill_buffer(&mut self) -> LResult<()> {
        // On success, the number of bytes is returned. `0` indicates "end
        // of stream".
        if 0 == deadline(self.timeout, self.stream.read_buf(&mut self.buffer)).await? {
            self.eof = true;
            // For this to be a clean shutdown, there should be no data in the
            // read buffer. If there is, the peer closed the socket mid reply.
            if self.buffer.is_empty() {
                return Err(Error::EndOfStream);
            }
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection was closed mid reply",
            )));
        }
        Ok(())
    }
}

/// Await `fut`, giving up after `timeout` if there is one.
pub(crate) async fn deadline<F, T>(timeout: Option<Duration>, fut: F) -> LResult<T>
where
    F: Future<Output = std::io::Result<T>>,
{
    match timeout {
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(res) => Ok(res?),
            Err(_) => Err(Error::Timeout(limit)),
        },
        None => Ok(fut.await?),
    }
}

fn find_crlf(src: &[u8]) -> Option<usize> {
    src.windows(2).position(|w| w == b"\r\n")
}
