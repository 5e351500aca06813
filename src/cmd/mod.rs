use bytes::{BufMut, Bytes, BytesMut};

pub mod get;
pub use get::GetCmd;

pub mod ping;
pub use ping::PingCmd;

pub mod set;
pub use set::SetCmd;

/// Turns a typed request into the command sent on the wire.
pub trait IntoCommand {
    fn into_command(self) -> Command;
}

/// A command in inline form: the name and its arguments separated by single
/// spaces, ended by `\r\n`.
///
/// Nothing is quoted or escaped. An argument holding a space or a line
/// terminator is sent as is and will be split up by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: String,
    args: Vec<Bytes>,
}

impl Command {
    pub fn new(name: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<Bytes>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn encode(&self) -> Bytes {
        let len = self.name.len() + self.args.iter().map(|a| a.len() + 1).sum::<usize>() + 2;
        let mut buf = BytesMut::with_capacity(len);

        buf.put_slice(self.name.as_bytes());
        for arg in &self.args {
            buf.put_u8(b' ');
            buf.put_slice(arg);
        }
        buf.put_slice(b"\r\n");

        buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_no_args() {
        assert_eq!(Command::new("PING").encode(), Bytes::from_static(b"PING\r\n"));
    }

    #[test]
    fn test_encode_args() {
        let cmd = Command::new("SET").arg("foo").arg(Bytes::from_static(b"bar"));
        assert_eq!(cmd.encode(), Bytes::from_static(b"SET foo bar\r\n"));
    }

    #[test]
    fn test_encode_is_not_escaped() {
        let cmd = Command::new("ECHO").arg("a b\r\nc");
        assert_eq!(cmd.encode(), Bytes::from_static(b"ECHO a b\r\nc\r\n"));
    }
}
