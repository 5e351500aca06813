use bytes::Bytes;

use super::{Command, IntoCommand};

#[derive(Debug)]
pub struct SetCmd {
    key: String,
    value: Bytes,
}

impl SetCmd {
    pub fn new(key: impl ToString, value: Bytes) -> SetCmd {
        SetCmd {
            key: key.to_string(),
            value,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &Bytes {
        &self.value
    }
}

impl IntoCommand for SetCmd {
    fn into_command(self) -> Command {
        Command::new("SET").arg(self.key).arg(self.value)
    }
}
