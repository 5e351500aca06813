use super::{Command, IntoCommand};

/// `PING`, always without a message.
#[derive(Debug, Default)]
pub struct PingCmd;

impl PingCmd {
    pub fn new() -> PingCmd {
        PingCmd
    }
}

impl IntoCommand for PingCmd {
    fn into_command(self) -> Command {
        Command::new("PING")
    }
}
