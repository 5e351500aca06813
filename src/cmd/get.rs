use super::{Command, IntoCommand};

#[derive(Debug)]
pub struct GetCmd {
    key: String,
}

impl GetCmd {
    pub fn new(key: impl ToString) -> Self {
        Self {
            key: key.to_string(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl IntoCommand for GetCmd {
    fn into_command(self) -> Command {
        Command::new("GET").arg(self.key)
    }
}
