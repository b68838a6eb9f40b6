use bytes::Bytes;

use crate::RESPType;

/// What a command hands back to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Bulk(Bytes),
    Nil,
    Status(String),
    Error(String),
}

impl Reply {
    pub fn ok() -> Self {
        Reply::Status("OK".to_string())
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Reply::Error(msg.into())
    }

    pub fn wrong_args(cmd: &str) -> Self {
        Reply::Error(format!("ERR wrong number of arguments for '{}' command", cmd))
    }
}

impl From<Reply> for RESPType {
    fn from(reply: Reply) -> RESPType {
        match reply {
            Reply::Bulk(val) => RESPType::Bulk(val),
            Reply::Nil => RESPType::Null,
            Reply::Status(msg) => RESPType::String(msg),
            Reply::Error(msg) => RESPType::Error(msg),
        }
    }
}
