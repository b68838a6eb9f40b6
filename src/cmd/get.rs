use bytes::Bytes;
use tracing::warn;

use super::Reply;
use crate::ShardedStore;

/// `GET key`
#[derive(Debug, PartialEq, Eq)]
pub struct Get {
    key: String,
}

impl Get {
    pub fn new(key: impl Into<String>) -> Self {
        Get { key: key.into() }
    }

    /// Parses `get <key>`. The leading command name is skipped and anything
    /// after the key is ignored.
    pub fn parse_args(args: &str) -> Option<Get> {
        let mut tokens = args.split_whitespace().skip(1);
        let key = tokens.next()?;
        for extra in tokens {
            warn!(arg = extra, "get: ignoring unknown argument");
        }
        Some(Get::new(key))
    }

    pub fn apply(self, store: &ShardedStore) -> Reply {
        match store.get(&self.key) {
            Some(value) => Reply::Bulk(Bytes::from(value)),
            None => Reply::Nil,
        }
    }
}

/// Handler registered under `"get"`.
pub fn handle(store: &ShardedStore, args: &str) -> Reply {
    match Get::parse_args(args) {
        Some(cmd) => cmd.apply(store),
        None => Reply::wrong_args("get"),
    }
}
