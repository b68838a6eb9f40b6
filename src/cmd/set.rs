use tracing::warn;

use super::Reply;
use crate::ShardedStore;

/// `SET key value`
#[derive(Debug, PartialEq, Eq)]
pub struct Set {
    key: String,
    value: String,
}

impl Set {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Set {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Parses `set <key> <value>`; both are required, extras are ignored.
    pub fn parse_args(args: &str) -> Option<Set> {
        let mut tokens = args.split_whitespace().skip(1);
        let key = tokens.next()?;
        let value = tokens.next()?;
        for extra in tokens {
            warn!(arg = extra, "set: ignoring unknown argument");
        }
        Some(Set::new(key, value))
    }

    pub fn apply(self, store: &ShardedStore) -> Reply {
        store.set(self.key, self.value);
        Reply::ok()
    }
}

/// Handler registered under `"set"`.
pub fn handle(store: &ShardedStore, args: &str) -> Reply {
    match Set::parse_args(args) {
        Some(cmd) => cmd.apply(store),
        None => Reply::wrong_args("set"),
    }
}
