use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::{get, set, Reply};
use crate::{RESPType, ShardedStore};

/// Runs one command against the store. `args` is the whole command line,
/// command name included.
pub type Handler = fn(&ShardedStore, &str) -> Reply;

/// Maps command names to handlers, all sharing one store.
pub struct CommandTable {
    store: Arc<ShardedStore>,
    handlers: HashMap<String, Handler>,
}

impl CommandTable {
    /// Table with `get` and `set` registered.
    pub fn new(store: Arc<ShardedStore>) -> Self {
        let mut table = CommandTable {
            store,
            handlers: HashMap::new(),
        };
        table.register("get", get::handle);
        table.register("set", set::handle);
        table
    }

    /// Registers `handler` under `name`, replacing any earlier one.
    /// Names are matched case-insensitively.
    pub fn register(&mut self, name: &str, handler: Handler) {
        self.handlers.insert(name.to_ascii_lowercase(), handler);
    }

    pub fn store(&self) -> &Arc<ShardedStore> {
        &self.store
    }

    pub fn dispatch(&self, args: &str) -> Reply {
        let name = match args.split_whitespace().next() {
            Some(name) => name.to_ascii_lowercase(),
            None => return Reply::error("ERR empty command"),
        };

        match self.handlers.get(&name) {
            Some(handler) => {
                debug!(cmd = %name, "dispatch");
                handler(self.store.as_ref(), args)
            }
            None => Reply::error(format!("ERR unknown command '{}'", name)),
        }
    }
}

/// Flattens a request frame into a space separated command line.
///
/// Requests must be arrays of bulk or simple strings holding UTF-8 text.
pub fn args_from_frame(frame: RESPType) -> crate::Result<String> {
    let arr = match frame {
        RESPType::Array(arr) => arr,
        other => return Err(format!("expected array, got {:?}", other).into()),
    };

    let mut parts = Vec::with_capacity(arr.len());
    for item in arr {
        match item {
            RESPType::Bulk(b) => parts.push(String::from_utf8(b.to_vec())?),
            RESPType::String(s) => parts.push(s),
            other => return Err(format!("invalid argument type {:?}", other).into()),
        }
    }
    Ok(parts.join(" "))
}
