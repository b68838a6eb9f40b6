//! A sharded in-memory key-value store that speaks enough of the Redis
//! protocol to answer `GET` and `SET`.
//!
//! The store splits its key space over a fixed number of shards, each one a
//! `HashMap` behind its own mutex, so commands touching different shards
//! never contend. Everything around it (RESP codec, connection framing, the
//! accept loop and a small client) is kept deliberately thin.

pub mod client;
pub mod cmd;
pub mod connection;
pub mod resp;
pub mod server;
pub mod store;

pub use client::Client;
pub use cmd::{CommandTable, Reply};
pub use connection::Connection;
pub use resp::{RESPParser, RESPSerializer, RESPType};
pub use store::ShardedStore;

/// Port a Redis server listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 6379;

pub type Error = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T> = std::result::Result<T, Error>;
