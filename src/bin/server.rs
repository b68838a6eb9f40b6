use std::sync::Arc;

use clap::Parser;
use sharded_kv::store::DEFAULT_SHARDS;
use sharded_kv::{server, CommandTable, ShardedStore, DEFAULT_PORT};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "sharded-kv-server", about = "Sharded in-memory key-value store speaking RESP")]
struct Args {
    /// Address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Number of shards; fixed for the lifetime of the process
    #[arg(short, long, default_value_t = DEFAULT_SHARDS)]
    shards: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> sharded_kv::Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let store = Arc::new(ShardedStore::with_shards(args.shards));
    info!(shards = store.shard_count(), "store ready");
    let table = Arc::new(CommandTable::new(store));

    let listener = TcpListener::bind((args.host.as_str(), args.port)).await?;
    server::run(listener, table, signal::ctrl_c()).await
}
