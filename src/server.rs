//! Accept loop and per-connection command processing.

use std::future::Future;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::cmd::{args_from_frame, CommandTable, Reply};
use crate::{Connection, RESPType};

/// Accepts connections until `shutdown` completes, serving each one on its
/// own task.
pub async fn run(
    listener: TcpListener,
    table: Arc<CommandTable>,
    shutdown: impl Future,
) -> crate::Result<()> {
    info!(addr = %listener.local_addr()?, "listening");

    tokio::select! {
        res = accept_loop(&listener, table) => res,
        _ = shutdown => {
            info!("shutting down");
            Ok(())
        }
    }
}

async fn accept_loop(listener: &TcpListener, table: Arc<CommandTable>) -> crate::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        debug!(%peer, "accepted connection");
        let table = table.clone();

        tokio::spawn(async move {
            if let Err(err) = process(stream, table).await {
                warn!(%peer, error = %err, "connection error");
            }
            debug!(%peer, "connection closed");
        });
    }
}

async fn process(stream: TcpStream, table: Arc<CommandTable>) -> crate::Result<()> {
    let mut connection = Connection::new(stream);

    loop {
        let frame = match connection.read_frame().await {
            Ok(Some(frame)) => frame,
            Ok(None) => return Ok(()),
            Err(err) if err.is::<std::io::Error>() => return Err(err),
            Err(err) => {
                // the buffer cannot be resynchronized, so answer and hang up
                let reply = Reply::error(format!("ERR Protocol error: {}", err));
                let _ = connection.write_frame(&reply.into()).await;
                return Err(err);
            }
        };
        if matches!(&frame, RESPType::Array(arr) if arr.is_empty()) {
            continue;
        }

        let reply = match args_from_frame(frame) {
            Ok(args) => table.dispatch(&args),
            Err(err) => Reply::error(format!("ERR Protocol error: {}", err)),
        };
        connection.write_frame(&reply.into()).await?;
    }
}
