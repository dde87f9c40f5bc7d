//! TCP transport: one JSON message per line from the game bridge

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::game::InputCache;
use crate::session::SessionInput;

use super::{dispatch, parse_line, TransportError};

/// Accept bridge connections until the session goes away.
///
/// Connection tasks live in a `JoinSet`, so dropping this future (or
/// aborting its task) also closes every open connection.
pub async fn serve(
    listener: TcpListener,
    cache: Arc<InputCache>,
    session_tx: mpsc::Sender<SessionInput>,
) -> Result<(), TransportError> {
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = accepted?;
                if session_tx.is_closed() {
                    return Err(TransportError::SessionClosed);
                }
                info!(%peer, "Bridge connected");

                let cache = cache.clone();
                let session_tx = session_tx.clone();
                connections.spawn(async move {
                    match handle_connection(stream, &cache, &session_tx).await {
                        Ok(lines) => info!(%peer, lines, "Bridge disconnected"),
                        Err(e) => error!(%peer, error = %e, "Bridge connection failed"),
                    }
                });
            }
            Some(_) = connections.join_next() => {}
        }
    }
}

/// Read lines until EOF; returns the number of messages accepted
pub async fn handle_connection<R>(
    reader: R,
    cache: &InputCache,
    session_tx: &mpsc::Sender<SessionInput>,
) -> Result<u64, TransportError>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut accepted = 0;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        match parse_line(&line) {
            Ok(msg) => {
                dispatch(msg, cache, session_tx).await?;
                accepted += 1;
            }
            Err(e) => {
                warn!(error = %e, "Failed to parse bridge message");
            }
        }
    }

    debug!(accepted, "Bridge stream ended");
    Ok(accepted)
}
