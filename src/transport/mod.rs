//! Feeds that deliver world packets and controller changes to a session

pub mod listener;
pub mod protocol;
pub mod synthetic;

pub use listener::serve;
pub use protocol::WireMsg;
pub use synthetic::SyntheticFeed;

use tokio::sync::mpsc;
use tracing::debug;

use crate::game::InputCache;
use crate::session::SessionInput;

/// Transport errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Session channel closed")]
    SessionClosed,
}

/// Parse one newline-delimited wire message
pub fn parse_line(line: &str) -> Result<WireMsg, TransportError> {
    Ok(serde_json::from_str(line.trim())?)
}

/// Route a message: controller changes go straight into the cache, packets
/// and reset commands are queued for the sampling loop.
pub async fn dispatch(
    msg: WireMsg,
    cache: &InputCache,
    session_tx: &mpsc::Sender<SessionInput>,
) -> Result<(), TransportError> {
    let input = match msg {
        WireMsg::InputChange(change) => {
            cache.record_input_change(change.player_index, change.controller.into());
            return Ok(());
        }
        WireMsg::Tick(packet) => SessionInput::Tick(Box::new(packet)),
        WireMsg::Reset => {
            debug!("Reset requested");
            SessionInput::Reset
        }
    };

    session_tx
        .send(input)
        .await
        .map_err(|_| TransportError::SessionClosed)
}
