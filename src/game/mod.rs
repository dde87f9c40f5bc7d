//! Game state model: physics, decoded snapshots and cached control inputs

pub mod controls;
pub mod physics;
pub mod snapshot;

pub use controls::{ControlInputRecord, InputCache};
pub use snapshot::{GameScoreState, PacketDecoder, PlayerSnapshot, Snapshot, SnapshotDecoder};

/// Stable player/vehicle identity for the session
pub type CarId = u32;
