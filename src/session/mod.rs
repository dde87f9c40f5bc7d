//! Reward session: the sampling loop and its per-step report

pub mod report;
pub mod sampler;

pub use report::{ConsoleSink, PrintSettings};
pub use sampler::{RewardSession, SessionInput};
