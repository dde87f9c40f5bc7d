//! Reward components, the weighted aggregator and running statistics

pub mod aggregator;
pub mod ball_touch;
pub mod event;
pub mod flip_reset;
pub mod input;
pub mod motion;
pub mod stats;

pub use aggregator::RewardAggregator;
pub use ball_touch::{AerialDistanceReward, DribbleReward, TouchBallReward};
pub use event::{EventReward, EventWeights};
pub use flip_reset::FlipResetReward;
pub use input::{HoldInputReward, HoldInputWeights, PositiveRollReward};
pub use motion::{
    DistanceToBallReward, FaceBallReward, LiuDistanceBallToGoalReward,
    LiuDistancePlayerToBallReward, SaveBoostReward, VelocityBallToGoalReward,
    VelocityPlayerToBallReward, VelocityReward,
};
pub use stats::StatsTracker;

use crate::game::{ControlInputRecord, GameScoreState, PlayerSnapshot};

/// A single scoring heuristic.
///
/// Components may keep per-car state between calls; that state must be keyed
/// by `car_id` and cleared by [`RewardFunction::reset`]. A component must
/// never return NaN: zero-length normalizations contribute 0.
pub trait RewardFunction: Send {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Score one player for the current tick
    fn score(
        &mut self,
        player: &PlayerSnapshot,
        game: &GameScoreState,
        controls: &ControlInputRecord,
    ) -> f32;

    /// Drop all per-car state (match boundary or manual reset)
    fn reset(&mut self) {}
}
