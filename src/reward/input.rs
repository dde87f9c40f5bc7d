//! Rewards driven by the player's cached controller inputs

use serde::{Deserialize, Serialize};

use crate::game::{ControlInputRecord, GameScoreState, PlayerSnapshot};

use super::RewardFunction;

/// Flat reward for rolling right while airborne near the ball
#[derive(Debug)]
pub struct PositiveRollReward {
    height_threshold: f32,
    distance_threshold: f32,
}

impl PositiveRollReward {
    pub fn new(height_threshold: f32, distance_threshold: f32) -> Self {
        Self {
            height_threshold,
            distance_threshold,
        }
    }
}

impl Default for PositiveRollReward {
    fn default() -> Self {
        Self::new(300.0, 500.0)
    }
}

impl RewardFunction for PositiveRollReward {
    fn name(&self) -> &'static str {
        "positive_roll"
    }

    fn score(
        &mut self,
        player: &PlayerSnapshot,
        game: &GameScoreState,
        controls: &ControlInputRecord,
    ) -> f32 {
        let pos = player.car_data.position;
        let high = pos.z > self.height_threshold;
        let near = pos.distance(game.ball.position) < self.distance_threshold;
        if high && near && controls.roll > 0.0 {
            1.0
        } else {
            0.0
        }
    }
}

/// Per-axis weights for [`HoldInputReward`].
///
/// Missing keys default to 0; unknown keys are rejected so that a typo in a
/// configuration file does not silently disable a term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HoldInputWeights {
    pub positive_steer: f32,
    pub negative_steer: f32,
    pub positive_throttle: f32,
    pub negative_throttle: f32,
    pub positive_pitch: f32,
    pub negative_pitch: f32,
    pub positive_roll: f32,
    pub negative_roll: f32,
    pub jump: f32,
    pub boost: f32,
    pub handbrake: f32,
    pub use_item: f32,
}

/// Adds a configured weight for every control axis currently held
#[derive(Debug)]
pub struct HoldInputReward {
    weights: HoldInputWeights,
}

impl HoldInputReward {
    pub fn new(weights: HoldInputWeights) -> Self {
        Self { weights }
    }
}

fn signed_axis(value: f32, positive: f32, negative: f32) -> f32 {
    if value > 0.0 {
        positive
    } else if value < 0.0 {
        negative
    } else {
        0.0
    }
}

fn held(active: bool, weight: f32) -> f32 {
    if active {
        weight
    } else {
        0.0
    }
}

impl RewardFunction for HoldInputReward {
    fn name(&self) -> &'static str {
        "hold_input"
    }

    fn score(
        &mut self,
        _: &PlayerSnapshot,
        _: &GameScoreState,
        controls: &ControlInputRecord,
    ) -> f32 {
        let w = &self.weights;
        signed_axis(controls.steer, w.positive_steer, w.negative_steer)
            + signed_axis(controls.throttle, w.positive_throttle, w.negative_throttle)
            + signed_axis(controls.pitch, w.positive_pitch, w.negative_pitch)
            + signed_axis(controls.roll, w.positive_roll, w.negative_roll)
            + held(controls.jump, w.jump)
            + held(controls.boost, w.boost)
            + held(controls.handbrake, w.handbrake)
            + held(controls.use_item, w.use_item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reward::fixtures::{ball_at, player_at};
    use glam::Vec3;

    #[test]
    fn positive_roll_needs_height_proximity_and_roll() {
        let mut reward = PositiveRollReward::new(300.0, 300.0);
        let player = player_at(0, Vec3::new(0.0, 0.0, 500.0));
        let game = ball_at(Vec3::new(0.0, 100.0, 500.0));
        let rolling = ControlInputRecord {
            roll: 0.4,
            ..ControlInputRecord::default()
        };

        assert_eq!(reward.score(&player, &game, &rolling), 1.0);
        assert_eq!(reward.score(&player, &game, &ControlInputRecord::default()), 0.0);

        let grounded = player_at(0, Vec3::new(0.0, 0.0, 17.0));
        assert_eq!(reward.score(&grounded, &game, &rolling), 0.0);

        let far = ball_at(Vec3::new(0.0, 2000.0, 500.0));
        assert_eq!(reward.score(&player, &far, &rolling), 0.0);
    }

    #[test]
    fn hold_input_sums_active_axes() {
        let weights = HoldInputWeights {
            positive_roll: 1.0,
            negative_roll: -1.0,
            positive_throttle: 0.5,
            negative_throttle: -0.25,
            boost: 2.0,
            jump: 4.0,
            ..HoldInputWeights::default()
        };
        let mut reward = HoldInputReward::new(weights);
        let player = player_at(0, Vec3::ZERO);
        let game = ball_at(Vec3::ZERO);

        let controls = ControlInputRecord {
            roll: -0.3,
            throttle: 1.0,
            boost: true,
            ..ControlInputRecord::default()
        };
        assert_eq!(reward.score(&player, &game, &controls), -1.0 + 0.5 + 2.0);

        let reversing = ControlInputRecord {
            roll: 1.0,
            throttle: -1.0,
            jump: true,
            ..ControlInputRecord::default()
        };
        assert_eq!(reward.score(&player, &game, &reversing), 1.0 - 0.25 + 4.0);

        assert_eq!(
            reward.score(&player, &game, &ControlInputRecord::default()),
            0.0
        );
    }

    #[test]
    fn missing_weight_keys_default_to_zero() {
        let weights: HoldInputWeights =
            serde_json::from_str(r#"{"positive_roll": 1.0, "negative_roll": -1.0}"#).unwrap();
        assert_eq!(weights.positive_roll, 1.0);
        assert_eq!(weights.jump, 0.0);
    }

    #[test]
    fn unknown_weight_keys_are_rejected() {
        let parsed = serde_json::from_str::<HoldInputWeights>(r#"{"postive_roll": 1.0}"#);
        assert!(parsed.is_err());
    }
}
