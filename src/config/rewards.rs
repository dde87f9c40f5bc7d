//! Reward table: which components to run and how much each one counts

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::game::InputCache;
use crate::reward::{
    AerialDistanceReward, DistanceToBallReward, DribbleReward, EventReward, EventWeights,
    FaceBallReward, FlipResetReward, HoldInputReward, HoldInputWeights,
    LiuDistanceBallToGoalReward, LiuDistancePlayerToBallReward, PositiveRollReward,
    RewardAggregator, RewardFunction, SaveBoostReward, TouchBallReward, VelocityBallToGoalReward,
    VelocityPlayerToBallReward, VelocityReward,
};

use super::ConfigError;

/// One component and its parameters, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComponentConfig {
    Event {
        #[serde(default)]
        weights: EventWeights,
    },
    HoldInput {
        #[serde(default)]
        weights: HoldInputWeights,
    },
    TouchBall {
        #[serde(default = "default_aerial_weight")]
        aerial_weight: f32,
    },
    Dribble,
    AerialDistance {
        #[serde(default = "default_aerial_scale")]
        height_scale: f32,
        #[serde(default = "default_aerial_scale")]
        distance_scale: f32,
        #[serde(default)]
        ang_vel_w: f32,
    },
    FlipReset {
        #[serde(default = "default_flip_reset_r")]
        flip_reset_r: f32,
        #[serde(default = "default_hold_flip_reset_r")]
        hold_flip_reset_r: f32,
    },
    PositiveRoll {
        #[serde(default = "default_roll_threshold")]
        height_threshold: f32,
        #[serde(default = "default_roll_threshold")]
        distance_threshold: f32,
    },
    Velocity {
        #[serde(default)]
        negative: bool,
    },
    SaveBoost {
        #[serde(default = "default_save_boost_exponent")]
        exponent: f32,
    },
    VelocityBallToGoal {
        #[serde(default)]
        own_goal: bool,
    },
    VelocityPlayerToBall,
    FaceBall,
    DistanceToBall,
    LiuDistanceBallToGoal {
        #[serde(default)]
        own_goal: bool,
    },
    LiuDistancePlayerToBall,
}

fn default_aerial_weight() -> f32 {
    0.5
}

fn default_aerial_scale() -> f32 {
    10.0
}

fn default_flip_reset_r() -> f32 {
    1.0
}

fn default_hold_flip_reset_r() -> f32 {
    0.01
}

fn default_roll_threshold() -> f32 {
    300.0
}

fn default_save_boost_exponent() -> f32 {
    0.5
}

impl ComponentConfig {
    /// Instantiate the component with fresh per-car state
    pub fn build(&self) -> Box<dyn RewardFunction> {
        match *self {
            Self::Event { weights } => Box::new(EventReward::new(weights)),
            Self::HoldInput { weights } => Box::new(HoldInputReward::new(weights)),
            Self::TouchBall { aerial_weight } => Box::new(TouchBallReward::new(aerial_weight)),
            Self::Dribble => Box::new(DribbleReward),
            Self::AerialDistance {
                height_scale,
                distance_scale,
                ang_vel_w,
            } => Box::new(AerialDistanceReward::new(
                height_scale,
                distance_scale,
                ang_vel_w,
            )),
            Self::FlipReset {
                flip_reset_r,
                hold_flip_reset_r,
            } => Box::new(FlipResetReward::new(flip_reset_r, hold_flip_reset_r)),
            Self::PositiveRoll {
                height_threshold,
                distance_threshold,
            } => Box::new(PositiveRollReward::new(height_threshold, distance_threshold)),
            Self::Velocity { negative } => Box::new(VelocityReward::new(negative)),
            Self::SaveBoost { exponent } => Box::new(SaveBoostReward::new(exponent)),
            Self::VelocityBallToGoal { own_goal } => {
                Box::new(VelocityBallToGoalReward::new(own_goal))
            }
            Self::VelocityPlayerToBall => Box::new(VelocityPlayerToBallReward),
            Self::FaceBall => Box::new(FaceBallReward),
            Self::DistanceToBall => Box::new(DistanceToBallReward),
            Self::LiuDistanceBallToGoal { own_goal } => {
                Box::new(LiuDistanceBallToGoalReward::new(own_goal))
            }
            Self::LiuDistancePlayerToBall => Box::new(LiuDistancePlayerToBallReward),
        }
    }
}

/// A component with its aggregation weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedComponent {
    #[serde(default)]
    pub weight: f32,
    #[serde(flatten)]
    pub component: ComponentConfig,
}

impl WeightedComponent {
    fn new(component: ComponentConfig, weight: f32) -> Self {
        Self { weight, component }
    }
}

/// The full reward table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardConfig {
    pub components: Vec<WeightedComponent>,
}

impl RewardConfig {
    /// Read a JSON reward table from disk
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::RewardFile {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        info!(path = %path.display(), components = config.components.len(), "Loaded reward config");
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build an aggregator reading controller state from `cache`
    pub fn build_aggregator(&self, cache: Arc<InputCache>) -> RewardAggregator {
        let mut aggregator = RewardAggregator::new(cache);
        for entry in &self.components {
            aggregator.push(entry.component.build(), entry.weight);
        }
        aggregator
    }
}

impl Default for RewardConfig {
    /// Goal events and roll direction count; every other component runs at
    /// weight 0 so its state is tracked and can be inspected in trace logs.
    fn default() -> Self {
        let events = EventWeights {
            team_goal: 50.0,
            concede: -50.0,
            ..EventWeights::default()
        };
        let roll = HoldInputWeights {
            positive_roll: 1.0,
            negative_roll: -1.0,
            ..HoldInputWeights::default()
        };

        let components = vec![
            WeightedComponent::new(ComponentConfig::Event { weights: events }, 1.0),
            WeightedComponent::new(ComponentConfig::HoldInput { weights: roll }, 1.0),
            WeightedComponent::new(
                ComponentConfig::TouchBall {
                    aerial_weight: default_aerial_weight(),
                },
                0.0,
            ),
            WeightedComponent::new(
                ComponentConfig::FlipReset {
                    flip_reset_r: default_flip_reset_r(),
                    hold_flip_reset_r: default_hold_flip_reset_r(),
                },
                0.0,
            ),
            WeightedComponent::new(
                ComponentConfig::AerialDistance {
                    height_scale: default_aerial_scale(),
                    distance_scale: default_aerial_scale(),
                    ang_vel_w: 0.0,
                },
                0.0,
            ),
            WeightedComponent::new(
                ComponentConfig::PositiveRoll {
                    height_threshold: default_roll_threshold(),
                    distance_threshold: default_roll_threshold(),
                },
                0.0,
            ),
            WeightedComponent::new(ComponentConfig::Dribble, 0.0),
            WeightedComponent::new(ComponentConfig::Velocity { negative: false }, 0.0),
            WeightedComponent::new(
                ComponentConfig::SaveBoost {
                    exponent: default_save_boost_exponent(),
                },
                0.0,
            ),
            WeightedComponent::new(ComponentConfig::VelocityBallToGoal { own_goal: false }, 0.0),
            WeightedComponent::new(ComponentConfig::VelocityPlayerToBall, 0.0),
            WeightedComponent::new(ComponentConfig::FaceBall, 0.0),
            WeightedComponent::new(ComponentConfig::DistanceToBall, 0.0),
            WeightedComponent::new(
                ComponentConfig::LiuDistanceBallToGoal { own_goal: false },
                0.0,
            ),
            WeightedComponent::new(ComponentConfig::LiuDistancePlayerToBall, 0.0),
        ];

        Self { components }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::ControlInputRecord;
    use crate::reward::fixtures::{ball_at, player_at};
    use glam::Vec3;

    #[test]
    fn default_table_weights_goals_and_roll() {
        let config = RewardConfig::default();
        let aggregator = config.build_aggregator(Arc::new(InputCache::new()));
        let weighted: Vec<_> = aggregator.weights().filter(|(_, w)| *w != 0.0).collect();
        assert_eq!(weighted, vec![("event", 1.0), ("hold_input", 1.0)]);
        assert_eq!(aggregator.len(), 15);
    }

    #[test]
    fn default_table_rewards_right_roll() {
        let cache = Arc::new(InputCache::new());
        cache.record_input_change(
            0,
            ControlInputRecord {
                roll: 1.0,
                ..ControlInputRecord::default()
            },
        );
        let mut aggregator = RewardConfig::default().build_aggregator(cache);
        let player = player_at(0, Vec3::new(0.0, -2000.0, 17.0));
        let reward = aggregator.total(&player, &ball_at(Vec3::ZERO));
        assert_eq!(reward, 1.0);
    }

    #[test]
    fn parses_tagged_components_with_defaults() {
        let config = RewardConfig::from_json(
            r#"{"components": [
                {"kind": "event", "weight": 1.0, "weights": {"teamGoal": 10.0, "boostPickup": 0.1}},
                {"kind": "touch_ball", "weight": 0.5},
                {"kind": "flip_reset", "weight": 2.0, "hold_flip_reset_r": 0.1},
                {"kind": "face_ball"}
            ]}"#,
        )
        .unwrap();

        let kinds: Vec<_> = config.components.iter().map(|c| c.component.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                ComponentConfig::Event {
                    weights: EventWeights {
                        team_goal: 10.0,
                        boost_pickup: 0.1,
                        ..EventWeights::default()
                    }
                },
                ComponentConfig::TouchBall { aerial_weight: 0.5 },
                ComponentConfig::FlipReset {
                    flip_reset_r: 1.0,
                    hold_flip_reset_r: 0.1
                },
                ComponentConfig::FaceBall,
            ]
        );
        assert_eq!(config.components[2].weight, 2.0);
        assert_eq!(config.components[3].weight, 0.0);
    }

    #[test]
    fn rejects_unknown_kinds_and_input_keys() {
        assert!(RewardConfig::from_json(r#"{"components": [{"kind": "warp"}]}"#).is_err());
        assert!(RewardConfig::from_json(
            r#"{"components": [{"kind": "hold_input", "weights": {"rol": 1.0}}]}"#
        )
        .is_err());
    }

    #[test]
    fn missing_file_is_reported() {
        let err = RewardConfig::load(Path::new("/nonexistent/rewards.json")).unwrap_err();
        assert!(matches!(err, ConfigError::RewardFile { .. }));
    }
}
