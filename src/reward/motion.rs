//! Stateless position and velocity rewards

use glam::Vec3;

use crate::game::physics::{
    direction, BACK_NET_Y, BACK_WALL_Y, BALL_MAX_SPEED, BALL_RADIUS, BLUE_GOAL_BACK,
    CAR_MAX_SPEED, ORANGE_GOAL_BACK,
};
use crate::game::{ControlInputRecord, GameScoreState, PlayerSnapshot};

use super::RewardFunction;

/// Back of the net a player is scoring on, or defending when `own_goal`
fn target_goal(team_num: u8, own_goal: bool) -> Vec3 {
    let attacks_orange = (team_num == 0) != own_goal;
    if attacks_orange {
        ORANGE_GOAL_BACK
    } else {
        BLUE_GOAL_BACK
    }
}

/// Car speed normalized by the supersonic cap; negated for "slow is good"
#[derive(Debug, Default)]
pub struct VelocityReward {
    negative: bool,
}

impl VelocityReward {
    pub fn new(negative: bool) -> Self {
        Self { negative }
    }
}

impl RewardFunction for VelocityReward {
    fn name(&self) -> &'static str {
        "velocity"
    }

    fn score(
        &mut self,
        player: &PlayerSnapshot,
        _: &GameScoreState,
        _: &ControlInputRecord,
    ) -> f32 {
        let speed = player.car_data.linear_velocity.length() / CAR_MAX_SPEED;
        if self.negative {
            -speed
        } else {
            speed
        }
    }
}

/// Rewards holding boost, with diminishing returns for exponents below 1
#[derive(Debug)]
pub struct SaveBoostReward {
    exponent: f32,
}

impl SaveBoostReward {
    pub fn new(exponent: f32) -> Self {
        Self { exponent }
    }
}

impl Default for SaveBoostReward {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl RewardFunction for SaveBoostReward {
    fn name(&self) -> &'static str {
        "save_boost"
    }

    fn score(
        &mut self,
        player: &PlayerSnapshot,
        _: &GameScoreState,
        _: &ControlInputRecord,
    ) -> f32 {
        let value = player.boost_amount.max(0.0).powf(self.exponent);
        if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, 1.0)
        }
    }
}

/// Ball velocity component toward the target goal
#[derive(Debug, Default)]
pub struct VelocityBallToGoalReward {
    own_goal: bool,
}

impl VelocityBallToGoalReward {
    pub fn new(own_goal: bool) -> Self {
        Self { own_goal }
    }
}

impl RewardFunction for VelocityBallToGoalReward {
    fn name(&self) -> &'static str {
        "velocity_ball_to_goal"
    }

    fn score(
        &mut self,
        player: &PlayerSnapshot,
        game: &GameScoreState,
        _: &ControlInputRecord,
    ) -> f32 {
        let goal = target_goal(player.team_num, self.own_goal);
        match direction(game.ball.position, goal) {
            Some(dir) => dir.dot(game.ball.linear_velocity / BALL_MAX_SPEED),
            None => 0.0,
        }
    }
}

/// Car velocity component toward the ball
#[derive(Debug, Default)]
pub struct VelocityPlayerToBallReward;

impl RewardFunction for VelocityPlayerToBallReward {
    fn name(&self) -> &'static str {
        "velocity_player_to_ball"
    }

    fn score(
        &mut self,
        player: &PlayerSnapshot,
        game: &GameScoreState,
        _: &ControlInputRecord,
    ) -> f32 {
        let car = &player.car_data;
        match direction(car.position, game.ball.position) {
            Some(dir) => dir.dot(car.linear_velocity / CAR_MAX_SPEED),
            None => 0.0,
        }
    }
}

/// Alignment of the car's nose with the ball
#[derive(Debug, Default)]
pub struct FaceBallReward;

impl RewardFunction for FaceBallReward {
    fn name(&self) -> &'static str {
        "face_ball"
    }

    fn score(
        &mut self,
        player: &PlayerSnapshot,
        game: &GameScoreState,
        _: &ControlInputRecord,
    ) -> f32 {
        let car = &player.car_data;
        match direction(car.position, game.ball.position) {
            Some(dir) => car.forward().dot(dir),
            None => 0.0,
        }
    }
}

/// Linear falloff from 1 at the ball center to 0 at twice the ball radius
#[derive(Debug, Default)]
pub struct DistanceToBallReward;

impl RewardFunction for DistanceToBallReward {
    fn name(&self) -> &'static str {
        "distance_to_ball"
    }

    fn score(
        &mut self,
        player: &PlayerSnapshot,
        game: &GameScoreState,
        _: &ControlInputRecord,
    ) -> f32 {
        let distance = player.car_data.position.distance(game.ball.position);
        (1.0 - distance / (BALL_RADIUS * 2.0)).max(0.0)
    }
}

/// Exponential closeness of the ball to the target goal
#[derive(Debug, Default)]
pub struct LiuDistanceBallToGoalReward {
    own_goal: bool,
}

impl LiuDistanceBallToGoalReward {
    pub fn new(own_goal: bool) -> Self {
        Self { own_goal }
    }
}

impl RewardFunction for LiuDistanceBallToGoalReward {
    fn name(&self) -> &'static str {
        "liu_distance_ball_to_goal"
    }

    fn score(
        &mut self,
        player: &PlayerSnapshot,
        game: &GameScoreState,
        _: &ControlInputRecord,
    ) -> f32 {
        let goal = target_goal(player.team_num, self.own_goal);
        let dist = game.ball.position.distance(goal) - (BACK_NET_Y - BACK_WALL_Y + BALL_RADIUS);
        (-0.5 * dist / BALL_MAX_SPEED).exp()
    }
}

/// Exponential closeness of the car to the ball surface
#[derive(Debug, Default)]
pub struct LiuDistancePlayerToBallReward;

impl RewardFunction for LiuDistancePlayerToBallReward {
    fn name(&self) -> &'static str {
        "liu_distance_player_to_ball"
    }

    fn score(
        &mut self,
        player: &PlayerSnapshot,
        game: &GameScoreState,
        _: &ControlInputRecord,
    ) -> f32 {
        let dist = player.car_data.position.distance(game.ball.position) - BALL_RADIUS;
        (-0.5 * dist / CAR_MAX_SPEED).exp()
    }
}
