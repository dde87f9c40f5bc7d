//! Flip reset detection

use std::collections::HashMap;

use crate::game::physics::{direction, BACK_WALL_Y, CEILING_Z, SIDE_WALL_X};
use crate::game::{CarId, ControlInputRecord, GameScoreState, PlayerSnapshot};

use super::RewardFunction;

const NEAR_BALL_DISTANCE: f32 = 170.0;
const CAR_UNDER_THRESHOLD: f32 = -1.0;
const MIN_DISTANCE_FLOOR: f32 = 200.0;
const MIN_DISTANCE_CEILING: f32 = 300.0;
const MIN_DISTANCE_WALLS: f32 = 700.0;

#[derive(Debug, Default, Clone, Copy)]
struct FlipResetLatch {
    prev_has_jump: bool,
    prev_has_flip: bool,
    has_reset: bool,
}

/// Detects a car regaining its flip by touching the ball with its wheels
/// mid-air, away from the floor, ceiling and walls.
///
/// Pays `flip_reset_r` once when the reset is acquired, then
/// `hold_flip_reset_r` each tick the car keeps it while still in the safe
/// zone. Flipping or leaving the zone drops the latch.
#[derive(Debug)]
pub struct FlipResetReward {
    flip_reset_r: f32,
    hold_flip_reset_r: f32,
    latches: HashMap<CarId, FlipResetLatch>,
}

impl FlipResetReward {
    pub fn new(flip_reset_r: f32, hold_flip_reset_r: f32) -> Self {
        Self {
            flip_reset_r,
            hold_flip_reset_r,
            latches: HashMap::new(),
        }
    }
}

impl Default for FlipResetReward {
    fn default() -> Self {
        Self::new(1.0, 0.01)
    }
}

fn near_wall(x: f32, y: f32) -> bool {
    x < -SIDE_WALL_X + MIN_DISTANCE_WALLS
        || x > SIDE_WALL_X - MIN_DISTANCE_WALLS
        || y < -BACK_WALL_Y + MIN_DISTANCE_WALLS
        || y > BACK_WALL_Y - MIN_DISTANCE_WALLS
}

impl RewardFunction for FlipResetReward {
    fn name(&self) -> &'static str {
        "flip_reset"
    }

    fn score(
        &mut self,
        player: &PlayerSnapshot,
        game: &GameScoreState,
        _: &ControlInputRecord,
    ) -> f32 {
        let car = &player.car_data;
        let pos = car.position;

        let near_ball = pos.distance(game.ball.position) < NEAR_BALL_DISTANCE;
        let height_excluded =
            pos.z < MIN_DISTANCE_FLOOR || pos.z > CEILING_Z - MIN_DISTANCE_CEILING;
        let wall_excluded = near_wall(pos.x, pos.y);
        let wheels_toward_ball = direction(pos, game.ball.position)
            .is_some_and(|dir| car.up().dot(dir) > CAR_UNDER_THRESHOLD);
        let in_zone = near_ball && !height_excluded && !wall_excluded && wheels_toward_ball;

        let latch = self.latches.entry(player.car_id).or_default();
        let got_reset = (!latch.prev_has_jump && player.has_jump)
            || (!latch.prev_has_flip && player.has_flip);

        if player.has_flipped || !in_zone {
            latch.has_reset = false;
        }

        let mut reward = 0.0;
        if in_zone {
            if got_reset && !latch.has_reset {
                latch.has_reset = true;
                reward = self.flip_reset_r;
            } else if latch.has_reset {
                reward = self.hold_flip_reset_r;
            }
        }

        latch.prev_has_jump = player.has_jump;
        latch.prev_has_flip = player.has_flip;
        reward
    }

    fn reset(&mut self) {
        self.latches.clear();
    }
}
