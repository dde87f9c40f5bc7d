//! Rewards built around ball contact: touches, dribbles and aerial play

use std::collections::HashMap;

use glam::Vec3;

use crate::game::physics::{BACK_WALL_Y, BALL_RADIUS, CAR_MAX_ANG_VEL, CAR_MAX_SPEED};
use crate::game::{CarId, ControlInputRecord, GameScoreState, PlayerSnapshot};

use super::RewardFunction;

/// Pays on the tick a touch is flagged, scaled up for higher touches
#[derive(Debug, Default)]
pub struct TouchBallReward {
    aerial_weight: f32,
}

impl TouchBallReward {
    pub fn new(aerial_weight: f32) -> Self {
        Self { aerial_weight }
    }
}

impl RewardFunction for TouchBallReward {
    fn name(&self) -> &'static str {
        "touch_ball"
    }

    fn score(
        &mut self,
        player: &PlayerSnapshot,
        game: &GameScoreState,
        _: &ControlInputRecord,
    ) -> f32 {
        if !player.ball_touched {
            return 0.0;
        }
        let ball_height = (game.ball.position.z + BALL_RADIUS).max(0.0);
        (ball_height / (BALL_RADIUS * 2.0)).powf(self.aerial_weight)
    }
}

const DRIBBLE_MIN_BALL_HEIGHT: f32 = 109.0;
const DRIBBLE_MAX_BALL_HEIGHT: f32 = 180.0;
const DRIBBLE_MAX_DISTANCE: f32 = 197.0;
const SPEED_MATCH_FACTOR: f32 = 2.0;

/// Rewards carrying the ball on the car roof at matched speed
#[derive(Debug, Default)]
pub struct DribbleReward;

impl RewardFunction for DribbleReward {
    fn name(&self) -> &'static str {
        "dribble"
    }

    fn score(
        &mut self,
        player: &PlayerSnapshot,
        game: &GameScoreState,
        _: &ControlInputRecord,
    ) -> f32 {
        let car = &player.car_data;
        let ball = &game.ball;
        let in_band =
            (DRIBBLE_MIN_BALL_HEIGHT..=DRIBBLE_MAX_BALL_HEIGHT).contains(&ball.position.z);
        let close = car.position.distance(ball.position) < DRIBBLE_MAX_DISTANCE;
        if !(player.on_ground && in_band && close) {
            return 0.0;
        }

        let player_speed = car.linear_velocity.length();
        let ball_speed = ball.linear_velocity.length();
        let speed_sum = player_speed + ball_speed;
        let speed_match = if speed_sum > 0.0 {
            1.0 - (player_speed - ball_speed).abs() / speed_sum
        } else {
            0.0
        };

        (player_speed / CAR_MAX_SPEED + SPEED_MATCH_FACTOR * speed_match) / 2.0
    }
}

/// Car height below which the car counts as grounded
const AERIAL_GROUND_HEIGHT: f32 = 250.0;
/// Combined car + ball height that must be exceeded for the touch bonus
const AERIAL_BONUS_OFFSET: f32 = 500.0;
const AERIAL_NORMALIZATION: f32 = 2.0 * BACK_WALL_Y;

#[derive(Debug, Default)]
struct AerialTrack {
    car_distance: f32,
    ball_distance: f32,
    ang_vel_accumulated: f32,
    prev_car: Option<Vec3>,
    prev_ball: Option<Vec3>,
    touched_airborne: bool,
}

impl AerialTrack {
    fn clear_accumulators(&mut self) {
        self.car_distance = 0.0;
        self.ball_distance = 0.0;
        self.ang_vel_accumulated = 0.0;
    }
}

/// Rewards aerial sequences: a height bonus on the first airborne touch,
/// then the car and ball distance covered (plus spin) between later touches.
#[derive(Debug)]
pub struct AerialDistanceReward {
    height_scale: f32,
    distance_scale: f32,
    ang_vel_w: f32,
    tracks: HashMap<CarId, AerialTrack>,
}

impl AerialDistanceReward {
    pub fn new(height_scale: f32, distance_scale: f32, ang_vel_w: f32) -> Self {
        Self {
            height_scale,
            distance_scale,
            ang_vel_w,
            tracks: HashMap::new(),
        }
    }
}

impl RewardFunction for AerialDistanceReward {
    fn name(&self) -> &'static str {
        "aerial_distance"
    }

    fn score(
        &mut self,
        player: &PlayerSnapshot,
        game: &GameScoreState,
        _: &ControlInputRecord,
    ) -> f32 {
        let car_pos = player.car_data.position;
        let ball_pos = game.ball.position;
        let track = self.tracks.entry(player.car_id).or_default();
        let mut reward = 0.0;

        if car_pos.z < AERIAL_GROUND_HEIGHT {
            track.clear_accumulators();
            track.touched_airborne = false;
            track.prev_car = Some(car_pos);
            track.prev_ball = Some(ball_pos);
        } else if player.ball_touched && !track.touched_airborne {
            reward = self.height_scale * (car_pos.z + ball_pos.z - AERIAL_BONUS_OFFSET).max(0.0);
            // Distance only counts from the first airborne touch on
            track.clear_accumulators();
            track.touched_airborne = true;
            track.prev_car = Some(car_pos);
            track.prev_ball = Some(ball_pos);
        } else if !player.on_ground {
            track.car_distance += track.prev_car.map_or(0.0, |p| car_pos.distance(p));
            track.ball_distance += track.prev_ball.map_or(0.0, |p| ball_pos.distance(p));
            track.ang_vel_accumulated +=
                self.ang_vel_w * player.car_data.angular_velocity.length() / CAR_MAX_ANG_VEL;
            track.prev_car = Some(car_pos);
            track.prev_ball = Some(ball_pos);

            if player.ball_touched {
                reward = self.distance_scale * (track.car_distance + track.ball_distance)
                    + track.ang_vel_accumulated;
                track.clear_accumulators();
            }
        }

        reward / AERIAL_NORMALIZATION
    }

    fn reset(&mut self) {
        self.tracks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reward::fixtures::{ball_at, player_at};

    fn score(
        reward: &mut impl RewardFunction,
        player: &PlayerSnapshot,
        game: &GameScoreState,
    ) -> f32 {
        reward.score(player, game, &ControlInputRecord::default())
    }

    #[test]
    fn touch_requires_flag() {
        let mut reward = TouchBallReward::new(0.5);
        let player = player_at(0, Vec3::ZERO);
        let game = ball_at(Vec3::new(0.0, 0.0, 1500.0));
        assert_eq!(score(&mut reward, &player, &game), 0.0);
    }

    #[test]
    fn touch_scales_with_height() {
        let mut reward = TouchBallReward::new(1.0);
        let mut player = player_at(0, Vec3::ZERO);
        player.ball_touched = true;

        let resting = ball_at(Vec3::new(0.0, 0.0, BALL_RADIUS));
        assert!((score(&mut reward, &player, &resting) - 1.0).abs() < 1e-6);

        let low = ball_at(Vec3::new(0.0, 0.0, 0.0));
        let r = score(&mut reward, &player, &low);
        assert!((r - 0.5).abs() < 1e-6);

        let mut flat = TouchBallReward::new(0.0);
        assert_eq!(score(&mut flat, &player, &low), 1.0);
    }

    #[test]
    fn touch_stays_in_unit_range_below_two_radii() {
        let mut reward = TouchBallReward::new(0.5);
        let mut player = player_at(0, Vec3::ZERO);
        player.ball_touched = true;
        for z in [-BALL_RADIUS, 0.0, 40.0, BALL_RADIUS] {
            let r = score(&mut reward, &player, &ball_at(Vec3::new(0.0, 0.0, z)));
            assert!((0.0..=1.0).contains(&r), "z = {z}, r = {r}");
        }
    }

    #[test]
    fn dribble_gate_and_speed_match() {
        let mut reward = DribbleReward;
        let mut player = player_at(0, Vec3::new(0.0, 0.0, 17.0));
        player.on_ground = true;
        player.car_data.linear_velocity = Vec3::new(0.0, 1150.0, 0.0);
        let mut game = ball_at(Vec3::new(0.0, 0.0, 150.0));
        game.ball.linear_velocity = Vec3::new(0.0, 1150.0, 0.0);

        assert!((score(&mut reward, &player, &game) - 1.25).abs() < 1e-6);

        player.on_ground = false;
        assert_eq!(score(&mut reward, &player, &game), 0.0);

        player.on_ground = true;
        let high = {
            let mut g = game.clone();
            g.ball.position.z = 300.0;
            g
        };
        assert_eq!(score(&mut reward, &player, &high), 0.0);
    }

    #[test]
    fn dribble_with_both_stationary_is_zero() {
        let mut reward = DribbleReward;
        let mut player = player_at(0, Vec3::new(0.0, 0.0, 17.0));
        player.on_ground = true;
        let game = ball_at(Vec3::new(0.0, 0.0, 150.0));
        assert_eq!(score(&mut reward, &player, &game), 0.0);
    }

    #[test]
    fn grounded_ticks_pay_nothing() {
        let mut reward = AerialDistanceReward::new(10.0, 10.0, 0.0);
        let mut player = player_at(0, Vec3::new(0.0, 0.0, 17.0));
        player.ball_touched = true;
        let game = ball_at(Vec3::new(0.0, 0.0, 100.0));
        assert_eq!(score(&mut reward, &player, &game), 0.0);
    }

    #[test]
    fn first_airborne_touch_pays_height_bonus() {
        let mut reward = AerialDistanceReward::new(10.0, 10.0, 0.0);
        let mut player = player_at(0, Vec3::new(0.0, 0.0, 600.0));
        player.ball_touched = true;
        let game = ball_at(Vec3::new(0.0, 0.0, 700.0));

        // 10 * (600 + 700 - 500) / 10240
        assert_eq!(score(&mut reward, &player, &game), 0.78125);
    }

    #[test]
    fn later_touch_cashes_out_distance() {
        let mut reward = AerialDistanceReward::new(10.0, 10.0, 0.0);
        let mut player = player_at(0, Vec3::new(0.0, 0.0, 600.0));
        player.ball_touched = true;
        score(&mut reward, &player, &ball_at(Vec3::new(0.0, 0.0, 700.0)));

        player.ball_touched = false;
        player.car_data.position = Vec3::new(0.0, 100.0, 600.0);
        let r = score(&mut reward, &player, &ball_at(Vec3::new(0.0, 50.0, 700.0)));
        assert_eq!(r, 0.0);

        player.ball_touched = true;
        player.car_data.position = Vec3::new(0.0, 200.0, 600.0);
        let r = score(&mut reward, &player, &ball_at(Vec3::new(0.0, 100.0, 700.0)));
        // 10 * (200 car + 100 ball) / 10240
        assert_eq!(r, 0.29296875);

        // Accumulators were cleared by the cash-out
        player.ball_touched = true;
        let r = score(&mut reward, &player, &ball_at(Vec3::new(0.0, 100.0, 700.0)));
        assert_eq!(r, 0.0);
    }

    #[test]
    fn spin_accumulates_while_airborne() {
        let mut reward = AerialDistanceReward::new(0.0, 0.0, 1.0);
        let mut player = player_at(0, Vec3::new(0.0, 0.0, 600.0));
        player.ball_touched = true;
        let game = ball_at(Vec3::new(0.0, 0.0, 700.0));
        score(&mut reward, &player, &game);

        player.ball_touched = false;
        player.car_data.angular_velocity = Vec3::new(0.0, 0.0, CAR_MAX_ANG_VEL);
        score(&mut reward, &player, &game);
        score(&mut reward, &player, &game);

        player.ball_touched = true;
        let r = score(&mut reward, &player, &game);
        assert!((r - 3.0 / AERIAL_NORMALIZATION).abs() < 1e-7);
    }

    #[test]
    fn take_off_distance_is_not_paid_out() {
        let mut reward = AerialDistanceReward::new(0.0, 1.0, 0.0);
        let game = ball_at(Vec3::new(0.0, 0.0, 700.0));
        let mut player = player_at(0, Vec3::new(0.0, -4000.0, 17.0));

        // Drive across half the field before jumping
        for y in [-4000.0, -3000.0, -2000.0, -1000.0, 0.0] {
            player.car_data.position = Vec3::new(0.0, y, 17.0);
            assert_eq!(score(&mut reward, &player, &game), 0.0);
        }

        player.car_data.position = Vec3::new(0.0, 0.0, 600.0);
        assert_eq!(score(&mut reward, &player, &game), 0.0);

        player.ball_touched = true;
        assert_eq!(score(&mut reward, &player, &game), 0.0);
        // Nothing moved since the first touch
        assert_eq!(score(&mut reward, &player, &game), 0.0);
    }

    #[test]
    fn landing_rearms_height_bonus() {
        let mut reward = AerialDistanceReward::new(10.0, 0.0, 0.0);
        let mut player = player_at(0, Vec3::new(0.0, 0.0, 600.0));
        player.ball_touched = true;
        let game = ball_at(Vec3::new(0.0, 0.0, 700.0));
        assert_eq!(score(&mut reward, &player, &game), 0.78125);

        player.car_data.position.z = 17.0;
        player.ball_touched = false;
        score(&mut reward, &player, &game);

        player.car_data.position.z = 600.0;
        player.ball_touched = true;
        assert_eq!(score(&mut reward, &player, &game), 0.78125);
    }
}
