//! Seeded stand-in for the game bridge.
//!
//! Drives a crude arena at the simulation rate: cars follow their own random
//! controller state, the ball bounces and gets pushed on contact, goals pause
//! the round and a match restarts from 0-0 after `GOALS_PER_MATCH` goals.

use std::sync::Arc;
use std::time::Duration;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{debug, info};

use crate::game::physics::{BALL_RADIUS, BACK_WALL_Y, CAR_MAX_SPEED, CEILING_Z, SIDE_WALL_X};
use crate::game::{CarId, InputCache};
use crate::session::SessionInput;
use crate::util::time::{tick_delta, SIMULATION_TPS, TICK_DURATION_MICROS};

use super::protocol::{
    BallInfo, CarInfo, ControllerState, InputChange, Rotator, ScoreInfo, TickPacket, Touch,
    WirePhysics,
};
use super::{dispatch, TransportError, WireMsg};

const GRAVITY: f32 = -650.0;
const CAR_REST_Z: f32 = 17.0;
const CAR_DRIVE_SPEED: f32 = 1400.0;
const CAR_ACCEL: f32 = 1600.0;
const CAR_TURN_RATE: f32 = 2.5;
const JUMP_SPEED: f32 = 300.0;
const TOUCH_RADIUS: f32 = BALL_RADIUS + 60.0;
const GOAL_HALF_WIDTH: f32 = 893.0;
const BOOST_USE_PER_SEC: f32 = 33.3;
/// Ticks the round stays inactive after a goal
const GOAL_PAUSE_TICKS: u32 = 3 * SIMULATION_TPS;
const GOALS_PER_MATCH: u32 = 5;
/// Chance per car per tick of a new controller state
const INPUT_CHANGE_CHANCE: f64 = 1.0 / 30.0;

#[derive(Debug, Clone)]
struct SimCar {
    team: u8,
    position: Vec3,
    velocity: Vec3,
    yaw: f32,
    boost: f32,
    jumped: bool,
    controls: ControllerState,
    touches: u32,
    goals: u32,
    shots: u32,
}

#[derive(Debug, Clone, Default)]
struct SimBall {
    position: Vec3,
    velocity: Vec3,
}

/// Deterministic packet source for running without a game
pub struct SyntheticFeed {
    rng: ChaCha8Rng,
    cars: Vec<SimCar>,
    ball: SimBall,
    team_scores: [u32; 2],
    latest_touch: Option<Touch>,
    frame: u64,
    pause_ticks: u32,
    /// Final goal scored; counters restart at the next kickoff
    match_over: bool,
}

impl SyntheticFeed {
    pub fn new(seed: u64, players: u32) -> Self {
        let cars = (0..players)
            .map(|i| SimCar {
                team: (i % 2) as u8,
                position: Vec3::ZERO,
                velocity: Vec3::ZERO,
                yaw: 0.0,
                boost: 33.0,
                jumped: false,
                controls: ControllerState::default(),
                touches: 0,
                goals: 0,
                shots: 0,
            })
            .collect();

        let mut feed = Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            cars,
            ball: SimBall::default(),
            team_scores: [0, 0],
            latest_touch: None,
            frame: 0,
            pause_ticks: 0,
            match_over: false,
        };
        feed.kickoff();
        feed
    }

    /// Place cars on their own half and the ball at center
    fn kickoff(&mut self) {
        if self.match_over {
            info!(scores = ?self.team_scores, "Starting a new synthetic match");
            self.team_scores = [0, 0];
            for car in &mut self.cars {
                car.goals = 0;
                car.shots = 0;
                car.touches = 0;
            }
            self.latest_touch = None;
            self.match_over = false;
        }

        self.ball = SimBall {
            position: Vec3::new(0.0, 0.0, BALL_RADIUS),
            velocity: Vec3::ZERO,
        };
        for car in &mut self.cars {
            let side = if car.team == 0 { -1.0 } else { 1.0 };
            let x = self.rng.gen_range(-2000.0..2000.0);
            let y = side * self.rng.gen_range(2000.0..4000.0);
            car.position = Vec3::new(x, y, CAR_REST_Z);
            car.velocity = Vec3::ZERO;
            // Face the ball
            car.yaw = (-y).atan2(-x);
            car.boost = 33.0;
            car.jumped = false;
        }
    }

    fn seconds_elapsed(&self) -> f32 {
        self.frame as f32 * tick_delta()
    }

    /// Randomly change some controller states
    pub fn next_inputs(&mut self) -> Vec<InputChange> {
        let seconds = self.seconds_elapsed();
        let frame_num = self.frame;
        let mut changes = Vec::new();

        for (index, car) in self.cars.iter_mut().enumerate() {
            if !self.rng.gen_bool(INPUT_CHANGE_CHANCE) {
                continue;
            }
            let controller = ControllerState {
                steer: self.rng.gen_range(-1.0..=1.0),
                throttle: self.rng.gen_range(-0.2..=1.0),
                pitch: self.rng.gen_range(-1.0..=1.0),
                roll: self.rng.gen_range(-1.0..=1.0),
                jump: self.rng.gen_bool(0.1),
                boost: self.rng.gen_bool(0.3),
                handbrake: self.rng.gen_bool(0.05),
                use_item: false,
            };
            car.controls = controller;
            changes.push(InputChange {
                player_index: index as CarId,
                controller,
                seconds,
                frame_num,
            });
        }

        changes
    }

    /// Advance one tick and build its packet
    pub fn next_tick(&mut self) -> TickPacket {
        let dt = tick_delta();
        self.frame += 1;

        if self.pause_ticks > 0 {
            self.pause_ticks -= 1;
            if self.pause_ticks == 0 {
                self.kickoff();
            }
        } else {
            self.step_cars(dt);
            self.step_ball(dt);
            self.check_touches();
            self.check_goal();
        }

        self.packet()
    }

    fn step_cars(&mut self, dt: f32) {
        for car in &mut self.cars {
            let controls = car.controls;
            let on_ground = car.position.z <= CAR_REST_Z;

            car.yaw += controls.steer * CAR_TURN_RATE * dt;
            let forward = Vec3::new(car.yaw.cos(), car.yaw.sin(), 0.0);

            let boosting = controls.boost && car.boost > 0.0;
            let top_speed = if boosting { CAR_MAX_SPEED } else { CAR_DRIVE_SPEED };
            if boosting {
                car.boost = (car.boost - BOOST_USE_PER_SEC * dt).max(0.0);
            }

            if on_ground {
                let speed = car.velocity.truncate().length();
                let target = (speed + controls.throttle * CAR_ACCEL * dt).clamp(0.0, top_speed);
                car.velocity = (forward * target).with_z(car.velocity.z.max(0.0));
                if controls.jump && !car.jumped {
                    car.velocity.z = JUMP_SPEED;
                    car.jumped = true;
                }
            }

            car.velocity.z += GRAVITY * dt;
            car.position += car.velocity * dt;

            if car.position.z <= CAR_REST_Z {
                car.position.z = CAR_REST_Z;
                car.velocity.z = 0.0;
                car.jumped = false;
            }
            for axis in [0, 1] {
                let limit = if axis == 0 { SIDE_WALL_X } else { BACK_WALL_Y };
                if car.position[axis].abs() > limit {
                    car.position[axis] = car.position[axis].clamp(-limit, limit);
                    car.velocity[axis] = -car.velocity[axis];
                    car.yaw += std::f32::consts::PI;
                }
            }
        }
    }

    fn step_ball(&mut self, dt: f32) {
        let ball = &mut self.ball;
        ball.velocity.z += GRAVITY * dt;
        ball.position += ball.velocity * dt;

        if ball.position.z < BALL_RADIUS {
            ball.position.z = BALL_RADIUS;
            ball.velocity.z = -ball.velocity.z * 0.6;
        }
        if ball.position.z > CEILING_Z - BALL_RADIUS {
            ball.position.z = CEILING_Z - BALL_RADIUS;
            ball.velocity.z = -ball.velocity.z.abs();
        }
        if ball.position.x.abs() > SIDE_WALL_X - BALL_RADIUS {
            ball.position.x = ball.position.x.clamp(-SIDE_WALL_X, SIDE_WALL_X);
            ball.velocity.x = -ball.velocity.x * 0.6;
        }
        // Back walls only outside the goal mouth
        let in_mouth = ball.position.x.abs() < GOAL_HALF_WIDTH;
        if !in_mouth && ball.position.y.abs() > BACK_WALL_Y - BALL_RADIUS {
            ball.position.y = ball.position.y.clamp(-BACK_WALL_Y, BACK_WALL_Y);
            ball.velocity.y = -ball.velocity.y * 0.6;
        }
        ball.velocity *= 1.0 - 0.03 * dt;
    }

    fn check_touches(&mut self) {
        let seconds = self.seconds_elapsed();
        for (index, car) in self.cars.iter_mut().enumerate() {
            let offset = self.ball.position - car.position;
            if offset.length() > TOUCH_RADIUS {
                continue;
            }
            let push = offset.normalize_or_zero() * (car.velocity.length() * 1.5 + 500.0);
            self.ball.velocity = push;
            car.touches += 1;

            let goal_y = if car.team == 0 { BACK_WALL_Y } else { -BACK_WALL_Y };
            if (goal_y - self.ball.position.y).signum() == push.y.signum() && push.y.abs() > 1000.0 {
                car.shots += 1;
            }

            self.latest_touch = Some(Touch {
                player_index: index as CarId,
                time_seconds: seconds,
            });
            break;
        }
    }

    fn check_goal(&mut self) {
        let y = self.ball.position.y;
        if y.abs() <= BACK_WALL_Y {
            return;
        }
        // Blue (0) scores in the positive-y goal
        let scoring_team = if y > 0.0 { 0 } else { 1 };
        self.team_scores[scoring_team] += 1;

        if let Some(touch) = self.latest_touch {
            if let Some(car) = self.cars.get_mut(touch.player_index as usize) {
                if car.team as usize == scoring_team {
                    car.goals += 1;
                }
            }
        }
        debug!(scores = ?self.team_scores, "Synthetic goal");

        if self.team_scores.iter().sum::<u32>() >= GOALS_PER_MATCH {
            info!(scores = ?self.team_scores, "Synthetic match over");
            self.match_over = true;
        }

        self.pause_ticks = GOAL_PAUSE_TICKS;
    }

    fn packet(&self) -> TickPacket {
        let cars = self
            .cars
            .iter()
            .enumerate()
            .map(|(index, car)| CarInfo {
                index: index as CarId,
                team: car.team,
                score_info: ScoreInfo {
                    goals: car.goals,
                    shots: car.shots,
                    ..ScoreInfo::default()
                },
                boost: car.boost,
                is_demolished: false,
                has_wheel_contact: car.position.z <= CAR_REST_Z,
                jumped: car.jumped,
                double_jumped: false,
                physics: WirePhysics {
                    location: car.position.to_array(),
                    velocity: car.velocity.to_array(),
                    angular_velocity: [0.0, 0.0, car.controls.steer * CAR_TURN_RATE],
                    rotation: Rotator {
                        pitch: 0.0,
                        yaw: car.yaw,
                        roll: 0.0,
                    },
                },
            })
            .collect();

        TickPacket {
            is_round_active: self.pause_ticks == 0,
            frame: self.frame,
            seconds_elapsed: self.seconds_elapsed(),
            cars,
            ball: BallInfo {
                physics: WirePhysics {
                    location: self.ball.position.to_array(),
                    velocity: self.ball.velocity.to_array(),
                    ..WirePhysics::default()
                },
                latest_touch: self.latest_touch,
            },
            team_scores: self.team_scores,
        }
    }

    /// Emit packets at the simulation rate until the session goes away
    pub async fn run(
        mut self,
        cache: Arc<InputCache>,
        session_tx: mpsc::Sender<SessionInput>,
    ) -> Result<(), TransportError> {
        info!(players = self.cars.len(), "Synthetic feed started");

        let mut tick_interval = interval(Duration::from_micros(TICK_DURATION_MICROS));
        tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tick_interval.tick().await;

            for change in self.next_inputs() {
                dispatch(WireMsg::InputChange(change), &cache, &session_tx).await?;
            }
            let packet = self.next_tick();
            dispatch(WireMsg::Tick(packet), &cache, &session_tx).await?;
        }
    }
}
