//! Normalized per-tick snapshots and the decoder that builds them

use glam::Vec3;

use crate::transport::protocol::{TickPacket, WirePhysics};

use super::physics::PhysicsState;
use super::CarId;

/// One player's view of a sampled tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerSnapshot {
    pub car_id: CarId,
    /// 0 = blue, 1 = orange
    pub team_num: u8,

    // Match counters (non-decreasing within a match)
    pub match_goals: u32,
    pub match_saves: u32,
    pub match_shots: u32,
    pub match_demolishes: u32,
    pub match_assists: u32,
    pub boost_pickups: u32,

    // Flags recomputed by the decoder every tick
    pub is_demoed: bool,
    pub on_ground: bool,
    pub ball_touched: bool,
    pub has_jump: bool,
    pub has_jumped: bool,
    pub has_flip: bool,
    pub has_flipped: bool,

    /// Boost in [0, 1]
    pub boost_amount: f32,
    pub car_data: PhysicsState,
    pub inverted_car_data: PhysicsState,
}

/// Score line and ball state shared by every player in a tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameScoreState {
    /// Goals per team: [blue, orange]
    pub score_line: [u32; 2],
    pub ball: PhysicsState,
    pub inverted_ball: PhysicsState,
}

impl GameScoreState {
    /// Goals scored by `team`
    pub fn team_goals(&self, team: u8) -> u32 {
        self.score_line[usize::from(team.min(1))]
    }

    /// Goals scored against `team`
    pub fn opponent_goals(&self, team: u8) -> u32 {
        self.score_line[1 - usize::from(team.min(1))]
    }
}

/// Everything decoded from one sampled tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub players: Vec<PlayerSnapshot>,
    pub game: GameScoreState,
}

/// Turns raw packets into snapshots
pub trait SnapshotDecoder: Send {
    fn decode(&mut self, packet: &TickPacket) -> Snapshot;
}

/// Decoder for the bridge's JSON tick packets.
///
/// Tracks the last seen ball touch so that `ball_touched` is raised exactly
/// once per touch, even when the touch happened on a skipped tick. Any
/// change of touch time counts as a new touch, so a game clock that
/// restarts with a new match keeps reporting touches.
#[derive(Debug, Default)]
pub struct PacketDecoder {
    last_touch_time: Option<f32>,
}

impl PacketDecoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotDecoder for PacketDecoder {
    fn decode(&mut self, packet: &TickPacket) -> Snapshot {
        let toucher = packet.ball.latest_touch.and_then(|touch| {
            let is_new = self
                .last_touch_time
                .map_or(true, |last| touch.time_seconds != last);
            if is_new {
                self.last_touch_time = Some(touch.time_seconds);
                Some(touch.player_index)
            } else {
                None
            }
        });

        let players = packet
            .cars
            .iter()
            .map(|car| {
                let car_data = decode_physics(&car.physics);
                PlayerSnapshot {
                    car_id: car.index,
                    team_num: car.team,
                    match_goals: car.score_info.goals,
                    match_saves: car.score_info.saves,
                    match_shots: car.score_info.shots,
                    match_demolishes: car.score_info.demolitions,
                    match_assists: car.score_info.assists,
                    boost_pickups: car.score_info.boost_pickups,
                    is_demoed: car.is_demolished,
                    on_ground: car.has_wheel_contact,
                    ball_touched: toucher == Some(car.index),
                    has_jump: !car.jumped,
                    has_jumped: car.jumped,
                    has_flip: !car.double_jumped,
                    has_flipped: car.double_jumped,
                    boost_amount: (car.boost / 100.0).clamp(0.0, 1.0),
                    car_data,
                    inverted_car_data: car_data.inverted(),
                }
            })
            .collect();

        let ball = decode_physics(&packet.ball.physics);
        Snapshot {
            players,
            game: GameScoreState {
                score_line: packet.team_scores,
                ball,
                inverted_ball: ball.inverted(),
            },
        }
    }
}

fn decode_physics(physics: &WirePhysics) -> PhysicsState {
    PhysicsState::from_euler(
        Vec3::from_array(physics.location),
        Vec3::from_array(physics.velocity),
        Vec3::from_array(physics.angular_velocity),
        physics.rotation.pitch,
        physics.rotation.yaw,
        physics.rotation.roll,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::protocol::{BallInfo, CarInfo, ScoreInfo, Touch};

    fn packet(touch: Option<Touch>) -> TickPacket {
        TickPacket {
            is_round_active: true,
            cars: vec![
                CarInfo {
                    index: 0,
                    team: 0,
                    boost: 50.0,
                    jumped: true,
                    score_info: ScoreInfo {
                        shots: 2,
                        ..ScoreInfo::default()
                    },
                    ..CarInfo::default()
                },
                CarInfo {
                    index: 1,
                    team: 1,
                    boost: 100.0,
                    double_jumped: true,
                    has_wheel_contact: true,
                    ..CarInfo::default()
                },
            ],
            ball: BallInfo {
                latest_touch: touch,
                ..BallInfo::default()
            },
            team_scores: [1, 3],
            ..TickPacket::default()
        }
    }

    #[test]
    fn decodes_counters_and_flags() {
        let mut decoder = PacketDecoder::new();
        let snapshot = decoder.decode(&packet(None));

        assert_eq!(snapshot.game.score_line, [1, 3]);
        let blue = &snapshot.players[0];
        assert_eq!(blue.match_shots, 2);
        assert_eq!(blue.boost_amount, 0.5);
        assert!(!blue.has_jump && blue.has_jumped);
        assert!(blue.has_flip && !blue.has_flipped);

        let orange = &snapshot.players[1];
        assert!(orange.on_ground);
        assert!(!orange.has_flip && orange.has_flipped);
        assert_eq!(orange.boost_amount, 1.0);
    }

    #[test]
    fn touch_is_reported_once() {
        let mut decoder = PacketDecoder::new();
        let touch = Some(Touch {
            player_index: 1,
            time_seconds: 12.5,
        });

        let first = decoder.decode(&packet(touch));
        assert!(!first.players[0].ball_touched);
        assert!(first.players[1].ball_touched);

        let repeat = decoder.decode(&packet(touch));
        assert!(!repeat.players[1].ball_touched);

        let newer = decoder.decode(&packet(Some(Touch {
            player_index: 0,
            time_seconds: 13.0,
        })));
        assert!(newer.players[0].ball_touched);
        assert!(!newer.players[1].ball_touched);
    }

    #[test]
    fn touch_after_clock_restart_is_reported() {
        let mut decoder = PacketDecoder::new();
        let late = decoder.decode(&packet(Some(Touch {
            player_index: 0,
            time_seconds: 250.0,
        })));
        assert!(late.players[0].ball_touched);

        // New match: the game clock starts over
        let early = decoder.decode(&packet(Some(Touch {
            player_index: 1,
            time_seconds: 4.0,
        })));
        assert!(early.players[1].ball_touched);
        assert!(!early.players[0].ball_touched);
    }

    #[test]
    fn team_goal_lookup() {
        let game = GameScoreState {
            score_line: [4, 2],
            ..GameScoreState::default()
        };
        assert_eq!(game.team_goals(0), 4);
        assert_eq!(game.opponent_goals(0), 2);
        assert_eq!(game.team_goals(1), 2);
        assert_eq!(game.opponent_goals(1), 4);
    }
}
