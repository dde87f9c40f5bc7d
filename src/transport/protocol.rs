//! Wire message definitions for the game-side bridge.
//! Each message is one JSON object per line, tagged by `type`.

use serde::{Deserialize, Serialize};

use crate::game::{CarId, ControlInputRecord};

/// Messages delivered by the game bridge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireMsg {
    /// Raw world state for one simulation tick
    Tick(TickPacket),

    /// A player's controller state changed
    InputChange(InputChange),

    /// Clear statistics and reward component state
    Reset,
}

/// Raw per-tick world packet
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TickPacket {
    /// False during kickoff countdowns and goal replays
    pub is_round_active: bool,
    /// Game frame number
    #[serde(default)]
    pub frame: u64,
    /// Seconds elapsed in game time
    #[serde(default)]
    pub seconds_elapsed: f32,
    pub cars: Vec<CarInfo>,
    pub ball: BallInfo,
    /// Goals per team: [blue, orange]
    #[serde(default)]
    pub team_scores: [u32; 2],
}

/// Raw car state
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CarInfo {
    /// Player index, stable for the session
    pub index: CarId,
    /// 0 = blue, 1 = orange
    pub team: u8,
    #[serde(default)]
    pub score_info: ScoreInfo,
    /// Boost in game units (0-100)
    #[serde(default)]
    pub boost: f32,
    #[serde(default)]
    pub is_demolished: bool,
    #[serde(default)]
    pub has_wheel_contact: bool,
    #[serde(default)]
    pub jumped: bool,
    #[serde(default)]
    pub double_jumped: bool,
    pub physics: WirePhysics,
}

/// Match counters reported for a car
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreInfo {
    pub goals: u32,
    pub saves: u32,
    pub shots: u32,
    pub demolitions: u32,
    pub assists: u32,
    pub boost_pickups: u32,
}

/// Raw ball state
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BallInfo {
    pub physics: WirePhysics,
    /// Most recent touch, if the ball has been touched this match
    #[serde(default)]
    pub latest_touch: Option<Touch>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Touch {
    pub player_index: CarId,
    /// Game time of the touch
    pub time_seconds: f32,
}

/// Physics as reported on the wire
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WirePhysics {
    pub location: [f32; 3],
    pub velocity: [f32; 3],
    pub angular_velocity: [f32; 3],
    pub rotation: Rotator,
}

/// Euler angles in radians
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Rotator {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

/// Controller change notification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputChange {
    pub player_index: CarId,
    pub controller: ControllerState,
    /// Game time of the change
    #[serde(default)]
    pub seconds: f32,
    #[serde(default)]
    pub frame_num: u64,
}

/// Controller state carried by an input change
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerState {
    /// -1.0 = full left, 1.0 = full right
    pub steer: f32,
    /// -1.0 = full reverse, 1.0 = full forward
    pub throttle: f32,
    pub pitch: f32,
    pub roll: f32,
    pub jump: bool,
    pub boost: bool,
    pub handbrake: bool,
    pub use_item: bool,
}

impl From<ControllerState> for ControlInputRecord {
    fn from(c: ControllerState) -> Self {
        Self {
            steer: c.steer,
            throttle: c.throttle,
            pitch: c.pitch,
            roll: c.roll,
            jump: c.jump,
            boost: c.boost,
            handbrake: c.handbrake,
            use_item: c.use_item,
        }
    }
}
