//! Car and ball physics state plus arena constants

use glam::{Mat3, Vec3};

/// Ball radius in unreal units
pub const BALL_RADIUS: f32 = 92.75;
/// Maximum car speed (supersonic cap)
pub const CAR_MAX_SPEED: f32 = 2300.0;
/// Maximum ball speed
pub const BALL_MAX_SPEED: f32 = 6000.0;
/// Maximum car angular velocity (rad/s)
pub const CAR_MAX_ANG_VEL: f32 = 5.5;

pub const SIDE_WALL_X: f32 = 4096.0;
pub const BACK_WALL_Y: f32 = 5120.0;
pub const CEILING_Z: f32 = 2044.0;
pub const BACK_NET_Y: f32 = 6000.0;
pub const GOAL_HEIGHT: f32 = 642.775;

/// Back of the orange net (the goal team 0 attacks)
pub const ORANGE_GOAL_BACK: Vec3 = Vec3::new(0.0, BACK_NET_Y, GOAL_HEIGHT / 2.0);
/// Back of the blue net (the goal team 1 attacks)
pub const BLUE_GOAL_BACK: Vec3 = Vec3::new(0.0, -BACK_NET_Y, GOAL_HEIGHT / 2.0);

/// Physical state of a car or the ball for one decoded tick.
///
/// `rotation` columns are the forward, right and up unit vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsState {
    pub position: Vec3,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub rotation: Mat3,
}

impl Default for PhysicsState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            rotation: Mat3::IDENTITY,
        }
    }
}

impl PhysicsState {
    /// Build a state from game-reported euler angles (radians)
    pub fn from_euler(
        position: Vec3,
        linear_velocity: Vec3,
        angular_velocity: Vec3,
        pitch: f32,
        yaw: f32,
        roll: f32,
    ) -> Self {
        Self {
            position,
            linear_velocity,
            angular_velocity,
            rotation: euler_to_rotation(pitch, yaw, roll),
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation.x_axis
    }

    pub fn up(&self) -> Vec3 {
        self.rotation.z_axis
    }

    /// Mirror the state into the other team's frame (x and y negated)
    #[must_use]
    pub fn inverted(mut self) -> Self {
        const INVERT_SCALE: Vec3 = Vec3::new(-1.0, -1.0, 1.0);

        self.position *= INVERT_SCALE;
        self.linear_velocity *= INVERT_SCALE;
        self.angular_velocity *= INVERT_SCALE;
        self.rotation = Mat3::from_cols(
            self.rotation.x_axis * INVERT_SCALE,
            self.rotation.y_axis * INVERT_SCALE,
            self.rotation.z_axis * INVERT_SCALE,
        );

        self
    }
}

/// Rotation matrix for the game's pitch/yaw/roll convention
pub fn euler_to_rotation(pitch: f32, yaw: f32, roll: f32) -> Mat3 {
    let (sp, cp) = pitch.sin_cos();
    let (sy, cy) = yaw.sin_cos();
    let (sr, cr) = roll.sin_cos();

    let forward = Vec3::new(cp * cy, cp * sy, sp);
    let right = Vec3::new(cy * sp * sr - cr * sy, sy * sp * sr + cr * cy, -cp * sr);
    let up = Vec3::new(-cr * cy * sp - sr * sy, -cr * sy * sp + sr * cy, cp * cr);

    Mat3::from_cols(forward, right, up)
}

/// Unit vector pointing from `from` to `to`.
/// Returns None when the two points coincide.
pub fn direction(from: Vec3, to: Vec3) -> Option<Vec3> {
    (to - from).try_normalize()
}
