//! Facing and gravity math for the player body.
//!
//! Angles are yaw degrees about the vertical axis, `0` facing `+z` and `90`
//! facing `+x`.

use glam::Vec3;

/// Smallest smoothing time accepted by [`smooth_damp`].
const MIN_SMOOTH_TIME: f32 = 1e-4;

/// Height of the ground plane.
pub const GROUND_HEIGHT: f32 = 0.0;

/// Shortest signed difference from `current` to `target`, in `(-180, 180]`.
#[must_use]
pub fn delta_angle(current: f32, target: f32) -> f32 {
    let delta = (target - current).rem_euclid(360.0);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}

/// Critically damped spring toward `target`.
///
/// `velocity` carries state between calls. The result never overshoots
/// `target`.
#[must_use]
pub fn smooth_damp(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, dt: f32) -> f32 {
    let smooth_time = smooth_time.max(MIN_SMOOTH_TIME);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * decay;
    let mut output = target + (change + temp) * decay;

    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = if dt > 0.0 { (output - target) / dt } else { 0.0 };
    }
    output
}

/// [`smooth_damp`] along the shortest way around the circle.
#[must_use]
pub fn smooth_damp_angle(
    current: f32,
    target: f32,
    velocity: &mut f32,
    smooth_time: f32,
    dt: f32,
) -> f32 {
    let target = current + delta_angle(current, target);
    smooth_damp(current, target, velocity, smooth_time, dt)
}

/// Moves `current` toward `target` by fraction `t` along the shortest arc.
#[must_use]
pub fn lerp_angle(current: f32, target: f32, t: f32) -> f32 {
    current + delta_angle(current, target) * t.clamp(0.0, 1.0)
}

/// Yaw that faces from `from` toward `to` in the horizontal plane.
#[must_use]
pub fn bearing(from: Vec3, to: Vec3) -> f32 {
    let offset = to - from;
    offset.x.atan2(offset.z).to_degrees()
}

/// Horizontal unit vector for a yaw in degrees.
#[must_use]
pub fn yaw_direction(yaw: f32) -> Vec3 {
    let radians = yaw.to_radians();
    Vec3::new(radians.sin(), 0.0, radians.cos())
}

/// Vertical motion under constant gravity with a flat ground plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalMotion {
    velocity: f32,
    grounded: bool,
}

impl VerticalMotion {
    /// Starts airborne with zero velocity.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            velocity: 0.0,
            grounded: false,
        }
    }

    /// Current vertical velocity.
    #[must_use]
    pub const fn velocity(&self) -> f32 {
        self.velocity
    }

    /// True if the last step ended on the ground.
    #[must_use]
    pub const fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Applies one tick of gravity to `position.y`.
    ///
    /// While grounded and falling, velocity is pinned to `grounded_velocity`
    /// before integration.
    pub fn apply(&mut self, position: &mut Vec3, gravity: f32, grounded_velocity: f32, dt: f32) {
        if self.grounded && self.velocity < 0.0 {
            self.velocity = grounded_velocity;
        }
        self.velocity += gravity * dt;
        position.y += self.velocity * dt;

        if position.y <= GROUND_HEIGHT {
            position.y = GROUND_HEIGHT;
            self.grounded = true;
        } else {
            self.grounded = false;
        }
    }

    /// Forgets accumulated velocity (after a teleport).
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for VerticalMotion {
    fn default() -> Self {
        Self::new()
    }
}
