use std::f32::consts::PI;

use glam::{Mat4, Quat, Vec3};

/// Ping-pong mover: `start` to `end` in `leg_duration` seconds and back again, bobbing
/// vertically along the way. The heading flips a half turn for the return leg.
#[derive(Debug, Clone, PartialEq)]
pub struct SwimPath {
    pub start: Vec3,
    pub end: Vec3,
    pub leg_duration: f32,
    pub amplitude: f32,
    pub scale: f32,
    /// extra yaw applied to the model, in degrees
    pub heading_offset: f32,
}

impl SwimPath {
    /// Returns the path parameter in [0, 1] and whether the mover is on the outbound leg.
    pub fn progress(&self, seconds: f32) -> (f32, bool) {
        if self.leg_duration <= f32::EPSILON {
            return (0.0, true);
        }
        let cycle = seconds.max(0.0).rem_euclid(self.leg_duration * 2.0);
        let outbound = cycle <= self.leg_duration;
        let t = cycle / self.leg_duration;
        (if outbound { t } else { 2.0 - t }, outbound)
    }

    pub fn position_at(&self, seconds: f32) -> Vec3 {
        let (t, _) = self.progress(seconds);
        let mut position = self.start.lerp(self.end, t);
        position.y += self.amplitude * (PI * t).sin();
        position
    }

    pub fn transform_at(&self, seconds: f32) -> Mat4 {
        let (_, outbound) = self.progress(seconds);
        let turn = if outbound { 0.0 } else { PI };
        Mat4::from_translation(self.position_at(seconds))
            * Mat4::from_quat(Quat::from_rotation_y(turn + self.heading_offset.to_radians()))
            * Mat4::from_scale(Vec3::splat(self.scale))
    }
}
