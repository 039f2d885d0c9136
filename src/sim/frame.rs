use glam::{Mat4, Vec3};

use super::camera::Camera;

/// Everything one frame's update and draw calls need, passed explicitly instead of living
/// in globals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    pub frame_index: u64,
    /// seconds since the previous frame
    pub delta_time: f32,
    /// seconds since the first frame
    pub time_since_start: f32,
    pub view: Mat4,
    pub projection: Mat4,
    pub view_position: Vec3,
}

impl FrameContext {
    pub fn with_camera(mut self, camera: &Camera, aspect: f32) -> Self {
        self.view = camera.view_matrix();
        self.projection = camera.projection_matrix(aspect);
        self.view_position = camera.position;
        self
    }
}

#[derive(Debug, Default, Clone)]
pub struct FrameClock {
    start: Option<f64>,
    last: f64,
    frame_index: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// `now` is any monotonic-ish clock in seconds. The first tick has zero delta, and a clock
    /// that goes backwards yields zero delta rather than a negative one.
    pub fn tick(&mut self, now: f64) -> FrameContext {
        let start = *self.start.get_or_insert(now);
        let delta_time = if self.frame_index == 0 {
            0.0
        } else {
            (now - self.last).max(0.0) as f32
        };
        self.last = now;
        let frame_index = self.frame_index;
        self.frame_index += 1;

        FrameContext {
            frame_index,
            delta_time,
            time_since_start: (now - start).max(0.0) as f32,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            view_position: Vec3::ZERO,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frame_index
    }
}
