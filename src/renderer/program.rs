use std::collections::HashMap;

use glam::{Mat4, Vec3};

#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec3(Vec3),
    Mat4(Mat4),
    /// uploaded to `name[0]`, `name[1]`, ...
    Mat4Array(Vec<Mat4>),
}

/// A linked shader program: bind it, then set uniforms by name.
pub trait ShaderProgram {
    fn bind(&mut self);
    fn set_uniform(&mut self, name: &str, value: UniformValue);

    fn set_mat4(&mut self, name: &str, value: Mat4) {
        self.set_uniform(name, UniformValue::Mat4(value));
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.set_uniform(name, UniformValue::Vec3(value));
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.set_uniform(name, UniformValue::Float(value));
    }
}

/// Program that keeps the last value written to each uniform. Backs the headless host.
#[derive(Debug, Default)]
pub struct RecordingProgram {
    pub name: String,
    uniforms: HashMap<String, UniformValue>,
    binds: usize,
    writes: usize,
}

impl RecordingProgram {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms.get(name)
    }

    pub fn binds(&self) -> usize {
        self.binds
    }

    /// Total uniform writes, a matrix array counting once.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl ShaderProgram for RecordingProgram {
    fn bind(&mut self) {
        self.binds += 1;
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.writes += 1;
        self.uniforms.insert(name.to_string(), value);
    }
}
