pub mod animator;
pub mod camera;
pub mod frame;
pub mod input;
pub mod pose;
pub mod swim_path;
