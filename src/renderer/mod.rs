pub mod bones;
pub mod drawable;
pub mod program;
