pub mod config;
pub mod error;
pub mod logging;
pub mod renderer;
pub mod resource_system;
pub mod scene;
pub mod sim;
