//! Infrastructure - concrete adapters for remote services and local storage

pub mod config;
pub mod pptx;
pub mod providers;
pub mod renderer;
pub mod workspace;
