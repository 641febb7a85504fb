//! Application layer - services and the ports they require

pub mod ports;
pub mod services;
