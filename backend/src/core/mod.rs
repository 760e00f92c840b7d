//! Simulation time

pub mod time;
