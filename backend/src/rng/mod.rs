//! Seeded random number generation
//!
//! Every stochastic draw in the simulator goes through [`RngManager`], which
//! is owned by the component that samples. There is no process-wide RNG.

mod manager;

pub use manager::{RngError, RngManager};
