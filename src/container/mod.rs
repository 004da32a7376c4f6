//! Containers: one or more occupancy grids addressed as a single unit.

mod core;

pub use core::{AcceptRules, Container, Slot};
