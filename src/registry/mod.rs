//! Container ownership, pixel hit-testing and dirty tracking.

mod core;

pub use core::{ContainerId, ContainerRegistry, fingerprint};
