//! Error module orchestrator.
//!
//! Placement and collision failures are plain `bool`/`Option` returns on the
//! grid and container APIs; only precondition and configuration failures are
//! surfaced through [`InventoryError`].

mod types;

pub use types::{InventoryError, Result};
