//! Layout synthesis for irregular containers.
//!
//! Downstream modules import layout types from here while the implementation
//! details live in the private `core` module.

mod core;

pub use core::{
    CellGroupEntry, LayoutRect, SubColumn, bounds, first_overlap, synthesize, total_cells,
};
