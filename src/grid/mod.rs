//! Occupancy grids: the per-cell record of which item covers what.

mod core;

pub use core::{
    GridMode, Item, ItemId, OccupancyGrid, PlacedItem, cell_to_pixel, pixel_to_cell,
};
