//! Grid inventory engine for extraction-style loot screens.
//!
//! Containers are built from irregular cell-group layouts, hold items on
//! occupancy grids, and exchange items through a single drag-and-drop
//! coordinator. Rendering is left to the host; the crate only answers where
//! things are and whether they fit.

pub mod config;
pub mod container;
pub mod drag;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod input;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod registry;

pub use config::{ContainerSpec, DEFAULT_CELL_SIZE, EngineConfig};
pub use container::{AcceptRules, Container, Slot};
pub use drag::{
    DragConfig, DragCoordinator, DragEvent, DragPhase, DragSession, DragTransition, DropTarget,
};
pub use error::{InventoryError, Result};
pub use geometry::{Point, Position, Rect, Size};
pub use grid::{GridMode, Item, ItemId, OccupancyGrid, PlacedItem};
pub use layout::{CellGroupEntry, LayoutRect, SubColumn, synthesize};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink,
};
pub use metrics::{InventoryMetrics, MetricSnapshot};
pub use registry::{ContainerId, ContainerRegistry};
