//! Drag-and-drop state machine moving items between registered containers.
//!
//! The coordinator never owns containers: every event is applied against a
//! `&mut ContainerRegistry` handed in by the caller. While a drag is active the
//! in-flight item lives in the session, not in any grid.

mod coordinator;
mod session;

pub use coordinator::{DragConfig, DragCoordinator};
pub use session::{DragEvent, DragPhase, DragSession, DragTransition, DropTarget};
