use crate::container::Slot;
use crate::geometry::{Point, Position};
use crate::grid::{Item, ItemId};
use crate::registry::ContainerId;

/// Pointer-level input accepted by [`DragCoordinator::submit`](super::DragCoordinator::submit).
#[derive(Debug, Clone, PartialEq)]
pub enum DragEvent {
    /// Pick up `item` from `container` with the pointer at `pointer`.
    Start {
        item: ItemId,
        container: ContainerId,
        pointer: Point,
    },
    /// Pointer sample while dragging.
    Move { pointer: Point },
    /// Turn the in-flight item a quarter.
    Rotate,
    /// Release over the current target.
    Drop,
    /// Abort and send the item home.
    Cancel,
}

/// Coordinator phase. `Committing` and `Reverting` only exist while a drop or
/// cancel is being resolved inside `submit`; callers observe `Idle` or
/// `Dragging`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Dragging,
    Committing,
    Reverting,
}

impl DragPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            DragPhase::Idle => "idle",
            DragPhase::Dragging => "dragging",
            DragPhase::Committing => "committing",
            DragPhase::Reverting => "reverting",
        }
    }
}

/// Where the in-flight item would land if dropped now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTarget {
    pub container: ContainerId,
    /// Container cell the item's top-left corner would occupy.
    pub cell: Position,
    /// Subgrid position of `cell`, if it falls inside a subgrid.
    pub slot: Option<Slot>,
    pub valid: bool,
}

/// State of the single in-flight drag.
#[derive(Debug, Clone)]
pub struct DragSession {
    pub(super) original: Item,
    pub(super) item: Item,
    pub(super) source: ContainerId,
    pub(super) origin: Slot,
    pub(super) pointer: Point,
    pub(super) grab: (u16, u16),
    pub(super) rotated: bool,
    pub(super) target: Option<DropTarget>,
}

impl DragSession {
    /// The item as currently oriented.
    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn source(&self) -> &ContainerId {
        &self.source
    }

    /// Slot the item was lifted from.
    pub fn origin(&self) -> Slot {
        self.origin
    }

    pub fn pointer(&self) -> Point {
        self.pointer
    }

    /// Item-relative cell held by the pointer.
    pub fn grab(&self) -> (u16, u16) {
        self.grab
    }

    pub fn is_rotated(&self) -> bool {
        self.rotated
    }

    pub fn target(&self) -> Option<&DropTarget> {
        self.target.as_ref()
    }

    pub fn is_valid_placement(&self) -> bool {
        self.target.as_ref().is_some_and(|target| target.valid)
    }

    pub(super) fn rotate(&mut self) {
        self.item = self.item.rotated();
        self.grab = (self.grab.1, self.grab.0);
        self.rotated = !self.rotated;
    }
}

/// Result of one submitted event.
#[derive(Debug, Clone, PartialEq)]
pub enum DragTransition {
    /// The event has no meaning in the current phase.
    Ignored,
    Started {
        item: ItemId,
        source: ContainerId,
    },
    /// Re-evaluated target after a move or rotation; `None` when the pointer
    /// is over no container.
    Hover(Option<DropTarget>),
    Committed {
        item: ItemId,
        container: ContainerId,
        slot: Slot,
        repositioned: bool,
    },
    /// Item returned to its source; `original` is false when its old slot was
    /// gone and a fallback slot was used.
    Reverted {
        item: ItemId,
        container: ContainerId,
        slot: Slot,
        original: bool,
    },
    /// The source could not take the item back. Ownership passes to the
    /// caller, which must re-home it.
    Lost { item: Item, source: ContainerId },
}
