use thiserror::Error;

use crate::grid::ItemId;
use crate::registry::ContainerId;

/// Unified result type for the stash engine.
pub type Result<T> = std::result::Result<T, InventoryError>;

/// Errors surfaced by the inventory engine.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("container `{0}` not found")]
    ContainerNotFound(ContainerId),
    #[error("container `{0}` is already registered")]
    DuplicateContainer(ContainerId),
    #[error("item `{item}` is not placed in container `{container}`")]
    ItemNotFound { item: ItemId, container: ContainerId },
    #[error("a drag session is already active")]
    DragInProgress,
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
