use std::sync::{Arc, Mutex};

use serde_json::Value;

use super::session::{DragEvent, DragPhase, DragSession, DragTransition, DropTarget};
use crate::container::Slot;
use crate::error::{InventoryError, Result};
use crate::geometry::{Point, Position};
use crate::grid::ItemId;
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};
use crate::metrics::InventoryMetrics;
use crate::registry::{ContainerId, ContainerRegistry};

/// Configuration for a [`DragCoordinator`].
#[derive(Clone)]
pub struct DragConfig {
    /// Optional structured logger for drag transitions.
    pub logger: Option<Logger>,
    /// Shared counters; `None` disables collection.
    pub metrics: Option<Arc<Mutex<InventoryMetrics>>>,
    /// Target field for transition events.
    pub log_target: String,
    /// Target field used when emitting metrics snapshots.
    pub metrics_target: String,
    /// Whether `Rotate` turns the in-flight item.
    pub allow_rotation: bool,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            logger: None,
            metrics: None,
            log_target: "stash::drag".to_string(),
            metrics_target: "stash::drag.metrics".to_string(),
            allow_rotation: true,
        }
    }
}

impl DragConfig {
    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(InventoryMetrics::new())));
        }
    }

    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    /// Access the shared metrics handle if metrics are enabled.
    pub fn metrics_handle(&self) -> Option<Arc<Mutex<InventoryMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }
}

/// Single owner of the in-flight drag.
///
/// At most one session exists at a time. Every path out of `Dragging` ends in
/// `Idle` with the item either placed in a container or handed back to the
/// caller as [`DragTransition::Lost`].
#[derive(Default)]
pub struct DragCoordinator {
    config: DragConfig,
    session: Option<DragSession>,
}

impl DragCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DragConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    pub fn config(&self) -> &DragConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut DragConfig {
        &mut self.config
    }

    pub fn phase(&self) -> DragPhase {
        if self.session.is_some() {
            DragPhase::Dragging
        } else {
            DragPhase::Idle
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Apply one event against the registry.
    pub fn submit(
        &mut self,
        registry: &mut ContainerRegistry,
        event: DragEvent,
    ) -> Result<DragTransition> {
        match event {
            DragEvent::Start {
                item,
                container,
                pointer,
            } => self.start(registry, &item, &container, pointer),
            DragEvent::Move { pointer } => Ok(self.update(registry, pointer)),
            DragEvent::Rotate => Ok(self.rotate(registry)),
            DragEvent::Drop => Ok(self.release(registry)),
            DragEvent::Cancel => Ok(self.cancel(registry)),
        }
    }

    /// Lift `item` out of `container`. The item leaves the grid immediately.
    pub fn start(
        &mut self,
        registry: &mut ContainerRegistry,
        item: &ItemId,
        container: &ContainerId,
        pointer: Point,
    ) -> Result<DragTransition> {
        if self.session.is_some() {
            return Err(InventoryError::DragInProgress);
        }
        let source = registry.require_mut(container)?;
        let not_found = || InventoryError::ItemNotFound {
            item: item.clone(),
            container: container.clone(),
        };

        let (origin, footprint) = source
            .placement(item)
            .map(|(slot, placed)| (slot, (placed.width, placed.height)))
            .ok_or_else(not_found)?;
        let grab = source
            .slot_cell(origin)
            .map(|anchor| {
                let cell = source.cell_at_pixel(pointer);
                (
                    grab_offset(cell.x.saturating_sub(anchor.x), footprint.0),
                    grab_offset(cell.y.saturating_sub(anchor.y), footprint.1),
                )
            })
            .unwrap_or((0, 0));
        let (_, placed) = source.remove(item).ok_or_else(not_found)?;

        self.session = Some(DragSession {
            original: placed.item.clone(),
            item: placed.item,
            source: container.clone(),
            origin,
            pointer,
            grab,
            rotated: false,
            target: None,
        });

        self.with_metrics(InventoryMetrics::record_drag_started);
        self.log_phase(DragPhase::Idle, DragPhase::Dragging);
        self.log(
            LogLevel::Info,
            "drag_started",
            [
                json_kv("item", item.as_str()),
                json_kv("container", container.as_str()),
                json_kv("subgrid", origin.subgrid),
                json_kv("x", origin.x),
                json_kv("y", origin.y),
            ],
        );

        Ok(DragTransition::Started {
            item: item.clone(),
            source: container.clone(),
        })
    }

    /// Follow the pointer and re-evaluate the drop target.
    pub fn update(&mut self, registry: &ContainerRegistry, pointer: Point) -> DragTransition {
        let Some(mut session) = self.session.take() else {
            return self.ignored("move");
        };
        session.pointer = pointer;
        session.target = evaluate(registry, &session);
        let transition = self.hover(&session);
        self.session = Some(session);
        transition
    }

    /// Turn the in-flight item a quarter and re-evaluate under the same pointer.
    pub fn rotate(&mut self, registry: &ContainerRegistry) -> DragTransition {
        let Some(mut session) = self.session.take() else {
            return self.ignored("rotate");
        };
        if !self.config.allow_rotation {
            self.session = Some(session);
            return self.ignored("rotate");
        }
        session.rotate();
        session.target = evaluate(registry, &session);
        self.log(
            LogLevel::Debug,
            "drag_rotated",
            [
                json_kv("item", session.item.id.as_str()),
                json_kv("width", session.item.width),
                json_kv("height", session.item.height),
            ],
        );
        let transition = self.hover(&session);
        self.session = Some(session);
        transition
    }

    /// Drop onto the last evaluated target, reverting when it is invalid.
    pub fn release(&mut self, registry: &mut ContainerRegistry) -> DragTransition {
        let Some(session) = self.session.take() else {
            return self.ignored("drop");
        };
        let destination = session
            .target
            .as_ref()
            .filter(|target| target.valid)
            .and_then(|target| target.slot.map(|slot| (target.container.clone(), slot)));
        let Some((container, slot)) = destination else {
            self.log_phase(DragPhase::Dragging, DragPhase::Reverting);
            return self.revert(registry, session);
        };

        self.log_phase(DragPhase::Dragging, DragPhase::Committing);
        let placed = registry
            .get_mut(&container)
            .is_some_and(|target| target.place(&session.item, slot));
        if !placed {
            self.log(
                LogLevel::Warn,
                "commit_rejected",
                [
                    json_kv("item", session.item.id.as_str()),
                    json_kv("container", container.as_str()),
                ],
            );
            self.log_phase(DragPhase::Committing, DragPhase::Reverting);
            return self.revert(registry, session);
        }

        let repositioned = container == session.source;
        self.with_metrics(|metrics| metrics.record_commit(repositioned));
        self.log_phase(DragPhase::Committing, DragPhase::Idle);
        self.log(
            LogLevel::Info,
            "drag_committed",
            slot_fields(&session.item.id, &container, slot).chain([
                json_kv("repositioned", repositioned),
                json_kv("rotated", session.rotated),
            ]),
        );
        DragTransition::Committed {
            item: session.item.id,
            container,
            slot,
            repositioned,
        }
    }

    /// Abort the drag and send the item back to its source.
    pub fn cancel(&mut self, registry: &mut ContainerRegistry) -> DragTransition {
        let Some(session) = self.session.take() else {
            return self.ignored("cancel");
        };
        self.log_phase(DragPhase::Dragging, DragPhase::Reverting);
        self.revert(registry, session)
    }

    /// Emit the current metrics snapshot through the logger, if both exist.
    pub fn emit_metrics_snapshot(&self) {
        if let (Some(logger), Some(metrics)) =
            (self.config.logger.as_ref(), self.config.metrics.as_ref())
        {
            if let Ok(guard) = metrics.lock() {
                let event = guard.snapshot().to_log_event(&self.config.metrics_target);
                let _ = logger.log_event(event);
            }
        }
    }

    fn revert(&mut self, registry: &mut ContainerRegistry, session: DragSession) -> DragTransition {
        let DragSession {
            original,
            source,
            origin,
            ..
        } = session;
        let restored = registry.get_mut(&source).and_then(|container| {
            if container.place(&original, origin) {
                return Some((origin, true));
            }
            let slot = container.find_placement_position(&original)?;
            container.place(&original, slot).then_some((slot, false))
        });
        self.log_phase(DragPhase::Reverting, DragPhase::Idle);

        match restored {
            Some((slot, at_origin)) => {
                self.with_metrics(InventoryMetrics::record_revert);
                self.log(
                    LogLevel::Info,
                    "drag_reverted",
                    slot_fields(&original.id, &source, slot)
                        .chain([json_kv("original_slot", at_origin)]),
                );
                DragTransition::Reverted {
                    item: original.id,
                    container: source,
                    slot,
                    original: at_origin,
                }
            }
            None => {
                self.with_metrics(InventoryMetrics::record_lost);
                self.log(
                    LogLevel::Error,
                    "item_lost",
                    [
                        json_kv("item", original.id.as_str()),
                        json_kv("source", source.as_str()),
                        json_kv("width", original.width),
                        json_kv("height", original.height),
                    ],
                );
                DragTransition::Lost {
                    item: original,
                    source,
                }
            }
        }
    }

    fn hover(&self, session: &DragSession) -> DragTransition {
        self.with_metrics(InventoryMetrics::record_hover_check);
        if let Some(target) = session.target.as_ref() {
            self.log(
                LogLevel::Trace,
                "drag_hover",
                [
                    json_kv("item", session.item.id.as_str()),
                    json_kv("container", target.container.as_str()),
                    json_kv("col", target.cell.x),
                    json_kv("row", target.cell.y),
                    json_kv("valid", target.valid),
                ],
            );
        }
        DragTransition::Hover(session.target.clone())
    }

    fn ignored(&self, event: &str) -> DragTransition {
        self.log(
            LogLevel::Debug,
            "drag_event_ignored",
            [
                json_kv("event", event),
                json_kv("phase", self.phase().as_str()),
            ],
        );
        DragTransition::Ignored
    }

    fn with_metrics(&self, record: impl FnOnce(&mut InventoryMetrics)) {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                record(&mut guard);
            }
        }
    }

    fn log_phase(&self, from: DragPhase, to: DragPhase) {
        self.log(
            LogLevel::Debug,
            "drag_phase",
            [json_kv("from", from.as_str()), json_kv("to", to.as_str())],
        );
    }

    fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        if let Some(logger) = self.config.logger.as_ref() {
            if !logger.enabled(level) {
                return;
            }
            let event = event_with_fields(level, &self.config.log_target, message, fields);
            let _ = logger.log_event(event);
        }
    }
}

/// Where the item would land under the session's pointer. Slot containers
/// ignore the grab cell since the whole item sits in their single cell.
fn evaluate(registry: &ContainerRegistry, session: &DragSession) -> Option<DropTarget> {
    let container = registry.container_at(session.pointer)?;
    let cell = container.cell_at_pixel(session.pointer);
    let anchor = if container.is_slot() {
        cell
    } else {
        Position::new(
            cell.x.saturating_sub(i32::from(session.grab.0)),
            cell.y.saturating_sub(i32::from(session.grab.1)),
        )
    };
    let slot = container.locate(anchor.x, anchor.y);
    let valid = slot.is_some_and(|slot| container.can_place(&session.item, slot))
        && !registry.nests_within(container.id(), &session.item.id);
    Some(DropTarget {
        container: container.id().clone(),
        cell: anchor,
        slot,
        valid,
    })
}

fn grab_offset(delta: i32, extent: u16) -> u16 {
    delta.clamp(0, i32::from(extent.saturating_sub(1))) as u16
}

fn slot_fields(
    item: &ItemId,
    container: &ContainerId,
    slot: Slot,
) -> impl Iterator<Item = (String, Value)> {
    [
        json_kv("item", item.as_str()),
        json_kv("container", container.as_str()),
        json_kv("subgrid", slot.subgrid),
        json_kv("x", slot.x),
        json_kv("y", slot.y),
    ]
    .into_iter()
}
