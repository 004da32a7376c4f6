use std::collections::{HashMap, HashSet};

use blake3::Hash;

use crate::container::{Container, Slot};
use crate::error::{InventoryError, Result};
use crate::geometry::Point;
use crate::grid::ItemId;
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};

const LOG_TARGET: &str = "stash::registry";

pub type ContainerId = String;

#[derive(Debug, Clone)]
struct ContainerEntry {
    container: Container,
    hash: Option<Hash>,
}

/// Owner of every container in play.
///
/// Registration order doubles as hit-test priority: when containers overlap
/// in pixel space the earliest registered one wins.
#[derive(Debug, Default)]
pub struct ContainerRegistry {
    entries: HashMap<ContainerId, ContainerEntry>,
    order: Vec<ContainerId>,
    dirty: HashSet<ContainerId>,
    owners: HashMap<ContainerId, ItemId>,
    logger: Option<Logger>,
}

impl ContainerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn register(&mut self, container: Container) -> Result<()> {
        let id = container.id().clone();
        if self.entries.contains_key(&id) {
            self.log(
                LogLevel::Warn,
                "duplicate_container",
                [json_kv("container", id.as_str())],
            );
            return Err(InventoryError::DuplicateContainer(id));
        }
        self.log(
            LogLevel::Debug,
            "container_registered",
            [
                json_kv("container", id.as_str()),
                json_kv("subgrids", container.subgrid_count()),
                json_kv("cells", container.total_cells()),
            ],
        );
        self.entries.insert(
            id.clone(),
            ContainerEntry {
                container,
                hash: None,
            },
        );
        self.order.push(id.clone());
        self.dirty.insert(id);
        Ok(())
    }

    pub fn unregister(&mut self, id: &str) -> Option<Container> {
        let entry = self.entries.remove(id)?;
        self.order.retain(|known| known != id);
        self.dirty.remove(id);
        self.owners.remove(id);
        self.log(
            LogLevel::Debug,
            "container_unregistered",
            [
                json_kv("container", id),
                json_kv("items", entry.container.len()),
            ],
        );
        Some(entry.container)
    }

    pub fn get(&self, id: &str) -> Option<&Container> {
        self.entries.get(id).map(|entry| &entry.container)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Container> {
        self.entries.get_mut(id).map(|entry| &mut entry.container)
    }

    pub fn require(&self, id: &str) -> Result<&Container> {
        self.get(id)
            .ok_or_else(|| InventoryError::ContainerNotFound(id.to_string()))
    }

    pub fn require_mut(&mut self, id: &str) -> Result<&mut Container> {
        self.get_mut(id)
            .ok_or_else(|| InventoryError::ContainerNotFound(id.to_string()))
    }

    pub fn ids(&self) -> &[ContainerId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Containers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Container> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id).map(|entry| &entry.container))
    }

    /// Topmost container whose pixel bounds contain the point.
    pub fn container_at(&self, point: Point) -> Option<&Container> {
        self.iter().find(|container| container.contains_pixel(point))
    }

    /// Which container holds an item, and where.
    pub fn locate_item(&self, item: &ItemId) -> Option<(&ContainerId, Slot)> {
        self.iter()
            .find_map(|container| container.placement(item).map(|(slot, _)| (container.id(), slot)))
    }

    /// Move containers to new pixel origins, e.g. after the host window was
    /// resized. Containers whose origin changed are flagged dirty; unknown ids
    /// are ignored.
    pub fn sync_origins(&mut self, origins: &HashMap<ContainerId, Point>) {
        for (id, origin) in origins {
            if let Some(entry) = self.entries.get_mut(id) {
                if entry.container.origin() != *origin {
                    entry.container.set_origin(*origin);
                    self.dirty.insert(id.clone());
                }
            }
        }
    }

    /// Record that `container` belongs to `item`, e.g. a backpack's grids.
    pub fn set_owner(&mut self, container: &str, item: impl Into<ItemId>) -> Result<()> {
        if !self.entries.contains_key(container) {
            return Err(InventoryError::ContainerNotFound(container.to_string()));
        }
        self.owners.insert(container.to_string(), item.into());
        Ok(())
    }

    pub fn owner_of(&self, container: &str) -> Option<&ItemId> {
        self.owners.get(container)
    }

    /// True when `container` lives inside `item`: owned by it, or owned by an
    /// item held somewhere inside it. Dropping `item` there would nest it
    /// into itself.
    pub fn nests_within(&self, container: &str, item: &ItemId) -> bool {
        let mut current = container;
        // Each hop moves to a distinct container unless owners form a cycle.
        for _ in 0..=self.order.len() {
            let Some(owner) = self.owners.get(current) else {
                return false;
            };
            if owner == item {
                return true;
            }
            let Some((holder, _)) = self.locate_item(owner) else {
                return false;
            };
            current = holder;
        }
        false
    }

    /// Containers whose occupancy or origin changed since the previous call, in
    /// registration order.
    pub fn take_dirty(&mut self) -> Vec<ContainerId> {
        let mut changed = Vec::new();
        for id in &self.order {
            let Some(entry) = self.entries.get_mut(id) else {
                continue;
            };
            let hash = fingerprint(&entry.container);
            let content_changed = entry.hash.map(|h| h != hash).unwrap_or(true);
            entry.hash = Some(hash);
            if content_changed || self.dirty.contains(id) {
                changed.push(id.clone());
            }
        }
        self.dirty.clear();
        changed
    }

    fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        if let Some(logger) = self.logger.as_ref() {
            let _ = logger.log_event(event_with_fields(level, LOG_TARGET, message, fields));
        }
    }
}

/// Content hash over a container's placements.
pub fn fingerprint(container: &Container) -> Hash {
    let mut hasher = blake3::Hasher::new();
    for (slot, placed) in container.placements() {
        hasher.update(placed.item.id.as_bytes());
        hasher.update(&[0]);
        hasher.update(&(slot.subgrid as u64).to_le_bytes());
        for value in [placed.grid_x, placed.grid_y, placed.width, placed.height] {
            hasher.update(&value.to_le_bytes());
        }
    }
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use crate::grid::Item;

    fn registry() -> ContainerRegistry {
        let mut registry = ContainerRegistry::new();
        registry
            .register(Container::grid("backpack", Size::new(4, 4), 10.0))
            .unwrap();
        registry
            .register(
                Container::grid("ground", Size::new(8, 8), 10.0)
                    .with_origin(Point::new(100.0, 0.0)),
            )
            .unwrap();
        registry
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut registry = registry();
        let err = registry
            .register(Container::grid("backpack", Size::new(1, 1), 10.0))
            .unwrap_err();
        assert!(matches!(err, InventoryError::DuplicateContainer(id) if id == "backpack"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn hit_test_prefers_registration_order() {
        let mut registry = registry();
        registry
            .register(
                Container::grid("overlay", Size::new(2, 2), 10.0)
                    .with_origin(Point::new(0.0, 0.0)),
            )
            .unwrap();
        let hit = registry.container_at(Point::new(5.0, 5.0)).unwrap();
        assert_eq!(hit.id(), "backpack");
        assert_eq!(
            registry.container_at(Point::new(150.0, 10.0)).map(|c| c.id().as_str()),
            Some("ground")
        );
        assert!(registry.container_at(Point::new(50.0, 50.0)).is_none());
    }

    #[test]
    fn take_dirty_tracks_occupancy_changes() {
        let mut registry = registry();
        assert_eq!(registry.take_dirty(), vec!["backpack", "ground"]);
        assert!(registry.take_dirty().is_empty());

        let ground = registry.get_mut("ground").unwrap();
        assert!(ground.place(&Item::new("ammo", 1, 1), Slot::new(0, 0, 0)));
        assert_eq!(registry.take_dirty(), vec!["ground"]);

        // Same occupancy after a round trip hashes the same.
        let ground = registry.get_mut("ground").unwrap();
        ground.remove(&"ammo".to_string());
        ground.place(&Item::new("ammo", 1, 1), Slot::new(0, 0, 0));
        assert!(registry.take_dirty().is_empty());
    }

    #[test]
    fn sync_origins_flags_moved_containers() {
        let mut registry = registry();
        registry.take_dirty();
        let mut origins = HashMap::new();
        origins.insert("ground".to_string(), Point::new(120.0, 0.0));
        origins.insert("backpack".to_string(), Point::new(0.0, 0.0));
        origins.insert("missing".to_string(), Point::new(1.0, 1.0));
        registry.sync_origins(&origins);

        assert_eq!(registry.take_dirty(), vec!["ground"]);
        assert_eq!(registry.get("ground").unwrap().origin(), Point::new(120.0, 0.0));
    }

    #[test]
    fn nesting_follows_owner_chain() {
        let mut registry = registry();
        registry
            .register(Container::grid("backpack-grid", Size::new(3, 3), 10.0))
            .unwrap();
        registry
            .register(Container::grid("pouch-grid", Size::new(1, 1), 10.0))
            .unwrap();
        registry.set_owner("backpack-grid", "backpack").unwrap();
        registry.set_owner("pouch-grid", "pouch").unwrap();
        registry
            .require_mut("backpack-grid")
            .unwrap()
            .place(&Item::new("pouch", 1, 1), Slot::new(0, 0, 0));

        let backpack = "backpack".to_string();
        assert!(registry.nests_within("backpack-grid", &backpack));
        assert!(registry.nests_within("pouch-grid", &backpack));
        assert!(!registry.nests_within("ground", &backpack));
        assert!(!registry.nests_within("backpack-grid", &"pouch".to_string()));
        assert_eq!(registry.owner_of("pouch-grid").map(String::as_str), Some("pouch"));
        assert!(matches!(
            registry.set_owner("missing", "x"),
            Err(InventoryError::ContainerNotFound(_))
        ));
    }

    #[test]
    fn owner_cycles_terminate() {
        let mut registry = registry();
        registry.set_owner("backpack", "ammo").unwrap();
        registry.set_owner("ground", "key").unwrap();
        let ground = registry.get_mut("ground").unwrap();
        ground.place(&Item::new("ammo", 1, 1), Slot::new(0, 0, 0));
        let backpack = registry.get_mut("backpack").unwrap();
        backpack.place(&Item::new("key", 1, 1), Slot::new(0, 0, 0));

        assert!(!registry.nests_within("backpack", &"rifle".to_string()));
        assert!(registry.nests_within("backpack", &"key".to_string()));
    }

    #[test]
    fn registration_is_logged() {
        let sink = crate::logging::MemorySink::new();
        let mut registry = ContainerRegistry::new().with_logger(Logger::new(sink.clone()));
        registry
            .register(Container::grid("bag", Size::new(2, 2), 10.0))
            .unwrap();
        assert!(registry
            .register(Container::grid("bag", Size::new(2, 2), 10.0))
            .is_err());
        registry.unregister("bag");

        let events = sink.events();
        assert_eq!(
            sink.messages(),
            vec!["container_registered", "duplicate_container", "container_unregistered"]
        );
        assert!(events.iter().all(|event| event.target == LOG_TARGET));
        assert_eq!(events[0].fields.get("cells"), Some(&serde_json::json!(4)));
    }

    #[test]
    fn locate_item_and_require() {
        let mut registry = registry();
        registry
            .require_mut("backpack")
            .unwrap()
            .place(&Item::new("key", 1, 1), Slot::new(0, 2, 3));
        let (id, slot) = registry.locate_item(&"key".to_string()).unwrap();
        assert_eq!(id, "backpack");
        assert_eq!(slot, Slot::new(0, 2, 3));
        assert!(matches!(
            registry.require("stash"),
            Err(InventoryError::ContainerNotFound(_))
        ));
        assert!(registry.unregister("backpack").is_some());
        assert_eq!(registry.ids(), ["ground".to_string()]);
    }
}
