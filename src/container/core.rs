use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Position, Size};
use crate::grid::{GridMode, Item, ItemId, OccupancyGrid, PlacedItem, cell_to_pixel, pixel_to_cell};
use crate::layout::{self, LayoutRect};
use crate::registry::ContainerId;

/// Admission filters applied before any geometry check.
///
/// The category reject list always wins. A non-empty `accept_ids` list then
/// decides on its own (accessory mounts take specific items); otherwise an
/// empty `accept` list admits every category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptRules {
    #[serde(default)]
    pub accept: Vec<String>,
    #[serde(default)]
    pub reject: Vec<String>,
    #[serde(default)]
    pub accept_ids: Vec<ItemId>,
}

impl AcceptRules {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn only<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            accept: categories.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Admit exactly the listed item ids.
    pub fn only_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ItemId>,
    {
        Self {
            accept_ids: ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn rejecting<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reject.extend(categories.into_iter().map(Into::into));
        self
    }

    pub fn accepts(&self, item: &Item) -> bool {
        let category = item.category.as_deref();
        if let Some(category) = category {
            if self.reject.iter().any(|rejected| rejected == category) {
                return false;
            }
        }
        if !self.accept_ids.is_empty() {
            return self.accept_ids.contains(&item.id);
        }
        if self.accept.is_empty() {
            return true;
        }
        category.is_some_and(|category| self.accept.iter().any(|accepted| accepted == category))
    }
}

/// Position inside a container: which subgrid, and the cell within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    pub subgrid: usize,
    pub x: u16,
    pub y: u16,
}

impl Slot {
    pub const fn new(subgrid: usize, x: u16, y: u16) -> Self {
        Self { subgrid, x, y }
    }
}

#[derive(Debug, Clone)]
struct Subgrid {
    area: LayoutRect,
    grid: OccupancyGrid,
}

/// Addressable container made of one or more disjoint occupancy grids.
///
/// Each subgrid sits at its layout rectangle's offset inside the container's
/// cell space; an item always lives entirely inside a single subgrid.
#[derive(Debug, Clone)]
pub struct Container {
    id: ContainerId,
    origin: Point,
    cell_size: f32,
    rules: AcceptRules,
    subgrids: Vec<Subgrid>,
}

impl Container {
    /// Plain rectangular container.
    pub fn grid(id: impl Into<ContainerId>, size: Size, cell_size: f32) -> Self {
        Self::from_layout(id, &[], size, cell_size)
    }

    /// Container whose regions come from a synthesized layout. An empty
    /// layout falls back to one `fallback`-sized region. Rectangles must be
    /// pairwise disjoint; config loading rejects overlapping ones.
    pub fn from_layout(
        id: impl Into<ContainerId>,
        rects: &[LayoutRect],
        fallback: Size,
        cell_size: f32,
    ) -> Self {
        debug_assert!(layout::first_overlap(rects).is_none(), "overlapping subgrids");
        let areas = if rects.is_empty() {
            vec![LayoutRect::new(fallback.width, fallback.height, 0, 0)]
        } else {
            rects.to_vec()
        };
        let subgrids = areas
            .into_iter()
            .map(|area| Subgrid {
                area,
                grid: OccupancyGrid::new(area.width, area.height, cell_size),
            })
            .collect();
        Self {
            id: id.into(),
            origin: Point::default(),
            cell_size,
            rules: AcceptRules::any(),
            subgrids,
        }
    }

    /// Equipment slot holding a single item regardless of its size.
    pub fn slot(id: impl Into<ContainerId>, cell_size: f32) -> Self {
        Self {
            id: id.into(),
            origin: Point::default(),
            cell_size,
            rules: AcceptRules::any(),
            subgrids: vec![Subgrid {
                area: LayoutRect::new(1, 1, 0, 0),
                grid: OccupancyGrid::with_mode(1, 1, cell_size, GridMode::Slot),
            }],
        }
    }

    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_rules(mut self, rules: AcceptRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn id(&self) -> &ContainerId {
        &self.id
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Reposition the container in pixel space (e.g. after a window resize).
    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// True for single-item equipment slots.
    pub fn is_slot(&self) -> bool {
        matches!(self.subgrids.as_slice(), [only] if only.grid.mode() == GridMode::Slot)
    }

    pub fn rules(&self) -> &AcceptRules {
        &self.rules
    }

    pub fn layout(&self) -> Vec<LayoutRect> {
        self.subgrids.iter().map(|sub| sub.area).collect()
    }

    pub fn subgrid_count(&self) -> usize {
        self.subgrids.len()
    }

    pub fn subgrid(&self, index: usize) -> Option<&OccupancyGrid> {
        self.subgrids.get(index).map(|sub| &sub.grid)
    }

    /// Cell extent covering every subgrid.
    pub fn bounds(&self) -> Size {
        layout::bounds(&self.layout())
    }

    pub fn contains_pixel(&self, point: Point) -> bool {
        let size = self.bounds();
        let right = self.origin.x + cell_to_pixel(size.width as i32, self.cell_size);
        let bottom = self.origin.y + cell_to_pixel(size.height as i32, self.cell_size);
        point.x >= self.origin.x && point.y >= self.origin.y && point.x < right && point.y < bottom
    }

    /// Container cell under a pixel position. May be negative or outside the
    /// container bounds.
    pub fn cell_at_pixel(&self, point: Point) -> Position {
        Position::new(
            pixel_to_cell(point.x - self.origin.x, self.cell_size),
            pixel_to_cell(point.y - self.origin.y, self.cell_size),
        )
    }

    /// Pixel position of a container cell's top-left corner.
    pub fn pixel_of_cell(&self, cell: Position) -> Point {
        self.origin.offset(
            cell_to_pixel(cell.x, self.cell_size),
            cell_to_pixel(cell.y, self.cell_size),
        )
    }

    /// Map a container cell onto the subgrid holding it. Cells in the gaps of
    /// an irregular layout map to nothing.
    pub fn locate(&self, col: i32, row: i32) -> Option<Slot> {
        self.subgrids.iter().enumerate().find_map(|(index, sub)| {
            let rect = sub.area.as_rect();
            rect.contains(col, row).then(|| {
                Slot::new(index, (col - rect.x as i32) as u16, (row - rect.y as i32) as u16)
            })
        })
    }

    /// Container cell of a slot; inverse of [`locate`](Self::locate).
    pub fn slot_cell(&self, slot: Slot) -> Option<Position> {
        let sub = self.subgrids.get(slot.subgrid)?;
        Some(Position::new(
            sub.area.x_offset as i32 + slot.x as i32,
            sub.area.y_offset as i32 + slot.y as i32,
        ))
    }

    pub fn accepts(&self, item: &Item) -> bool {
        self.rules.accepts(item)
    }

    pub fn can_place(&self, item: &Item, slot: Slot) -> bool {
        if !self.accepts(item) || self.contains(&item.id) {
            return false;
        }
        self.subgrids
            .get(slot.subgrid)
            .is_some_and(|sub| sub.grid.can_place(item, slot.x as i32, slot.y as i32))
    }

    pub fn place(&mut self, item: &Item, slot: Slot) -> bool {
        if !self.can_place(item, slot) {
            return false;
        }
        self.subgrids[slot.subgrid]
            .grid
            .place(item, slot.x as i32, slot.y as i32)
    }

    pub fn remove(&mut self, id: &ItemId) -> Option<(Slot, PlacedItem)> {
        self.subgrids
            .iter_mut()
            .enumerate()
            .find_map(|(index, sub)| {
                sub.grid
                    .remove(id)
                    .map(|placed| (Slot::new(index, placed.grid_x, placed.grid_y), placed))
            })
    }

    /// Move a held item to another slot of this container, possibly in a
    /// different subgrid. A failed move leaves the item where it was.
    pub fn move_item(&mut self, id: &ItemId, slot: Slot) -> bool {
        let Some((previous, placed)) = self.remove(id) else {
            return false;
        };
        if self.place(&placed.item, slot) {
            return true;
        }
        let restored = self.place(&placed.item, previous);
        debug_assert!(restored, "vacated slot must accept its item again");
        false
    }

    /// First fit: subgrids in layout order, row-major inside each.
    pub fn find_placement_position(&self, item: &Item) -> Option<Slot> {
        if !self.accepts(item) || self.contains(&item.id) {
            return None;
        }
        self.subgrids.iter().enumerate().find_map(|(index, sub)| {
            sub.grid
                .find_placement_position(item)
                .map(|pos| Slot::new(index, pos.x as u16, pos.y as u16))
        })
    }

    /// Place an item at the first position where it fits, trying the turned
    /// footprint at each position before moving on when `allow_rotation` is
    /// set. Returns the slot and the orientation actually stored.
    pub fn auto_place(&mut self, item: &Item, allow_rotation: bool) -> Option<(Slot, Item)> {
        if !self.accepts(item) || self.contains(&item.id) {
            return None;
        }
        let turned = (allow_rotation && item.width != item.height).then(|| item.rotated());
        let mut found = None;
        'search: for (index, sub) in self.subgrids.iter().enumerate() {
            for y in 0..sub.grid.height() as i32 {
                for x in 0..sub.grid.width() as i32 {
                    let candidates = std::iter::once(item).chain(turned.as_ref());
                    for candidate in candidates {
                        if sub.grid.can_place(candidate, x, y) {
                            found = Some((Slot::new(index, x as u16, y as u16), candidate.clone()));
                            break 'search;
                        }
                    }
                }
            }
        }
        let (slot, stored) = found?;
        self.place(&stored, slot).then_some((slot, stored))
    }

    /// Repack every item largest-first. If the repack cannot hold all items
    /// the original arrangement is restored and false is returned.
    pub fn compact(&mut self) -> bool {
        let snapshot: Vec<(Slot, Item)> = self
            .placements()
            .into_iter()
            .map(|(slot, placed)| (slot, placed.item.clone()))
            .collect();
        self.clear();

        let mut order: Vec<&Item> = snapshot.iter().map(|(_, item)| item).collect();
        order.sort_by(|a, b| b.area().cmp(&a.area()));

        let mut repacked = true;
        for item in order {
            match self.find_placement_position(item) {
                Some(slot) if self.place(item, slot) => {}
                _ => {
                    repacked = false;
                    break;
                }
            }
        }
        if repacked {
            return true;
        }

        self.clear();
        for (slot, item) in &snapshot {
            let restored = self.place(item, *slot);
            debug_assert!(restored, "snapshot arrangement must fit again");
        }
        false
    }

    pub fn clear(&mut self) -> Vec<(Slot, PlacedItem)> {
        self.subgrids
            .iter_mut()
            .enumerate()
            .flat_map(|(index, sub)| {
                sub.grid
                    .clear()
                    .into_iter()
                    .map(move |placed| (Slot::new(index, placed.grid_x, placed.grid_y), placed))
            })
            .collect()
    }

    /// Item covering a container cell, if any.
    pub fn item_at(&self, col: i32, row: i32) -> Option<&PlacedItem> {
        let slot = self.locate(col, row)?;
        self.subgrids[slot.subgrid]
            .grid
            .item_at(slot.x as i32, slot.y as i32)
    }

    pub fn placement(&self, id: &ItemId) -> Option<(Slot, &PlacedItem)> {
        self.subgrids.iter().enumerate().find_map(|(index, sub)| {
            sub.grid
                .placement(id)
                .map(|placed| (Slot::new(index, placed.grid_x, placed.grid_y), placed))
        })
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.subgrids.iter().any(|sub| sub.grid.contains(id))
    }

    /// Every held item, subgrid by subgrid in row-major order.
    pub fn placements(&self) -> Vec<(Slot, &PlacedItem)> {
        self.subgrids
            .iter()
            .enumerate()
            .flat_map(|(index, sub)| {
                sub.grid
                    .items()
                    .into_iter()
                    .map(move |placed| (Slot::new(index, placed.grid_x, placed.grid_y), placed))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.subgrids.iter().map(|sub| sub.grid.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.subgrids.iter().all(|sub| sub.grid.is_empty())
    }

    pub fn total_cells(&self) -> u32 {
        self.subgrids.iter().map(|sub| sub.grid.total_cells()).sum()
    }

    pub fn used_cells(&self) -> u32 {
        self.subgrids.iter().map(|sub| sub.grid.used_cells()).sum()
    }

    pub fn remaining_cells(&self) -> u32 {
        self.total_cells().saturating_sub(self.used_cells())
    }
}
