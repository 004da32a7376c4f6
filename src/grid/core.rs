use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Position, Rect, Size};

/// Stable identity of an item across containers.
pub type ItemId = String;

/// Geometry the engine needs from a catalog item. Everything else about the
/// item (name, price, grade) stays with the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub width: u16,
    pub height: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Item {
    pub fn new(id: impl Into<ItemId>, width: u16, height: u16) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Same item turned a quarter, footprint width and height swapped.
    pub fn rotated(&self) -> Self {
        Self {
            width: self.height,
            height: self.width,
            ..self.clone()
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn area(&self) -> u32 {
        self.size().area()
    }
}

/// Record of an item held by one grid. `width`/`height` are the cells the item
/// actually covers, which differ from the item's own size in slot mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedItem {
    pub item: Item,
    pub grid_x: u16,
    pub grid_y: u16,
    pub width: u16,
    pub height: u16,
}

impl PlacedItem {
    pub fn rect(&self) -> Rect {
        Rect::new(self.grid_x, self.grid_y, self.width, self.height)
    }

    pub fn position(&self) -> Position {
        Position::new(self.grid_x as i32, self.grid_y as i32)
    }
}

/// How a grid maps items onto its cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridMode {
    /// Items cover `width × height` cells.
    #[default]
    Cells,
    /// Equipment slot: exactly one item of any size, anchored at the origin.
    Slot,
}

/// Floor-divide a pixel offset into a cell index.
pub fn pixel_to_cell(pixel: f32, cell_size: f32) -> i32 {
    (pixel / cell_size).floor() as i32
}

/// Pixel offset of a cell's top-left corner.
pub fn cell_to_pixel(cell: i32, cell_size: f32) -> f32 {
    cell as f32 * cell_size
}

/// Fixed-size cell matrix tracking which item covers each cell.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    width: u16,
    height: u16,
    cell_size: f32,
    mode: GridMode,
    cells: Vec<Option<ItemId>>,
    records: HashMap<ItemId, PlacedItem>,
}

impl OccupancyGrid {
    pub fn new(width: u16, height: u16, cell_size: f32) -> Self {
        Self::with_mode(width, height, cell_size, GridMode::Cells)
    }

    /// A single-cell equipment slot.
    pub fn slot(cell_size: f32) -> Self {
        Self::with_mode(1, 1, cell_size, GridMode::Slot)
    }

    pub fn with_mode(width: u16, height: u16, cell_size: f32, mode: GridMode) -> Self {
        let (width, height) = match mode {
            GridMode::Cells => (width, height),
            GridMode::Slot => (1, 1),
        };
        Self {
            width,
            height,
            cell_size,
            mode,
            cells: vec![None; width as usize * height as usize],
            records: HashMap::new(),
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn mode(&self) -> GridMode {
        self.mode
    }

    fn footprint(&self, item: &Item) -> (u16, u16) {
        match self.mode {
            GridMode::Cells => (item.width, item.height),
            GridMode::Slot => (1, 1),
        }
    }

    fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    fn in_bounds(&self, item: &Item, x: i32, y: i32) -> bool {
        if item.width == 0 || item.height == 0 || x < 0 || y < 0 {
            return false;
        }
        if self.mode == GridMode::Slot {
            return x == 0 && y == 0;
        }
        let (w, h) = self.footprint(item);
        x <= self.width as i32 - w as i32 && y <= self.height as i32 - h as i32
    }

    /// True iff the item's footprint at `(x, y)` lies inside the grid and
    /// covers only empty cells. An item already held by this grid never fits
    /// a second time.
    pub fn can_place(&self, item: &Item, x: i32, y: i32) -> bool {
        if self.records.contains_key(&item.id) || !self.in_bounds(item, x, y) {
            return false;
        }
        let (w, h) = self.footprint(item);
        let (x, y) = (x as u16, y as u16);
        (y..y + h).all(|row| (x..x + w).all(|col| self.cells[self.index(col, row)].is_none()))
    }

    /// Place a copy of `item` at `(x, y)`. Returns false, leaving the grid
    /// untouched, when [`can_place`](Self::can_place) fails.
    pub fn place(&mut self, item: &Item, x: i32, y: i32) -> bool {
        if !self.can_place(item, x, y) {
            return false;
        }
        let (w, h) = self.footprint(item);
        let (x, y) = (x as u16, y as u16);
        for row in y..y + h {
            for col in x..x + w {
                let idx = self.index(col, row);
                self.cells[idx] = Some(item.id.clone());
            }
        }
        self.records.insert(
            item.id.clone(),
            PlacedItem {
                item: item.clone(),
                grid_x: x,
                grid_y: y,
                width: w,
                height: h,
            },
        );
        true
    }

    /// Clear every cell the item covered and hand back its record.
    pub fn remove(&mut self, id: &ItemId) -> Option<PlacedItem> {
        let record = self.records.remove(id)?;
        for row in record.grid_y..record.grid_y + record.height {
            for col in record.grid_x..record.grid_x + record.width {
                let idx = self.index(col, row);
                self.cells[idx] = None;
            }
        }
        Some(record)
    }

    /// Move a held item. A failed move leaves the item where it was.
    pub fn move_item(&mut self, id: &ItemId, x: i32, y: i32) -> bool {
        let Some(previous) = self.remove(id) else {
            return false;
        };
        if self.place(&previous.item, x, y) {
            return true;
        }
        let restored = self.place(
            &previous.item,
            previous.grid_x as i32,
            previous.grid_y as i32,
        );
        debug_assert!(restored, "vacated cells must accept their item again");
        false
    }

    /// First position in row-major order (y outer, x inner) where the item
    /// fits.
    pub fn find_placement_position(&self, item: &Item) -> Option<Position> {
        (0..self.height as i32)
            .flat_map(|y| (0..self.width as i32).map(move |x| Position::new(x, y)))
            .find(|pos| self.can_place(item, pos.x, pos.y))
    }

    pub fn item_at(&self, x: i32, y: i32) -> Option<&PlacedItem> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        let id = self.cells[self.index(x as u16, y as u16)].as_ref()?;
        self.records.get(id)
    }

    pub fn placement(&self, id: &ItemId) -> Option<&PlacedItem> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.records.contains_key(id)
    }

    /// Held items in row-major order of their anchor cell.
    pub fn items(&self) -> Vec<&PlacedItem> {
        let mut items: Vec<_> = self.records.values().collect();
        items.sort_by_key(|placed| (placed.grid_y, placed.grid_x));
        items
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total_cells(&self) -> u32 {
        self.size().area()
    }

    pub fn used_cells(&self) -> u32 {
        self.records
            .values()
            .map(|placed| placed.width as u32 * placed.height as u32)
            .sum()
    }

    pub fn remaining_cells(&self) -> u32 {
        self.total_cells().saturating_sub(self.used_cells())
    }

    /// Remove every item, returning the records in row-major order.
    pub fn clear(&mut self) -> Vec<PlacedItem> {
        let mut drained: Vec<_> = self.records.drain().map(|(_, placed)| placed).collect();
        drained.sort_by_key(|placed| (placed.grid_y, placed.grid_x));
        self.cells.iter_mut().for_each(|cell| *cell = None);
        drained
    }

    /// Cell under a pixel offset relative to the grid's top-left corner.
    pub fn cell_at(&self, local: Point) -> Position {
        Position::new(
            pixel_to_cell(local.x, self.cell_size),
            pixel_to_cell(local.y, self.cell_size),
        )
    }

    /// Pixel offset of a cell relative to the grid's top-left corner.
    pub fn cell_origin(&self, cell: Position) -> Point {
        Point::new(
            cell_to_pixel(cell.x, self.cell_size),
            cell_to_pixel(cell.y, self.cell_size),
        )
    }
}
