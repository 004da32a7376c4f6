use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::{Rect, Size};

/// Secondary grouping key of a cell-group entry.
///
/// Upstream data leaves the key out for the "base" cells of a column; a
/// present key of `0` is a real row and must not collapse into `Base`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SubColumn {
    #[default]
    Base,
    Row(i32),
}

impl SubColumn {
    pub fn key(&self) -> Option<i32> {
        match self {
            SubColumn::Base => None,
            SubColumn::Row(key) => Some(*key),
        }
    }
}

impl From<Option<i32>> for SubColumn {
    fn from(value: Option<i32>) -> Self {
        value.map(SubColumn::Row).unwrap_or(SubColumn::Base)
    }
}

/// One irregular cell region of a backpack or chest rig, as exported by the
/// catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawCellGroup")]
pub struct CellGroupEntry {
    pub size: Size,
    pub column: i32,
    pub sub_column: SubColumn,
}

impl CellGroupEntry {
    pub fn base(width: u16, height: u16, column: i32) -> Self {
        Self {
            size: Size::new(width, height),
            column,
            sub_column: SubColumn::Base,
        }
    }

    pub fn row(width: u16, height: u16, column: i32, sub_column: i32) -> Self {
        Self {
            size: Size::new(width, height),
            column,
            sub_column: SubColumn::Row(sub_column),
        }
    }
}

/// Wire shape accepted for cell groups: either our own `size` object or the
/// upstream `grid: {X, Y}` export.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCellGroup {
    #[serde(default)]
    size: Option<Size>,
    #[serde(default)]
    grid: Option<UpstreamGrid>,
    column: i32,
    #[serde(default)]
    sub_column: Option<i32>,
}

#[derive(Deserialize)]
struct UpstreamGrid {
    #[serde(rename = "X")]
    x: u16,
    #[serde(rename = "Y")]
    y: u16,
}

impl TryFrom<RawCellGroup> for CellGroupEntry {
    type Error = String;

    fn try_from(raw: RawCellGroup) -> Result<Self, Self::Error> {
        let size = match (raw.size, raw.grid) {
            (Some(size), _) => size,
            (None, Some(grid)) => Size::new(grid.x, grid.y),
            (None, None) => {
                return Err(format!(
                    "cell group in column {} has neither `size` nor `grid`",
                    raw.column
                ));
            }
        };
        Ok(Self {
            size,
            column: raw.column,
            sub_column: raw.sub_column.into(),
        })
    }
}

/// Absolute rectangle produced by [`synthesize`], in grid units.
///
/// Serialized as the `[width, height, xOffset, yOffset]` tuple used by item
/// catalogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u16; 4]", into = "[u16; 4]")]
pub struct LayoutRect {
    pub width: u16,
    pub height: u16,
    pub x_offset: u16,
    pub y_offset: u16,
}

impl LayoutRect {
    pub const fn new(width: u16, height: u16, x_offset: u16, y_offset: u16) -> Self {
        Self {
            width,
            height,
            x_offset,
            y_offset,
        }
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(self.x_offset, self.y_offset, self.width, self.height)
    }

    pub fn to_array(self) -> [u16; 4] {
        self.into()
    }
}

impl From<[u16; 4]> for LayoutRect {
    fn from([width, height, x_offset, y_offset]: [u16; 4]) -> Self {
        Self::new(width, height, x_offset, y_offset)
    }
}

impl From<LayoutRect> for [u16; 4] {
    fn from(rect: LayoutRect) -> Self {
        [rect.width, rect.height, rect.x_offset, rect.y_offset]
    }
}

#[derive(Default)]
struct ColumnGroups<'a> {
    base: Vec<&'a CellGroupEntry>,
    rows: BTreeMap<i32, Vec<&'a CellGroupEntry>>,
}

/// Convert grouped cell regions into absolute rectangles.
///
/// Columns sit side by side in ascending key order. Inside a column the base
/// entries stack vertically first, then every sub-column forms one
/// horizontal row below them, rows stacking in ascending key order. Input
/// order is the only tie-break within a group.
pub fn synthesize(entries: &[CellGroupEntry]) -> Vec<LayoutRect> {
    let mut columns: BTreeMap<i32, ColumnGroups<'_>> = BTreeMap::new();
    for entry in entries {
        let groups = columns.entry(entry.column).or_default();
        match entry.sub_column {
            SubColumn::Base => groups.base.push(entry),
            SubColumn::Row(key) => groups.rows.entry(key).or_default().push(entry),
        }
    }

    let mut rects = Vec::with_capacity(entries.len());
    let mut column_x: u16 = 0;

    for groups in columns.values() {
        let mut cursor_y: u16 = 0;
        let mut column_width: u16 = 0;

        for entry in &groups.base {
            rects.push(LayoutRect::new(
                entry.size.width,
                entry.size.height,
                column_x,
                cursor_y,
            ));
            cursor_y = cursor_y.saturating_add(entry.size.height);
            column_width = column_width.max(entry.size.width);
        }

        for row in groups.rows.values() {
            let mut row_x = column_x;
            let mut row_height: u16 = 0;
            for entry in row {
                rects.push(LayoutRect::new(
                    entry.size.width,
                    entry.size.height,
                    row_x,
                    cursor_y,
                ));
                row_x = row_x.saturating_add(entry.size.width);
                row_height = row_height.max(entry.size.height);
            }
            column_width = column_width.max(row_x - column_x);
            cursor_y = cursor_y.saturating_add(row_height);
        }

        column_x = column_x.saturating_add(column_width);
    }

    rects
}

/// Union extent of a layout; `Size::default()` for an empty layout.
pub fn bounds(rects: &[LayoutRect]) -> Size {
    rects.iter().fold(Size::default(), |acc, rect| {
        let rect = rect.as_rect();
        Size::new(acc.width.max(rect.right()), acc.height.max(rect.bottom()))
    })
}

/// Number of usable cells in a layout.
pub fn total_cells(rects: &[LayoutRect]) -> u32 {
    rects
        .iter()
        .map(|rect| rect.width as u32 * rect.height as u32)
        .sum()
}

/// First pair of rectangles sharing a cell, by index. Synthesized layouts
/// never overlap; hand-written ones may.
pub fn first_overlap(rects: &[LayoutRect]) -> Option<(usize, usize)> {
    rects.iter().enumerate().find_map(|(i, a)| {
        rects[i + 1..]
            .iter()
            .position(|b| a.as_rect().intersects(&b.as_rect()))
            .map(|offset| (i, i + 1 + offset))
    })
}
