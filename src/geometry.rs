use serde::{Deserialize, Serialize};

/// Integer size measured in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

impl Size {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> u32 {
        self.width as u32 * self.height as u32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Rectangle anchored within a container's cell space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    pub fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    pub fn contains(&self, col: i32, row: i32) -> bool {
        col >= self.x as i32
            && row >= self.y as i32
            && col < self.right() as i32
            && row < self.bottom() as i32
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Signed grid coordinate. Pointer-derived positions may fall left of or
/// above a grid, so they stay signed until validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Pointer position in pixel space, as reported by the input collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_edges_saturate() {
        let rect = Rect::new(u16::MAX - 1, 0, 5, 5);
        assert_eq!(rect.right(), u16::MAX);
        assert_eq!(rect.bottom(), 5);
    }

    #[test]
    fn touching_rects_do_not_intersect() {
        let left = Rect::new(0, 0, 2, 2);
        let right = Rect::new(2, 0, 2, 2);
        let below = Rect::new(0, 2, 2, 1);
        assert!(!left.intersects(&right));
        assert!(!left.intersects(&below));
        assert!(left.intersects(&Rect::new(1, 1, 2, 2)));
    }

    #[test]
    fn contains_rejects_negative_cells() {
        let rect = Rect::new(0, 0, 3, 3);
        assert!(rect.contains(0, 0));
        assert!(rect.contains(2, 2));
        assert!(!rect.contains(-1, 0));
        assert!(!rect.contains(3, 0));
    }
}
