//! Property-based invariants for layout synthesis and occupancy grids.
//!
//! Verifies:
//! 1. Synthesized rectangles never overlap
//! 2. Place then remove restores the previous occupancy
//! 3. `can_place` agrees with `place` and the cells the item then covers
//! 4. A failed move leaves the item where it was
//! 5. `find_placement_position` returns the first fitting cell in row-major order

use proptest::prelude::*;
use stash_engine::layout::{CellGroupEntry, synthesize};
use stash_engine::{Item, OccupancyGrid, PlacedItem};

// Strategy helpers

fn arb_entry() -> impl Strategy<Value = CellGroupEntry> {
    (1u16..=4, 1u16..=4, 0i32..=3, prop::option::of(0i32..=3)).prop_map(
        |(width, height, column, sub_column)| match sub_column {
            Some(sub) => CellGroupEntry::row(width, height, column, sub),
            None => CellGroupEntry::base(width, height, column),
        },
    )
}

fn arb_item(id: &'static str) -> impl Strategy<Value = Item> {
    (1u16..=4, 1u16..=4).prop_map(move |(width, height)| Item::new(id, width, height))
}

/// A grid pre-filled by attempting a handful of random placements.
fn arb_grid() -> impl Strategy<Value = OccupancyGrid> {
    (
        1u16..=8,
        1u16..=8,
        prop::collection::vec((1u16..=3, 1u16..=3, 0i32..8, 0i32..8), 0..8),
    )
        .prop_map(|(width, height, fills)| {
            let mut grid = OccupancyGrid::new(width, height, 10.0);
            for (index, (w, h, x, y)) in fills.into_iter().enumerate() {
                grid.place(&Item::new(format!("fill-{index}"), w, h), x, y);
            }
            grid
        })
}

fn snapshot(grid: &OccupancyGrid) -> Vec<PlacedItem> {
    grid.items().into_iter().cloned().collect()
}

fn occupancy(grid: &OccupancyGrid) -> Vec<Option<String>> {
    (0..grid.height() as i32)
        .flat_map(|y| (0..grid.width() as i32).map(move |x| (x, y)))
        .map(|(x, y)| grid.item_at(x, y).map(|placed| placed.item.id.clone()))
        .collect()
}

proptest! {
    #[test]
    fn synthesized_rects_are_disjoint(entries in prop::collection::vec(arb_entry(), 0..12)) {
        let rects = synthesize(&entries);
        prop_assert_eq!(rects.len(), entries.len());
        for (i, a) in rects.iter().enumerate() {
            for b in &rects[i + 1..] {
                prop_assert!(
                    !a.as_rect().intersects(&b.as_rect()),
                    "{:?} overlaps {:?}", a, b
                );
            }
        }
    }

    #[test]
    fn place_then_remove_restores_occupancy(
        grid in arb_grid(),
        item in arb_item("candidate"),
        x in -1i32..9,
        y in -1i32..9,
    ) {
        let mut grid = grid;
        let before = (snapshot(&grid), occupancy(&grid), grid.used_cells());
        if grid.place(&item, x, y) {
            let removed = grid.remove(&item.id);
            prop_assert!(removed.is_some());
        }
        prop_assert_eq!((snapshot(&grid), occupancy(&grid), grid.used_cells()), before);
    }

    #[test]
    fn can_place_matches_covered_cells(
        grid in arb_grid(),
        item in arb_item("candidate"),
        x in -1i32..9,
        y in -1i32..9,
    ) {
        let predicted = grid.can_place(&item, x, y);
        let mut placed_grid = grid.clone();
        let placed = placed_grid.place(&item, x, y);
        prop_assert_eq!(predicted, placed);
        if placed {
            for row in y..y + item.height as i32 {
                for col in x..x + item.width as i32 {
                    let covering = placed_grid.item_at(col, row).map(|p| p.item.id.as_str());
                    prop_assert_eq!(covering, Some("candidate"));
                }
            }
        } else {
            prop_assert_eq!(snapshot(&placed_grid), snapshot(&grid));
        }
    }

    #[test]
    fn failed_move_is_a_no_op(
        grid in arb_grid(),
        pick in any::<prop::sample::Index>(),
        x in -2i32..10,
        y in -2i32..10,
    ) {
        let mut grid = grid;
        let ids: Vec<String> = grid.items().iter().map(|p| p.item.id.clone()).collect();
        prop_assume!(!ids.is_empty());
        let id = pick.get(&ids).clone();
        let before = snapshot(&grid);
        let original = grid.placement(&id).cloned();

        if !grid.move_item(&id, x, y) {
            prop_assert_eq!(grid.placement(&id).cloned(), original);
            prop_assert_eq!(snapshot(&grid), before);
        } else {
            let moved = grid.placement(&id).map(|p| (p.grid_x as i32, p.grid_y as i32));
            prop_assert_eq!(moved, Some((x, y)));
        }
    }

    #[test]
    fn first_fit_is_row_major_minimal(grid in arb_grid(), item in arb_item("candidate")) {
        let found = grid.find_placement_position(&item);
        let fits: Vec<(i32, i32)> = (0..grid.height() as i32)
            .flat_map(|y| (0..grid.width() as i32).map(move |x| (y, x)))
            .filter(|&(y, x)| grid.can_place(&item, x, y))
            .collect();
        match found {
            Some(pos) => prop_assert_eq!(fits.first().copied(), Some((pos.y, pos.x))),
            None => prop_assert!(fits.is_empty()),
        }
    }
}
