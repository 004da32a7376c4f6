//! Map crossterm terminal events onto drag events.
//!
//! Terminal columns and rows are treated as the pixel space, so a container
//! with `cell_size` 2.0 uses two terminal cells per grid cell.

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};

use crate::drag::DragEvent;
use crate::geometry::Point;
use crate::registry::ContainerRegistry;

/// Pointer position of a mouse event.
pub fn pointer_of(mouse: &MouseEvent) -> Point {
    Point::new(f32::from(mouse.column), f32::from(mouse.row))
}

/// Translate one terminal event. `dragging` is the coordinator's current
/// state; events that mean nothing in that state map to `None`.
pub fn translate(event: &Event, registry: &ContainerRegistry, dragging: bool) -> Option<DragEvent> {
    match event {
        Event::Mouse(mouse) => translate_mouse(mouse, registry, dragging),
        Event::Key(key) if dragging => translate_key(key),
        _ => None,
    }
}

fn translate_mouse(
    mouse: &MouseEvent,
    registry: &ContainerRegistry,
    dragging: bool,
) -> Option<DragEvent> {
    let pointer = pointer_of(mouse);
    match (mouse.kind, dragging) {
        (MouseEventKind::Down(MouseButton::Left), false) => {
            let container = registry.container_at(pointer)?;
            let cell = container.cell_at_pixel(pointer);
            let placed = container.item_at(cell.x, cell.y)?;
            Some(DragEvent::Start {
                item: placed.item.id.clone(),
                container: container.id().clone(),
                pointer,
            })
        }
        (MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved, true) => {
            Some(DragEvent::Move { pointer })
        }
        (MouseEventKind::Up(MouseButton::Left), true) => Some(DragEvent::Drop),
        _ => None,
    }
}

fn translate_key(key: &KeyEvent) -> Option<DragEvent> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Esc => Some(DragEvent::Cancel),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(DragEvent::Rotate),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{Container, Slot};
    use crate::geometry::Size;
    use crate::grid::Item;
    use crossterm::event::{KeyEventState, KeyModifiers};

    fn registry() -> ContainerRegistry {
        let mut registry = ContainerRegistry::new();
        let mut bag =
            Container::grid("bag", Size::new(4, 2), 2.0).with_origin(Point::new(10.0, 5.0));
        assert!(bag.place(&Item::new("knife", 1, 2), Slot::new(0, 1, 0)));
        registry.register(bag).unwrap();
        registry
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn key(code: KeyCode, kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn left_press_over_item_starts_drag() {
        let registry = registry();
        let press = mouse(MouseEventKind::Down(MouseButton::Left), 13, 7);
        assert_eq!(
            translate(&press, &registry, false),
            Some(DragEvent::Start {
                item: "knife".into(),
                container: "bag".into(),
                pointer: Point::new(13.0, 7.0),
            })
        );
        // Empty cell, outside any container, or already dragging.
        let empty = mouse(MouseEventKind::Down(MouseButton::Left), 10, 5);
        assert_eq!(translate(&empty, &registry, false), None);
        let outside = mouse(MouseEventKind::Down(MouseButton::Left), 0, 0);
        assert_eq!(translate(&outside, &registry, false), None);
        assert_eq!(translate(&press, &registry, true), None);
    }

    #[test]
    fn motion_and_release_only_matter_while_dragging() {
        let registry = registry();
        let drag = mouse(MouseEventKind::Drag(MouseButton::Left), 20, 9);
        let moved = mouse(MouseEventKind::Moved, 21, 9);
        let release = mouse(MouseEventKind::Up(MouseButton::Left), 21, 9);

        assert_eq!(
            translate(&drag, &registry, true),
            Some(DragEvent::Move {
                pointer: Point::new(20.0, 9.0)
            })
        );
        assert!(matches!(translate(&moved, &registry, true), Some(DragEvent::Move { .. })));
        assert_eq!(translate(&release, &registry, true), Some(DragEvent::Drop));
        assert_eq!(translate(&drag, &registry, false), None);
        assert_eq!(translate(&release, &registry, false), None);
        let right = mouse(MouseEventKind::Up(MouseButton::Right), 21, 9);
        assert_eq!(translate(&right, &registry, true), None);
    }

    #[test]
    fn keys_cancel_and_rotate() {
        let registry = registry();
        let esc = key(KeyCode::Esc, KeyEventKind::Press);
        assert_eq!(translate(&esc, &registry, true), Some(DragEvent::Cancel));
        assert_eq!(
            translate(&key(KeyCode::Char('R'), KeyEventKind::Press), &registry, true),
            Some(DragEvent::Rotate)
        );
        assert_eq!(
            translate(&key(KeyCode::Char('r'), KeyEventKind::Release), &registry, true),
            None
        );
        assert_eq!(translate(&esc, &registry, false), None);
        assert_eq!(translate(&Event::FocusLost, &registry, true), None);
    }
}
