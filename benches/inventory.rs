use criterion::{Criterion, black_box, criterion_group, criterion_main};
use stash_engine::logging::{LogEvent, LogSink};
use stash_engine::{
    CellGroupEntry, Container, ContainerRegistry, DragConfig, DragCoordinator, DragEvent, Item,
    Logger, LoggingResult, Point, Size, Slot, synthesize,
};

#[derive(Clone, Default)]
struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _event: &LogEvent) -> LoggingResult<()> {
        Ok(())
    }
}

const CELL: f32 = 72.0;

fn rig_entries() -> Vec<CellGroupEntry> {
    let mut entries = Vec::new();
    for column in 0..6 {
        entries.push(CellGroupEntry::base(2, 2, column));
        for sub in 0..3 {
            entries.push(CellGroupEntry::row(1, 3, column, sub));
            entries.push(CellGroupEntry::row(1, 2, column, sub));
        }
    }
    entries
}

fn layout_synthesis(c: &mut Criterion) {
    let entries = rig_entries();
    c.bench_function("layout_synthesis", |b| {
        b.iter(|| synthesize(black_box(&entries)));
    });
}

fn auto_placement(c: &mut Criterion) {
    let items: Vec<Item> = (0..48)
        .map(|idx| Item::new(format!("loot-{idx}"), 1 + idx % 3, 1 + (idx / 3) % 2))
        .collect();
    c.bench_function("auto_placement_10x12", |b| {
        b.iter(|| {
            let mut stash = Container::grid("stash", Size::new(10, 12), CELL);
            for item in &items {
                black_box(stash.auto_place(item, true));
            }
            stash.compact()
        });
    });
}

fn scripted_drag(c: &mut Criterion) {
    let script = drag_script();
    c.bench_function("scripted_drag", |b| {
        b.iter(|| {
            let mut registry = build_registry();
            let mut config = DragConfig::default();
            config.logger = Some(Logger::new(NullSink));
            config.enable_metrics();
            let mut drag = DragCoordinator::with_config(config);
            for event in black_box(script.clone()) {
                let _ = drag.submit(&mut registry, event);
            }
            registry.take_dirty()
        });
    });
}

fn build_registry() -> ContainerRegistry {
    let mut registry = ContainerRegistry::new();
    let mut stash = Container::grid("stash", Size::new(10, 12), CELL);
    for idx in 0..10u16 {
        stash.place(&Item::new(format!("loot-{idx}"), 1, 2), Slot::new(0, idx, 0));
    }
    let rig = Container::from_layout("rig", &synthesize(&rig_entries()), Size::new(1, 1), CELL)
        .with_origin(Point::new(10.0 * CELL + 20.0, 0.0));
    // Registration cannot fail for distinct ids.
    let _ = registry.register(stash);
    let _ = registry.register(rig);
    registry
}

fn drag_script() -> Vec<DragEvent> {
    let mut events = Vec::new();
    for idx in 0..10u16 {
        let x = f32::from(idx) * CELL + 4.0;
        events.push(DragEvent::Start {
            item: format!("loot-{idx}"),
            container: "stash".into(),
            pointer: Point::new(x, 4.0),
        });
        for step in 0..16 {
            events.push(DragEvent::Move {
                pointer: Point::new(x + step as f32 * 48.0, 4.0 + step as f32 * 6.0),
            });
        }
        if idx % 3 == 0 {
            events.push(DragEvent::Rotate);
        }
        events.push(if idx % 4 == 0 {
            DragEvent::Cancel
        } else {
            DragEvent::Drop
        });
    }
    events
}

criterion_group!(benches, layout_synthesis, auto_placement, scripted_drag);
criterion_main!(benches);
