use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tastegraph::culture::{Entity, EntityType, Tag};
use tastegraph::graph::GraphBuilder;
use tastegraph::layout;
use tastegraph::persona::PersonaRecord;
use tastegraph::{LayoutConfig, Simulation};
use tastegraph_layout::LayoutView;

/// A full-size persona: eight entities, three tags each
fn persona() -> PersonaRecord {
    let entities = (0..8)
        .map(|i| {
            let mut e = Entity::new(format!("e{}", i), format!("Entity {}", i), EntityType::Artist);
            e.tags = (0..3).map(|t| Tag::named(format!("tag {}", (i + t) % 12))).collect();
            e
        })
        .collect();
    let tags = (0..8).map(|t| format!("tag {}", t)).collect();
    PersonaRecord::new(tags, entities)
}

/// Ring-with-chords view of `size` nodes
fn synthetic_view(size: usize) -> LayoutView {
    let mut view = LayoutView::new();
    for i in 0..size {
        view.add_node(format!("n{}", i), 8.0);
    }
    for i in 0..size {
        let _ = view.add_link(&format!("n{}", i), &format!("n{}", (i + 1) % size), 0.8);
        let _ = view.add_link(&format!("n{}", i), &format!("n{}", (i * 7 + 3) % size), 0.3);
    }
    view
}

/// Benchmark building the persona graph
fn bench_graph_build(c: &mut Criterion) {
    let persona = persona();
    c.bench_function("graph_build", |b| {
        b.iter(|| GraphBuilder::new(42).build(&persona));
    });
}

/// Benchmark settling the persona layout from scratch
fn bench_persona_settle(c: &mut Criterion) {
    let graph = match GraphBuilder::new(42).build(&persona()) {
        Ok(graph) => graph,
        Err(_) => return,
    };
    c.bench_function("persona_settle", |b| {
        b.iter(|| layout::settle(&graph, LayoutConfig::default(), 1000));
    });
}

/// Benchmark single ticks across graph sizes, crossing the parallel threshold
fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_tick");

    for size in [50, 500, 2000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let mut sim = Simulation::new(synthetic_view(size), LayoutConfig::default());
            b.iter(|| sim.tick());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_graph_build, bench_persona_settle, bench_tick);
criterion_main!(benches);
