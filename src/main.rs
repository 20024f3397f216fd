use std::time::{Duration, Instant};
use tastegraph::affinity::AffinityAggregator;
use tastegraph::culture::{Entity, EntityType, Tag};
use tastegraph::graph::{GraphBuilder, NodeId, PersonaGraph};
use tastegraph::interaction::{hover_styles, ClickAction, ClickResolver, Viewport};
use tastegraph::layout::{self, LayoutCommand, LayoutDriver};
use tastegraph::persona::PersonaRecord;
use tastegraph::render::RenderFrame;
use tastegraph::LayoutConfig;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("Tastegraph v{}", tastegraph::version());
    println!("==========================================");
    println!();

    let persona = demo_persona();

    // Demo 1: Persona graph
    let graph = match demo_graph(&persona) {
        Some(graph) => graph,
        None => return,
    };

    // Demo 2: Settled layout and a rendered frame
    demo_layout(&graph);

    // Demo 3: Interactive driver
    demo_driver(&graph).await;

    // Demo 4: Affinity comparison (offline demo data)
    demo_comparison();
}

fn demo_persona() -> PersonaRecord {
    let mut artist = Entity::new("demo-radiohead", "Radiohead", EntityType::Artist);
    artist.popularity = Some(0.92);
    artist.tags = vec![
        Tag::named("Art Rock").with_score(0.9),
        Tag::named("Alternative"),
        Tag::named("Melancholy").with_score(0.7),
    ];

    let mut film = Entity::new("demo-her", "Her", EntityType::Movie);
    film.confidence = Some(0.74);
    film.tags = vec![Tag::named("Melancholy"), Tag::named("Romance"), Tag::named("Near Future")];

    let mut book = Entity::new("demo-norwegian-wood", "Norwegian Wood", EntityType::Book);
    book.tags = vec![Tag::named("Coming Of Age"), Tag::named("Romance")];

    PersonaRecord::new(
        vec!["Melancholy".to_string(), "Art Rock".to_string(), "Romance".to_string()],
        vec![artist, film, book],
    )
}

fn demo_graph(persona: &PersonaRecord) -> Option<PersonaGraph> {
    println!("=== Demo 1: Persona Graph ===");
    let graph = match GraphBuilder::new(2024).build(persona) {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!("Failed to build graph: {}", e);
            return None;
        }
    };

    println!(
        "✓ {} nodes, {} edges ({} entities)",
        graph.node_count(),
        graph.edge_count(),
        persona.entities.len()
    );
    for edge in graph.edges() {
        println!("  {} -[{}: {:.2}]-> {}", edge.source, edge.kind, edge.strength, edge.target);
    }
    println!();
    Some(graph)
}

fn demo_layout(graph: &PersonaGraph) {
    println!("=== Demo 2: Force Layout ===");
    let sim = match layout::settle(graph, LayoutConfig::default(), 1000) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("Layout failed: {}", e);
            return;
        }
    };
    println!("✓ Settled after {} ticks (alpha {:.4})", sim.ticks(), sim.alpha());

    let mut viewport = Viewport::new();
    viewport.zoom_by(1.5, (400.0, 300.0));
    let hovered = NodeId::from("center");
    let frame = RenderFrame::compose(
        graph,
        &sim.positions(),
        &hover_styles(graph, Some(&hovered)),
        viewport.transform(),
    );
    for node in &frame.nodes {
        println!(
            "  {:<16} ({:>7.1}, {:>7.1}) r={:<5.1} opacity={:.1}",
            node.label, node.x, node.y, node.radius, node.opacity
        );
    }
    println!();
}

async fn demo_driver(graph: &PersonaGraph) {
    println!("=== Demo 3: Interactive Layout ===");
    let sim = match layout::simulation_for(graph, LayoutConfig::default()) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("Layout failed: {}", e);
            return;
        }
    };

    let driver = LayoutDriver::spawn(sim, Duration::from_millis(2));
    let mut frames = driver.subscribe();
    if frames.wait_for(|f| f.settled).await.is_err() {
        eprintln!("Layout driver stopped unexpectedly");
        return;
    }
    println!("✓ Driver settled at tick {}", driver.latest().tick);

    // Two clicks 120 ms apart on the same node: a double-click
    let mut clicks = ClickResolver::default();
    let t0 = Instant::now();
    clicks.click("center", t0);
    if let Some(ClickAction::TogglePin(id)) = clicks.click("center", t0 + Duration::from_millis(120)) {
        if driver.send(LayoutCommand::TogglePin(id.clone())).await.is_ok() {
            let _ = frames
                .wait_for(|f| f.positions.iter().any(|p| p.id == id && p.state.is_pinned()))
                .await;
            println!("✓ Double-click pinned '{}'", id);
        }
    }

    driver.shutdown().await;
    println!();
}

fn demo_comparison() {
    println!("=== Demo 4: Affinity Comparison ===");
    let report = AffinityAggregator::default().fallback("offline demo");
    println!(
        "✓ Overlap {}% across {} tags{}",
        report.overlap_percent(),
        report.total_tags,
        if report.is_fallback { " (demo data)" } else { "" }
    );
    for tag in &report.common_tags {
        println!("  shared: {:<16} a={:.4} b={:.4}", tag.name, tag.a_affinity, tag.b_affinity);
    }
    for (category, tags) in &report.tags_by_category {
        println!("  {:<10} {}", category, tags.len());
    }
}
