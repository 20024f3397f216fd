//! Tastegraph CLI — command-line front-end for building and exploring a
//! cultural persona
//!
//! The persona lives in a RocksDB session directory, so commands can be
//! run one after another: `select`, then `graph`, `compare`, `generate`...

use anyhow::{anyhow, Context};
use chrono::{Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use std::path::PathBuf;
use std::sync::Arc;
use tastegraph::affinity::{AffinityTag, ComparisonReport};
use tastegraph::culture::{CultureClient, Entity, EntityType};
use tastegraph::interaction::{hover_styles, Transform};
use tastegraph::narrative::{ContentKind, GenerationClient};
use tastegraph::persona::{Fetched, PersonaError, PersonaService};
use tastegraph::render::RenderFrame;
use tastegraph::session::{PersonaSession, RocksStore, Route, SessionError};
use tastegraph::{layout, AppConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

const DEFAULT_DATA_DIR: &str = ".tastegraph";

#[derive(Parser)]
#[command(name = "tastegraph", version, about = "Tastegraph cultural persona CLI")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true, env = "TASTEGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Session directory
    #[arg(long, global = true)]
    data_dir: Option<String>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for entities. Without a query, each line read from stdin is
    /// searched as it is typed, after the debounce delay.
    Search {
        query: Option<String>,

        /// Only keep results of this type (artist, movie, book, ...)
        #[arg(long = "type")]
        entity_type: Option<String>,

        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Build the persona from the top search hit of each query
    Select {
        #[arg(required = true)]
        queries: Vec<String>,

        #[arg(long = "type")]
        entity_type: Option<String>,
    },
    /// Show the stored persona
    Persona,
    /// Lay out the persona graph and print node positions
    Graph {
        /// Upper bound on simulation ticks
        #[arg(long, default_value_t = 1000)]
        ticks: usize,
    },
    /// Recommendations seeded by the persona
    Recommend {
        /// Comma-separated entity types
        #[arg(long = "type", value_delimiter = ',', default_value = "movie")]
        types: Vec<String>,
    },
    /// Compare the persona (or --base) against other entity ids
    Compare {
        #[arg(required = true)]
        other: Vec<String>,

        /// Entity ids to compare instead of the persona
        #[arg(long, value_delimiter = ',')]
        base: Vec<String>,
    },
    /// Geographic affinity of an entity around a point
    Heatmap {
        entity_id: String,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Radius in metres
        #[arg(long, default_value_t = 5000)]
        radius: u32,
    },
    /// Popularity trend of an entity
    Trend {
        entity_id: String,

        /// First day (YYYY-MM-DD), default 90 days ago
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last day (YYYY-MM-DD), default today
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// Generate narrative content (persona_story, recommendations, travel_guide, comparison_insight)
    Generate {
        kind: String,

        /// Ignore cached content
        #[arg(long)]
        refresh: bool,

        /// Entity ids to compare against, for comparison_insight
        #[arg(long, value_delimiter = ',')]
        compare: Vec<String>,
    },
    /// Forget the persona and all generated content
    Reset,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    let result = match build_service(&cli) {
        Ok((config, service)) => run(&cli, &config, &service).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        if let Some(Route::EntitySelection) = redirect_of(&e) {
            eprintln!("No persona yet. Pick some favorites first:");
            eprintln!("  tastegraph-cli select \"Radiohead\" \"Dune\" \"Lisbon\"");
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

fn redirect_of(e: &anyhow::Error) -> Option<Route> {
    if let Some(PersonaError::Session(s)) = e.downcast_ref::<PersonaError>() {
        return s.redirect();
    }
    e.downcast_ref::<SessionError>().and_then(SessionError::redirect)
}

fn build_service(cli: &Cli) -> anyhow::Result<(AppConfig, PersonaService)> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::from_env()?,
    };
    if let Some(dir) = &cli.data_dir {
        config.session.data_path = Some(dir.clone());
    }

    let data_path = config
        .session
        .data_path
        .clone()
        .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
    let store = RocksStore::open(&data_path).with_context(|| format!("opening session at {}", data_path))?;

    let culture = CultureClient::new(&config.culture)?;
    let generator = GenerationClient::new(&config.generation)?;

    let service = PersonaService::new(
        Arc::new(culture),
        Arc::new(generator),
        PersonaSession::new(Arc::new(store)),
        &config,
    );
    Ok((config, service))
}

/// Feed stdin lines through the debounced search and print each result set
async fn live_search(
    service: &PersonaService,
    limit: usize,
    entity_type: Option<EntityType>,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let (query_tx, query_rx) = mpsc::channel(32);
    let (result_tx, mut result_rx) = mpsc::channel(8);

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if query_tx.send(line).await.is_err() {
                break;
            }
        }
    });

    let searching = service.live_search(query_rx, limit, entity_type, result_tx);
    let printing = async {
        while let Some((query, fetched)) = result_rx.recv().await {
            println!("Results for '{}':", query);
            warn_fallback(&fetched);
            print_entities(fetched.data(), format)?;
        }
        Ok::<_, anyhow::Error>(())
    };
    let ((), printed) = tokio::join!(searching, printing);
    printed
}

fn parse_type(s: &str) -> anyhow::Result<EntityType> {
    EntityType::parse(s).ok_or_else(|| anyhow!("unknown entity type '{}'", s))
}

fn warn_fallback<T>(fetched: &Fetched<T>) {
    if let Some(reason) = fetched.reason() {
        eprintln!("⚠ Showing placeholder data ({})", reason);
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}

fn opt(v: Option<f64>) -> String {
    v.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}

async fn run(cli: &Cli, config: &AppConfig, service: &PersonaService) -> anyhow::Result<()> {
    let format = &cli.format;
    match &cli.command {
        Commands::Search { query, entity_type, limit } => {
            let entity_type = entity_type.as_deref().map(parse_type).transpose()?;
            match query {
                Some(query) => {
                    let fetched = service.search(query, *limit, entity_type).await;
                    warn_fallback(&fetched);
                    print_entities(fetched.data(), format)
                }
                None => live_search(service, *limit, entity_type, format).await,
            }
        }
        Commands::Select { queries, entity_type } => {
            let entity_type = entity_type.as_deref().map(parse_type).transpose()?;
            let mut picked = Vec::new();
            for query in queries {
                let fetched = service.search(query, 5, entity_type).await;
                warn_fallback(&fetched);
                match fetched.into_data().into_iter().next() {
                    Some(entity) => picked.push(entity),
                    None => eprintln!("No match for '{}', skipping", query),
                }
            }
            let fetched = service.build_persona(picked).await?;
            warn_fallback(&fetched);
            print_persona(fetched.data(), format)
        }
        Commands::Persona => print_persona(&service.current_persona()?, format),
        Commands::Graph { ticks } => {
            let graph = service.persona_graph()?;
            let sim = layout::settle(&graph, config.layout.clone(), *ticks)?;
            let frame = RenderFrame::compose(
                &graph,
                &sim.positions(),
                &hover_styles(&graph, None),
                Transform::IDENTITY,
            );
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&frame)?),
                OutputFormat::Table => {
                    let mut table = new_table(vec!["Id", "Label", "Kind", "X", "Y", "Radius"]);
                    for node in &frame.nodes {
                        table.add_row(vec![
                            node.id.clone(),
                            node.label.clone(),
                            format!("{:?}", node.kind),
                            format!("{:.1}", node.x),
                            format!("{:.1}", node.y),
                            format!("{:.1}", node.radius),
                        ]);
                    }
                    println!("{}", table);
                    println!(
                        "{} node(s), {} edge(s), settled after {} ticks",
                        frame.nodes.len(),
                        frame.edges.len(),
                        sim.ticks()
                    );
                }
            }
            Ok(())
        }
        Commands::Recommend { types } => {
            let types = types.iter().map(|t| parse_type(t)).collect::<anyhow::Result<Vec<_>>>()?;
            for (entity_type, fetched) in service.recommendations_for(&types).await? {
                warn_fallback(&fetched);
                if matches!(format, OutputFormat::Table) {
                    println!("{}", entity_type);
                }
                print_entities(&fetched.data().entities, format)?;
            }
            Ok(())
        }
        Commands::Compare { other, base } => {
            let fetched = if base.is_empty() {
                service.compare_with_persona(other).await?
            } else {
                service.compare(base, other).await
            };
            warn_fallback(&fetched);
            print_report(fetched.data(), format)
        }
        Commands::Heatmap { entity_id, lng, lat, radius } => {
            let fetched = service.heatmap(entity_id, *lng, *lat, *radius).await;
            warn_fallback(&fetched);
            let summary = fetched.data();
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(summary)?),
                OutputFormat::Table => {
                    let mut table = new_table(vec!["Lat", "Lng", "Intensity", "Popularity"]);
                    for spot in &summary.hotspots {
                        table.add_row(vec![
                            format!("{:.4}", spot.latitude),
                            format!("{:.4}", spot.longitude),
                            format!("{:.2}", spot.intensity),
                            format!("{:.2}", spot.popularity),
                        ]);
                    }
                    println!("{}", table);
                    println!("{} point(s), max affinity {:.4}", summary.points.len(), summary.max_affinity);
                }
            }
            Ok(())
        }
        Commands::Trend { entity_id, start, end } => {
            let end = end.unwrap_or_else(|| Utc::now().date_naive());
            let start = start.unwrap_or(end - Duration::days(90));
            let fetched = service.trend(entity_id, start, end).await;
            warn_fallback(&fetched);
            let summary = fetched.data();
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(summary)?),
                OutputFormat::Table => {
                    let mut table = new_table(vec!["Date", "Popularity", "Rank", "Rank Δ"]);
                    for point in &summary.points {
                        table.add_row(vec![
                            point.date.to_string(),
                            format!("{:.3}", point.popularity),
                            point.rank.to_string(),
                            point.rank_delta.to_string(),
                        ]);
                    }
                    println!("{}", table);
                    if let Some(peak) = summary.peak_date {
                        println!("Peak {:.3} on {}", summary.peak_popularity, peak);
                    }
                    println!(
                        "Mean popularity {:.3}, rank change {:+} ({:?})",
                        summary.mean_popularity, summary.net_rank_change, summary.direction
                    );
                }
            }
            Ok(())
        }
        Commands::Generate { kind, refresh, compare } => {
            let kind = ContentKind::parse(kind).ok_or_else(|| anyhow!("unknown content kind '{}'", kind))?;
            let report = if kind == ContentKind::ComparisonInsight && !compare.is_empty() {
                Some(service.compare_with_persona(compare).await?.into_data())
            } else {
                None
            };
            let fetched = service.generate(kind, report.as_ref(), *refresh).await?;
            warn_fallback(&fetched);
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&fetched)?),
                OutputFormat::Table => println!("{}", fetched.data()),
            }
            Ok(())
        }
        Commands::Reset => {
            service.reset()?;
            println!("Session cleared");
            Ok(())
        }
    }
}

fn print_entities(entities: &[Entity], format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(entities)?),
        OutputFormat::Table => {
            if entities.is_empty() {
                println!("(no results)");
                return Ok(());
            }
            let mut table = new_table(vec!["Id", "Name", "Type", "Popularity", "Tags"]);
            for e in entities {
                let tags: Vec<&str> = e.tags.iter().take(4).map(|t| t.identity()).collect();
                table.add_row(vec![
                    e.id.clone(),
                    e.name.clone(),
                    e.entity_type.clone(),
                    opt(e.popularity),
                    tags.join(", "),
                ]);
            }
            println!("{}", table);
            println!("{} result(s)", entities.len());
        }
    }
    Ok(())
}

fn print_persona(persona: &tastegraph::PersonaRecord, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(persona)?),
        OutputFormat::Table => {
            print_entities(&persona.entities, format)?;
            println!("Tags: {}", persona.tags.join(", "));
        }
    }
    Ok(())
}

fn tag_rows(title: &str, tags: &[AffinityTag]) {
    if tags.is_empty() {
        return;
    }
    let mut table = new_table(vec![title, "Combined", "A", "B", "Delta"]);
    for t in tags {
        table.add_row(vec![
            t.name.clone(),
            format!("{:.4}", t.combined_affinity),
            format!("{:.4}", t.a_affinity),
            format!("{:.4}", t.b_affinity),
            format!("{:.2}", t.delta),
        ]);
    }
    println!("{}", table);
}

fn print_report(report: &ComparisonReport, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Table => {
            println!(
                "Overlap {}% ({} tags, mean affinity {:.4}){}",
                report.overlap_percent(),
                report.total_tags,
                report.avg_affinity,
                if report.is_fallback { " [demo data]" } else { "" }
            );
            tag_rows("Shared", &report.common_tags);
            tag_rows("Leans A", &report.profile1_stronger);
            tag_rows("Leans B", &report.profile2_stronger);
            tag_rows("Top", &report.top_tags);
            let categories: Vec<String> = report
                .tags_by_category
                .iter()
                .map(|(c, tags)| format!("{} ({})", c, tags.len()))
                .collect();
            println!("Categories: {}", categories.join(", "));
        }
    }
    Ok(())
}
