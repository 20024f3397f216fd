//! Integration tests for the persona service
//!
//! Stub API and generator implementations drive the live and fallback
//! paths of every operation.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tastegraph::culture::{
    Analysis, AnalysisTag, Comparison, CultureApi, CultureError, CultureResult, Entity, EntityType,
    HeatmapPoint, Insights, RawTagComparison, Tag, TrendPoint,
};
use tastegraph::culture::models::{ComparisonQuery, GeoLocation, HeatmapQuery, SideAffinity};
use tastegraph::narrative::{ContentKind, GenerationError, GenerationResult, TextGenerator};
use tastegraph::persona::{PersonaError, PersonaService, TrendDirection};
use tastegraph::session::{PersonaSession, Route, SessionError};
use tastegraph::{AffinityAggregator, AppConfig, ComparisonReport};
use tokio::sync::mpsc;

struct StubCulture {
    fail: bool,
    searches: AtomicUsize,
}

impl StubCulture {
    fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self { fail, searches: AtomicUsize::new(0) })
    }

    fn check(&self) -> CultureResult<()> {
        if self.fail {
            Err(CultureError::NetworkError("upstream down".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CultureApi for StubCulture {
    async fn search(&self, query: &str, _limit: usize, _t: Option<EntityType>) -> CultureResult<Vec<Entity>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(vec![Entity::new(format!("id-{}", query), query, EntityType::Artist)])
    }

    async fn insights(&self, _ids: &[String], filter_type: EntityType) -> CultureResult<Insights> {
        self.check()?;
        Ok(Insights {
            entities: vec![Entity::new(format!("rec-{}", filter_type.urn()), "Recommended", filter_type)],
            tags: vec![],
        })
    }

    async fn insights_by_tags(&self, ids: &[String], target_type: EntityType) -> CultureResult<Insights> {
        self.insights(ids, target_type).await
    }

    async fn analysis(&self, _ids: &[String]) -> CultureResult<Analysis> {
        self.check()?;
        let tag = |name: &str, affinity: f64| AnalysisTag {
            tag_id: format!("urn:tag:{}", name),
            name: name.to_string(),
            affinity,
        };
        Ok(Analysis {
            tags: vec![tag("jazz", 0.002), tag("indie", 0.005), tag(" ", 0.9)],
            entities: vec![],
        })
    }

    async fn compare(&self, _a: &[String], _b: &[String]) -> CultureResult<Comparison> {
        self.check()?;
        Ok(Comparison {
            tags: vec![RawTagComparison {
                name: "indie".to_string(),
                tag_id: "urn:tag:genre:indie".to_string(),
                subtype: Some("urn:tag:genre:music".to_string()),
                query: ComparisonQuery {
                    affinity: Some(0.0045),
                    a: Some(SideAffinity { affinity: Some(0.005) }),
                    b: Some(SideAffinity { affinity: Some(0.004) }),
                    delta: Some(1.1),
                },
            }],
        })
    }

    async fn heatmap(&self, _id: &str, lng: f64, lat: f64, _r: u32) -> CultureResult<Vec<HeatmapPoint>> {
        self.check()?;
        Ok(vec![HeatmapPoint {
            location: GeoLocation { latitude: lat, longitude: lng, geohash: "u09t".to_string() },
            query: HeatmapQuery { affinity: 0.8, affinity_rank: 1.0, popularity: 0.5 },
        }])
    }

    async fn trend(&self, _id: &str, start: NaiveDate, _end: NaiveDate) -> CultureResult<Vec<TrendPoint>> {
        self.check()?;
        let point = |days: u64, popularity: f64, rank: i64| TrendPoint {
            date: start + chrono::Days::new(days),
            popularity,
            rank,
            rank_delta: 0,
            population_percent_delta: 0.0,
        };
        Ok(vec![point(0, 0.2, 300), point(7, 0.5, 150)])
    }
}

struct StubGenerator {
    fail: bool,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl StubGenerator {
    fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self { fail, calls: AtomicUsize::new(0), prompts: Mutex::new(Vec::new()) })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, prompt: &str) -> GenerationResult<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(GenerationError::ApiError("quota exceeded".to_string()));
        }
        Ok(format!("story #{} ({} chars of prompt)", n, prompt.len()))
    }
}

fn service(culture: Arc<StubCulture>, generator: Arc<StubGenerator>) -> PersonaService {
    PersonaService::new(culture, generator, PersonaSession::in_memory(), &AppConfig::default())
}

fn report(tag: &str, a: f64, b: f64, delta: f64) -> ComparisonReport {
    AffinityAggregator::default().aggregate(&[RawTagComparison {
        name: tag.to_string(),
        tag_id: format!("urn:tag:genre:{}", tag),
        subtype: None,
        query: ComparisonQuery {
            affinity: Some((a + b) / 2.0),
            a: Some(SideAffinity { affinity: Some(a) }),
            b: Some(SideAffinity { affinity: Some(b) }),
            delta: Some(delta),
        },
    }])
}

fn picks() -> Vec<Entity> {
    let mut artist = Entity::new("a1", "Bjork", EntityType::Artist);
    artist.tags = vec![Tag::named("avant pop"), Tag::named("icelandic")];
    let mut book = Entity::new("b1", "Solaris", EntityType::Book);
    book.tags = vec![Tag::named("science fiction"), Tag::named("avant pop")];
    vec![artist, book]
}

#[tokio::test]
async fn test_build_persona_uses_analysis_tags() {
    let svc = service(StubCulture::new(false), StubGenerator::new(false));

    let fetched = svc.build_persona(picks()).await.unwrap();

    assert!(!fetched.is_fallback());
    assert_eq!(fetched.data().tags, vec!["indie", "jazz"]);
    assert_eq!(svc.current_persona().unwrap().entities.len(), 2);
}

#[tokio::test]
async fn test_build_persona_falls_back_to_entity_tags() {
    let svc = service(StubCulture::new(true), StubGenerator::new(false));

    let fetched = svc.build_persona(picks()).await.unwrap();

    assert!(fetched.is_fallback());
    assert!(fetched.reason().unwrap().contains("upstream down"));
    assert_eq!(fetched.data().tags, vec!["avant pop", "icelandic", "science fiction"]);
    // Fallback personas are still stored
    assert!(svc.session().has_persona().unwrap());
}

#[tokio::test]
async fn test_empty_selection_is_rejected() {
    let svc = service(StubCulture::new(false), StubGenerator::new(false));
    assert!(matches!(svc.build_persona(vec![]).await, Err(PersonaError::EmptySelection)));
}

#[tokio::test]
async fn test_views_without_persona_redirect() {
    let svc = service(StubCulture::new(false), StubGenerator::new(false));

    match svc.generate(ContentKind::PersonaStory, None, false).await {
        Err(PersonaError::Session(e)) => {
            assert!(matches!(e, SessionError::NoPersona));
            assert_eq!(e.redirect(), Some(Route::EntitySelection));
        }
        other => panic!("expected NoPersona, got {:?}", other.map(|f| f.into_data())),
    }
    assert!(svc.persona_graph().is_err());
}

#[tokio::test]
async fn test_generated_content_is_cached_until_refresh() {
    let generator = StubGenerator::new(false);
    let svc = service(StubCulture::new(false), generator.clone());
    svc.build_persona(picks()).await.unwrap();

    let first = svc.generate(ContentKind::PersonaStory, None, false).await.unwrap();
    let second = svc.generate(ContentKind::PersonaStory, None, false).await.unwrap();
    assert_eq!(first.data(), second.data());
    assert_eq!(generator.calls(), 1);

    let refreshed = svc.generate(ContentKind::PersonaStory, None, true).await.unwrap();
    assert_ne!(refreshed.data(), first.data());
    assert_eq!(generator.calls(), 2);

    // Each kind has its own slot
    svc.generate(ContentKind::TravelGuide, None, false).await.unwrap();
    assert_eq!(generator.calls(), 3);
}

#[tokio::test]
async fn test_comparison_insight_follows_each_comparison() {
    let generator = StubGenerator::new(false);
    let svc = service(StubCulture::new(false), generator.clone());
    svc.build_persona(picks()).await.unwrap();

    let shoegaze = report("shoegaze", 0.005, 0.0049, 1.0);
    let opera = report("opera", 0.009, 0.0001, 5.0);

    let first = svc.generate(ContentKind::ComparisonInsight, Some(&shoegaze), false).await.unwrap();
    let second = svc.generate(ContentKind::ComparisonInsight, Some(&opera), false).await.unwrap();

    assert_eq!(generator.calls(), 2);
    assert_ne!(first.data(), second.data());
    let prompts = generator.prompts();
    assert!(prompts[0].contains("shoegaze"));
    assert!(prompts[1].contains("opera"));
    assert!(!prompts[1].contains("shoegaze"));

    // The same comparison asked for again is still regenerated
    svc.generate(ContentKind::ComparisonInsight, Some(&opera), false).await.unwrap();
    assert_eq!(generator.calls(), 3);
}

#[tokio::test]
async fn test_generation_failure_returns_uncached_placeholder() {
    let generator = StubGenerator::new(true);
    let svc = service(StubCulture::new(false), generator.clone());
    svc.build_persona(picks()).await.unwrap();

    let fetched = svc.generate(ContentKind::Recommendations, None, false).await.unwrap();
    assert!(fetched.is_fallback());
    assert_eq!(fetched.data(), ContentKind::Recommendations.placeholder());

    svc.generate(ContentKind::Recommendations, None, false).await.unwrap();
    assert_eq!(generator.calls(), 2);
}

#[tokio::test]
async fn test_compare_live_and_fallback() {
    let live = service(StubCulture::new(false), StubGenerator::new(false));
    let report = live.compare(&["a".to_string()], &["b".to_string()]).await;
    assert!(!report.is_fallback());
    assert_eq!(report.data().overlap_percent(), 90);
    assert!(!report.data().is_fallback);

    let down = service(StubCulture::new(true), StubGenerator::new(false));
    let report = down.compare(&["a".to_string()], &["b".to_string()]).await;
    assert!(report.is_fallback());
    assert!(report.data().is_fallback);
    assert!(report.data().total_tags > 0);
}

#[tokio::test]
async fn test_search_hits_cache() {
    let culture = StubCulture::new(false);
    let svc = service(culture.clone(), StubGenerator::new(false));

    svc.search("Radiohead", 5, None).await;
    let again = svc.search("radiohead", 5, None).await;

    assert_eq!(again.data()[0].name, "Radiohead");
    assert_eq!(culture.searches.load(Ordering::SeqCst), 1);

    let blank = svc.search("   ", 5, None).await;
    assert!(blank.data().is_empty());
    assert_eq!(culture.searches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_live_search_only_searches_settled_query() {
    let culture = StubCulture::new(false);
    let svc = service(culture.clone(), StubGenerator::new(false));
    let (queries, input) = mpsc::channel(8);
    let (results, mut output) = mpsc::channel(8);

    for q in ["r", "ra", "rad", "radiohead"] {
        queries.send(q.to_string()).await.unwrap();
    }
    drop(queries);
    tokio::time::timeout(Duration::from_secs(5), svc.live_search(input, 5, None, results))
        .await
        .expect("live search finishes once input closes");

    let (query, fetched) = output.recv().await.unwrap();
    assert_eq!(query, "radiohead");
    assert_eq!(fetched.data()[0].name, "radiohead");
    assert!(output.recv().await.is_none());
    assert_eq!(culture.searches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_search_is_flagged_empty() {
    let svc = service(StubCulture::new(true), StubGenerator::new(false));

    let fetched = svc.search("anything", 5, None).await;

    assert!(fetched.is_fallback());
    assert!(fetched.data().is_empty());
}

#[tokio::test]
async fn test_recommendations_for_several_types() {
    let svc = service(StubCulture::new(false), StubGenerator::new(false));
    svc.build_persona(picks()).await.unwrap();

    let results = svc
        .recommendations_for(&[EntityType::Movie, EntityType::Place])
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, EntityType::Movie);
    assert!(results[0].1.data().entities[0].is_type(EntityType::Movie));
    assert_eq!(results[1].0, EntityType::Place);
}

#[tokio::test]
async fn test_heatmap_and_trend_fallbacks() {
    let svc = service(StubCulture::new(true), StubGenerator::new(false));

    let heatmap = svc.heatmap("e1", -0.12, 51.5, 5000).await;
    assert!(heatmap.is_fallback());
    assert!(!heatmap.data().points.is_empty());

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let trend = svc.trend("e1", start, start + chrono::Days::new(30)).await;
    assert!(trend.is_fallback());
    assert!(trend.data().points.is_empty());
}

#[tokio::test]
async fn test_live_trend_summary() {
    let svc = service(StubCulture::new(false), StubGenerator::new(false));
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    let trend = svc.trend("e1", start, start + chrono::Days::new(30)).await;

    assert!(!trend.is_fallback());
    let summary = trend.data();
    assert_eq!(summary.peak_date, Some(start + chrono::Days::new(7)));
    assert_eq!(summary.net_rank_change, 150);
    assert_eq!(summary.direction, TrendDirection::Rising);
}

#[tokio::test]
async fn test_reset_ends_session() {
    let svc = service(StubCulture::new(false), StubGenerator::new(false));
    svc.build_persona(picks()).await.unwrap();

    svc.reset().unwrap();

    assert!(matches!(
        svc.current_persona(),
        Err(PersonaError::Session(SessionError::NoPersona))
    ));
}
