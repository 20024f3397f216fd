//! HTTP client for the cultural-graph API

use crate::config::CultureApiConfig;
use crate::culture::models::{Analysis, Comparison, Entity, EntityType, HeatmapPoint, Insights, TrendPoint};
use crate::culture::{CultureApi, CultureError, CultureResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Characters left as-is in query values
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b':');

/// Decode a response body. Objects must carry their payload under
/// `results`; only non-object bodies (lists) are accepted bare.
fn decode_results<T: DeserializeOwned>(path: &str, body: &str) -> CultureResult<T> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| CultureError::SerializationError(format!("{}: {}", path, e)))?;
    let payload = match value {
        Value::Object(mut map) => map.remove("results").ok_or_else(|| {
            CultureError::SerializationError(format!("{}: response has no results", path))
        })?,
        other => other,
    };
    serde_json::from_value(payload).map_err(|e| CultureError::SerializationError(format!("{}: {}", path, e)))
}

#[derive(Deserialize)]
struct HeatmapResults {
    #[serde(default)]
    heatmap: Vec<HeatmapPoint>,
}

#[derive(Deserialize)]
struct TrendResults {
    #[serde(default)]
    trends: Vec<TrendPoint>,
}

pub struct CultureClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl CultureClient {
    pub fn new(config: &CultureApiConfig) -> CultureResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CultureError::ConfigError(e.to_string()))?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(CultureError::ConfigError("base URL is empty".to_string()));
        }

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `base_url + path` with percent-encoded query parameters
    fn url(&self, path: &str, params: &[(&str, String)]) -> String {
        let mut url = format!("{}{}", self.base_url, path);
        for (i, (key, value)) in params.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(key);
            url.push('=');
            url.push_str(&utf8_percent_encode(value, QUERY_VALUE).to_string());
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> CultureResult<T> {
        let url = self.url(path, params);
        debug!("GET {}", url);

        let mut request = self.client.get(&url).header("Accept", "application/json");
        if let Some(key) = &self.api_key {
            request = request.header("X-Api-Key", key);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| CultureError::NetworkError(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(CultureError::ApiError(format!("{} returned {}: {}", path, status, text)));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| CultureError::NetworkError(e.to_string()))?;
        decode_results(path, &body)
    }
}

#[async_trait]
impl CultureApi for CultureClient {
    async fn search(
        &self,
        query: &str,
        limit: usize,
        entity_type: Option<EntityType>,
    ) -> CultureResult<Vec<Entity>> {
        let mut entities: Vec<Entity> = self
            .get_json("/search", &[("query", query.to_string()), ("take", limit.to_string())])
            .await?;

        if let Some(wanted) = entity_type {
            entities.retain(|e| e.is_type(wanted));
        }
        info!("Search '{}' returned {} entities", query, entities.len());
        Ok(entities)
    }

    async fn insights(&self, entity_ids: &[String], filter_type: EntityType) -> CultureResult<Insights> {
        self.get_json(
            "/v2/insights",
            &[
                ("filter.type", filter_type.urn().to_string()),
                ("signal.interests.entities", entity_ids.join(",")),
            ],
        )
        .await
    }

    async fn insights_by_tags(&self, tag_ids: &[String], target_type: EntityType) -> CultureResult<Insights> {
        self.get_json(
            "/v2/insights",
            &[
                ("filter.type", target_type.urn().to_string()),
                ("signal.interests.tags", tag_ids.join(",")),
            ],
        )
        .await
    }

    async fn analysis(&self, entity_ids: &[String]) -> CultureResult<Analysis> {
        self.get_json("/analysis", &[("entity_ids", entity_ids.join(","))]).await
    }

    async fn compare(&self, a: &[String], b: &[String]) -> CultureResult<Comparison> {
        self.get_json(
            "/v2/insights/compare",
            &[
                ("a.signal.interests.entities", a.join(",")),
                ("b.signal.interests.entities", b.join(",")),
            ],
        )
        .await
    }

    async fn heatmap(
        &self,
        entity_id: &str,
        longitude: f64,
        latitude: f64,
        radius_m: u32,
    ) -> CultureResult<Vec<HeatmapPoint>> {
        let results: HeatmapResults = self
            .get_json(
                "/v2/insights",
                &[
                    ("filter.type", "urn:heatmap".to_string()),
                    ("filter.location", format!("POINT({} {})", longitude, latitude)),
                    ("filter.location.radius", radius_m.to_string()),
                    ("signal.interests.entities", entity_id.to_string()),
                ],
            )
            .await?;
        Ok(results.heatmap)
    }

    async fn trend(&self, entity_id: &str, start: NaiveDate, end: NaiveDate) -> CultureResult<Vec<TrendPoint>> {
        let results: TrendResults = self
            .get_json(
                "/v2/trends/entity",
                &[
                    ("entity_id", entity_id.to_string()),
                    ("start_date", start.format("%Y-%m-%d").to_string()),
                    ("end_date", end.format("%Y-%m-%d").to_string()),
                ],
            )
            .await?;
        Ok(results.trends)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> CultureClient {
        CultureClient::new(&CultureApiConfig {
            base_url: base_url.to_string(),
            ..CultureApiConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_url_encoding() {
        let c = client("http://localhost:9000/");
        let url = c.url(
            "/v2/insights",
            &[
                ("filter.location", "POINT(-73.99 40.73)".to_string()),
                ("signal.interests.entities", "a,b".to_string()),
            ],
        );
        assert_eq!(
            url,
            "http://localhost:9000/v2/insights?filter.location=POINT%28-73.99%2040.73%29&signal.interests.entities=a%2Cb"
        );
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let result = CultureClient::new(&CultureApiConfig {
            base_url: "/".to_string(),
            ..CultureApiConfig::default()
        });
        assert!(matches!(result, Err(CultureError::ConfigError(_))));
    }

    #[test]
    fn test_wrapped_and_bare_lists() {
        let wrapped: Vec<u32> = decode_results("/x", r#"{"success": true, "results": [1, 2]}"#).unwrap();
        assert_eq!(wrapped, vec![1, 2]);

        let bare: Vec<u32> = decode_results("/x", "[3]").unwrap();
        assert_eq!(bare, vec![3]);
    }

    #[test]
    fn test_object_without_results_is_rejected() {
        let err = decode_results::<Insights>("/v2/insights", r#"{"error": "rate limited"}"#).unwrap_err();
        assert!(matches!(err, CultureError::SerializationError(_)));

        let ok: Insights = decode_results("/v2/insights", r#"{"results": {"entities": []}}"#).unwrap();
        assert!(ok.entities.is_empty());
    }
}
