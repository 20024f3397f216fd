//! Persona orchestration
//!
//! A persona is the set of entities a user picked plus the tags derived
//! from them. `PersonaService` drives the upstream APIs on its behalf and
//! turns every upstream failure into an explicit `Fetched::Fallback`.

pub mod search;
pub mod service;
pub mod summary;

pub use search::SearchCache;
pub use service::{PersonaError, PersonaResult, PersonaService};
pub use summary::{HeatmapSummary, Hotspot, TrendDirection, TrendSummary};

use crate::culture::Entity;
use serde::{Deserialize, Serialize};

/// Entities a user selected plus the tags derived from them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonaRecord {
    pub tags: Vec<String>,
    pub entities: Vec<Entity>,
}

impl PersonaRecord {
    pub fn new(tags: Vec<String>, entities: Vec<Entity>) -> Self {
        Self { tags, entities }
    }

    pub fn entity_ids(&self) -> Vec<String> {
        self.entities.iter().map(|e| e.id.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Upstream data, or placeholder data with the reason it was substituted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fetched<T> {
    Live(T),
    Fallback { data: T, reason: String },
}

impl<T> Fetched<T> {
    pub fn fallback(data: T, reason: impl Into<String>) -> Self {
        Fetched::Fallback {
            data,
            reason: reason.into(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Fetched::Fallback { .. })
    }

    pub fn data(&self) -> &T {
        match self {
            Fetched::Live(data) | Fetched::Fallback { data, .. } => data,
        }
    }

    pub fn into_data(self) -> T {
        match self {
            Fetched::Live(data) | Fetched::Fallback { data, .. } => data,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Fetched::Live(_) => None,
            Fetched::Fallback { reason, .. } => Some(reason.as_str()),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        match self {
            Fetched::Live(data) => Fetched::Live(f(data)),
            Fetched::Fallback { data, reason } => Fetched::Fallback { data: f(data), reason },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetched_accessors() {
        let live = Fetched::Live(3);
        assert!(!live.is_fallback());
        assert_eq!(live.reason(), None);

        let fallback = Fetched::fallback(vec![1], "timeout").map(|v| v.len());
        assert!(fallback.is_fallback());
        assert_eq!(fallback.reason(), Some("timeout"));
        assert_eq!(*fallback.data(), 1);
        assert_eq!(fallback.into_data(), 1);
    }
}
