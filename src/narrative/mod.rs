//! Narrative content generation
//!
//! Builds prompts from a persona (or a comparison) and sends them to a
//! text-generation provider.

pub mod client;

pub use client::GenerationClient;

use crate::affinity::ComparisonReport;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("LLM API error: {0}")]
    ApiError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Provider returned no text")]
    EmptyResponse,
}

pub type GenerationResult<T> = Result<T, GenerationError>;

/// Anything that turns a prompt into text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> GenerationResult<String>;
}

/// Kinds of generated content, cached per kind in the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    PersonaStory,
    Recommendations,
    TravelGuide,
    ComparisonInsight,
}

impl ContentKind {
    pub const ALL: [ContentKind; 4] = [
        ContentKind::PersonaStory,
        ContentKind::Recommendations,
        ContentKind::TravelGuide,
        ContentKind::ComparisonInsight,
    ];

    /// Key under which the content is cached
    pub fn key(&self) -> &'static str {
        match self {
            ContentKind::PersonaStory => "persona_story",
            ContentKind::Recommendations => "recommendations",
            ContentKind::TravelGuide => "travel_guide",
            ContentKind::ComparisonInsight => "comparison_insight",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|k| k.key() == s)
    }

    /// Text shown when generation fails
    pub fn placeholder(&self) -> &'static str {
        match self {
            ContentKind::PersonaStory => {
                "Your cultural story is still being written. Try generating it again in a moment."
            }
            ContentKind::Recommendations => {
                "Recommendations are unavailable right now. Explore the graph to discover related tastes."
            }
            ContentKind::TravelGuide => {
                "A travel guide could not be generated right now. Check back soon for destinations that fit your taste."
            }
            ContentKind::ComparisonInsight => {
                "No comparison insight is available right now. The overlap chart still shows where your tastes meet."
            }
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// What a prompt is built from
#[derive(Debug, Clone, Default)]
pub struct PromptContext<'a> {
    pub entity_names: Vec<&'a str>,
    pub tags: Vec<&'a str>,
    pub comparison: Option<&'a ComparisonReport>,
}

fn list_or(items: &[&str], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

/// Prompt text for one content kind
pub fn build_prompt(kind: ContentKind, ctx: &PromptContext<'_>) -> String {
    let favorites = list_or(&ctx.entity_names, "nothing yet");
    let tags = list_or(&ctx.tags, "no tags yet");

    match kind {
        ContentKind::PersonaStory => format!(
            "Write a short, vivid second-person story (about 150 words) describing someone whose favorites are: {}.\n\
             Their taste is characterized by: {}.\n\
             Do not list the favorites back; weave them into a portrait of who this person is.",
            favorites, tags
        ),
        ContentKind::Recommendations => format!(
            "Someone loves {} and their taste leans toward {}.\n\
             Suggest five new things across different domains (music, film, books, places) they would enjoy.\n\
             Give each a one-sentence reason tied to their taste.",
            favorites, tags
        ),
        ContentKind::TravelGuide => format!(
            "Plan a three-stop travel itinerary for someone whose favorites are {} and whose taste is described by {}.\n\
             For each stop give the city, one thing to do there, and why it fits them.",
            favorites, tags
        ),
        ContentKind::ComparisonInsight => {
            let (overlap, shared, a_only, b_only) = match ctx.comparison {
                Some(report) => {
                    let names = |tags: &[crate::affinity::AffinityTag]| {
                        tags.iter().take(5).map(|t| t.name.as_str()).collect::<Vec<_>>().join(", ")
                    };
                    (
                        report.overlap_percent(),
                        names(&report.common_tags),
                        names(&report.profile1_stronger),
                        names(&report.profile2_stronger),
                    )
                }
                None => (0, String::new(), String::new(), String::new()),
            };
            format!(
                "Two people compared their cultural tastes and overlap {}%.\n\
                 Shared tastes: {}.\nOnly the first leans toward: {}.\nOnly the second leans toward: {}.\n\
                 In about 100 words, describe what they have in common and what each could introduce to the other.",
                overlap,
                if shared.is_empty() { "none found" } else { shared.as_str() },
                if a_only.is_empty() { "nothing notable" } else { a_only.as_str() },
                if b_only.is_empty() { "nothing notable" } else { b_only.as_str() },
            )
        }
    }
}

/// Strip a surrounding markdown fence some providers add
pub fn clean_response(response: &str) -> String {
    let trimmed = response.trim();
    if let Some(rest) = trimmed.strip_prefix("```") {
        let body = rest.find('\n').map(|i| &rest[i + 1..]).unwrap_or(rest);
        return body.trim_end().trim_end_matches("```").trim().to_string();
    }
    trimmed.to_string()
}
