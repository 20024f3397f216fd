//! Typed access to the persona session

use super::{
    KeyValueStore, SessionError, SessionResult, KEY_GENERATED_CONTENT, KEY_PERSONA_TAGS,
    KEY_SELECTED_ENTITIES,
};
use crate::culture::Entity;
use crate::narrative::ContentKind;
use crate::persona::PersonaRecord;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// One piece of generated text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredContent {
    pub text: String,
    pub generated_at: DateTime<Utc>,
}

type ContentMap = IndexMap<String, StoredContent>;

/// Persona state on top of a key/value store
#[derive(Clone)]
pub struct PersonaSession {
    store: Arc<dyn KeyValueStore>,
}

impl PersonaSession {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Session over a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(super::MemoryStore::new()))
    }

    fn read_json<T: for<'de> Deserialize<'de>>(&self, key: &str) -> SessionResult<Option<T>> {
        match self.store.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn write_json<T: Serialize>(&self, key: &str, value: &T) -> SessionResult<()> {
        self.store.put(key, &serde_json::to_string(value)?)
    }

    /// Replace the persona. Generated content belonged to the old persona
    /// and is dropped.
    pub fn save_persona(&self, persona: &PersonaRecord) -> SessionResult<()> {
        self.write_json(KEY_SELECTED_ENTITIES, &persona.entities)?;
        self.write_json(KEY_PERSONA_TAGS, &persona.tags)?;
        self.store.delete(KEY_GENERATED_CONTENT)?;
        self.store.flush()?;
        info!(
            "Saved persona: {} entities, {} tags",
            persona.entities.len(),
            persona.tags.len()
        );
        Ok(())
    }

    pub fn selected_entities(&self) -> SessionResult<Vec<Entity>> {
        Ok(self.read_json(KEY_SELECTED_ENTITIES)?.unwrap_or_default())
    }

    /// Tags are a JSON array; a bare comma-separated string is also accepted
    pub fn persona_tags(&self) -> SessionResult<Vec<String>> {
        let Some(raw) = self.store.get(KEY_PERSONA_TAGS)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(tags) => Ok(tags),
            Err(_) => Ok(raw
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect()),
        }
    }

    pub fn has_persona(&self) -> SessionResult<bool> {
        Ok(!self.selected_entities()?.is_empty())
    }

    /// The stored persona, or `NoPersona` when nothing was selected yet
    pub fn load_persona(&self) -> SessionResult<PersonaRecord> {
        let entities = self.selected_entities()?;
        if entities.is_empty() {
            return Err(SessionError::NoPersona);
        }
        Ok(PersonaRecord::new(self.persona_tags()?, entities))
    }

    fn content_map(&self) -> SessionResult<ContentMap> {
        Ok(self.read_json(KEY_GENERATED_CONTENT)?.unwrap_or_default())
    }

    pub fn cached_content(&self, kind: ContentKind) -> SessionResult<Option<StoredContent>> {
        Ok(self.content_map()?.shift_remove(kind.key()))
    }

    pub fn store_content(&self, kind: ContentKind, text: &str) -> SessionResult<StoredContent> {
        let mut map = self.content_map()?;
        let content = StoredContent {
            text: text.to_string(),
            generated_at: Utc::now(),
        };
        map.insert(kind.key().to_string(), content.clone());
        self.write_json(KEY_GENERATED_CONTENT, &map)?;
        debug!("Cached {} ({} chars)", kind, text.len());
        Ok(content)
    }

    /// Drop every cached piece of content
    pub fn clear_content(&self) -> SessionResult<()> {
        self.store.delete(KEY_GENERATED_CONTENT)
    }

    /// Forget everything, ending the session
    pub fn reset(&self) -> SessionResult<()> {
        self.store.clear()?;
        self.store.flush()?;
        info!("Session reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::culture::EntityType;
    use crate::session::{MemoryStore, Route};

    fn persona() -> PersonaRecord {
        PersonaRecord::new(
            vec!["indie".to_string(), "sci-fi".to_string()],
            vec![
                Entity::new("e1", "Radiohead", EntityType::Artist),
                Entity::new("e2", "Dune", EntityType::Book),
            ],
        )
    }

    #[test]
    fn test_missing_persona_redirects() {
        let session = PersonaSession::in_memory();
        let err = session.load_persona().unwrap_err();
        assert!(matches!(err, SessionError::NoPersona));
        assert_eq!(err.redirect(), Some(Route::EntitySelection));
        assert!(!session.has_persona().unwrap());
    }

    #[test]
    fn test_persona_roundtrip() {
        let session = PersonaSession::in_memory();
        session.save_persona(&persona()).unwrap();

        assert_eq!(session.load_persona().unwrap(), persona());
    }

    #[test]
    fn test_legacy_tag_string() {
        let store = Arc::new(MemoryStore::new());
        store.put(KEY_PERSONA_TAGS, "indie, dream pop,,jazz").unwrap();
        let session = PersonaSession::new(store);

        assert_eq!(session.persona_tags().unwrap(), vec!["indie", "dream pop", "jazz"]);
    }

    #[test]
    fn test_content_cache_by_kind() {
        let session = PersonaSession::in_memory();
        session.store_content(ContentKind::PersonaStory, "Once upon a time").unwrap();
        session.store_content(ContentKind::TravelGuide, "Go to Lisbon").unwrap();

        let story = session.cached_content(ContentKind::PersonaStory).unwrap().unwrap();
        assert_eq!(story.text, "Once upon a time");
        assert!(session.cached_content(ContentKind::Recommendations).unwrap().is_none());
    }

    #[test]
    fn test_new_persona_drops_content() {
        let session = PersonaSession::in_memory();
        session.store_content(ContentKind::PersonaStory, "old").unwrap();
        session.save_persona(&persona()).unwrap();

        assert!(session.cached_content(ContentKind::PersonaStory).unwrap().is_none());
    }

    #[test]
    fn test_reset_clears_every_key() {
        let store = Arc::new(MemoryStore::new());
        let session = PersonaSession::new(store.clone());
        session.save_persona(&persona()).unwrap();
        session.store_content(ContentKind::PersonaStory, "story").unwrap();

        session.reset().unwrap();

        assert!(store.keys().unwrap().is_empty());
        assert!(matches!(session.load_persona(), Err(SessionError::NoPersona)));
    }
}
