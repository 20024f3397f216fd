//! Integration tests for the RocksDB-backed persona session
//!
//! Verifies persistence across reopen, content caching and reset.

use std::sync::Arc;
use tastegraph::culture::{Entity, EntityType, Tag};
use tastegraph::narrative::ContentKind;
use tastegraph::persona::PersonaRecord;
use tastegraph::session::{KeyValueStore, PersonaSession, RocksStore, Route, SessionError, KEY_PERSONA_TAGS};
use tempfile::TempDir;

fn persona() -> PersonaRecord {
    let mut film = Entity::new("f1", "Stalker", EntityType::Movie);
    film.tags = vec![Tag::named("slow cinema")];
    PersonaRecord::new(vec!["slow cinema".to_string(), "soviet".to_string()], vec![film])
}

fn open(dir: &TempDir) -> PersonaSession {
    PersonaSession::new(Arc::new(RocksStore::open(dir.path()).unwrap()))
}

#[test]
fn test_persona_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let session = open(&dir);
        session.save_persona(&persona()).unwrap();
        session.store_content(ContentKind::PersonaStory, "Once upon a time").unwrap();
    }

    let session = open(&dir);
    assert_eq!(session.load_persona().unwrap(), persona());
    let cached = session.cached_content(ContentKind::PersonaStory).unwrap().unwrap();
    assert_eq!(cached.text, "Once upon a time");
    assert!(session.cached_content(ContentKind::TravelGuide).unwrap().is_none());
}

#[test]
fn test_new_persona_drops_generated_content() {
    let dir = TempDir::new().unwrap();
    let session = open(&dir);
    session.save_persona(&persona()).unwrap();
    session.store_content(ContentKind::Recommendations, "Watch Solaris").unwrap();

    session.save_persona(&persona()).unwrap();

    assert!(session.cached_content(ContentKind::Recommendations).unwrap().is_none());
}

#[test]
fn test_reset_redirects_to_entity_selection() {
    let dir = TempDir::new().unwrap();
    let session = open(&dir);
    session.save_persona(&persona()).unwrap();

    session.reset().unwrap();

    let err = session.load_persona().unwrap_err();
    assert!(matches!(err, SessionError::NoPersona));
    assert_eq!(err.redirect(), Some(Route::EntitySelection));
    assert!(!session.has_persona().unwrap());
}

#[test]
fn test_comma_separated_tags_are_read() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(RocksStore::open(dir.path()).unwrap());
    store.put(KEY_PERSONA_TAGS, "indie, jazz ,").unwrap();

    let session = PersonaSession::new(store);
    assert_eq!(session.persona_tags().unwrap(), vec!["indie", "jazz"]);
}
