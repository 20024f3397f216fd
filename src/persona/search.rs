//! Recent-search cache

use crate::culture::{Entity, EntityType};
use chrono::{DateTime, Duration, Utc};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SearchKey {
    query: String,
    limit: usize,
    entity_type: Option<EntityType>,
}

impl SearchKey {
    fn new(query: &str, limit: usize, entity_type: Option<EntityType>) -> Self {
        Self {
            query: query.trim().to_lowercase(),
            limit,
            entity_type,
        }
    }
}

struct CachedResults {
    entities: Vec<Entity>,
    stored_at: DateTime<Utc>,
}

/// Bounded cache of live search results. Entries expire after `ttl`.
pub struct SearchCache {
    entries: Mutex<LruCache<SearchKey, CachedResults>>,
    ttl: Duration,
}

impl SearchCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    pub fn get(&self, query: &str, limit: usize, entity_type: Option<EntityType>) -> Option<Vec<Entity>> {
        self.get_at(query, limit, entity_type, Utc::now())
    }

    fn get_at(
        &self,
        query: &str,
        limit: usize,
        entity_type: Option<EntityType>,
        now: DateTime<Utc>,
    ) -> Option<Vec<Entity>> {
        let mut entries = self.entries.lock().ok()?;
        let key = SearchKey::new(query, limit, entity_type);
        let expired = match entries.get(&key) {
            Some(cached) if now - cached.stored_at <= self.ttl => return Some(cached.entities.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(&key);
        }
        None
    }

    pub fn insert(&self, query: &str, limit: usize, entity_type: Option<EntityType>, entities: Vec<Entity>) {
        self.insert_at(query, limit, entity_type, entities, Utc::now());
    }

    fn insert_at(
        &self,
        query: &str,
        limit: usize,
        entity_type: Option<EntityType>,
        entities: Vec<Entity>,
        now: DateTime<Utc>,
    ) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.put(
                SearchKey::new(query, limit, entity_type),
                CachedResults { entities, stored_at: now },
            );
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}
