use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use super::{
    clock::{Clock, SystemClock},
    index::KnowledgeIndex,
    solver::{IndexSolver, TopologicalSolver},
};
use crate::{
    config::{CacheSettings, Config},
    errors::Result,
    ontology::{OntologyContext, OntologyGraph},
};

/// Counters describing cache behaviour since construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
}

struct CacheEntry {
    index: Arc<KnowledgeIndex>,
    inserted_at: DateTime<Utc>,
}

enum Lookup {
    Fresh(Arc<KnowledgeIndex>),
    Expired,
    Missing,
}

/// Entries plus their insertion order, oldest first.
#[derive(Default)]
struct CacheStore {
    entries: HashMap<u64, CacheEntry>,
    order: VecDeque<u64>,
    stats: CacheStats,
}

impl CacheStore {
    fn lookup(&self, hash: u64, now: DateTime<Utc>, ttl: Duration) -> Lookup {
        let Some(entry) = self.entries.get(&hash) else {
            return Lookup::Missing;
        };
        // A timestamp in the future (clock stepped back) counts as age zero.
        let age = now
            .signed_duration_since(entry.inserted_at)
            .to_std()
            .unwrap_or_default();
        if age < ttl {
            Lookup::Fresh(Arc::clone(&entry.index))
        } else {
            Lookup::Expired
        }
    }

    fn remove(&mut self, hash: u64) -> Option<CacheEntry> {
        let entry = self.entries.remove(&hash)?;
        self.order.retain(|queued| *queued != hash);
        Some(entry)
    }

    fn evict_oldest(&mut self) -> Option<u64> {
        let oldest = self.order.pop_front()?;
        self.entries.remove(&oldest);
        Some(oldest)
    }

    fn push(&mut self, hash: u64, entry: CacheEntry) {
        self.order.push_back(hash);
        self.entries.insert(hash, entry);
    }
}

/// Memoizes knowledge indexes by ontology content hash.
///
/// Bounded by a fixed capacity with first-in-first-out eviction and a fixed
/// time to live. Hits do not change an entry's eviction position; an expired
/// entry is dropped and the recomputed index is appended as the newest entry.
///
/// The store sits behind a [`Mutex`], so one cache can be shared by every
/// extraction task of a multi-threaded host. The solver runs outside the lock:
/// concurrent misses on the same hash may each compute the index, and the
/// first one stored is the one every caller receives.
pub struct KnowledgeCache {
    store: Mutex<CacheStore>,
    solver: Arc<dyn IndexSolver>,
    clock: Arc<dyn Clock>,
    capacity: usize,
    ttl: Duration,
}

impl KnowledgeCache {
    /// Creates a cache with the default bounds and the wall clock.
    pub fn new(solver: Arc<dyn IndexSolver>) -> Self {
        Self::with_settings(solver, &CacheSettings::default())
    }

    /// Creates a cache with explicit bounds. A zero capacity is raised to one.
    pub fn with_settings(solver: Arc<dyn IndexSolver>, settings: &CacheSettings) -> Self {
        Self {
            store: Mutex::new(CacheStore::default()),
            solver,
            clock: Arc::new(SystemClock),
            capacity: settings.capacity.max(1),
            ttl: settings.ttl(),
        }
    }

    /// Builds a cache backed by a [`TopologicalSolver`] from configuration.
    ///
    /// # Errors
    ///
    /// Fails when the configuration does not validate.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let solver = TopologicalSolver::new().with_policy(config.integrity);
        Ok(Self::with_settings(Arc::new(solver), &config.cache))
    }

    /// Replaces the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the index for `hash`, solving and storing it on a miss.
    ///
    /// `hash` must fingerprint `context` and `graph`; the cache never looks at
    /// their content on a hit.
    ///
    /// # Errors
    ///
    /// Propagates solver failures. Failures are never cached, so the same
    /// error is produced again on the next call until the ontology changes.
    pub fn get_knowledge_index(
        &self,
        hash: u64,
        context: &OntologyContext,
        graph: &OntologyGraph,
    ) -> Result<Arc<KnowledgeIndex>> {
        {
            let mut store = self.guard();
            match store.lookup(hash, self.clock.now(), self.ttl) {
                Lookup::Fresh(index) => {
                    store.stats.hits += 1;
                    debug!(hash, "knowledge_index_cache_hit");
                    return Ok(index);
                }
                Lookup::Expired => {
                    store.remove(hash);
                    store.stats.expirations += 1;
                    debug!(hash, "knowledge_index_cache_expired");
                }
                Lookup::Missing => {}
            }
            store.stats.misses += 1;
        }

        debug!(hash, "knowledge_index_cache_miss");
        let index = Arc::new(self.solver.solve(graph, context)?);

        let inserted_at = self.clock.now();
        let mut store = self.guard();
        match store.lookup(hash, inserted_at, self.ttl) {
            Lookup::Fresh(stored) => return Ok(stored),
            Lookup::Expired => {
                store.remove(hash);
            }
            Lookup::Missing => {}
        }
        while store.entries.len() >= self.capacity {
            let Some(evicted) = store.evict_oldest() else {
                break;
            };
            store.stats.evictions += 1;
            debug!(hash = evicted, "knowledge_index_cache_evicted");
        }
        store.push(
            hash,
            CacheEntry {
                index: Arc::clone(&index),
                inserted_at,
            },
        );
        Ok(index)
    }

    /// Whether an entry is stored for `hash`, fresh or not yet purged.
    #[must_use]
    pub fn contains(&self, hash: u64) -> bool {
        self.guard().entries.contains_key(&hash)
    }

    /// Drops the entry for `hash`. Returns whether one was stored.
    pub fn invalidate(&self, hash: u64) -> bool {
        self.guard().remove(hash).is_some()
    }

    /// Drops every entry. Counters are kept.
    pub fn clear(&self) {
        let mut store = self.guard();
        store.entries.clear();
        store.order.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.guard().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guard().entries.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.guard().stats
    }

    /// Stored hashes from oldest to newest insertion.
    #[must_use]
    pub fn insertion_order(&self) -> Vec<u64> {
        self.guard().order.iter().copied().collect()
    }

    fn guard(&self) -> MutexGuard<'_, CacheStore> {
        self.store.lock().expect("knowledge index cache poisoned")
    }
}
