//! Memoized query results keyed by dataset generation and arguments.
//! Queries are pure, so a result for the same generation and inputs never changes.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use crate::data::dataset::Dataset;
use crate::query::{distinct_teams, effective_team_filter, player_details, search, RosterRow};

pub const DEFAULT_QUERY_CACHE_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SearchKey {
    generation: u64,
    name: String,
    team: Option<String>,
    limit: usize,
}

/// Bounded memo tables; a table that reaches capacity is cleared before the next insert.
/// A capacity of zero disables caching.
#[derive(Debug)]
pub struct QueryCache {
    capacity: usize,
    teams: Mutex<HashMap<u64, Arc<[String]>>>,
    searches: Mutex<HashMap<SearchKey, Arc<[RosterRow]>>>,
    details: Mutex<HashMap<(u64, String), Arc<[RosterRow]>>>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_QUERY_CACHE_CAPACITY)
    }
}

impl QueryCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            teams: Mutex::new(HashMap::new()),
            searches: Mutex::new(HashMap::new()),
            details: Mutex::new(HashMap::new()),
        }
    }

    pub fn teams(&self, dataset: &Dataset) -> Arc<[String]> {
        memoize(&self.teams, self.capacity, dataset.generation(), || {
            distinct_teams(dataset).into()
        })
    }

    pub fn search(
        &self,
        dataset: &Dataset,
        name_query: &str,
        team_filter: Option<&str>,
        limit: usize,
    ) -> Arc<[RosterRow]> {
        let name = name_query.trim().to_string();
        let team = effective_team_filter(team_filter).map(str::to_string);
        let key = SearchKey {
            generation: dataset.generation(),
            name,
            team,
            limit,
        };
        memoize(&self.searches, self.capacity, key, || {
            search(dataset, name_query, team_filter, limit).into()
        })
    }

    pub fn player_details(&self, dataset: &Dataset, name_fragment: &str) -> Arc<[RosterRow]> {
        let key = (dataset.generation(), name_fragment.trim().to_string());
        memoize(&self.details, self.capacity, key, || {
            player_details(dataset, name_fragment).into()
        })
    }

    /// Entries currently held across all tables.
    pub fn len(&self) -> usize {
        let count = |len: Option<usize>| len.unwrap_or(0);
        count(self.teams.lock().ok().map(|t| t.len()))
            + count(self.searches.lock().ok().map(|t| t.len()))
            + count(self.details.lock().ok().map(|t| t.len()))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn memoize<K, V, F>(table: &Mutex<HashMap<K, V>>, capacity: usize, key: K, compute: F) -> V
where
    K: Eq + Hash,
    V: Clone,
    F: FnOnce() -> V,
{
    if capacity == 0 {
        return compute();
    }
    if let Some(hit) = table.lock().ok().and_then(|t| t.get(&key).cloned()) {
        return hit;
    }
    let value = compute();
    if let Ok(mut t) = table.lock() {
        if t.len() >= capacity {
            t.clear();
        }
        t.insert(key, value.clone());
    }
    value
}
