//! Cached logical-concept to column resolution.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use indexmap::IndexMap;
use serde::Serialize;

use super::registry::{ConceptMapping, default_mappings};

/// How a column was matched, from strongest to weakest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    Primary,
    Variation,
    Pattern,
}

impl MatchStrategy {
    /// Confidence reported by [`ColumnResolver::suggest_mappings`].
    pub fn confidence(&self) -> f64 {
        match self {
            MatchStrategy::Primary => 1.0,
            MatchStrategy::Variation => 0.8,
            MatchStrategy::Pattern => 0.6,
        }
    }
}

/// Suggested mapping for one concept against a concrete column list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingSuggestion {
    pub actual_column: Option<String>,
    pub confidence: f64,
    /// Other pattern-matching columns that are not known variations.
    pub alternatives: Vec<String>,
}

/// Outcome of [`ColumnResolver::validate_data_source`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceValidation {
    pub is_valid: bool,
    pub resolved: IndexMap<String, String>,
    pub missing: Vec<String>,
}

/// Cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Resolves logical concepts (`customer`, `ship_mode`, ...) to concrete column names.
///
/// Resolution order: the concept's primary column, then its variations (exact), then its
/// patterns (case-insensitive substring, first available column in dataset order). Every
/// outcome, including "not found", is cached per `(sorted columns, concept)`.
///
/// The resolver is meant to be constructed once and shared (`Arc<ColumnResolver>`); the cache
/// only grows by insertion, so a lost race just recomputes the same answer.
pub struct ColumnResolver {
    mappings: RwLock<IndexMap<String, ConceptMapping>>,
    cache: Mutex<IndexMap<String, Option<String>>>,
    cache_limit: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ColumnResolver {
    /// Resolver over the built-in concepts with a 100-entry cache bound.
    pub fn new() -> Self {
        Self::with_mappings(default_mappings(), 100)
    }

    pub fn with_mappings(mappings: IndexMap<String, ConceptMapping>, cache_limit: usize) -> Self {
        Self {
            mappings: RwLock::new(mappings),
            cache: Mutex::new(IndexMap::new()),
            cache_limit: cache_limit.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Resolve `concept` against `columns`, or `None` when no strategy matches.
    pub fn resolve(&self, columns: &[String], concept: &str) -> Option<String> {
        self.resolve_with_strategy(columns, concept).map(|(col, _)| col)
    }

    fn resolve_with_strategy(&self, columns: &[String], concept: &str) -> Option<(String, MatchStrategy)> {
        let key = cache_key(columns, concept);
        let cached = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();

        let resolved = match cached {
            Some(hit) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                hit
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                let computed = self.compute(columns, concept).map(|(col, _)| col);
                match &computed {
                    Some(col) => tracing::debug!(concept, column = %col, "column resolved"),
                    None => tracing::debug!(concept, ?columns, "column not resolved"),
                }
                let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
                cache.insert(key, computed.clone());
                if cache.len() > self.cache_limit {
                    prune(&mut cache);
                }
                computed
            }
        };

        // Strategy is cheap to recompute once the column is known.
        let col = resolved?;
        let strategy = self.strategy_for(concept, &col);
        Some((col, strategy))
    }

    fn compute(&self, columns: &[String], concept: &str) -> Option<(String, MatchStrategy)> {
        let mappings = self.mappings.read().unwrap_or_else(PoisonError::into_inner);
        let Some(mapping) = mappings.get(concept) else {
            tracing::warn!(concept, "no semantic mapping defined");
            return None;
        };

        if columns.iter().any(|c| c == &mapping.primary_column) {
            return Some((mapping.primary_column.clone(), MatchStrategy::Primary));
        }
        if let Some(v) = mapping.variations.iter().find(|v| columns.contains(*v)) {
            return Some((v.clone(), MatchStrategy::Variation));
        }
        mapping.patterns.iter().find_map(|pattern| {
            let pattern = pattern.to_lowercase();
            columns
                .iter()
                .find(|c| c.to_lowercase().contains(&pattern))
                .map(|c| (c.clone(), MatchStrategy::Pattern))
        })
    }

    fn strategy_for(&self, concept: &str, column: &str) -> MatchStrategy {
        let mappings = self.mappings.read().unwrap_or_else(PoisonError::into_inner);
        match mappings.get(concept) {
            Some(m) if m.primary_column == column => MatchStrategy::Primary,
            Some(m) if m.variations.iter().any(|v| v == column) => MatchStrategy::Variation,
            _ => MatchStrategy::Pattern,
        }
    }

    /// [`Self::resolve`], then the legacy fallback: the first column that contains the concept
    /// name, or is contained by it, compared case-insensitively.
    pub fn resolve_or_fallback(&self, columns: &[String], concept: &str) -> Option<String> {
        if let Some(col) = self.resolve(columns, concept) {
            return Some(col);
        }
        let needle = concept.to_lowercase();
        let found = columns.iter().find(|c| {
            let lower = c.to_lowercase();
            !lower.is_empty() && (lower.contains(&needle) || needle.contains(&lower))
        });
        if let Some(col) = found {
            tracing::debug!(concept, column = %col, "legacy column fallback used");
        }
        found.cloned()
    }

    /// Resolve several concepts; unresolved ones are omitted.
    pub fn resolve_many(&self, columns: &[String], concepts: &[&str]) -> IndexMap<String, String> {
        concepts
            .iter()
            .filter_map(|c| self.resolve(columns, c).map(|col| (c.to_string(), col)))
            .collect()
    }

    /// Names of all registered concepts, in declaration order.
    pub fn supported_concepts(&self) -> Vec<String> {
        self.mappings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// For every registered concept: the resolved column, a confidence, and alternatives.
    pub fn suggest_mappings(&self, columns: &[String]) -> IndexMap<String, MappingSuggestion> {
        let concepts = self.supported_concepts();
        let mut out = IndexMap::new();
        for concept in concepts {
            let resolved = self.resolve_with_strategy(columns, &concept);
            let alternatives = {
                let mappings = self.mappings.read().unwrap_or_else(PoisonError::into_inner);
                mappings
                    .get(&concept)
                    .map(|m| alternatives(columns, m))
                    .unwrap_or_default()
            };
            out.insert(
                concept,
                MappingSuggestion {
                    confidence: resolved.as_ref().map_or(0.0, |(_, s)| s.confidence()),
                    actual_column: resolved.map(|(col, _)| col),
                    alternatives,
                },
            );
        }
        out
    }

    /// Check that every `required` concept resolves against `columns`.
    pub fn validate_data_source(&self, columns: &[String], required: &[&str]) -> DataSourceValidation {
        let resolved = self.resolve_many(columns, required);
        let missing: Vec<String> = required
            .iter()
            .filter(|c| !resolved.contains_key(**c))
            .map(|c| c.to_string())
            .collect();
        DataSourceValidation {
            is_valid: missing.is_empty(),
            resolved,
            missing,
        }
    }

    /// Register or replace a concept. Clears the cache.
    pub fn add_mapping(&self, concept: impl Into<String>, mapping: ConceptMapping) {
        let concept = concept.into();
        tracing::info!(concept = %concept, "semantic mapping added");
        self.mappings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(concept, mapping);
        self.clear_cache();
    }

    pub fn clear_cache(&self) {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /// Drop the oldest half of the cache if it exceeds the configured bound.
    pub fn prune_cache(&self) {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if cache.len() > self.cache_limit {
            prune(&mut cache);
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.cache.lock().unwrap_or_else(PoisonError::into_inner).len(),
        }
    }
}

impl Default for ColumnResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn cache_key(columns: &[String], concept: &str) -> String {
    let mut sorted: Vec<&str> = columns.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    format!("{}\u{1f}{concept}", sorted.join(","))
}

fn prune(cache: &mut IndexMap<String, Option<String>>) {
    let drop = cache.len() / 2;
    cache.drain(..drop);
    tracing::debug!(kept = cache.len(), "column resolver cache pruned");
}

fn alternatives(columns: &[String], mapping: &ConceptMapping) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for pattern in &mapping.patterns {
        let pattern = pattern.to_lowercase();
        for col in columns {
            if col.to_lowercase().contains(&pattern)
                && !mapping.variations.contains(col)
                && !out.contains(col)
            {
                out.push(col.clone());
            }
        }
    }
    out
}
