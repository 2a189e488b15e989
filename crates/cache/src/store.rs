//! Concurrent optimization result store.

use crate::error::CacheError;
use crate::Result;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tuner_spi::{ParamSet, TuningMethod, ValidationMetrics};

/// Default record lifetime.
pub const DEFAULT_EXPIRY: Duration = Duration::from_secs(24 * 60 * 60);

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Tuned parameters for one (entity, model, method) slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodRecord {
    pub parameters: ParamSet,
    /// Hash of the series the parameters were tuned on
    pub data_hash: String,
    /// Unix milliseconds when the record was saved
    pub saved_at_ms: u64,
    pub accuracy: f64,
    pub mape: f64,
    pub rmse: f64,
    pub mae: f64,
    /// Blend of accuracy and validation consistency
    pub confidence: f64,
    /// Free-form note on how the parameters were chosen
    pub reasoning: Option<String>,
}

impl MethodRecord {
    pub fn new(
        parameters: ParamSet,
        data_hash: impl Into<String>,
        metrics: ValidationMetrics,
        confidence: f64,
    ) -> Self {
        Self {
            parameters,
            data_hash: data_hash.into(),
            saved_at_ms: now_ms(),
            accuracy: metrics.accuracy,
            mape: metrics.mape,
            rmse: metrics.rmse,
            mae: metrics.mae,
            confidence,
            reasoning: None,
        }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }

    /// Override the save timestamp (backfills, tests)
    pub fn saved_at(mut self, saved_at_ms: u64) -> Self {
        self.saved_at_ms = saved_at_ms;
        self
    }

    /// Valid iff tuned on the same data and not expired.
    pub fn is_valid(&self, data_hash: &str, now_ms: u64, expiry: Duration) -> bool {
        self.data_hash == data_hash
            && now_ms.saturating_sub(self.saved_at_ms) <= expiry.as_millis() as u64
    }
}

/// Annotation describing the optimization currently applied to a pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedOptimization {
    pub expected_accuracy: f64,
    pub confidence: f64,
    pub reasoning: Option<String>,
}

/// Working state for one (entity, model) pair: a record slot per tuning
/// method plus selection metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheEntry {
    pub ai: Option<MethodRecord>,
    pub grid: Option<MethodRecord>,
    pub manual: Option<MethodRecord>,
    /// Method selected to drive forecasts for this pair
    pub selected_method: Option<TuningMethod>,
    /// Annotation from the last applied optimization
    pub applied: Option<AppliedOptimization>,
    /// Set by the best-method selector on at most one method per entity
    pub winning_method: Option<TuningMethod>,
}

impl CacheEntry {
    pub fn record(&self, method: TuningMethod) -> Option<&MethodRecord> {
        match method {
            TuningMethod::Ai => self.ai.as_ref(),
            TuningMethod::Grid => self.grid.as_ref(),
            TuningMethod::Manual => self.manual.as_ref(),
        }
    }

    fn slot_mut(&mut self, method: TuningMethod) -> &mut Option<MethodRecord> {
        match method {
            TuningMethod::Ai => &mut self.ai,
            TuningMethod::Grid => &mut self.grid,
            TuningMethod::Manual => &mut self.manual,
        }
    }
}

/// One valid record flattened for best-method selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCandidate {
    pub model_id: String,
    pub method: TuningMethod,
    pub accuracy: f64,
    pub mape: f64,
    pub rmse: f64,
    pub mae: f64,
}

/// Concurrent cache of tuned parameters keyed by (entity, model).
///
/// Writers to the same key serialize on its map entry; distinct keys do
/// not contend.
#[derive(Debug)]
pub struct OptimizationCache {
    entries: DashMap<(String, String), CacheEntry>,
    expiry: Duration,
}

impl Default for OptimizationCache {
    fn default() -> Self {
        Self::new()
    }
}

impl OptimizationCache {
    pub fn new() -> Self {
        Self::with_expiry(DEFAULT_EXPIRY)
    }

    pub fn with_expiry(expiry: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            expiry,
        }
    }

    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Store a record in the pair's slot for the method, replacing any
    /// previous one.
    pub fn store(&self, entity: &str, model: &str, method: TuningMethod, record: MethodRecord) {
        let mut entry = self
            .entries
            .entry((entity.to_string(), model.to_string()))
            .or_default();
        *entry.slot_mut(method) = Some(record);
    }

    /// Fetch a valid record. With a method, only that slot qualifies;
    /// without, the valid slot of highest priority (ai > grid > manual).
    pub fn lookup(
        &self,
        entity: &str,
        model: &str,
        data_hash: &str,
        method: Option<TuningMethod>,
    ) -> Option<MethodRecord> {
        let entry = self
            .entries
            .get(&(entity.to_string(), model.to_string()))?;
        let now = now_ms();
        match method {
            Some(method) => entry
                .record(method)
                .filter(|record| record.is_valid(data_hash, now, self.expiry))
                .cloned(),
            None => TuningMethod::by_priority().into_iter().find_map(|method| {
                entry
                    .record(method)
                    .filter(|record| record.is_valid(data_hash, now, self.expiry))
                    .cloned()
            }),
        }
    }

    /// Select which method drives forecasts for a pair. Choosing manual
    /// clears the applied-optimization annotation.
    pub fn set_selected_method(
        &self,
        entity: &str,
        model: &str,
        method: TuningMethod,
    ) -> Result<()> {
        let mut entry = self
            .entries
            .get_mut(&(entity.to_string(), model.to_string()))
            .ok_or_else(|| CacheError::UnknownEntry {
                entity: entity.to_string(),
                model: model.to_string(),
            })?;
        entry.selected_method = Some(method);
        if method == TuningMethod::Manual {
            entry.applied = None;
        }
        Ok(())
    }

    /// Attach an applied-optimization annotation to a pair.
    pub fn annotate(
        &self,
        entity: &str,
        model: &str,
        applied: AppliedOptimization,
    ) -> Result<()> {
        let mut entry = self
            .entries
            .get_mut(&(entity.to_string(), model.to_string()))
            .ok_or_else(|| CacheError::UnknownEntry {
                entity: entity.to_string(),
                model: model.to_string(),
            })?;
        entry.applied = Some(applied);
        Ok(())
    }

    /// Snapshot of a pair's working state.
    pub fn entry(&self, entity: &str, model: &str) -> Option<CacheEntry> {
        self.entries
            .get(&(entity.to_string(), model.to_string()))
            .map(|entry| entry.clone())
    }

    /// Every valid record for the entity, flattened and deterministically
    /// ordered (model id, then method priority).
    pub fn candidates(&self, entity: &str, data_hash: &str) -> Vec<MethodCandidate> {
        let now = now_ms();
        let mut out = Vec::new();
        for item in self.entries.iter() {
            let (key_entity, model) = item.key();
            if key_entity != entity {
                continue;
            }
            for method in TuningMethod::by_priority() {
                if let Some(record) = item.value().record(method) {
                    if record.is_valid(data_hash, now, self.expiry) {
                        out.push(MethodCandidate {
                            model_id: model.clone(),
                            method,
                            accuracy: record.accuracy,
                            mape: record.mape,
                            rmse: record.rmse,
                            mae: record.mae,
                        });
                    }
                }
            }
        }
        // Map iteration order is arbitrary; pin it down.
        out.sort_by(|a, b| {
            a.model_id
                .cmp(&b.model_id)
                .then(b.method.priority().cmp(&a.method.priority()))
        });
        out
    }

    /// Clear winner flags on every pair of the entity.
    pub fn clear_winners(&self, entity: &str) {
        for mut item in self.entries.iter_mut() {
            if item.key().0 == entity {
                item.value_mut().winning_method = None;
            }
        }
    }

    /// Flag one (model, method) pair as the entity's winner, clearing any
    /// previous winner first.
    pub fn mark_winner(&self, entity: &str, model: &str, method: TuningMethod) -> Result<()> {
        self.clear_winners(entity);
        let mut entry = self
            .entries
            .get_mut(&(entity.to_string(), model.to_string()))
            .ok_or_else(|| CacheError::UnknownEntry {
                entity: entity.to_string(),
                model: model.to_string(),
            })?;
        entry.winning_method = Some(method);
        Ok(())
    }

    /// The entity's current winner, if one has been selected.
    pub fn winner(&self, entity: &str) -> Option<(String, TuningMethod)> {
        self.entries.iter().find_map(|item| {
            if item.key().0 != entity {
                return None;
            }
            item.value()
                .winning_method
                .map(|method| (item.key().1.clone(), method))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(accuracy: f64) -> ValidationMetrics {
        ValidationMetrics {
            accuracy,
            mape: 100.0 - accuracy,
            rmse: 2.0,
            mae: 1.5,
        }
    }

    fn record(hash: &str, accuracy: f64) -> MethodRecord {
        MethodRecord::new(
            ParamSet::new().with("alpha", 0.3),
            hash,
            metrics(accuracy),
            80.0,
        )
    }

    // ========== Store and Lookup ==========

    #[test]
    fn test_store_and_lookup_by_method() {
        let cache = OptimizationCache::new();
        cache.store("sku-1", "ses", TuningMethod::Grid, record("v2-abc", 90.0));

        let hit = cache
            .lookup("sku-1", "ses", "v2-abc", Some(TuningMethod::Grid))
            .unwrap();
        assert!((hit.accuracy - 90.0).abs() < f64::EPSILON);
        assert!(cache
            .lookup("sku-1", "ses", "v2-abc", Some(TuningMethod::Ai))
            .is_none());
    }

    #[test]
    fn test_lookup_prefers_ai_over_grid_over_manual() {
        let cache = OptimizationCache::new();
        cache.store("sku-1", "ses", TuningMethod::Manual, record("v2-abc", 70.0));
        cache.store("sku-1", "ses", TuningMethod::Grid, record("v2-abc", 80.0));

        let hit = cache.lookup("sku-1", "ses", "v2-abc", None).unwrap();
        assert!((hit.accuracy - 80.0).abs() < f64::EPSILON);

        cache.store("sku-1", "ses", TuningMethod::Ai, record("v2-abc", 60.0));
        let hit = cache.lookup("sku-1", "ses", "v2-abc", None).unwrap();
        // Priority wins even when the accuracy is lower.
        assert!((hit.accuracy - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stale_hash_invalidates() {
        let cache = OptimizationCache::new();
        cache.store("sku-1", "ses", TuningMethod::Grid, record("v2-old", 90.0));
        assert!(cache.lookup("sku-1", "ses", "v2-new", None).is_none());
    }

    #[test]
    fn test_expired_record_invalidates() {
        let cache = OptimizationCache::new();
        let stale = record("v2-abc", 90.0).saved_at(now_ms() - 25 * 60 * 60 * 1000);
        cache.store("sku-1", "ses", TuningMethod::Grid, stale);
        assert!(cache.lookup("sku-1", "ses", "v2-abc", None).is_none());
    }

    #[test]
    fn test_custom_expiry() {
        let cache = OptimizationCache::with_expiry(Duration::from_secs(60));
        let aged = record("v2-abc", 90.0).saved_at(now_ms() - 120 * 1000);
        cache.store("sku-1", "ses", TuningMethod::Grid, aged);
        assert!(cache.lookup("sku-1", "ses", "v2-abc", None).is_none());

        cache.store("sku-1", "ses", TuningMethod::Grid, record("v2-abc", 90.0));
        assert!(cache.lookup("sku-1", "ses", "v2-abc", None).is_some());
    }

    #[test]
    fn test_fallback_skips_invalid_higher_priority() {
        let cache = OptimizationCache::new();
        cache.store("sku-1", "ses", TuningMethod::Ai, record("v2-old", 95.0));
        cache.store("sku-1", "ses", TuningMethod::Grid, record("v2-abc", 85.0));

        let hit = cache.lookup("sku-1", "ses", "v2-abc", None).unwrap();
        assert!((hit.accuracy - 85.0).abs() < f64::EPSILON);
    }

    // ========== Selection State ==========

    #[test]
    fn test_manual_selection_clears_annotation() {
        let cache = OptimizationCache::new();
        cache.store("sku-1", "ses", TuningMethod::Grid, record("v2-abc", 90.0));
        cache
            .annotate(
                "sku-1",
                "ses",
                AppliedOptimization {
                    expected_accuracy: 90.0,
                    confidence: 80.0,
                    reasoning: Some("grid winner".to_string()),
                },
            )
            .unwrap();

        cache
            .set_selected_method("sku-1", "ses", TuningMethod::Grid)
            .unwrap();
        assert!(cache.entry("sku-1", "ses").unwrap().applied.is_some());

        cache
            .set_selected_method("sku-1", "ses", TuningMethod::Manual)
            .unwrap();
        let entry = cache.entry("sku-1", "ses").unwrap();
        assert_eq!(entry.selected_method, Some(TuningMethod::Manual));
        assert!(entry.applied.is_none());
    }

    #[test]
    fn test_selection_on_unknown_pair_fails() {
        let cache = OptimizationCache::new();
        let err = cache
            .set_selected_method("ghost", "ses", TuningMethod::Grid)
            .unwrap_err();
        assert!(matches!(err, CacheError::UnknownEntry { .. }));
    }

    // ========== Winner Flags ==========

    #[test]
    fn test_single_winner_per_entity() {
        let cache = OptimizationCache::new();
        cache.store("sku-1", "ses", TuningMethod::Grid, record("v2-abc", 80.0));
        cache.store("sku-1", "holt", TuningMethod::Grid, record("v2-abc", 85.0));

        cache.mark_winner("sku-1", "ses", TuningMethod::Grid).unwrap();
        assert_eq!(
            cache.winner("sku-1"),
            Some(("ses".to_string(), TuningMethod::Grid))
        );

        cache.mark_winner("sku-1", "holt", TuningMethod::Grid).unwrap();
        assert_eq!(
            cache.winner("sku-1"),
            Some(("holt".to_string(), TuningMethod::Grid))
        );
        assert!(cache.entry("sku-1", "ses").unwrap().winning_method.is_none());
    }

    #[test]
    fn test_winners_scoped_to_entity() {
        let cache = OptimizationCache::new();
        cache.store("sku-1", "ses", TuningMethod::Grid, record("v2-abc", 80.0));
        cache.store("sku-2", "ses", TuningMethod::Grid, record("v2-def", 80.0));

        cache.mark_winner("sku-1", "ses", TuningMethod::Grid).unwrap();
        cache.mark_winner("sku-2", "ses", TuningMethod::Grid).unwrap();
        assert!(cache.winner("sku-1").is_some());
        assert!(cache.winner("sku-2").is_some());
    }

    // ========== Candidates ==========

    #[test]
    fn test_candidates_only_valid_and_ordered() {
        let cache = OptimizationCache::new();
        cache.store("sku-1", "ses", TuningMethod::Grid, record("v2-abc", 80.0));
        cache.store("sku-1", "ses", TuningMethod::Ai, record("v2-abc", 75.0));
        cache.store("sku-1", "holt", TuningMethod::Grid, record("v2-old", 90.0));
        cache.store("sku-2", "ses", TuningMethod::Grid, record("v2-abc", 99.0));

        let candidates = cache.candidates("sku-1", "v2-abc");
        assert_eq!(candidates.len(), 2);
        // ses only (holt's hash is stale), ai before grid.
        assert_eq!(candidates[0].method, TuningMethod::Ai);
        assert_eq!(candidates[1].method, TuningMethod::Grid);
        assert!(candidates.iter().all(|c| c.model_id == "ses"));
    }
}
