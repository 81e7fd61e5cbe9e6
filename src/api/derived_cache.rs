use ordered_float::OrderedFloat;

use crate::core::FitRange;
use crate::error::FitResult;

/// Runtime metrics exposed by the session's derived-data cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DerivedCacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Canonical inputs every derived render product depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) struct DerivedKey {
    pub(super) spectrum_generation: u64,
    pub(super) layout_generation: u64,
    pub(super) store_version: u64,
    pub(super) slice_min: OrderedFloat<f64>,
    pub(super) slice_max: OrderedFloat<f64>,
}

impl DerivedKey {
    pub(super) fn new(
        spectrum_generation: u64,
        layout_generation: u64,
        store_version: u64,
        slice: FitRange,
    ) -> Self {
        Self {
            spectrum_generation,
            layout_generation,
            store_version,
            slice_min: OrderedFloat(slice.min),
            slice_max: OrderedFloat(slice.max),
        }
    }
}

/// Single-entry memo: holds the value computed for the most recent key.
#[derive(Debug)]
pub(super) struct MemoSlot<K, V> {
    entry: Option<(K, V)>,
}

impl<K, V> Default for MemoSlot<K, V> {
    fn default() -> Self {
        Self { entry: None }
    }
}

impl<K: PartialEq + Copy, V: Clone> MemoSlot<K, V> {
    pub(super) fn get_or_try_insert_with(
        &mut self,
        key: K,
        stats: &mut DerivedCacheStats,
        compute: impl FnOnce() -> FitResult<V>,
    ) -> FitResult<V> {
        if let Some((cached_key, value)) = &self.entry {
            if *cached_key == key {
                stats.hits = stats.hits.saturating_add(1);
                return Ok(value.clone());
            }
        }
        stats.misses = stats.misses.saturating_add(1);
        let value = compute()?;
        self.entry = Some((key, value.clone()));
        Ok(value)
    }

    pub(super) fn clear(&mut self) {
        self.entry = None;
    }
}
