use std::collections::{BTreeSet, HashMap};

use crate::models::{Item, ItemId, RankingWeights};

/// Per-attribute preference weights inferred from a visitor's signal
///
/// Built in two passes over the catalog: viewed items first, then liked
/// items. Contributions are additive, so an item that is both viewed and
/// liked contributes `viewed + liked` weight to each of its keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferenceAccumulator {
    styles: HashMap<String, f64>,
    mediums: HashMap<String, f64>,
    creators: HashMap<i64, f64>,
}

impl PreferenceAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate weights from the catalog items named in `viewed` and `liked`
    ///
    /// Ids that are not in the catalog are skipped.
    pub fn from_signal(
        catalog: &[Item],
        viewed: &BTreeSet<ItemId>,
        liked: &BTreeSet<ItemId>,
        weights: &RankingWeights,
    ) -> Self {
        let mut acc = Self::new();

        for item in catalog.iter().filter(|item| viewed.contains(&item.id)) {
            acc.observe(item, weights.viewed);
        }

        for item in catalog.iter().filter(|item| liked.contains(&item.id)) {
            acc.observe(item, weights.liked);
        }

        acc
    }

    /// Add `weight` to every key the item carries
    pub fn observe(&mut self, item: &Item, weight: f64) {
        if let Some(style) = &item.style {
            *self.styles.entry(style.clone()).or_insert(0.0) += weight;
        }

        if let Some(medium) = &item.medium {
            *self.mediums.entry(medium.clone()).or_insert(0.0) += weight;
        }

        *self.creators.entry(item.creator_id).or_insert(0.0) += weight;
    }

    #[inline]
    pub fn style_weight(&self, style: Option<&str>) -> f64 {
        style.and_then(|s| self.styles.get(s)).copied().unwrap_or(0.0)
    }

    #[inline]
    pub fn medium_weight(&self, medium: Option<&str>) -> f64 {
        medium.and_then(|m| self.mediums.get(m)).copied().unwrap_or(0.0)
    }

    #[inline]
    pub fn creator_weight(&self, creator_id: i64) -> f64 {
        self.creators.get(&creator_id).copied().unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty() && self.mediums.is_empty() && self.creators.is_empty()
    }
}
