use std::collections::{BTreeSet, HashSet};

use crate::core::{accumulator::PreferenceAccumulator, scoring::calculate_item_score};
use crate::models::{Item, ItemId, PreferenceProfile, RankingWeights, ScoredCandidate, MAX_RECOMMENDATIONS};

/// Preference ranker - turns a visitor's signal into recommendations
///
/// # Pipeline Stages
/// 1. Accumulate style/medium/creator weights from viewed and liked items
/// 2. Exclude everything already viewed
/// 3. Score the rest, dropping items with no overlap
/// 4. Stable sort by score and truncate
///
/// The ranker holds no state besides its weights; identical inputs always
/// produce identical output.
#[derive(Debug, Clone)]
pub struct Ranker {
    weights: RankingWeights,
}

impl Ranker {
    pub fn new(weights: RankingWeights) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: RankingWeights::default(),
        }
    }

    /// Rank catalog items the visitor has not seen yet
    ///
    /// # Arguments
    /// * `catalog` - Full catalog as returned by the provider
    /// * `viewed` - Ids the visitor has viewed; never part of the output
    /// * `liked` - Ids the visitor has liked
    ///
    /// # Returns
    /// At most `limit` candidates, highest score first, ties in catalog order.
    /// Empty when `viewed` is empty, since there is nothing to infer from.
    pub fn rank(
        &self,
        catalog: &[Item],
        viewed: &BTreeSet<ItemId>,
        liked: &BTreeSet<ItemId>,
    ) -> Vec<ScoredCandidate> {
        if viewed.is_empty() || catalog.is_empty() {
            return Vec::new();
        }

        let preferences = PreferenceAccumulator::from_signal(catalog, viewed, liked, &self.weights);

        let mut emitted: HashSet<ItemId> = HashSet::new();

        let mut scored: Vec<ScoredCandidate> = catalog
            .iter()
            // Stage 2: exclude anything already viewed
            .filter(|item| !viewed.contains(&item.id))
            // Catalogs with repeated ids keep the first occurrence
            .filter(|item| emitted.insert(item.id))
            // Stage 3: score, keeping only items related to the signal
            .filter_map(|item| {
                let score = calculate_item_score(item, &preferences);

                if score > 0.0 {
                    Some(ScoredCandidate {
                        item: item.clone(),
                        score,
                    })
                } else {
                    None
                }
            })
            .collect();

        // Stage 4: sort_by is stable, so equal scores stay in catalog order
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        scored.truncate(self.weights.limit.min(MAX_RECOMMENDATIONS));

        tracing::trace!(
            catalog = catalog.len(),
            viewed = viewed.len(),
            liked = liked.len(),
            ranked = scored.len(),
            "Ranked catalog"
        );

        scored
    }

    /// Rank against a profile snapshot
    pub fn rank_profile(&self, catalog: &[Item], profile: &PreferenceProfile) -> Vec<ScoredCandidate> {
        self.rank(catalog, &profile.viewed, &profile.liked)
    }

    /// Same as [`Ranker::rank`] without the scores
    pub fn rank_items(
        &self,
        catalog: &[Item],
        viewed: &BTreeSet<ItemId>,
        liked: &BTreeSet<ItemId>,
    ) -> Vec<Item> {
        self.rank(catalog, viewed, liked)
            .into_iter()
            .map(|candidate| candidate.item)
            .collect()
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[ItemId]) -> BTreeSet<ItemId> {
        values.iter().copied().collect()
    }

    fn abc_catalog() -> Vec<Item> {
        vec![
            Item::new(1, Some("abstract"), None, 1, 100.0), // A
            Item::new(2, Some("abstract"), None, 2, 100.0), // B
            Item::new(3, Some("portrait"), None, 1, 100.0), // C
        ]
    }

    #[test]
    fn test_viewed_only_scenario() {
        let ranker = Ranker::with_default_weights();
        let result = ranker.rank(&abc_catalog(), &ids(&[1]), &ids(&[]));

        let ranked: Vec<(ItemId, f64)> = result.iter().map(|c| (c.item.id, c.score)).collect();
        assert_eq!(ranked, vec![(2, 1.0), (3, 1.0)]);
    }

    #[test]
    fn test_viewed_and_liked_scenario() {
        let ranker = Ranker::with_default_weights();
        let result = ranker.rank(&abc_catalog(), &ids(&[1]), &ids(&[1]));

        let ranked: Vec<(ItemId, f64)> = result.iter().map(|c| (c.item.id, c.score)).collect();
        assert_eq!(ranked, vec![(2, 4.0), (3, 4.0)]);
    }

    #[test]
    fn test_no_signal_returns_empty() {
        let ranker = Ranker::with_default_weights();
        assert!(ranker.rank(&abc_catalog(), &ids(&[]), &ids(&[])).is_empty());
        // Likes alone do not count as signal
        assert!(ranker.rank(&abc_catalog(), &ids(&[]), &ids(&[1])).is_empty());
    }

    #[test]
    fn test_empty_catalog() {
        let ranker = Ranker::with_default_weights();
        assert!(ranker.rank(&[], &ids(&[1]), &ids(&[1])).is_empty());
    }

    #[test]
    fn test_sorted_by_score() {
        let ranker = Ranker::with_default_weights();
        let catalog = vec![
            Item::new(1, Some("abstract"), Some("oil"), 1, 100.0),
            Item::new(2, Some("portrait"), None, 9, 100.0),   // no overlap
            Item::new(3, Some("abstract"), None, 7, 100.0),   // style only
            Item::new(4, Some("abstract"), Some("oil"), 1, 100.0), // all three
        ];

        let result = ranker.rank_items(&catalog, &ids(&[1]), &ids(&[]));
        let order: Vec<ItemId> = result.iter().map(|i| i.id).collect();
        assert_eq!(order, vec![4, 3]);
    }

    #[test]
    fn test_respects_limit() {
        let ranker = Ranker::with_default_weights();
        let catalog: Vec<Item> = (0..30)
            .map(|i| Item::new(i, Some("abstract"), None, i, 100.0))
            .collect();

        let result = ranker.rank(&catalog, &ids(&[0]), &ids(&[]));
        assert_eq!(result.len(), 10);
        // Ties keep catalog order
        let order: Vec<ItemId> = result.iter().map(|c| c.item.id).collect();
        assert_eq!(order, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_duplicate_catalog_ids_ranked_once() {
        let ranker = Ranker::with_default_weights();
        let mut catalog = abc_catalog();
        catalog.push(Item::new(2, Some("abstract"), None, 2, 100.0));

        let result = ranker.rank(&catalog, &ids(&[1]), &ids(&[]));
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_custom_weights() {
        let ranker = Ranker::new(RankingWeights {
            viewed: 2.0,
            liked: 5.0,
            limit: 1,
        });

        let result = ranker.rank(&abc_catalog(), &ids(&[1]), &ids(&[1]));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].item.id, 2);
        assert_eq!(result[0].score, 7.0);
    }

    #[test]
    fn test_limit_never_exceeds_cap() {
        let ranker = Ranker::new(RankingWeights {
            limit: 50,
            ..RankingWeights::default()
        });
        let catalog: Vec<Item> = (0..30)
            .map(|i| Item::new(i, Some("abstract"), None, i, 100.0))
            .collect();

        let result = ranker.rank(&catalog, &ids(&[0]), &ids(&[]));
        assert_eq!(result.len(), MAX_RECOMMENDATIONS);
    }
}
