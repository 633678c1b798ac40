// Unit tests for Art Spark ranking properties

use artspark::core::{
    accumulator::PreferenceAccumulator,
    gesture::{Direction, SwipeGesture, VoteButton, DEFAULT_SWIPE_THRESHOLD},
    scoring::calculate_item_score,
    Ranker,
};
use artspark::models::{Item, ItemId, RankingWeights};
use std::collections::BTreeSet;

const STYLES: &[&str] = &["abstract", "portrait", "landscape", "surrealism", "pop"];
const MEDIUMS: &[&str] = &["oil", "acrylic", "watercolor", "ink"];

fn ids(values: &[ItemId]) -> BTreeSet<ItemId> {
    values.iter().copied().collect()
}

/// Deterministic catalog with a spread of attribute combinations
fn create_test_catalog(size: i64) -> Vec<Item> {
    (0..size)
        .map(|i| {
            let style = if i % 7 == 0 { None } else { Some(STYLES[(i as usize) % STYLES.len()]) };
            let medium = if i % 5 == 0 { None } else { Some(MEDIUMS[(i as usize) % MEDIUMS.len()]) };
            Item::new(i, style, medium, i % 6, 100.0 + i as f64)
        })
        .collect()
}

fn signal_cases() -> Vec<(BTreeSet<ItemId>, BTreeSet<ItemId>)> {
    vec![
        (ids(&[0]), ids(&[])),
        (ids(&[1, 2, 3]), ids(&[2])),
        (ids(&[4, 9, 14, 19]), ids(&[4, 9, 14, 19])),
        (ids(&[5]), ids(&[6, 7, 8])),
        (ids(&[10, 500]), ids(&[600])),
        ((0..40).collect(), ids(&[3])),
    ]
}

#[test]
fn test_exclusion_of_viewed_items() {
    let ranker = Ranker::with_default_weights();
    let catalog = create_test_catalog(50);

    for (viewed, liked) in signal_cases() {
        let ranked = ranker.rank(&catalog, &viewed, &liked);
        for candidate in &ranked {
            assert!(
                !viewed.contains(&candidate.item.id),
                "Viewed item {} was recommended",
                candidate.item.id
            );
        }
    }
}

#[test]
fn test_cap_and_no_duplicates() {
    let ranker = Ranker::with_default_weights();
    let catalog = create_test_catalog(200);

    for (viewed, liked) in signal_cases() {
        let ranked = ranker.rank(&catalog, &viewed, &liked);
        assert!(ranked.len() <= 10, "Returned {} items", ranked.len());

        let unique: BTreeSet<ItemId> = ranked.iter().map(|c| c.item.id).collect();
        assert_eq!(unique.len(), ranked.len());
    }
}

#[test]
fn test_scores_positive_and_descending() {
    let ranker = Ranker::with_default_weights();
    let catalog = create_test_catalog(100);

    for (viewed, liked) in signal_cases() {
        let ranked = ranker.rank(&catalog, &viewed, &liked);
        for pair in ranked.windows(2) {
            assert!(pair[0].score >= pair[1].score, "Scores not sorted");
        }
        assert!(ranked.iter().all(|c| c.score > 0.0));
    }
}

#[test]
fn test_idempotence() {
    let ranker = Ranker::with_default_weights();
    let catalog = create_test_catalog(80);

    for (viewed, liked) in signal_cases() {
        let first = ranker.rank(&catalog, &viewed, &liked);
        let second = ranker.rank(&catalog, &viewed, &liked);
        assert_eq!(first, second);
    }
}

#[test]
fn test_no_signal_returns_empty() {
    let ranker = Ranker::with_default_weights();
    let catalog = create_test_catalog(30);
    assert!(ranker.rank(&catalog, &ids(&[]), &ids(&[])).is_empty());
}

#[test]
fn test_unliking_never_increases_scores() {
    let weights = RankingWeights::default();
    let catalog = create_test_catalog(60);
    let viewed = ids(&[1, 2, 3, 12]);
    let liked = ids(&[2, 12, 30]);

    let with_like = PreferenceAccumulator::from_signal(&catalog, &viewed, &liked, &weights);

    for unliked in &liked {
        let mut reduced = liked.clone();
        reduced.remove(unliked);
        let without_like = PreferenceAccumulator::from_signal(&catalog, &viewed, &reduced, &weights);

        for item in catalog.iter().filter(|item| !viewed.contains(&item.id)) {
            assert!(
                calculate_item_score(item, &without_like) <= calculate_item_score(item, &with_like),
                "Unliking {} raised the score of {}",
                unliked,
                item.id
            );
        }
    }
}

#[test]
fn test_liked_outweighs_viewed_three_to_one() {
    let weights = RankingWeights::default();
    let catalog = vec![
        Item::new(1, Some("abstract"), Some("oil"), 1, 100.0),
        Item::new(2, Some("portrait"), Some("ink"), 2, 100.0),
    ];

    let viewed_only = PreferenceAccumulator::from_signal(&catalog, &ids(&[1]), &ids(&[]), &weights);
    let liked_only = PreferenceAccumulator::from_signal(&catalog, &ids(&[]), &ids(&[1]), &weights);

    let probe = Item::new(3, Some("abstract"), Some("oil"), 1, 100.0);
    assert_eq!(calculate_item_score(&probe, &viewed_only), 3.0);
    assert_eq!(calculate_item_score(&probe, &liked_only), 9.0);
}

#[test]
fn test_removed_catalog_items_are_tolerated() {
    let ranker = Ranker::with_default_weights();
    let catalog = create_test_catalog(20);

    // Only unknown ids: no accumulator contributions, nothing related
    assert!(ranker.rank(&catalog, &ids(&[1000, 1001]), &ids(&[1002])).is_empty());

    // Unknown ids mixed with known ones rank like the known ones alone
    let mixed = ranker.rank(&catalog, &ids(&[3, 1000]), &ids(&[1002]));
    let known = ranker.rank(&catalog, &ids(&[3]), &ids(&[]));
    assert_eq!(mixed, known);
}

#[test]
fn test_button_and_gesture_agree() {
    assert_eq!(
        SwipeGesture::new(DEFAULT_SWIPE_THRESHOLD + 1.0).resolve(DEFAULT_SWIPE_THRESHOLD),
        Some(Direction::from(VoteButton::Like))
    );
    assert_eq!(
        SwipeGesture::new(-DEFAULT_SWIPE_THRESHOLD - 1.0).resolve(DEFAULT_SWIPE_THRESHOLD),
        Some(Direction::from(VoteButton::Skip))
    );
}
