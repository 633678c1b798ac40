//! Art Spark - recommendation and swipe-selection service for the art marketplace
//!
//! This library ranks catalog items against a visitor's viewed/liked signal and
//! drives the one-card-at-a-time swipe selector that feeds decisions back into
//! that signal.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Direction, Ranker, SelectorSnapshot, SelectorState, SwipeSelector};
pub use crate::models::{Item, ItemId, PreferenceProfile, RankingWeights, ScoredCandidate};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let ranker = Ranker::default();
        let profile = PreferenceProfile::new();
        assert!(ranker.rank_profile(&[], &profile).is_empty());
    }
}
