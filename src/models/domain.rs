use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// Catalog item identifier
pub type ItemId = i64;

/// Artwork as served by the catalog provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub medium: Option<String>,
    #[serde(rename = "artistId", alias = "creatorId")]
    pub creator_id: i64,
    #[serde(deserialize_with = "deserialize_price")]
    pub price: f64,
}

impl Item {
    /// Minimal item carrying only the attributes the ranker looks at
    pub fn new(id: ItemId, style: Option<&str>, medium: Option<&str>, creator_id: i64, price: f64) -> Self {
        Self {
            id,
            title: None,
            image_url: None,
            style: style.map(str::to_string),
            medium: medium.map(str::to_string),
            creator_id,
            price,
        }
    }
}

/// Decimal columns come back from the catalog as strings ("1250.00");
/// plain JSON numbers are accepted too.
fn deserialize_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPrice {
        Number(f64),
        Text(String),
    }

    match RawPrice::deserialize(deserializer)? {
        RawPrice::Number(n) => Ok(n),
        RawPrice::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid price {:?}: {}", s, e))),
    }
}

/// A visitor's accumulated browsing signal
///
/// `liked` is not required to be a subset of `viewed`. Ids that no longer
/// exist in the catalog are kept and simply contribute nothing when ranking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceProfile {
    #[serde(default)]
    pub viewed: BTreeSet<ItemId>,
    #[serde(default)]
    pub liked: BTreeSet<ItemId>,
}

impl PreferenceProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids<V, L>(viewed: V, liked: L) -> Self
    where
        V: IntoIterator<Item = ItemId>,
        L: IntoIterator<Item = ItemId>,
    {
        Self {
            viewed: viewed.into_iter().collect(),
            liked: liked.into_iter().collect(),
        }
    }

    /// Returns true if the id was not already marked viewed
    pub fn mark_viewed(&mut self, id: ItemId) -> bool {
        self.viewed.insert(id)
    }

    /// Returns true if the id was not already marked liked
    pub fn mark_liked(&mut self, id: ItemId) -> bool {
        self.liked.insert(id)
    }

    pub fn is_viewed(&self, id: ItemId) -> bool {
        self.viewed.contains(&id)
    }

    pub fn is_liked(&self, id: ItemId) -> bool {
        self.liked.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.viewed.is_empty() && self.liked.is_empty()
    }

    /// Immutable copy to hand to the ranker while the live profile keeps changing
    pub fn snapshot(&self) -> PreferenceProfile {
        self.clone()
    }
}

/// Ranked recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub item: Item,
    pub score: f64,
}

/// Upper bound on the number of recommendations returned for any input
pub const MAX_RECOMMENDATIONS: usize = 10;

/// Signal weights used by the ranker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingWeights {
    pub viewed: f64,
    pub liked: f64,
    pub limit: usize,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            viewed: 1.0,
            liked: 3.0,
            limit: MAX_RECOMMENDATIONS,
        }
    }
}

/// Kind of stored signal row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Viewed,
    Liked,
}

/// Line in a visitor's cart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(rename = "itemId")]
    pub item_id: ItemId,
    pub quantity: i32,
    pub price: f64,
    #[serde(rename = "addedAt")]
    pub added_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_price_from_string() {
        let json = r#"{"id": 7, "title": "Dusk", "imageUrl": "/a.jpg", "artistId": 3,
                       "style": "abstract", "medium": null, "price": "1250.00"}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, 7);
        assert_eq!(item.creator_id, 3);
        assert_eq!(item.style.as_deref(), Some("abstract"));
        assert!(item.medium.is_none());
        assert_eq!(item.price, 1250.0);
    }

    #[test]
    fn test_item_price_from_number() {
        let json = r#"{"id": 1, "artistId": 2, "price": 99.5}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.price, 99.5);
        assert!(item.style.is_none());
    }

    #[test]
    fn test_item_invalid_price() {
        let json = r#"{"id": 1, "artistId": 2, "price": "cheap"}"#;
        assert!(serde_json::from_str::<Item>(json).is_err());
    }

    #[test]
    fn test_profile_marks() {
        let mut profile = PreferenceProfile::new();
        assert!(profile.is_empty());
        assert!(profile.mark_viewed(1));
        assert!(!profile.mark_viewed(1));
        assert!(profile.mark_liked(2));
        assert!(profile.is_viewed(1));
        assert!(!profile.is_viewed(2));
        assert!(profile.is_liked(2));
    }

    #[test]
    fn test_profile_missing_fields_default() {
        let profile: PreferenceProfile = serde_json::from_str("{}").unwrap();
        assert!(profile.is_empty());
    }

    #[test]
    fn test_default_weights() {
        let weights = RankingWeights::default();
        assert_eq!(weights.viewed, 1.0);
        assert_eq!(weights.liked, 3.0);
        assert_eq!(weights.limit, 10);
    }
}
