use crate::core::accumulator::PreferenceAccumulator;
use crate::models::Item;

/// Score an item against the accumulated preferences
///
/// score = style weight + medium weight + creator weight
///
/// Keys the visitor never interacted with count as zero, so an item sharing
/// nothing with the signal scores exactly `0.0`.
#[inline]
pub fn calculate_item_score(item: &Item, preferences: &PreferenceAccumulator) -> f64 {
    preferences.style_weight(item.style.as_deref())
        + preferences.medium_weight(item.medium.as_deref())
        + preferences.creator_weight(item.creator_id)
}
