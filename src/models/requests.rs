use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::gesture::{Direction, SwipeGesture, VoteButton};
use crate::models::domain::ItemId;

/// Request to rank recommendations for a visitor
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecommendationsRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "visitor_id", rename = "visitorId")]
    pub visitor_id: String,
}

/// Request to record that an item was displayed to a visitor
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordViewRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "visitor_id", rename = "visitorId")]
    pub visitor_id: String,
    #[serde(alias = "item_id", rename = "itemId")]
    pub item_id: ItemId,
}

/// Request to open a swipe session
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSessionRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "visitor_id", rename = "visitorId")]
    pub visitor_id: String,
}

/// A decision on the presented candidate
///
/// Exactly one input is expected. `direction` wins over `button`, which wins
/// over a drag gesture.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecideRequest {
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub button: Option<VoteButton>,
    #[serde(alias = "offset_x", rename = "offsetX", default)]
    pub offset_x: Option<f64>,
}

impl DecideRequest {
    /// Resolve the request into a direction; `None` means the gesture snapped back
    pub fn resolve(&self, gesture_threshold: f64) -> Option<Direction> {
        if let Some(direction) = self.direction {
            return Some(direction);
        }
        if let Some(button) = self.button {
            return Some(button.into());
        }
        self.offset_x
            .and_then(|offset_x| SwipeGesture::new(offset_x).resolve(gesture_threshold))
    }
}

/// Query parameters carrying a visitor id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitorQuery {
    #[serde(alias = "visitor_id", rename = "visitorId")]
    pub visitor_id: String,
}
