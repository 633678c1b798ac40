use serde::{Deserialize, Serialize};

use crate::core::selector::SelectorSnapshot;
use crate::models::domain::{CartLine, ItemId, ScoredCandidate};

/// Response for the recommendations endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<ScoredCandidate>,
    #[serde(rename = "catalogSize")]
    pub catalog_size: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Stored signal for a visitor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalsResponse {
    #[serde(rename = "visitorId")]
    pub visitor_id: String,
    pub viewed: Vec<ItemId>,
    pub liked: Vec<ItemId>,
}

/// Swipe session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(rename = "visitorId")]
    pub visitor_id: String,
    pub snapshot: SelectorSnapshot,
}

/// Outcome of a decide call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecideResponse {
    /// False when the input was ignored or the gesture snapped back
    pub applied: bool,
    pub snapshot: SelectorSnapshot,
}

/// Cart contents for a visitor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartResponse {
    #[serde(rename = "visitorId")]
    pub visitor_id: String,
    pub items: Vec<CartLine>,
}
