// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    CartLine, Item, ItemId, PreferenceProfile, RankingWeights, ScoredCandidate, SignalKind, MAX_RECOMMENDATIONS,
};
pub use requests::{CreateSessionRequest, DecideRequest, RecommendationsRequest, RecordViewRequest, VisitorQuery};
pub use responses::{
    CartResponse, DecideResponse, ErrorResponse, HealthResponse, RecommendationsResponse, SessionResponse,
    SignalsResponse,
};
