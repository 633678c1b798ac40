// Core algorithm exports
pub mod accumulator;
pub mod gesture;
pub mod ranker;
pub mod scoring;
pub mod selector;

pub use accumulator::PreferenceAccumulator;
pub use gesture::{Direction, SwipeGesture, VoteButton, DEFAULT_SWIPE_THRESHOLD};
pub use ranker::Ranker;
pub use scoring::calculate_item_score;
pub use selector::{
    CartSink, DecideOutcome, DecisionEvent, LoadOutcome, NoopCart, SelectionObserver, SelectorSnapshot,
    SelectorState, SettleOutcome, SettleTicket, SwipeSelector,
};
