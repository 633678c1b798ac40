use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::core::gesture::Direction;
use crate::models::{Item, ItemId, PreferenceProfile};

/// Receives accepted items
///
/// Delivery is fire-and-forget: the selector never looks at the outcome,
/// retries and backpressure are up to the implementation.
pub trait CartSink: Send + Sync {
    fn submit(&self, item: &Item);
}

/// Notified after every state transition of a selector
pub trait SelectionObserver: Send + Sync {
    fn on_transition(&self, snapshot: &SelectorSnapshot);
}

/// Cart sink that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCart;

impl CartSink for NoopCart {
    fn submit(&self, _item: &Item) {}
}

/// Selector state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum SelectorState {
    /// No candidates loaded
    Idle,
    /// Waiting for a decision on the candidate under the cursor
    Presenting,
    /// Decision made, exit in progress; input is suppressed until settle
    Transitioning { direction: Direction },
    /// Cursor has passed the last candidate
    Exhausted,
}

/// Handle for completing a transition
///
/// Tied to the generation and cursor it was issued for, so a settle that
/// arrives after a reload cannot touch the new sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleTicket {
    generation: u64,
    cursor: usize,
}

impl SettleTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Emitted for every applied decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionEvent {
    pub item: Item,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded { generation: u64, total: usize },
    /// Nothing to present; the selector stays idle
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecideOutcome {
    Applied { event: DecisionEvent, ticket: SettleTicket },
    /// Not presenting: duplicate input during a transition, or nothing loaded
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    Advanced { cursor: usize },
    Exhausted,
    /// Ticket belongs to a superseded sequence or an already settled decision
    Stale,
}

/// What an observer needs to render the selector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorSnapshot {
    #[serde(flatten)]
    pub state: SelectorState,
    pub generation: u64,
    /// 1-based position of the current candidate
    pub position: usize,
    pub total: usize,
    pub current: Option<Item>,
    pub pending: Option<Direction>,
    pub exhausted: bool,
}

/// Swipe selection state machine
///
/// Idle --load--> Presenting --decide--> Transitioning --settle--> Presenting | Exhausted
///
/// All effects of a decision (profile update, cart forward) happen inside
/// `decide`, before the state becomes `Transitioning`.
pub struct SwipeSelector {
    candidates: Vec<Item>,
    cursor: usize,
    state: SelectorState,
    generation: u64,
    cart: Arc<dyn CartSink>,
    observers: Vec<Arc<dyn SelectionObserver>>,
}

impl SwipeSelector {
    pub fn new(cart: Arc<dyn CartSink>) -> Self {
        Self {
            candidates: Vec::new(),
            cursor: 0,
            state: SelectorState::Idle,
            generation: 0,
            cart,
            observers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, observer: Arc<dyn SelectionObserver>) {
        self.observers.push(observer);
    }

    pub fn state(&self) -> SelectorState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn candidates(&self) -> &[Item] {
        &self.candidates
    }

    /// Candidate under the cursor while presenting or transitioning
    pub fn current(&self) -> Option<&Item> {
        match self.state {
            SelectorState::Presenting | SelectorState::Transitioning { .. } => self.candidates.get(self.cursor),
            SelectorState::Idle | SelectorState::Exhausted => None,
        }
    }

    /// Replace the candidate sequence
    ///
    /// Always starts a new generation, discarding any pending settle.
    pub fn load(&mut self, candidates: Vec<Item>) -> LoadOutcome {
        self.generation += 1;
        self.cursor = 0;

        let outcome = if candidates.is_empty() {
            self.candidates.clear();
            self.state = SelectorState::Idle;
            LoadOutcome::Empty
        } else {
            let total = candidates.len();
            self.candidates = candidates;
            self.state = SelectorState::Presenting;
            LoadOutcome::Loaded {
                generation: self.generation,
                total,
            }
        };

        tracing::debug!(generation = self.generation, total = self.candidates.len(), "Loaded candidates");
        self.notify();
        outcome
    }

    /// Apply a decision to the presented candidate
    ///
    /// Only effective while presenting; anything else is ignored.
    pub fn decide(&mut self, direction: Direction, profile: &mut PreferenceProfile) -> DecideOutcome {
        if self.state != SelectorState::Presenting {
            tracing::trace!(state = ?self.state, ?direction, "Ignoring decision");
            return DecideOutcome::Ignored;
        }

        let item = match self.candidates.get(self.cursor) {
            Some(item) => item.clone(),
            None => return DecideOutcome::Ignored,
        };

        profile.mark_viewed(item.id);
        if direction.is_accept() {
            profile.mark_liked(item.id);
            self.cart.submit(&item);
        }

        self.state = SelectorState::Transitioning { direction };

        tracing::debug!(item_id = item.id, ?direction, cursor = self.cursor, "Decision applied");

        let ticket = SettleTicket {
            generation: self.generation,
            cursor: self.cursor,
        };
        self.notify();

        DecideOutcome::Applied {
            event: DecisionEvent { item, direction },
            ticket,
        }
    }

    /// Finish the transition started by `decide`
    pub fn settle(&mut self, ticket: SettleTicket) -> SettleOutcome {
        let transitioning = matches!(self.state, SelectorState::Transitioning { .. });
        if !transitioning || ticket.generation != self.generation || ticket.cursor != self.cursor {
            tracing::debug!(
                ticket_generation = ticket.generation,
                generation = self.generation,
                "Discarding stale settle"
            );
            return SettleOutcome::Stale;
        }

        let outcome = if self.cursor + 1 < self.candidates.len() {
            self.cursor += 1;
            self.state = SelectorState::Presenting;
            SettleOutcome::Advanced { cursor: self.cursor }
        } else {
            self.state = SelectorState::Exhausted;
            SettleOutcome::Exhausted
        };

        self.notify();
        outcome
    }

    /// Record that the presented candidate was displayed
    ///
    /// Adds it to `viewed` without making a decision.
    pub fn mark_displayed(&self, profile: &mut PreferenceProfile) -> Option<ItemId> {
        if self.state != SelectorState::Presenting {
            return None;
        }

        let id = self.candidates.get(self.cursor)?.id;
        profile.mark_viewed(id);
        Some(id)
    }

    pub fn snapshot(&self) -> SelectorSnapshot {
        let total = self.candidates.len();
        let (position, pending) = match self.state {
            SelectorState::Idle => (0, None),
            SelectorState::Presenting => (self.cursor + 1, None),
            SelectorState::Transitioning { direction } => (self.cursor + 1, Some(direction)),
            SelectorState::Exhausted => (total, None),
        };

        SelectorSnapshot {
            state: self.state,
            generation: self.generation,
            position,
            total,
            current: self.current().cloned(),
            pending,
            exhausted: self.state == SelectorState::Exhausted,
        }
    }

    fn notify(&self) {
        if self.observers.is_empty() {
            return;
        }

        let snapshot = self.snapshot();
        for observer in &self.observers {
            observer.on_transition(&snapshot);
        }
    }
}

impl fmt::Debug for SwipeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwipeSelector")
            .field("state", &self.state)
            .field("cursor", &self.cursor)
            .field("generation", &self.generation)
            .field("candidates", &self.candidates.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingCart {
        items: Mutex<Vec<ItemId>>,
    }

    impl CartSink for RecordingCart {
        fn submit(&self, item: &Item) {
            self.items.lock().unwrap().push(item.id);
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        states: Mutex<Vec<SelectorState>>,
    }

    impl SelectionObserver for RecordingObserver {
        fn on_transition(&self, snapshot: &SelectorSnapshot) {
            self.states.lock().unwrap().push(snapshot.state);
        }
    }

    fn items(n: i64) -> Vec<Item> {
        (1..=n).map(|i| Item::new(i, Some("abstract"), None, 1, 100.0)).collect()
    }

    fn selector() -> (SwipeSelector, Arc<RecordingCart>) {
        let cart = Arc::new(RecordingCart::default());
        (SwipeSelector::new(cart.clone()), cart)
    }

    fn applied_ticket(outcome: DecideOutcome) -> SettleTicket {
        match outcome {
            DecideOutcome::Applied { ticket, .. } => ticket,
            DecideOutcome::Ignored => panic!("decision was ignored"),
        }
    }

    #[test]
    fn test_load_empty_stays_idle() {
        let (mut selector, _) = selector();
        assert_eq!(selector.load(vec![]), LoadOutcome::Empty);
        assert_eq!(selector.state(), SelectorState::Idle);
        assert!(selector.current().is_none());
    }

    #[test]
    fn test_load_presents_first() {
        let (mut selector, _) = selector();
        assert_eq!(selector.load(items(3)), LoadOutcome::Loaded { generation: 1, total: 3 });
        assert_eq!(selector.state(), SelectorState::Presenting);
        assert_eq!(selector.current().map(|i| i.id), Some(1));
    }

    #[test]
    fn test_accept_updates_profile_and_cart() {
        let (mut selector, cart) = selector();
        let mut profile = PreferenceProfile::new();
        selector.load(items(2));

        let outcome = selector.decide(Direction::Accept, &mut profile);
        assert!(matches!(outcome, DecideOutcome::Applied { ref event, .. } if event.item.id == 1));
        assert!(profile.is_viewed(1));
        assert!(profile.is_liked(1));
        assert_eq!(*cart.items.lock().unwrap(), vec![1]);
        assert_eq!(selector.state(), SelectorState::Transitioning { direction: Direction::Accept });
    }

    #[test]
    fn test_reject_only_marks_viewed() {
        let (mut selector, cart) = selector();
        let mut profile = PreferenceProfile::new();
        selector.load(items(2));

        selector.decide(Direction::Reject, &mut profile);
        assert!(profile.is_viewed(1));
        assert!(!profile.is_liked(1));
        assert!(cart.items.lock().unwrap().is_empty());
    }

    #[test]
    fn test_decisions_suppressed_while_transitioning() {
        let (mut selector, cart) = selector();
        let mut profile = PreferenceProfile::new();
        selector.load(items(3));

        let ticket = applied_ticket(selector.decide(Direction::Accept, &mut profile));
        assert_eq!(selector.decide(Direction::Accept, &mut profile), DecideOutcome::Ignored);
        assert_eq!(cart.items.lock().unwrap().len(), 1);

        assert_eq!(selector.settle(ticket), SettleOutcome::Advanced { cursor: 1 });
        assert_eq!(selector.current().map(|i| i.id), Some(2));
        // Settling twice does not advance again
        assert_eq!(selector.settle(ticket), SettleOutcome::Stale);
        assert_eq!(selector.cursor(), 1);
    }

    #[test]
    fn test_last_candidate_settles_to_exhausted() {
        let (mut selector, _) = selector();
        let mut profile = PreferenceProfile::new();
        selector.load(items(1));

        let ticket = applied_ticket(selector.decide(Direction::Reject, &mut profile));
        assert_eq!(selector.settle(ticket), SettleOutcome::Exhausted);
        assert_eq!(selector.state(), SelectorState::Exhausted);
        assert_eq!(selector.decide(Direction::Accept, &mut profile), DecideOutcome::Ignored);

        let snapshot = selector.snapshot();
        assert!(snapshot.exhausted);
        assert!(snapshot.current.is_none());
        assert_eq!(snapshot.position, 1);
    }

    #[test]
    fn test_stale_settle_after_reload() {
        let (mut selector, _) = selector();
        let mut profile = PreferenceProfile::new();
        selector.load(items(3));

        let ticket = applied_ticket(selector.decide(Direction::Reject, &mut profile));
        selector.load(items(2));

        assert_eq!(selector.settle(ticket), SettleOutcome::Stale);
        assert_eq!(selector.state(), SelectorState::Presenting);
        assert_eq!(selector.cursor(), 0);
    }

    #[test]
    fn test_stale_settle_after_reload_into_transition() {
        let (mut selector, _) = selector();
        let mut profile = PreferenceProfile::new();
        selector.load(items(3));

        let old = applied_ticket(selector.decide(Direction::Reject, &mut profile));
        selector.load(items(3));
        let new = applied_ticket(selector.decide(Direction::Reject, &mut profile));

        assert_eq!(selector.settle(old), SettleOutcome::Stale);
        assert_eq!(selector.settle(new), SettleOutcome::Advanced { cursor: 1 });
    }

    #[test]
    fn test_decide_while_idle_ignored() {
        let (mut selector, _) = selector();
        let mut profile = PreferenceProfile::new();
        assert_eq!(selector.decide(Direction::Accept, &mut profile), DecideOutcome::Ignored);
        assert!(profile.is_empty());
    }

    #[test]
    fn test_mark_displayed() {
        let (mut selector, _) = selector();
        let mut profile = PreferenceProfile::new();
        assert_eq!(selector.mark_displayed(&mut profile), None);

        selector.load(items(2));
        assert_eq!(selector.mark_displayed(&mut profile), Some(1));
        assert!(profile.is_viewed(1));
        assert!(!profile.is_liked(1));
    }

    #[test]
    fn test_observer_sees_every_transition() {
        let (mut selector, _) = selector();
        let observer = Arc::new(RecordingObserver::default());
        selector.subscribe(observer.clone());
        let mut profile = PreferenceProfile::new();

        selector.load(items(1));
        let ticket = applied_ticket(selector.decide(Direction::Accept, &mut profile));
        selector.decide(Direction::Accept, &mut profile);
        selector.settle(ticket);

        assert_eq!(
            *observer.states.lock().unwrap(),
            vec![
                SelectorState::Presenting,
                SelectorState::Transitioning { direction: Direction::Accept },
                SelectorState::Exhausted,
            ]
        );
    }

    #[test]
    fn test_snapshot_pending_direction() {
        let (mut selector, _) = selector();
        let mut profile = PreferenceProfile::new();
        selector.load(items(2));
        selector.decide(Direction::Reject, &mut profile);

        let snapshot = selector.snapshot();
        assert_eq!(snapshot.pending, Some(Direction::Reject));
        assert_eq!(snapshot.position, 1);
        assert_eq!(snapshot.total, 2);
        assert_eq!(snapshot.current.map(|i| i.id), Some(1));

        let json = serde_json::to_value(selector.snapshot()).unwrap();
        assert_eq!(json["state"], "transitioning");
        assert_eq!(json["direction"], "reject");
    }
}
