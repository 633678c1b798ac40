use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::core::{
    CartSink, DecideOutcome, DecisionEvent, Direction, SelectionObserver, SelectorSnapshot, SettleOutcome,
    SettleTicket, SwipeSelector,
};
use crate::models::{Item, ItemId, PreferenceProfile};

/// A visitor's live swipe session
#[derive(Debug)]
pub struct SwipeSession {
    pub visitor_id: String,
    pub selector: SwipeSelector,
    pub profile: PreferenceProfile,
}

pub type SessionHandle = Arc<Mutex<SwipeSession>>;

/// Result of forwarding a decision to a session
#[derive(Debug, Clone)]
pub struct DecisionReport {
    pub visitor_id: String,
    /// `None` when the selector ignored the input
    pub event: Option<DecisionEvent>,
    pub snapshot: SelectorSnapshot,
}

/// Logs selector transitions
pub struct TracingObserver {
    session_id: Uuid,
}

impl TracingObserver {
    pub fn new(session_id: Uuid) -> Self {
        Self { session_id }
    }
}

impl SelectionObserver for TracingObserver {
    fn on_transition(&self, snapshot: &SelectorSnapshot) {
        tracing::debug!(
            session_id = %self.session_id,
            state = ?snapshot.state,
            position = snapshot.position,
            total = snapshot.total,
            "Selector transition"
        );
    }
}

/// In-memory registry of swipe sessions
///
/// Sessions expire after sitting idle for the configured time. Settles are
/// scheduled on the runtime after `settle_delay`; the selector keeps
/// rejecting input for that whole window because it stays `Transitioning`
/// until the settle runs.
pub struct SessionRegistry {
    sessions: moka::future::Cache<Uuid, SessionHandle>,
    settle_delay: Duration,
}

impl SessionRegistry {
    pub fn new(max_sessions: u64, idle_timeout: Duration, settle_delay: Duration) -> Self {
        let sessions = moka::future::CacheBuilder::new(max_sessions)
            .time_to_idle(idle_timeout)
            .build();

        Self { sessions, settle_delay }
    }

    /// Open a session and load its first candidate sequence
    pub async fn open(
        &self,
        visitor_id: &str,
        profile: PreferenceProfile,
        candidates: Vec<Item>,
        cart: Arc<dyn CartSink>,
    ) -> (Uuid, SelectorSnapshot) {
        let session_id = Uuid::new_v4();

        let mut selector = SwipeSelector::new(cart);
        selector.subscribe(Arc::new(TracingObserver::new(session_id)));
        selector.load(candidates);
        let snapshot = selector.snapshot();

        let session = SwipeSession {
            visitor_id: visitor_id.to_string(),
            selector,
            profile,
        };
        self.sessions.insert(session_id, Arc::new(Mutex::new(session))).await;

        tracing::info!(
            "Opened session {} for visitor {} with {} candidates",
            session_id,
            visitor_id,
            snapshot.total
        );

        (session_id, snapshot)
    }

    pub async fn get(&self, session_id: &Uuid) -> Option<SessionHandle> {
        self.sessions.get(session_id).await
    }

    /// Current snapshot and owning visitor
    pub async fn snapshot(&self, session_id: &Uuid) -> Option<(String, SelectorSnapshot)> {
        let handle = self.get(session_id).await?;
        let session = handle.lock().await;
        Some((session.visitor_id.clone(), session.selector.snapshot()))
    }

    /// Copy of the session's profile, for re-ranking
    pub async fn profile(&self, session_id: &Uuid) -> Option<PreferenceProfile> {
        let handle = self.get(session_id).await?;
        let session = handle.lock().await;
        Some(session.profile.snapshot())
    }

    /// Apply a decision and schedule its settle
    pub async fn decide(&self, session_id: &Uuid, direction: Direction) -> Option<DecisionReport> {
        let handle = self.get(session_id).await?;
        let mut guard = handle.lock().await;
        let session = &mut *guard;

        let outcome = session.selector.decide(direction, &mut session.profile);

        let event = match outcome {
            DecideOutcome::Applied { event, ticket } => {
                self.schedule_settle(*session_id, handle.clone(), ticket);
                Some(event)
            }
            DecideOutcome::Ignored => {
                tracing::debug!("Session {} ignored {:?} decision", session_id, direction);
                None
            }
        };

        Some(DecisionReport {
            visitor_id: session.visitor_id.clone(),
            event,
            snapshot: session.selector.snapshot(),
        })
    }

    /// Replace a session's candidates; any pending settle becomes stale
    ///
    /// Candidates are usually ranked from a [`SessionRegistry::profile`] copy
    /// taken before the catalog fetch, so anything viewed since then is
    /// dropped against the live profile here.
    pub async fn reload(&self, session_id: &Uuid, candidates: Vec<Item>) -> Option<(String, SelectorSnapshot)> {
        let handle = self.get(session_id).await?;
        let mut guard = handle.lock().await;
        let session = &mut *guard;

        let ranked = candidates.len();
        let candidates: Vec<Item> = candidates
            .into_iter()
            .filter(|item| !session.profile.is_viewed(item.id))
            .collect();

        if candidates.len() < ranked {
            tracing::debug!(
                "Session {} dropped {} candidates viewed since ranking",
                session_id,
                ranked - candidates.len()
            );
        }

        session.selector.load(candidates);
        Some((session.visitor_id.clone(), session.selector.snapshot()))
    }

    /// Record that the presented candidate was displayed
    ///
    /// Returns the owning visitor and the id marked viewed, if any.
    pub async fn mark_displayed(&self, session_id: &Uuid) -> Option<(String, Option<ItemId>)> {
        let handle = self.get(session_id).await?;
        let mut guard = handle.lock().await;
        let session = &mut *guard;
        let displayed = session.selector.mark_displayed(&mut session.profile);
        Some((session.visitor_id.clone(), displayed))
    }

    pub async fn close(&self, session_id: &Uuid) -> bool {
        self.sessions.remove(session_id).await.is_some()
    }

    fn schedule_settle(&self, session_id: Uuid, handle: SessionHandle, ticket: SettleTicket) {
        let delay = self.settle_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let mut session = handle.lock().await;
            match session.selector.settle(ticket) {
                SettleOutcome::Stale => {
                    tracing::debug!(
                        "Dropped stale settle for session {} (generation {})",
                        session_id,
                        ticket.generation()
                    );
                }
                SettleOutcome::Exhausted => {
                    tracing::info!("Session {} exhausted its candidates", session_id);
                }
                SettleOutcome::Advanced { cursor } => {
                    tracing::trace!("Session {} advanced to {}", session_id, cursor);
                }
            }
        });
    }
}
