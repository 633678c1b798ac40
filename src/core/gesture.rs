use serde::{Deserialize, Serialize};

/// Default drag distance (px) a swipe has to cover to count as a decision
pub const DEFAULT_SWIPE_THRESHOLD: f64 = 100.0;

/// Outcome of a decision on the presented candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Accept,
    Reject,
}

impl Direction {
    pub fn is_accept(self) -> bool {
        matches!(self, Direction::Accept)
    }
}

/// Discrete vote buttons shown under the card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteButton {
    Like,
    Skip,
}

impl From<VoteButton> for Direction {
    fn from(button: VoteButton) -> Self {
        match button {
            VoteButton::Like => Direction::Accept,
            VoteButton::Skip => Direction::Reject,
        }
    }
}

/// Completed horizontal drag on the card
///
/// Positive offsets are drags to the right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeGesture {
    pub offset_x: f64,
}

impl SwipeGesture {
    pub fn new(offset_x: f64) -> Self {
        Self { offset_x }
    }

    /// Map the drag to a direction
    ///
    /// Returns `None` when the net displacement is under `threshold`; the
    /// card snaps back and no decision is made.
    pub fn resolve(&self, threshold: f64) -> Option<Direction> {
        if !self.offset_x.is_finite() || self.offset_x.abs() < threshold {
            return None;
        }

        if self.offset_x > 0.0 {
            Some(Direction::Accept)
        } else {
            Some(Direction::Reject)
        }
    }
}
