use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{card::Card, leitner_box::{BoxType, LeitnerBox}};

/// A study pass over one box of a deck.
///
/// At most one exists per deck. It is deleted once the learner closes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySession {
    /// The unique identifier for the session.
    pub id: Uuid,
    /// The deck being studied.
    pub deck_id: Uuid,
    /// The box whose cards are being reviewed.
    pub current_box_id: Uuid,
    /// Card count of the box when the session started. Only used for progress.
    pub total_cards_on_box: i32,
    /// Set once no unreviewed card remains in the box.
    pub is_finished: bool,
    /// The timestamp when the session was started.
    pub created_at: DateTime<Utc>,
}

impl StudySession {
    /// Creates an active session over `target`.
    pub fn new(target: &LeitnerBox, total_cards_on_box: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            deck_id: target.deck_id,
            current_box_id: target.id,
            total_cards_on_box,
            is_finished: false,
            created_at: Utc::now(),
        }
    }
}

/// How far a session has come.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionProgress {
    /// Distinct cards answered during the session.
    pub reviewed: i64,
    /// Card count of the box when the session started.
    pub total: i64,
}

/// Where a deck stands in the session lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionStatus {
    /// No session exists for the deck.
    Inert,
    /// A card is waiting to be answered.
    Active {
        session: StudySession,
        current_card: Card,
        progress: SessionProgress,
    },
    /// Every card of the box has been answered; the session awaits closing.
    Finished {
        session: StudySession,
        progress: SessionProgress,
    },
}

impl SessionStatus {
    /// The card waiting to be answered, if any.
    pub fn current_card(&self) -> Option<&Card> {
        match self {
            SessionStatus::Active { current_card, .. } => Some(current_card),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, SessionStatus::Finished { .. })
    }
}

/// The learner's verdict on a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Correct,
    Incorrect,
}

impl Answer {
    /// The box a card in `current` moves to after this answer.
    pub fn next_box(self, current: BoxType) -> BoxType {
        match self {
            Answer::Correct => current.after_correct(),
            Answer::Incorrect => current.after_wrong(),
        }
    }
}

impl FromStr for Answer {
    type Err = AppError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim() {
            "correct" | "_correct" => Ok(Answer::Correct),
            "incorrect" | "_incorrect" => Ok(Answer::Incorrect),
            other => Err(AppError::InvalidTransition(format!(
                "Unrecognized answer tag: {:?}",
                other
            ))),
        }
    }
}

/// The result of answering the current card.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerOutcome {
    /// The answered card, in the box it moved to.
    pub answered: Card,
    /// The session after the answer was recorded.
    pub status: SessionStatus,
}
