use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{leitner_box::BoxSummary, session::StudySession};
use crate::validation::text::not_blank;

/// Represents a deck of flashcards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    /// The unique identifier for the deck.
    pub id: Uuid,
    /// The ID of the user who owns the deck.
    pub owner_id: Uuid,
    /// The description of the deck.
    pub description: String,
    /// The timestamp when the deck was created.
    pub created_at: DateTime<Utc>,
}

impl Deck {
    /// Creates a new deck owned by `owner_id`.
    pub fn new(owner_id: Uuid, description: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            description,
            created_at: Utc::now(),
        }
    }
}

/// The fields a caller supplies to create or rename a deck.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DeckInput {
    #[garde(length(min = 1, max = 150), custom(not_blank))]
    pub description: String,
}

/// A deck with its boxes and, when one is running, its study session.
#[derive(Debug, Clone, Serialize)]
pub struct DeckDetail {
    #[serde(flatten)]
    pub deck: Deck,
    pub boxes: Vec<BoxSummary>,
    pub session: Option<StudySession>,
}
