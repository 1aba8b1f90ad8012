use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::leitner_box::{BoxType, LeitnerBox};
use crate::validation::text::not_blank;

/// Represents a flashcard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// The unique identifier for the card.
    pub id: Uuid,
    /// The deck the card belongs to.
    pub deck_id: Uuid,
    /// The box the card currently sits in. Always a box of `deck_id`.
    pub box_id: Uuid,
    /// The type of `box_id`, read alongside the card.
    pub box_type: BoxType,
    /// The prompt side.
    pub front_text: String,
    /// The answer side.
    pub back_text: String,
    /// Refreshed on every write; oldest cards are studied first.
    pub updated_at: DateTime<Utc>,
}

impl Card {
    /// Creates a card inside `target`.
    pub fn new(target: &LeitnerBox, front_text: String, back_text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            deck_id: target.deck_id,
            box_id: target.id,
            box_type: target.box_type,
            front_text,
            back_text,
            updated_at: Utc::now(),
        }
    }
}

/// The fields a caller supplies to create a card.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewCard {
    #[garde(length(min = 1, max = 150), custom(not_blank))]
    pub front_text: String,
    #[garde(custom(not_blank))]
    pub back_text: String,
    /// Target box; the daily box when absent.
    #[garde(skip)]
    #[serde(default)]
    pub box_id: Option<Uuid>,
}

/// The fields a caller supplies to edit a card.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CardEdit {
    #[garde(length(min = 1, max = 150), custom(not_blank))]
    pub front_text: String,
    #[garde(custom(not_blank))]
    pub back_text: String,
}

/// Ordering of cards inside a box by `updated_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum CardOrder {
    /// Least recently touched first; the study order.
    #[default]
    #[serde(rename = "asc")]
    OldestFirst,
    #[serde(rename = "desc")]
    NewestFirst,
}
