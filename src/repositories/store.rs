use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::Result,
    models::{
        card::{Card, CardOrder},
        deck::Deck,
        leitner_box::{BoxType, LeitnerBox},
        session::StudySession,
    },
};

/// Persistence consumed by the Leitner services.
///
/// Implementations keep the relational guarantees of the schema: one box per
/// type per deck, cards only in boxes of their own deck, one session per deck,
/// and cascading deletes from decks and sessions. Operations that touch more
/// than one row are atomic.
pub trait LeitnerStore: Clone + Send + Sync + 'static {
    /// Inserts a deck together with its box set.
    fn insert_deck(&self, deck: &Deck, boxes: &[LeitnerBox]) -> impl Future<Output = Result<()>> + Send;

    /// Lists the decks of an owner, oldest first.
    fn list_decks(&self, owner_id: Uuid) -> impl Future<Output = Result<Vec<Deck>>> + Send;

    /// Finds a deck if it belongs to `owner_id`.
    fn find_deck(&self, owner_id: Uuid, deck_id: Uuid) -> impl Future<Output = Result<Option<Deck>>> + Send;

    fn update_deck_description(&self, deck_id: Uuid, description: &str) -> impl Future<Output = Result<()>> + Send;

    /// Deletes a deck and everything it owns. Returns whether a deck was deleted.
    fn delete_deck(&self, owner_id: Uuid, deck_id: Uuid) -> impl Future<Output = Result<bool>> + Send;

    /// Lists the boxes of a deck ordered by `box_type`.
    fn list_boxes(&self, deck_id: Uuid) -> impl Future<Output = Result<Vec<LeitnerBox>>> + Send;

    /// Finds a box by ID regardless of its deck. Callers check ownership.
    fn find_box(&self, box_id: Uuid) -> impl Future<Output = Result<Option<LeitnerBox>>> + Send;

    fn find_box_by_type(&self, deck_id: Uuid, box_type: BoxType) -> impl Future<Output = Result<Option<LeitnerBox>>> + Send;

    fn count_cards(&self, box_id: Uuid) -> impl Future<Output = Result<i64>> + Send;

    fn insert_card(&self, card: &Card) -> impl Future<Output = Result<()>> + Send;

    fn find_card(&self, deck_id: Uuid, card_id: Uuid) -> impl Future<Output = Result<Option<Card>>> + Send;

    fn list_cards(&self, box_id: Uuid, order: CardOrder) -> impl Future<Output = Result<Vec<Card>>> + Send;

    fn update_card_text(
        &self,
        card_id: Uuid,
        front_text: &str,
        back_text: &str,
        updated_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Moves a card to a box of its own deck.
    ///
    /// Fails with `ConstraintViolation` when the box belongs to another deck.
    fn move_card(&self, card_id: Uuid, box_id: Uuid, updated_at: DateTime<Utc>) -> impl Future<Output = Result<()>> + Send;

    fn delete_card(&self, deck_id: Uuid, card_id: Uuid) -> impl Future<Output = Result<bool>> + Send;

    /// Inserts a session and flags its box as in use.
    ///
    /// Fails with `InvalidTransition` when the deck already has a session.
    fn insert_session(&self, session: &StudySession) -> impl Future<Output = Result<()>> + Send;

    fn find_session(&self, deck_id: Uuid) -> impl Future<Output = Result<Option<StudySession>>> + Send;

    /// The least recently updated card of `box_id` not yet answered in the session.
    fn next_card(&self, session_id: Uuid, box_id: Uuid) -> impl Future<Output = Result<Option<Card>>> + Send;

    /// Number of distinct cards answered in the session.
    fn count_finished_cards(&self, session_id: Uuid) -> impl Future<Output = Result<i64>> + Send;

    /// Moves the card to `target_box_id` and marks it answered in the session.
    fn record_answer(
        &self,
        session_id: Uuid,
        card_id: Uuid,
        target_box_id: Uuid,
        answered_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<()>> + Send;

    fn mark_session_finished(&self, session_id: Uuid) -> impl Future<Output = Result<()>> + Send;

    /// Releases the session's box, stamps its `last_used` and deletes the session.
    fn close_session(&self, session: &StudySession, closed_at: DateTime<Utc>) -> impl Future<Output = Result<()>> + Send;
}
