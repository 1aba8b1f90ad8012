use std::{collections::HashSet, sync::Arc};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{
        card::{Card, CardOrder},
        deck::Deck,
        leitner_box::{BoxType, LeitnerBox},
        session::StudySession,
    },
    repositories::store::LeitnerStore,
};

#[derive(Default)]
struct Tables {
    decks: Vec<Deck>,
    boxes: Vec<LeitnerBox>,
    /// Kept in write order so that equal timestamps still sort by recency.
    cards: Vec<Card>,
    sessions: Vec<StudySession>,
    finished: HashSet<(Uuid, Uuid)>,
}

impl Tables {
    fn box_by_id(&self, box_id: Uuid) -> Option<&LeitnerBox> {
        self.boxes.iter().find(|b| b.id == box_id)
    }

    fn card_position(&self, card_id: Uuid) -> Result<usize> {
        self.cards
            .iter()
            .position(|c| c.id == card_id)
            .ok_or(AppError::NotFound)
    }

    /// Re-appends a written card so the vector stays in write order.
    fn touch_card(&mut self, card_id: Uuid, apply: impl FnOnce(&mut Card)) -> Result<()> {
        let position = self.card_position(card_id)?;
        let mut card = self.cards.remove(position);
        apply(&mut card);
        self.cards.push(card);
        Ok(())
    }

    fn cards_in_box(&self, box_id: Uuid) -> Vec<Card> {
        let mut cards: Vec<Card> = self.cards.iter().filter(|c| c.box_id == box_id).cloned().collect();
        cards.sort_by_key(|c| c.updated_at);
        cards
    }

    fn move_card(&mut self, card_id: Uuid, box_id: Uuid, updated_at: DateTime<Utc>) -> Result<()> {
        let card = &self.cards[self.card_position(card_id)?];
        let target = self
            .box_by_id(box_id)
            .filter(|b| b.deck_id == card.deck_id)
            .ok_or_else(|| {
                AppError::ConstraintViolation("Box does not belong to the card's deck".to_string())
            })?;
        let box_type = target.box_type;
        self.touch_card(card_id, |card| {
            card.box_id = box_id;
            card.box_type = box_type;
            card.updated_at = updated_at;
        })
    }
}

/// `LeitnerStore` kept in process memory.
///
/// Used by the test-suite and by the server when no database is configured.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    /// Creates a new, empty `MemoryStore`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LeitnerStore for MemoryStore {
    async fn insert_deck(&self, deck: &Deck, boxes: &[LeitnerBox]) -> Result<()> {
        let mut tables = self.tables.lock().await;
        let mut seen = HashSet::new();
        for leitner_box in boxes {
            if leitner_box.deck_id != deck.id || !seen.insert(leitner_box.box_type) {
                return Err(AppError::ConstraintViolation(format!(
                    "Invalid box set for deck {}",
                    deck.id
                )));
            }
        }
        tables.decks.push(deck.clone());
        tables.boxes.extend(boxes.iter().cloned());
        Ok(())
    }

    async fn list_decks(&self, owner_id: Uuid) -> Result<Vec<Deck>> {
        let tables = self.tables.lock().await;
        let mut decks: Vec<Deck> = tables.decks.iter().filter(|d| d.owner_id == owner_id).cloned().collect();
        decks.sort_by_key(|d| d.created_at);
        Ok(decks)
    }

    async fn find_deck(&self, owner_id: Uuid, deck_id: Uuid) -> Result<Option<Deck>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .decks
            .iter()
            .find(|d| d.id == deck_id && d.owner_id == owner_id)
            .cloned())
    }

    async fn update_deck_description(&self, deck_id: Uuid, description: &str) -> Result<()> {
        let mut tables = self.tables.lock().await;
        if let Some(deck) = tables.decks.iter_mut().find(|d| d.id == deck_id) {
            deck.description = description.to_string();
        }
        Ok(())
    }

    async fn delete_deck(&self, owner_id: Uuid, deck_id: Uuid) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.decks.len();
        tables.decks.retain(|d| !(d.id == deck_id && d.owner_id == owner_id));
        if tables.decks.len() == before {
            return Ok(false);
        }

        let session_ids: HashSet<Uuid> = tables
            .sessions
            .iter()
            .filter(|s| s.deck_id == deck_id)
            .map(|s| s.id)
            .collect();
        tables.finished.retain(|(session_id, _)| !session_ids.contains(session_id));
        tables.sessions.retain(|s| s.deck_id != deck_id);
        tables.cards.retain(|c| c.deck_id != deck_id);
        tables.boxes.retain(|b| b.deck_id != deck_id);
        Ok(true)
    }

    async fn list_boxes(&self, deck_id: Uuid) -> Result<Vec<LeitnerBox>> {
        let tables = self.tables.lock().await;
        let mut boxes: Vec<LeitnerBox> = tables.boxes.iter().filter(|b| b.deck_id == deck_id).cloned().collect();
        boxes.sort_by_key(|b| b.box_type);
        Ok(boxes)
    }

    async fn find_box(&self, box_id: Uuid) -> Result<Option<LeitnerBox>> {
        let tables = self.tables.lock().await;
        Ok(tables.box_by_id(box_id).cloned())
    }

    async fn find_box_by_type(&self, deck_id: Uuid, box_type: BoxType) -> Result<Option<LeitnerBox>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .boxes
            .iter()
            .find(|b| b.deck_id == deck_id && b.box_type == box_type)
            .cloned())
    }

    async fn count_cards(&self, box_id: Uuid) -> Result<i64> {
        let tables = self.tables.lock().await;
        Ok(tables.cards.iter().filter(|c| c.box_id == box_id).count() as i64)
    }

    async fn insert_card(&self, card: &Card) -> Result<()> {
        let mut tables = self.tables.lock().await;
        let target = tables
            .box_by_id(card.box_id)
            .filter(|b| b.deck_id == card.deck_id)
            .ok_or_else(|| {
                AppError::ConstraintViolation("Box does not belong to the card's deck".to_string())
            })?;
        let mut card = card.clone();
        card.box_type = target.box_type;
        tables.cards.push(card);
        Ok(())
    }

    async fn find_card(&self, deck_id: Uuid, card_id: Uuid) -> Result<Option<Card>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .cards
            .iter()
            .find(|c| c.id == card_id && c.deck_id == deck_id)
            .cloned())
    }

    async fn list_cards(&self, box_id: Uuid, order: CardOrder) -> Result<Vec<Card>> {
        let tables = self.tables.lock().await;
        let mut cards = tables.cards_in_box(box_id);
        if order == CardOrder::NewestFirst {
            cards.reverse();
        }
        Ok(cards)
    }

    async fn update_card_text(
        &self,
        card_id: Uuid,
        front_text: &str,
        back_text: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut tables = self.tables.lock().await;
        tables.touch_card(card_id, |card| {
            card.front_text = front_text.to_string();
            card.back_text = back_text.to_string();
            card.updated_at = updated_at;
        })
    }

    async fn move_card(&self, card_id: Uuid, box_id: Uuid, updated_at: DateTime<Utc>) -> Result<()> {
        let mut tables = self.tables.lock().await;
        tables.move_card(card_id, box_id, updated_at)
    }

    async fn delete_card(&self, deck_id: Uuid, card_id: Uuid) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.cards.len();
        tables.cards.retain(|c| !(c.id == card_id && c.deck_id == deck_id));
        let deleted = tables.cards.len() < before;
        if deleted {
            tables.finished.retain(|(_, finished_card)| *finished_card != card_id);
        }
        Ok(deleted)
    }

    async fn insert_session(&self, session: &StudySession) -> Result<()> {
        let mut tables = self.tables.lock().await;
        if tables.sessions.iter().any(|s| s.deck_id == session.deck_id) {
            return Err(AppError::InvalidTransition(
                "A study session is already running for this deck".to_string(),
            ));
        }
        let leitner_box = tables
            .boxes
            .iter_mut()
            .find(|b| b.id == session.current_box_id && b.deck_id == session.deck_id)
            .ok_or_else(|| {
                AppError::ConstraintViolation("Box does not belong to the session's deck".to_string())
            })?;
        leitner_box.in_session = true;
        tables.sessions.push(session.clone());
        Ok(())
    }

    async fn find_session(&self, deck_id: Uuid) -> Result<Option<StudySession>> {
        let tables = self.tables.lock().await;
        Ok(tables.sessions.iter().find(|s| s.deck_id == deck_id).cloned())
    }

    async fn next_card(&self, session_id: Uuid, box_id: Uuid) -> Result<Option<Card>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .cards_in_box(box_id)
            .into_iter()
            .find(|c| !tables.finished.contains(&(session_id, c.id))))
    }

    async fn count_finished_cards(&self, session_id: Uuid) -> Result<i64> {
        let tables = self.tables.lock().await;
        Ok(tables
            .finished
            .iter()
            .filter(|(finished_session, _)| *finished_session == session_id)
            .count() as i64)
    }

    async fn record_answer(
        &self,
        session_id: Uuid,
        card_id: Uuid,
        target_box_id: Uuid,
        answered_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut tables = self.tables.lock().await;
        if !tables.sessions.iter().any(|s| s.id == session_id && !s.is_finished) {
            return Err(AppError::InvalidTransition("No study session is running".to_string()));
        }
        tables.move_card(card_id, target_box_id, answered_at)?;
        tables.finished.insert((session_id, card_id));
        Ok(())
    }

    async fn mark_session_finished(&self, session_id: Uuid) -> Result<()> {
        let mut tables = self.tables.lock().await;
        if let Some(session) = tables.sessions.iter_mut().find(|s| s.id == session_id) {
            session.is_finished = true;
        }
        Ok(())
    }

    async fn close_session(&self, session: &StudySession, closed_at: DateTime<Utc>) -> Result<()> {
        let mut tables = self.tables.lock().await;
        if let Some(leitner_box) = tables.boxes.iter_mut().find(|b| b.id == session.current_box_id) {
            leitner_box.in_session = false;
            leitner_box.last_used = Some(closed_at);
        }
        tables.finished.retain(|(session_id, _)| *session_id != session.id);
        tables.sessions.retain(|s| s.id != session.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> (MemoryStore, Deck, Vec<LeitnerBox>) {
        let store = MemoryStore::new();
        let deck = Deck::new(Uuid::new_v4(), "Deutsch".to_string());
        let boxes = LeitnerBox::set_for(deck.id);
        store.insert_deck(&deck, &boxes).await.unwrap();
        (store, deck, boxes)
    }

    #[tokio::test]
    async fn second_session_for_a_deck_is_rejected() {
        let (store, _deck, boxes) = seeded().await;
        store.insert_session(&StudySession::new(&boxes[0], 1)).await.unwrap();

        let err = store
            .insert_session(&StudySession::new(&boxes[1], 1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
        assert!(!store.find_box(boxes[1].id).await.unwrap().unwrap().in_session);
    }

    #[tokio::test]
    async fn answers_after_close_are_rejected() {
        let (store, deck, boxes) = seeded().await;
        let card = Card::new(&boxes[0], "der Hund".to_string(), "the dog".to_string());
        store.insert_card(&card).await.unwrap();
        let session = StudySession::new(&boxes[0], 1);
        store.insert_session(&session).await.unwrap();
        store.close_session(&session, Utc::now()).await.unwrap();

        let err = store
            .record_answer(session.id, card.id, boxes[1].id, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
        assert_eq!(store.find_card(deck.id, card.id).await.unwrap().unwrap(), card);
        assert_eq!(store.count_finished_cards(session.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn answers_on_a_finished_session_are_rejected() {
        let (store, deck, boxes) = seeded().await;
        let card = Card::new(&boxes[0], "der Hund".to_string(), "the dog".to_string());
        store.insert_card(&card).await.unwrap();
        let session = StudySession::new(&boxes[0], 1);
        store.insert_session(&session).await.unwrap();
        store.mark_session_finished(session.id).await.unwrap();

        let err = store
            .record_answer(session.id, card.id, boxes[1].id, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
        assert_eq!(store.find_card(deck.id, card.id).await.unwrap().unwrap(), card);
    }

    #[tokio::test]
    async fn cards_cannot_move_into_another_deck() {
        let (store, deck, boxes) = seeded().await;
        let other = Deck::new(deck.owner_id, "Other".to_string());
        let other_boxes = LeitnerBox::set_for(other.id);
        store.insert_deck(&other, &other_boxes).await.unwrap();
        let card = Card::new(&boxes[0], "der Hund".to_string(), "the dog".to_string());
        store.insert_card(&card).await.unwrap();

        let err = store
            .move_card(card.id, other_boxes[1].id, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConstraintViolation(_)));
        assert_eq!(store.find_card(deck.id, card.id).await.unwrap().unwrap(), card);
    }

    #[tokio::test]
    async fn equal_timestamps_keep_write_order() {
        let (store, _deck, boxes) = seeded().await;
        let now = Utc::now();
        let mut first = Card::new(&boxes[0], "eins".to_string(), "one".to_string());
        let mut second = Card::new(&boxes[0], "zwei".to_string(), "two".to_string());
        first.updated_at = now;
        second.updated_at = now;
        store.insert_card(&first).await.unwrap();
        store.insert_card(&second).await.unwrap();
        store.update_card_text(first.id, "eins", "one!", now).await.unwrap();

        let order: Vec<Uuid> = store
            .list_cards(boxes[0].id, CardOrder::OldestFirst)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(order, vec![second.id, first.id]);
    }
}
