use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{
        card::{Card, CardOrder},
        deck::Deck,
        leitner_box::{BoxType, LeitnerBox},
        session::StudySession,
    },
    repositories::{
        card as card_repo, deck as deck_repo, leitner_box as box_repo, session as session_repo,
        store::LeitnerStore,
    },
};

/// `LeitnerStore` backed by PostgreSQL through a `deadpool-postgres` pool.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    /// Creates a new `PgStore` over an existing pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &Pool {
        &self.pool
    }
}

impl LeitnerStore for PgStore {
    async fn insert_deck(&self, deck: &Deck, boxes: &[LeitnerBox]) -> Result<()> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;
        deck_repo::create_deck(&*tx, deck).await?;
        box_repo::create_boxes(&*tx, boxes).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn list_decks(&self, owner_id: Uuid) -> Result<Vec<Deck>> {
        let client = self.pool.get().await?;
        deck_repo::list_by_owner(&**client, owner_id).await
    }

    async fn find_deck(&self, owner_id: Uuid, deck_id: Uuid) -> Result<Option<Deck>> {
        let client = self.pool.get().await?;
        deck_repo::find_by_id(&**client, owner_id, deck_id).await
    }

    async fn update_deck_description(&self, deck_id: Uuid, description: &str) -> Result<()> {
        let client = self.pool.get().await?;
        deck_repo::update_description(&**client, deck_id, description).await
    }

    async fn delete_deck(&self, owner_id: Uuid, deck_id: Uuid) -> Result<bool> {
        let client = self.pool.get().await?;
        deck_repo::delete_deck(&**client, owner_id, deck_id).await
    }

    async fn list_boxes(&self, deck_id: Uuid) -> Result<Vec<LeitnerBox>> {
        let client = self.pool.get().await?;
        box_repo::list_by_deck(&**client, deck_id).await
    }

    async fn find_box(&self, box_id: Uuid) -> Result<Option<LeitnerBox>> {
        let client = self.pool.get().await?;
        box_repo::find_by_id(&**client, box_id).await
    }

    async fn find_box_by_type(&self, deck_id: Uuid, box_type: BoxType) -> Result<Option<LeitnerBox>> {
        let client = self.pool.get().await?;
        box_repo::find_by_type(&**client, deck_id, box_type).await
    }

    async fn count_cards(&self, box_id: Uuid) -> Result<i64> {
        let client = self.pool.get().await?;
        box_repo::count_cards(&**client, box_id).await
    }

    async fn insert_card(&self, card: &Card) -> Result<()> {
        let client = self.pool.get().await?;
        card_repo::create_card(&**client, card).await
    }

    async fn find_card(&self, deck_id: Uuid, card_id: Uuid) -> Result<Option<Card>> {
        let client = self.pool.get().await?;
        card_repo::find_by_id(&**client, deck_id, card_id).await
    }

    async fn list_cards(&self, box_id: Uuid, order: CardOrder) -> Result<Vec<Card>> {
        let client = self.pool.get().await?;
        card_repo::list_by_box(&**client, box_id, order).await
    }

    async fn update_card_text(
        &self,
        card_id: Uuid,
        front_text: &str,
        back_text: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let client = self.pool.get().await?;
        card_repo::update_text(&**client, card_id, front_text, back_text, updated_at).await
    }

    async fn move_card(&self, card_id: Uuid, box_id: Uuid, updated_at: DateTime<Utc>) -> Result<()> {
        let client = self.pool.get().await?;
        card_repo::move_to_box(&**client, card_id, box_id, updated_at).await
    }

    async fn delete_card(&self, deck_id: Uuid, card_id: Uuid) -> Result<bool> {
        let client = self.pool.get().await?;
        card_repo::delete_card(&**client, deck_id, card_id).await
    }

    async fn insert_session(&self, session: &StudySession) -> Result<()> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;
        session_repo::create_session(&*tx, session).await?;
        box_repo::set_in_session(&*tx, session.current_box_id).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn find_session(&self, deck_id: Uuid) -> Result<Option<StudySession>> {
        let client = self.pool.get().await?;
        session_repo::find_by_deck(&**client, deck_id).await
    }

    async fn next_card(&self, session_id: Uuid, box_id: Uuid) -> Result<Option<Card>> {
        let client = self.pool.get().await?;
        session_repo::next_card(&**client, session_id, box_id).await
    }

    async fn count_finished_cards(&self, session_id: Uuid) -> Result<i64> {
        let client = self.pool.get().await?;
        session_repo::count_finished_cards(&**client, session_id).await
    }

    async fn record_answer(
        &self,
        session_id: Uuid,
        card_id: Uuid,
        target_box_id: Uuid,
        answered_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;
        if !session_repo::lock_active(&*tx, session_id).await? {
            return Err(AppError::InvalidTransition("No study session is running".to_string()));
        }
        card_repo::move_to_box(&*tx, card_id, target_box_id, answered_at).await?;
        session_repo::add_finished_card(&*tx, session_id, card_id, answered_at).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn mark_session_finished(&self, session_id: Uuid) -> Result<()> {
        let client = self.pool.get().await?;
        session_repo::mark_finished(&**client, session_id).await
    }

    async fn close_session(&self, session: &StudySession, closed_at: DateTime<Utc>) -> Result<()> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;
        box_repo::release(&*tx, session.current_box_id, closed_at).await?;
        session_repo::delete_session(&*tx, session.id).await?;
        tx.commit().await?;
        Ok(())
    }
}
