use chrono::{DateTime, Utc};
use tokio_postgres::{error::SqlState, GenericClient, Row};
use uuid::Uuid;
use crate::{
    error::{AppError, Result},
    models::{card::Card, session::StudySession},
    repositories::card::row_to_card,
};

/// A helper function to map a `tokio_postgres::Row` to a `StudySession`.
fn row_to_session(row: &Row) -> Result<StudySession> {
    Ok(StudySession {
        id: row.try_get("id").map_err(|_| AppError::MissingData("id".to_string()))?,
        deck_id: row.try_get("deck_id").map_err(|_| AppError::MissingData("deck_id".to_string()))?,
        current_box_id: row.try_get("current_box_id").map_err(|_| AppError::MissingData("current_box_id".to_string()))?,
        total_cards_on_box: row.try_get("total_cards_on_box").map_err(|_| AppError::MissingData("total_cards_on_box".to_string()))?,
        is_finished: row.try_get("is_finished").map_err(|_| AppError::MissingData("is_finished".to_string()))?,
        created_at: row.try_get("created_at").map_err(|_| AppError::MissingData("created_at".to_string()))?,
    })
}

/// Creates a session. A second session for the same deck hits the unique constraint.
///
/// # Arguments
///
/// * `db` - The transaction that also flags the box.
/// * `session` - The session to insert.
///
/// # Returns
///
/// An empty `Result`, or `InvalidTransition` when the deck already has a session.
pub async fn create_session<C: GenericClient>(db: &C, session: &StudySession) -> Result<()> {
    db.execute(
        r#"
        INSERT INTO study_sessions (id, deck_id, current_box_id, total_cards_on_box, is_finished, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
        &[
            &session.id,
            &session.deck_id,
            &session.current_box_id,
            &session.total_cards_on_box,
            &session.is_finished,
            &session.created_at,
        ],
    )
    .await
    .map_err(|e| {
        if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
            AppError::InvalidTransition("A study session is already running for this deck".to_string())
        } else {
            AppError::Database(e)
        }
    })?;
    Ok(())
}

/// Finds the session of a deck.
pub async fn find_by_deck<C: GenericClient>(db: &C, deck_id: Uuid) -> Result<Option<StudySession>> {
    let row = db
        .query_opt(
            r#"
            SELECT id, deck_id, current_box_id, total_cards_on_box, is_finished, created_at
            FROM study_sessions
            WHERE deck_id = $1
            "#,
            &[&deck_id],
        )
        .await?;
    row.map(|r| row_to_session(&r)).transpose()
}

/// Locks an unfinished session for the rest of the transaction.
///
/// # Arguments
///
/// * `db` - A transaction.
/// * `session_id` - The ID of the session.
///
/// # Returns
///
/// `true` when the session exists and is not finished. A concurrent close waits
/// for the lock to be released.
pub async fn lock_active<C: GenericClient>(db: &C, session_id: Uuid) -> Result<bool> {
    let row = db
        .query_opt(
            "SELECT 1 FROM study_sessions WHERE id = $1 AND NOT is_finished FOR UPDATE",
            &[&session_id],
        )
        .await?;
    Ok(row.is_some())
}

/// Selects the oldest card of the box that has not been answered in the session.
///
/// # Arguments
///
/// * `db` - The database client.
/// * `session_id` - The ID of the session.
/// * `box_id` - The box the session studies.
///
/// # Returns
///
/// A `Result` containing the pending card, or `None` once every card was answered.
pub async fn next_card<C: GenericClient>(db: &C, session_id: Uuid, box_id: Uuid) -> Result<Option<Card>> {
    let row = db
        .query_opt(
            r#"
            SELECT c.id, c.deck_id, c.box_id, b.box_type, c.front_text, c.back_text, c.updated_at
            FROM cards c
            JOIN boxes b ON b.id = c.box_id
            WHERE c.box_id = $2
              AND NOT EXISTS (
                  SELECT 1 FROM session_finished_cards f
                  WHERE f.session_id = $1 AND f.card_id = c.id
              )
            ORDER BY c.updated_at ASC, c.write_seq ASC
            LIMIT 1
            "#,
            &[&session_id, &box_id],
        )
        .await?;
    row.map(|r| row_to_card(&r)).transpose()
}

/// Marks a card as answered. Answering the same card twice keeps a single entry.
///
/// # Arguments
///
/// * `db` - The transaction that moved the card.
/// * `session_id` - The ID of the session.
/// * `card_id` - The ID of the answered card.
/// * `reviewed_at` - When the answer was given.
///
/// # Returns
///
/// An empty `Result`.
pub async fn add_finished_card<C: GenericClient>(
    db: &C,
    session_id: Uuid,
    card_id: Uuid,
    reviewed_at: DateTime<Utc>,
) -> Result<()> {
    db.execute(
        r#"
        INSERT INTO session_finished_cards (session_id, card_id, reviewed_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (session_id, card_id) DO NOTHING
        "#,
        &[&session_id, &card_id, &reviewed_at],
    )
    .await?;
    Ok(())
}

/// Counts the cards answered in a session.
pub async fn count_finished_cards<C: GenericClient>(db: &C, session_id: Uuid) -> Result<i64> {
    let row = db
        .query_one(
            "SELECT COUNT(*) AS reviewed FROM session_finished_cards WHERE session_id = $1",
            &[&session_id],
        )
        .await?;
    row.try_get("reviewed").map_err(|_| AppError::MissingData("reviewed".to_string()))
}

/// Flags a session as finished.
pub async fn mark_finished<C: GenericClient>(db: &C, session_id: Uuid) -> Result<()> {
    db.execute(
        "UPDATE study_sessions SET is_finished = true WHERE id = $1",
        &[&session_id],
    )
    .await?;
    Ok(())
}

/// Deletes a session; its finished-card entries cascade.
pub async fn delete_session<C: GenericClient>(db: &C, session_id: Uuid) -> Result<()> {
    db.execute("DELETE FROM study_sessions WHERE id = $1", &[&session_id])
        .await?;
    Ok(())
}
