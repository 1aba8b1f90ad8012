use chrono::{DateTime, Utc};
use tokio_postgres::{error::SqlState, GenericClient, Row};
use uuid::Uuid;
use crate::{
    error::{AppError, Result},
    models::{
        card::{Card, CardOrder},
        leitner_box::BoxType,
    },
};

const CARD_SELECT: &str = r#"
    SELECT c.id, c.deck_id, c.box_id, b.box_type, c.front_text, c.back_text, c.updated_at
    FROM cards c
    JOIN boxes b ON b.id = c.box_id
"#;

/// A helper function to map a `tokio_postgres::Row` to a `Card`.
pub(crate) fn row_to_card(row: &Row) -> Result<Card> {
    let box_type: i16 = row.try_get("box_type").map_err(|_| AppError::MissingData("box_type".to_string()))?;
    Ok(Card {
        id: row.try_get("id").map_err(|_| AppError::MissingData("id".to_string()))?,
        deck_id: row.try_get("deck_id").map_err(|_| AppError::MissingData("deck_id".to_string()))?,
        box_id: row.try_get("box_id").map_err(|_| AppError::MissingData("box_id".to_string()))?,
        box_type: BoxType::try_from(box_type)?,
        front_text: row.try_get("front_text").map_err(|_| AppError::MissingData("front_text".to_string()))?,
        back_text: row.try_get("back_text").map_err(|_| AppError::MissingData("back_text".to_string()))?,
        updated_at: row.try_get("updated_at").map_err(|_| AppError::MissingData("updated_at".to_string()))?,
    })
}

/// Turns a foreign-key failure on a card's box into a `ConstraintViolation`.
fn map_box_violation(e: tokio_postgres::Error) -> AppError {
    if e.code() == Some(&SqlState::FOREIGN_KEY_VIOLATION) {
        AppError::ConstraintViolation("Box does not belong to the card's deck".to_string())
    } else {
        AppError::Database(e)
    }
}

/// Creates a new card in the database.
///
/// # Arguments
///
/// * `db` - The database client.
/// * `card` - The card to insert.
///
/// # Returns
///
/// An empty `Result`, or a `ConstraintViolation` when the box is not in the card's deck.
pub async fn create_card<C: GenericClient>(db: &C, card: &Card) -> Result<()> {
    db.execute(
        r#"
        INSERT INTO cards (id, deck_id, box_id, front_text, back_text, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
        &[
            &card.id,
            &card.deck_id,
            &card.box_id,
            &card.front_text,
            &card.back_text,
            &card.updated_at,
        ],
    )
    .await
    .map_err(map_box_violation)?;
    Ok(())
}

/// Finds a card by its ID within a deck.
///
/// # Arguments
///
/// * `db` - The database client.
/// * `deck_id` - The ID of the deck.
/// * `card_id` - The ID of the card.
///
/// # Returns
///
/// A `Result` containing the `Card` with its box type, if found.
pub async fn find_by_id<C: GenericClient>(db: &C, deck_id: Uuid, card_id: Uuid) -> Result<Option<Card>> {
    let sql = format!("{CARD_SELECT} WHERE c.id = $1 AND c.deck_id = $2");
    let row = db.query_opt(sql.as_str(), &[&card_id, &deck_id]).await?;
    row.map(|r| row_to_card(&r)).transpose()
}

/// Lists the cards of a box by `updated_at`.
///
/// # Arguments
///
/// * `db` - The database client.
/// * `box_id` - The ID of the box.
/// * `order` - Oldest first or newest first. Equal timestamps follow write order.
///
/// # Returns
///
/// A `Result` containing the cards of the box.
pub async fn list_by_box<C: GenericClient>(db: &C, box_id: Uuid, order: CardOrder) -> Result<Vec<Card>> {
    let sql = match order {
        CardOrder::OldestFirst => format!("{CARD_SELECT} WHERE c.box_id = $1 ORDER BY c.updated_at ASC, c.write_seq ASC"),
        CardOrder::NewestFirst => format!("{CARD_SELECT} WHERE c.box_id = $1 ORDER BY c.updated_at DESC, c.write_seq DESC"),
    };
    let rows = db.query(sql.as_str(), &[&box_id]).await?;
    rows.iter().map(row_to_card).collect()
}

/// Updates the text of a card.
///
/// # Arguments
///
/// * `db` - The database client.
/// * `card_id` - The ID of the card.
/// * `front_text` - The new prompt side.
/// * `back_text` - The new answer side.
/// * `updated_at` - The write time, which sends the card to the back of its box.
///
/// # Returns
///
/// An empty `Result`.
pub async fn update_text<C: GenericClient>(
    db: &C,
    card_id: Uuid,
    front_text: &str,
    back_text: &str,
    updated_at: DateTime<Utc>,
) -> Result<()> {
    db.execute(
        r#"
        UPDATE cards
        SET front_text = $1, back_text = $2, updated_at = $3, write_seq = nextval('cards_write_seq')
        WHERE id = $4
        "#,
        &[&front_text, &back_text, &updated_at, &card_id],
    )
    .await?;
    Ok(())
}

/// Moves a card to another box. The schema only accepts boxes of the card's deck.
///
/// # Arguments
///
/// * `db` - The database client or transaction.
/// * `card_id` - The ID of the card.
/// * `box_id` - The ID of the target box.
/// * `updated_at` - The write time.
///
/// # Returns
///
/// An empty `Result`, or a `ConstraintViolation` when the box is in another deck.
pub async fn move_to_box<C: GenericClient>(
    db: &C,
    card_id: Uuid,
    box_id: Uuid,
    updated_at: DateTime<Utc>,
) -> Result<()> {
    db.execute(
        r#"
        UPDATE cards
        SET box_id = $1, updated_at = $2, write_seq = nextval('cards_write_seq')
        WHERE id = $3
        "#,
        &[&box_id, &updated_at, &card_id],
    )
    .await
    .map_err(map_box_violation)?;
    Ok(())
}

/// Deletes a card from a deck.
pub async fn delete_card<C: GenericClient>(db: &C, deck_id: Uuid, card_id: Uuid) -> Result<bool> {
    let deleted = db
        .execute(
            "DELETE FROM cards WHERE id = $1 AND deck_id = $2",
            &[&card_id, &deck_id],
        )
        .await?;
    Ok(deleted > 0)
}
