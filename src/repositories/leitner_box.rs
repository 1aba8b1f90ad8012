use chrono::{DateTime, Utc};
use tokio_postgres::{GenericClient, Row};
use uuid::Uuid;
use crate::{
    error::{AppError, Result},
    models::leitner_box::{BoxType, LeitnerBox},
};

const BOX_COLUMNS: &str = "id, deck_id, description, box_type, in_session, last_used";

/// A helper function to map a `tokio_postgres::Row` to a `LeitnerBox`.
fn row_to_box(row: &Row) -> Result<LeitnerBox> {
    let box_type: i16 = row.try_get("box_type").map_err(|_| AppError::MissingData("box_type".to_string()))?;
    Ok(LeitnerBox {
        id: row.try_get("id").map_err(|_| AppError::MissingData("id".to_string()))?,
        deck_id: row.try_get("deck_id").map_err(|_| AppError::MissingData("deck_id".to_string()))?,
        description: row.try_get("description").map_err(|_| AppError::MissingData("description".to_string()))?,
        box_type: BoxType::try_from(box_type)?,
        in_session: row.try_get("in_session").map_err(|_| AppError::MissingData("in_session".to_string()))?,
        last_used: row.try_get("last_used").map_err(|_| AppError::MissingData("last_used".to_string()))?,
    })
}

/// Inserts the boxes of a freshly created deck.
///
/// # Arguments
///
/// * `db` - The transaction that inserted the deck.
/// * `boxes` - The three boxes of the deck.
///
/// # Returns
///
/// An empty `Result`.
pub async fn create_boxes<C: GenericClient>(db: &C, boxes: &[LeitnerBox]) -> Result<()> {
    for leitner_box in boxes {
        db.execute(
            r#"
            INSERT INTO boxes (id, deck_id, description, box_type, in_session, last_used)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
            &[
                &leitner_box.id,
                &leitner_box.deck_id,
                &leitner_box.description,
                &leitner_box.box_type.as_i16(),
                &leitner_box.in_session,
                &leitner_box.last_used,
            ],
        )
        .await?;
    }
    Ok(())
}

/// Lists the boxes of a deck ordered by `box_type`.
///
/// # Arguments
///
/// * `db` - The database client.
/// * `deck_id` - The ID of the deck.
///
/// # Returns
///
/// A `Result` containing the boxes, daily box first.
pub async fn list_by_deck<C: GenericClient>(db: &C, deck_id: Uuid) -> Result<Vec<LeitnerBox>> {
    let sql = format!("SELECT {BOX_COLUMNS} FROM boxes WHERE deck_id = $1 ORDER BY box_type ASC");
    let rows = db.query(sql.as_str(), &[&deck_id]).await?;
    rows.iter().map(row_to_box).collect()
}

/// Finds a box by its ID.
pub async fn find_by_id<C: GenericClient>(db: &C, box_id: Uuid) -> Result<Option<LeitnerBox>> {
    let sql = format!("SELECT {BOX_COLUMNS} FROM boxes WHERE id = $1");
    let row = db.query_opt(sql.as_str(), &[&box_id]).await?;
    row.map(|r| row_to_box(&r)).transpose()
}

/// Finds the box of a given type in a deck.
///
/// # Arguments
///
/// * `db` - The database client.
/// * `deck_id` - The ID of the deck.
/// * `box_type` - The rung of the ladder to look up.
///
/// # Returns
///
/// A `Result` containing the box, if the deck has one of that type.
pub async fn find_by_type<C: GenericClient>(db: &C, deck_id: Uuid, box_type: BoxType) -> Result<Option<LeitnerBox>> {
    let sql = format!("SELECT {BOX_COLUMNS} FROM boxes WHERE deck_id = $1 AND box_type = $2");
    let row = db.query_opt(sql.as_str(), &[&deck_id, &box_type.as_i16()]).await?;
    row.map(|r| row_to_box(&r)).transpose()
}

/// Counts the cards currently in a box.
pub async fn count_cards<C: GenericClient>(db: &C, box_id: Uuid) -> Result<i64> {
    let row = db
        .query_one("SELECT COUNT(*) AS card_count FROM cards WHERE box_id = $1", &[&box_id])
        .await?;
    row.try_get("card_count").map_err(|_| AppError::MissingData("card_count".to_string()))
}

/// Flags a box as used by a study session.
pub async fn set_in_session<C: GenericClient>(db: &C, box_id: Uuid) -> Result<()> {
    db.execute("UPDATE boxes SET in_session = true WHERE id = $1", &[&box_id])
        .await?;
    Ok(())
}

/// Releases a box after its study session closed.
///
/// # Arguments
///
/// * `db` - The transaction closing the session.
/// * `box_id` - The ID of the box.
/// * `last_used` - When the session was closed.
///
/// # Returns
///
/// An empty `Result`.
pub async fn release<C: GenericClient>(db: &C, box_id: Uuid, last_used: DateTime<Utc>) -> Result<()> {
    db.execute(
        "UPDATE boxes SET in_session = false, last_used = $1 WHERE id = $2",
        &[&last_used, &box_id],
    )
    .await?;
    Ok(())
}
