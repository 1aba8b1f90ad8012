use tokio_postgres::{GenericClient, Row};
use uuid::Uuid;
use crate::{
    error::{AppError, Result},
    models::deck::Deck,
};

/// A helper function to map a `tokio_postgres::Row` to a `Deck`.
fn row_to_deck(row: &Row) -> Result<Deck> {
    Ok(Deck {
        id: row.try_get("id").map_err(|_| AppError::MissingData("id".to_string()))?,
        owner_id: row.try_get("owner_id").map_err(|_| AppError::MissingData("owner_id".to_string()))?,
        description: row.try_get("description").map_err(|_| AppError::MissingData("description".to_string()))?,
        created_at: row.try_get("created_at").map_err(|_| AppError::MissingData("created_at".to_string()))?,
    })
}

/// Creates a new deck in the database.
///
/// # Arguments
///
/// * `db` - The database client or transaction.
/// * `deck` - The deck to insert.
///
/// # Returns
///
/// An empty `Result`.
pub async fn create_deck<C: GenericClient>(db: &C, deck: &Deck) -> Result<()> {
    db.execute(
        r#"
        INSERT INTO decks (id, owner_id, description, created_at)
        VALUES ($1, $2, $3, $4)
        "#,
        &[&deck.id, &deck.owner_id, &deck.description, &deck.created_at],
    )
    .await?;
    Ok(())
}

/// Lists the decks of a user, oldest first.
///
/// # Arguments
///
/// * `db` - The database client.
/// * `owner_id` - The ID of the user.
///
/// # Returns
///
/// A `Result` containing the user's decks.
pub async fn list_by_owner<C: GenericClient>(db: &C, owner_id: Uuid) -> Result<Vec<Deck>> {
    let rows = db
        .query(
            r#"
            SELECT id, owner_id, description, created_at
            FROM decks
            WHERE owner_id = $1
            ORDER BY created_at ASC, id
            "#,
            &[&owner_id],
        )
        .await?;
    rows.iter().map(row_to_deck).collect()
}

/// Finds a deck by its ID, scoped to its owner.
///
/// # Arguments
///
/// * `db` - The database client.
/// * `owner_id` - The ID of the user who must own the deck.
/// * `deck_id` - The ID of the deck.
///
/// # Returns
///
/// A `Result` containing the `Deck`, or `None` when it is missing or owned by someone else.
pub async fn find_by_id<C: GenericClient>(db: &C, owner_id: Uuid, deck_id: Uuid) -> Result<Option<Deck>> {
    let row = db
        .query_opt(
            r#"
            SELECT id, owner_id, description, created_at
            FROM decks
            WHERE id = $1 AND owner_id = $2
            "#,
            &[&deck_id, &owner_id],
        )
        .await?;
    row.map(|r| row_to_deck(&r)).transpose()
}

/// Updates a deck's description.
pub async fn update_description<C: GenericClient>(db: &C, deck_id: Uuid, description: &str) -> Result<()> {
    db.execute(
        "UPDATE decks SET description = $1 WHERE id = $2",
        &[&description, &deck_id],
    )
    .await?;
    Ok(())
}

/// Deletes a deck. Boxes, cards and the session go with it.
///
/// # Arguments
///
/// * `db` - The database client.
/// * `owner_id` - The ID of the user who must own the deck.
/// * `deck_id` - The ID of the deck.
///
/// # Returns
///
/// A `Result` containing `true` if a deck was deleted.
pub async fn delete_deck<C: GenericClient>(db: &C, owner_id: Uuid, deck_id: Uuid) -> Result<bool> {
    let deleted = db
        .execute(
            "DELETE FROM decks WHERE id = $1 AND owner_id = $2",
            &[&deck_id, &owner_id],
        )
        .await?;
    Ok(deleted > 0)
}
