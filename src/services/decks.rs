use garde::Validate;
use uuid::Uuid;
use crate::{
    error::{AppError, Result},
    models::{
        deck::{Deck, DeckDetail, DeckInput},
        leitner_box::{BoxSummary, LeitnerBox},
    },
    repositories::store::LeitnerStore,
};

/// Looks up a deck the owner is allowed to see.
///
/// # Returns
///
/// The `Deck`, or `AppError::NotFound` when it does not exist or belongs to someone else.
pub async fn owned_deck<S: LeitnerStore>(store: &S, owner_id: Uuid, deck_id: Uuid) -> Result<Deck> {
    store
        .find_deck(owner_id, deck_id)
        .await?
        .ok_or(AppError::NotFound)
}

/// Creates a new deck and its three boxes.
///
/// # Arguments
///
/// * `store` - The storage backend.
/// * `owner_id` - The ID of the user who owns the deck.
/// * `input` - The deck description.
///
/// # Returns
///
/// A `Result` containing the created deck with its boxes.
pub async fn create_deck<S: LeitnerStore>(store: &S, owner_id: Uuid, input: DeckInput) -> Result<DeckDetail> {
    input.validate()?;

    let deck = Deck::new(owner_id, input.description.trim().to_string());
    let boxes = LeitnerBox::set_for(deck.id);
    store.insert_deck(&deck, &boxes).await?;

    tracing::info!("📚 Deck created: {} (owner {})", deck.id, owner_id);

    Ok(DeckDetail {
        deck,
        boxes: boxes
            .into_iter()
            .map(|leitner_box| BoxSummary { leitner_box, card_count: 0 })
            .collect(),
        session: None,
    })
}

/// Lists the decks of a user.
pub async fn list_decks<S: LeitnerStore>(store: &S, owner_id: Uuid) -> Result<Vec<Deck>> {
    store.list_decks(owner_id).await
}

/// Gets a deck with its boxes, their card counts and the running session.
///
/// # Arguments
///
/// * `store` - The storage backend.
/// * `owner_id` - The ID of the user.
/// * `deck_id` - The ID of the deck.
///
/// # Returns
///
/// A `Result` containing the `DeckDetail`.
pub async fn get_deck<S: LeitnerStore>(store: &S, owner_id: Uuid, deck_id: Uuid) -> Result<DeckDetail> {
    let deck = owned_deck(store, owner_id, deck_id).await?;

    let mut boxes = Vec::new();
    for leitner_box in store.list_boxes(deck.id).await? {
        let card_count = store.count_cards(leitner_box.id).await?;
        boxes.push(BoxSummary { leitner_box, card_count });
    }

    let session = store.find_session(deck.id).await?;

    Ok(DeckDetail { deck, boxes, session })
}

/// Changes the description of a deck.
pub async fn rename_deck<S: LeitnerStore>(
    store: &S,
    owner_id: Uuid,
    deck_id: Uuid,
    input: DeckInput,
) -> Result<Deck> {
    input.validate()?;
    let mut deck = owned_deck(store, owner_id, deck_id).await?;

    deck.description = input.description.trim().to_string();
    store.update_deck_description(deck.id, &deck.description).await?;

    tracing::debug!("✏️ Deck renamed: {}", deck.id);
    Ok(deck)
}

/// Deletes a deck with its boxes, cards and session.
pub async fn delete_deck<S: LeitnerStore>(store: &S, owner_id: Uuid, deck_id: Uuid) -> Result<()> {
    if !store.delete_deck(owner_id, deck_id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!("🗑️ Deck deleted: {}", deck_id);
    Ok(())
}
