use chrono::Utc;
use garde::Validate;
use uuid::Uuid;
use crate::{
    error::{AppError, Result},
    models::{
        card::{Card, CardEdit, CardOrder, NewCard},
        leitner_box::{BoxType, LeitnerBox},
        session::{Answer, StudySession},
    },
    repositories::store::LeitnerStore,
    services::{decks::owned_deck, sessions::active_session},
};

/// Resolves a box of `deck_id` by ID.
async fn deck_box<S: LeitnerStore>(store: &S, deck_id: Uuid, box_id: Uuid) -> Result<LeitnerBox> {
    store
        .find_box(box_id)
        .await?
        .filter(|b| b.deck_id == deck_id)
        .ok_or(AppError::NotFound)
}

/// Resolves the box of a given type in a deck. Every deck has all three.
async fn box_of_type<S: LeitnerStore>(store: &S, deck_id: Uuid, box_type: BoxType) -> Result<LeitnerBox> {
    store
        .find_box_by_type(deck_id, box_type)
        .await?
        .ok_or_else(|| AppError::Internal(format!("Deck {} has no '{}' box", deck_id, box_type)))
}

/// Creates a new card in a deck.
///
/// # Arguments
///
/// * `store` - The storage backend.
/// * `owner_id` - The ID of the user who owns the deck.
/// * `deck_id` - The ID of the deck.
/// * `input` - The card texts and, optionally, the box to place it in.
///
/// # Returns
///
/// A `Result` containing the created `Card`.
pub async fn add_card<S: LeitnerStore>(
    store: &S,
    owner_id: Uuid,
    deck_id: Uuid,
    input: NewCard,
) -> Result<Card> {
    input.validate()?;
    let deck = owned_deck(store, owner_id, deck_id).await?;

    let target = match input.box_id {
        Some(box_id) => deck_box(store, deck.id, box_id).await?,
        None => box_of_type(store, deck.id, BoxType::Daily).await?,
    };

    let card = Card::new(&target, input.front_text, input.back_text);
    store.insert_card(&card).await?;

    tracing::info!("🃏 Card {} added to box '{}' of deck {}", card.id, target.box_type, deck.id);
    Ok(card)
}

/// Gets a card of a deck.
pub async fn get_card<S: LeitnerStore>(store: &S, owner_id: Uuid, deck_id: Uuid, card_id: Uuid) -> Result<Card> {
    let deck = owned_deck(store, owner_id, deck_id).await?;
    store
        .find_card(deck.id, card_id)
        .await?
        .ok_or(AppError::NotFound)
}

/// Lists the cards of a box.
///
/// # Arguments
///
/// * `store` - The storage backend.
/// * `owner_id` - The ID of the user.
/// * `deck_id` - The ID of the deck.
/// * `box_id` - The ID of the box.
/// * `order` - Oldest first (study order) or newest first.
///
/// # Returns
///
/// A `Result` containing the cards of the box.
pub async fn list_cards<S: LeitnerStore>(
    store: &S,
    owner_id: Uuid,
    deck_id: Uuid,
    box_id: Uuid,
    order: CardOrder,
) -> Result<Vec<Card>> {
    let deck = owned_deck(store, owner_id, deck_id).await?;
    let leitner_box = deck_box(store, deck.id, box_id).await?;
    store.list_cards(leitner_box.id, order).await
}

/// Changes the texts of a card. This also sends it to the back of its box.
///
/// Submitting the texts the card already has writes nothing, so the card keeps
/// its place in the box.
pub async fn edit_card<S: LeitnerStore>(
    store: &S,
    owner_id: Uuid,
    deck_id: Uuid,
    card_id: Uuid,
    input: CardEdit,
) -> Result<Card> {
    input.validate()?;
    let mut card = get_card(store, owner_id, deck_id, card_id).await?;

    if card.front_text == input.front_text && card.back_text == input.back_text {
        tracing::warn!("⚠️ No changes have been made to card {}", card.id);
        return Ok(card);
    }

    card.front_text = input.front_text;
    card.back_text = input.back_text;
    card.updated_at = Utc::now();
    store
        .update_card_text(card.id, &card.front_text, &card.back_text, card.updated_at)
        .await?;

    tracing::debug!("✏️ Card edited: {}", card.id);
    Ok(card)
}

/// Deletes a card from a deck.
pub async fn delete_card<S: LeitnerStore>(store: &S, owner_id: Uuid, deck_id: Uuid, card_id: Uuid) -> Result<()> {
    let deck = owned_deck(store, owner_id, deck_id).await?;
    if !store.delete_card(deck.id, card_id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!("🗑️ Card deleted: {}", card_id);
    Ok(())
}

/// Moves a card to another box of its deck.
///
/// A box of another deck owned by the same user is a `ConstraintViolation`;
/// a box the user cannot see is `NotFound`. Neither changes anything.
///
/// # Arguments
///
/// * `store` - The storage backend.
/// * `owner_id` - The ID of the user.
/// * `deck_id` - The ID of the card's deck.
/// * `card_id` - The ID of the card.
/// * `box_id` - The ID of the target box.
///
/// # Returns
///
/// A `Result` containing the moved `Card`.
pub async fn move_card<S: LeitnerStore>(
    store: &S,
    owner_id: Uuid,
    deck_id: Uuid,
    card_id: Uuid,
    box_id: Uuid,
) -> Result<Card> {
    let card = get_card(store, owner_id, deck_id, card_id).await?;

    let target = store.find_box(box_id).await?.ok_or(AppError::NotFound)?;
    if target.deck_id != card.deck_id {
        owned_deck(store, owner_id, target.deck_id).await?;
        tracing::warn!("⚠️ Refused to move card {} into box {} of deck {}", card.id, target.id, target.deck_id);
        return Err(AppError::ConstraintViolation(
            "A card can only move between boxes of its own deck".to_string(),
        ));
    }

    let updated_at = Utc::now();
    store.move_card(card.id, target.id, updated_at).await?;

    Ok(Card {
        box_id: target.id,
        box_type: target.box_type,
        updated_at,
        ..card
    })
}

/// Records a correct answer: the card climbs one box (staying put on the weekly box).
///
/// Requires an active study session on the card's deck.
pub async fn correct_answer<S: LeitnerStore>(
    store: &S,
    owner_id: Uuid,
    deck_id: Uuid,
    card_id: Uuid,
) -> Result<Card> {
    answer_card(store, owner_id, deck_id, card_id, Answer::Correct).await
}

/// Records a wrong answer: the card goes back to the daily box.
///
/// Requires an active study session on the card's deck.
pub async fn wrong_answer<S: LeitnerStore>(
    store: &S,
    owner_id: Uuid,
    deck_id: Uuid,
    card_id: Uuid,
) -> Result<Card> {
    answer_card(store, owner_id, deck_id, card_id, Answer::Incorrect).await
}

async fn answer_card<S: LeitnerStore>(
    store: &S,
    owner_id: Uuid,
    deck_id: Uuid,
    card_id: Uuid,
    answer: Answer,
) -> Result<Card> {
    let card = get_card(store, owner_id, deck_id, card_id).await?;
    let session = active_session(store, card.deck_id).await?;
    apply_answer(store, &session, card, answer).await
}

/// Moves `card` to the box `answer` sends it to and logs it as reviewed in `session`.
pub(crate) async fn apply_answer<S: LeitnerStore>(
    store: &S,
    session: &StudySession,
    card: Card,
    answer: Answer,
) -> Result<Card> {
    let target = box_of_type(store, card.deck_id, answer.next_box(card.box_type)).await?;
    let answered_at = Utc::now();
    store
        .record_answer(session.id, card.id, target.id, answered_at)
        .await?;

    tracing::debug!(
        "📝 Card {} answered {:?}: '{}' -> '{}'",
        card.id,
        answer,
        card.box_type,
        target.box_type
    );

    Ok(Card {
        box_id: target.id,
        box_type: target.box_type,
        updated_at: answered_at,
        ..card
    })
}
