use chrono::Utc;
use uuid::Uuid;
use crate::{
    error::{AppError, Result},
    models::{
        card::Card,
        leitner_box::LeitnerBox,
        session::{Answer, AnswerOutcome, SessionProgress, SessionStatus, StudySession},
    },
    repositories::store::LeitnerStore,
    services::{cards::apply_answer, decks::owned_deck},
};

/// The session of a deck, which must exist and not be finished yet.
pub(crate) async fn active_session<S: LeitnerStore>(store: &S, deck_id: Uuid) -> Result<StudySession> {
    let session = store
        .find_session(deck_id)
        .await?
        .ok_or_else(|| AppError::InvalidTransition("No study session is running for this deck".to_string()))?;
    if session.is_finished {
        return Err(AppError::InvalidTransition(
            "The study session is already finished".to_string(),
        ));
    }
    Ok(session)
}

/// Returns the card waiting in `session`, finishing the session when none is left.
async fn pending_card<S: LeitnerStore>(store: &S, session: &mut StudySession) -> Result<Option<Card>> {
    if session.is_finished {
        return Ok(None);
    }

    let card = store.next_card(session.id, session.current_box_id).await?;
    if card.is_none() {
        store.mark_session_finished(session.id).await?;
        session.is_finished = true;
        tracing::info!("🏁 Study session {} finished (deck {})", session.id, session.deck_id);
    }
    Ok(card)
}

async fn progress<S: LeitnerStore>(store: &S, session: &StudySession) -> Result<SessionProgress> {
    Ok(SessionProgress {
        reviewed: store.count_finished_cards(session.id).await?,
        total: i64::from(session.total_cards_on_box),
    })
}

async fn status_of<S: LeitnerStore>(store: &S, mut session: StudySession) -> Result<SessionStatus> {
    let card = pending_card(store, &mut session).await?;
    let progress = progress(store, &session).await?;
    Ok(match card {
        Some(current_card) => SessionStatus::Active { session, current_card, progress },
        None => SessionStatus::Finished { session, progress },
    })
}

/// Starts a study session over one box of a deck.
///
/// # Arguments
///
/// * `store` - The storage backend.
/// * `owner_id` - The ID of the user who owns the deck.
/// * `deck_id` - The ID of the deck.
/// * `box_id` - The ID of the box to study.
///
/// # Returns
///
/// A `Result` containing the new `StudySession`. Fails with `InvalidTransition`
/// when the deck already has a session and with `EmptySelection` when the box
/// holds no cards.
pub async fn start_session<S: LeitnerStore>(
    store: &S,
    owner_id: Uuid,
    deck_id: Uuid,
    box_id: Uuid,
) -> Result<StudySession> {
    let deck = owned_deck(store, owner_id, deck_id).await?;

    if store.find_session(deck.id).await?.is_some() {
        return Err(AppError::InvalidTransition(
            "A study session is already running for this deck".to_string(),
        ));
    }

    let leitner_box = store
        .find_box(box_id)
        .await?
        .filter(|b| b.deck_id == deck.id)
        .ok_or(AppError::NotFound)?;

    let card_count = store.count_cards(leitner_box.id).await?;
    if card_count == 0 {
        tracing::warn!("⚠️ Box '{}' of deck {} is empty", leitner_box.box_type, deck.id);
        return Err(AppError::EmptySelection(
            "The selected box is empty, use another".to_string(),
        ));
    }

    let total_cards_on_box = i32::try_from(card_count)
        .map_err(|_| AppError::Internal(format!("Box {} holds too many cards", leitner_box.id)))?;
    let session = StudySession::new(&leitner_box, total_cards_on_box);
    store.insert_session(&session).await?;

    tracing::info!(
        "🚀 Study session {} started on box '{}' of deck {} ({} cards)",
        session.id,
        leitner_box.box_type,
        deck.id,
        total_cards_on_box
    );
    Ok(session)
}

/// Reports where the deck stands in the session lifecycle.
///
/// Reading an active session with nothing left to answer finishes it.
pub async fn session_status<S: LeitnerStore>(store: &S, owner_id: Uuid, deck_id: Uuid) -> Result<SessionStatus> {
    let deck = owned_deck(store, owner_id, deck_id).await?;
    match store.find_session(deck.id).await? {
        Some(session) => status_of(store, session).await,
        None => Ok(SessionStatus::Inert),
    }
}

/// The oldest card of the session's box not yet answered in this session.
///
/// # Returns
///
/// `None` once every card has been answered, at which point the session is
/// finished. Fails with `InvalidTransition` when the deck has no session.
pub async fn current_card<S: LeitnerStore>(store: &S, owner_id: Uuid, deck_id: Uuid) -> Result<Option<Card>> {
    let deck = owned_deck(store, owner_id, deck_id).await?;
    let mut session = store
        .find_session(deck.id)
        .await?
        .ok_or_else(|| AppError::InvalidTransition("No study session is running for this deck".to_string()))?;
    pending_card(store, &mut session).await
}

/// Answers the current card of the deck's session.
///
/// # Arguments
///
/// * `store` - The storage backend.
/// * `owner_id` - The ID of the user.
/// * `deck_id` - The ID of the deck.
/// * `answer` - Whether the learner got the card right.
///
/// # Returns
///
/// A `Result` containing the answered card and the session status afterwards.
/// Nothing is written when there is no active session or no pending card.
pub async fn answer<S: LeitnerStore>(
    store: &S,
    owner_id: Uuid,
    deck_id: Uuid,
    answer: Answer,
) -> Result<AnswerOutcome> {
    let deck = owned_deck(store, owner_id, deck_id).await?;
    let session = active_session(store, deck.id).await?;

    let card = store
        .next_card(session.id, session.current_box_id)
        .await?
        .ok_or_else(|| AppError::InvalidTransition("No card is waiting to be answered".to_string()))?;

    let answered = apply_answer(store, &session, card, answer).await?;
    let status = status_of(store, session).await?;

    Ok(AnswerOutcome { answered, status })
}

/// Closes a finished session, releasing its box.
///
/// # Arguments
///
/// * `store` - The storage backend.
/// * `owner_id` - The ID of the user.
/// * `deck_id` - The ID of the deck.
///
/// # Returns
///
/// A `Result` containing the released box with its new `last_used`. Fails with
/// `InvalidTransition` when there is no session or cards are still pending.
pub async fn finish_and_close<S: LeitnerStore>(store: &S, owner_id: Uuid, deck_id: Uuid) -> Result<LeitnerBox> {
    let deck = owned_deck(store, owner_id, deck_id).await?;
    let mut session = store
        .find_session(deck.id)
        .await?
        .ok_or_else(|| AppError::InvalidTransition("No study session is running for this deck".to_string()))?;

    if pending_card(store, &mut session).await?.is_some() {
        return Err(AppError::InvalidTransition(
            "The study session still has cards to answer".to_string(),
        ));
    }

    let closed_at = Utc::now();
    store.close_session(&session, closed_at).await?;

    let released = store
        .find_box(session.current_box_id)
        .await?
        .ok_or(AppError::NotFound)?;

    tracing::info!("✅ Study session {} closed, box '{}' released", session.id, released.box_type);
    Ok(released)
}
