use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    Extension,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::Result,
    handlers::{
        extract::{JsonBody, PathParams},
        respond,
    },
    models::{
        deck::{Deck, DeckInput},
        owner::Owner,
    },
    repositories::store::LeitnerStore,
    services::decks as deck_service,
    state::AppState,
};

/// The response payload for listing decks.
#[derive(Serialize)]
pub struct DeckList<'a> {
    pub count: usize,
    pub decks: &'a [Deck],
}

/// Creates a new deck with its three boxes.
pub async fn create_deck<S: LeitnerStore>(
    State(state): State<AppState<S>>,
    Extension(owner): Extension<Owner>,
    JsonBody(req): JsonBody<DeckInput>,
) -> Result<Response> {
    let deck = deck_service::create_deck(&state.store, owner.id, req).await?;
    respond::json(StatusCode::CREATED, &deck)
}

/// Lists the decks of the owner.
pub async fn list_decks<S: LeitnerStore>(
    State(state): State<AppState<S>>,
    Extension(owner): Extension<Owner>,
) -> Result<Response> {
    let decks = deck_service::list_decks(&state.store, owner.id).await?;
    respond::json(
        StatusCode::OK,
        &DeckList {
            count: decks.len(),
            decks: &decks,
        },
    )
}

/// Shows a deck with its boxes and session.
pub async fn get_deck<S: LeitnerStore>(
    State(state): State<AppState<S>>,
    Extension(owner): Extension<Owner>,
    PathParams(deck_id): PathParams<Uuid>,
) -> Result<Response> {
    let detail = deck_service::get_deck(&state.store, owner.id, deck_id).await?;
    respond::json(StatusCode::OK, &detail)
}

/// Changes the description of a deck.
pub async fn rename_deck<S: LeitnerStore>(
    State(state): State<AppState<S>>,
    Extension(owner): Extension<Owner>,
    PathParams(deck_id): PathParams<Uuid>,
    JsonBody(req): JsonBody<DeckInput>,
) -> Result<Response> {
    let deck = deck_service::rename_deck(&state.store, owner.id, deck_id, req).await?;
    respond::json(StatusCode::OK, &deck)
}

/// Deletes a deck.
pub async fn delete_deck<S: LeitnerStore>(
    State(state): State<AppState<S>>,
    Extension(owner): Extension<Owner>,
    PathParams(deck_id): PathParams<Uuid>,
) -> Result<Response> {
    deck_service::delete_deck(&state.store, owner.id, deck_id).await?;
    respond::message(StatusCode::OK, "Deck deleted successfully")
}
