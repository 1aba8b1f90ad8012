use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    Extension,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::Result,
    handlers::{
        extract::{JsonBody, PathParams, QueryParams},
        respond,
    },
    models::{
        card::{Card, CardEdit, CardOrder, NewCard},
        owner::Owner,
    },
    repositories::store::LeitnerStore,
    services::cards as card_service,
    state::AppState,
};

/// The query parameters for listing the cards of a box.
#[derive(Deserialize)]
pub struct ListCardsQuery {
    #[serde(default)]
    pub order: CardOrder,
}

/// The request payload for moving a card.
#[derive(Deserialize)]
pub struct MoveCardRequest {
    pub box_id: Uuid,
}

/// The response payload for listing cards.
#[derive(Serialize)]
pub struct CardList<'a> {
    pub count: usize,
    pub cards: &'a [Card],
}

/// Adds a card to a deck.
pub async fn create_card<S: LeitnerStore>(
    State(state): State<AppState<S>>,
    Extension(owner): Extension<Owner>,
    PathParams(deck_id): PathParams<Uuid>,
    JsonBody(req): JsonBody<NewCard>,
) -> Result<Response> {
    let card = card_service::add_card(&state.store, owner.id, deck_id, req).await?;
    respond::json(StatusCode::CREATED, &card)
}

/// Lists the cards of a box.
pub async fn list_box_cards<S: LeitnerStore>(
    State(state): State<AppState<S>>,
    Extension(owner): Extension<Owner>,
    PathParams((deck_id, box_id)): PathParams<(Uuid, Uuid)>,
    QueryParams(query): QueryParams<ListCardsQuery>,
) -> Result<Response> {
    let cards = card_service::list_cards(&state.store, owner.id, deck_id, box_id, query.order).await?;
    respond::json(
        StatusCode::OK,
        &CardList {
            count: cards.len(),
            cards: &cards,
        },
    )
}

/// Shows a card.
pub async fn get_card<S: LeitnerStore>(
    State(state): State<AppState<S>>,
    Extension(owner): Extension<Owner>,
    PathParams((deck_id, card_id)): PathParams<(Uuid, Uuid)>,
) -> Result<Response> {
    let card = card_service::get_card(&state.store, owner.id, deck_id, card_id).await?;
    respond::json(StatusCode::OK, &card)
}

/// Edits the texts of a card.
pub async fn edit_card<S: LeitnerStore>(
    State(state): State<AppState<S>>,
    Extension(owner): Extension<Owner>,
    PathParams((deck_id, card_id)): PathParams<(Uuid, Uuid)>,
    JsonBody(req): JsonBody<CardEdit>,
) -> Result<Response> {
    let card = card_service::edit_card(&state.store, owner.id, deck_id, card_id, req).await?;
    respond::json(StatusCode::OK, &card)
}

/// Deletes a card.
pub async fn delete_card<S: LeitnerStore>(
    State(state): State<AppState<S>>,
    Extension(owner): Extension<Owner>,
    PathParams((deck_id, card_id)): PathParams<(Uuid, Uuid)>,
) -> Result<Response> {
    card_service::delete_card(&state.store, owner.id, deck_id, card_id).await?;
    respond::message(StatusCode::OK, "Card deleted successfully")
}

/// Moves a card to another box of its deck.
pub async fn move_card<S: LeitnerStore>(
    State(state): State<AppState<S>>,
    Extension(owner): Extension<Owner>,
    PathParams((deck_id, card_id)): PathParams<(Uuid, Uuid)>,
    JsonBody(req): JsonBody<MoveCardRequest>,
) -> Result<Response> {
    let card = card_service::move_card(&state.store, owner.id, deck_id, card_id, req.box_id).await?;
    respond::json(StatusCode::OK, &card)
}
