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
        extract::{JsonBody, PathParams},
        respond,
    },
    models::{leitner_box::LeitnerBox, owner::Owner, session::Answer},
    repositories::store::LeitnerStore,
    services::sessions as session_service,
    state::AppState,
};

/// The request payload for starting a study session.
#[derive(Deserialize)]
pub struct StartSessionRequest {
    pub box_id: Uuid,
}

/// The request payload for answering the current card.
#[derive(Deserialize)]
pub struct AnswerRequest {
    /// `correct` or `incorrect`.
    pub answer: String,
}

/// The response payload for a closed session.
#[derive(Serialize)]
pub struct SessionClosed {
    pub message: &'static str,
    #[serde(rename = "box")]
    pub released_box: LeitnerBox,
}

/// Starts a study session on a box.
pub async fn start_session<S: LeitnerStore>(
    State(state): State<AppState<S>>,
    Extension(owner): Extension<Owner>,
    PathParams(deck_id): PathParams<Uuid>,
    JsonBody(req): JsonBody<StartSessionRequest>,
) -> Result<Response> {
    let session = session_service::start_session(&state.store, owner.id, deck_id, req.box_id).await?;
    respond::json(StatusCode::CREATED, &session)
}

/// Shows the session of a deck along with its current card.
pub async fn session_status<S: LeitnerStore>(
    State(state): State<AppState<S>>,
    Extension(owner): Extension<Owner>,
    PathParams(deck_id): PathParams<Uuid>,
) -> Result<Response> {
    let status = session_service::session_status(&state.store, owner.id, deck_id).await?;
    respond::json(StatusCode::OK, &status)
}

/// Answers the current card.
pub async fn answer_card<S: LeitnerStore>(
    State(state): State<AppState<S>>,
    Extension(owner): Extension<Owner>,
    PathParams(deck_id): PathParams<Uuid>,
    JsonBody(req): JsonBody<AnswerRequest>,
) -> Result<Response> {
    let answer: Answer = req.answer.parse()?;
    let outcome = session_service::answer(&state.store, owner.id, deck_id, answer).await?;
    respond::json(StatusCode::OK, &outcome)
}

/// Closes a finished session.
pub async fn close_session<S: LeitnerStore>(
    State(state): State<AppState<S>>,
    Extension(owner): Extension<Owner>,
    PathParams(deck_id): PathParams<Uuid>,
) -> Result<Response> {
    let released = session_service::finish_and_close(&state.store, owner.id, deck_id).await?;
    respond::json(
        StatusCode::OK,
        &SessionClosed {
            message: "Study session finished!",
            released_box: released,
        },
    )
}
