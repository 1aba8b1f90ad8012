use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{
    config::Config,
    handlers::{cards, decks, sessions},
    middleware_layer::owner::{OWNER_HEADER, require_owner},
    repositories::store::LeitnerStore,
    state::AppState,
};

async fn health() -> &'static str {
    "ok"
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("⚠️ Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::HeaderName::from_static(OWNER_HEADER),
        ])
}

/// Builds the HTTP router over any storage backend.
///
/// # Arguments
///
/// * `state` - The application state.
///
/// # Returns
///
/// The `Router` serving the deck, card and session endpoints.
pub fn router<S: LeitnerStore>(state: AppState<S>) -> Router {
    let cors = cors_layer(&state.config);

    let deck_routes = Router::new()
        .route(
            "/api/decks",
            get(decks::list_decks::<S>).post(decks::create_deck::<S>),
        )
        .route(
            "/api/decks/{deck_id}",
            get(decks::get_deck::<S>)
                .patch(decks::rename_deck::<S>)
                .delete(decks::delete_deck::<S>),
        )
        .route(
            "/api/decks/{deck_id}/boxes/{box_id}/cards",
            get(cards::list_box_cards::<S>),
        )
        .route("/api/decks/{deck_id}/cards", post(cards::create_card::<S>))
        .route(
            "/api/decks/{deck_id}/cards/{card_id}",
            get(cards::get_card::<S>)
                .patch(cards::edit_card::<S>)
                .delete(cards::delete_card::<S>),
        )
        .route(
            "/api/decks/{deck_id}/cards/{card_id}/move",
            post(cards::move_card::<S>),
        )
        .route(
            "/api/decks/{deck_id}/session",
            get(sessions::session_status::<S>)
                .post(sessions::start_session::<S>)
                .delete(sessions::close_session::<S>),
        )
        .route(
            "/api/decks/{deck_id}/session/answer",
            post(sessions::answer_card::<S>),
        )
        .route_layer(from_fn(require_owner))
        .with_state(state);

    Router::new()
        .route("/health", get(health))
        .merge(deck_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(cors)
}
