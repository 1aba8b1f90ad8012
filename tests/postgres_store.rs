//! Runs the study loop against a real database.
//!
//! Set `TEST_DATABASE_URL` and run with `cargo test -- --ignored`.

use leitner::{
    db,
    error::AppError,
    models::{
        card::{Card, CardOrder, NewCard},
        deck::DeckInput,
        leitner_box::BoxType,
        session::Answer,
    },
    repositories::{postgres::PgStore, store::LeitnerStore},
    services::{cards as card_service, decks as deck_service, sessions as session_service},
};
use chrono::Utc;
use uuid::Uuid;

async fn store() -> PgStore {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let pool = db::create_pool(&url, 4).expect("pool");
    db::migrate(&pool).await.expect("migrations");
    PgStore::new(pool)
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn study_loop_round_trip() {
    let store = store().await;
    let owner_id = Uuid::new_v4();

    let deck = deck_service::create_deck(
        &store,
        owner_id,
        DeckInput {
            description: "Deutsch".to_string(),
        },
    )
    .await
    .unwrap();
    let daily = deck.boxes[0].leitner_box.clone();
    assert_eq!(daily.box_type, BoxType::Daily);

    let mut cards = Vec::new();
    for front in ["eins", "zwei"] {
        let card = card_service::add_card(
            &store,
            owner_id,
            deck.deck.id,
            NewCard {
                front_text: front.to_string(),
                back_text: "?".to_string(),
                box_id: None,
            },
        )
        .await
        .unwrap();
        cards.push(card);
    }

    let listed = card_service::list_cards(&store, owner_id, deck.deck.id, daily.id, CardOrder::OldestFirst)
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);

    let session = session_service::start_session(&store, owner_id, deck.deck.id, daily.id)
        .await
        .unwrap();
    let err = session_service::start_session(&store, owner_id, deck.deck.id, daily.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));

    let first = session_service::answer(&store, owner_id, deck.deck.id, Answer::Correct)
        .await
        .unwrap();
    assert_eq!(first.answered.id, cards[0].id);
    assert_eq!(first.answered.box_type, BoxType::EveryOtherDay);

    let second = session_service::answer(&store, owner_id, deck.deck.id, Answer::Incorrect)
        .await
        .unwrap();
    assert_eq!(second.answered.id, cards[1].id);
    assert!(second.status.is_finished());

    let released = session_service::finish_and_close(&store, owner_id, deck.deck.id)
        .await
        .unwrap();
    assert!(!released.in_session);
    assert!(released.last_used.is_some());
    assert!(store.find_session(deck.deck.id).await.unwrap().is_none());

    let late = store
        .record_answer(session.id, cards[1].id, daily.id, Utc::now())
        .await;
    assert!(matches!(late, Err(AppError::InvalidTransition(_))));

    deck_service::delete_deck(&store, owner_id, deck.deck.id)
        .await
        .unwrap();
    assert!(store.find_card(deck.deck.id, cards[0].id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn equal_timestamps_keep_write_order() {
    let store = store().await;
    let owner_id = Uuid::new_v4();
    let deck = deck_service::create_deck(
        &store,
        owner_id,
        DeckInput {
            description: "Deutsch".to_string(),
        },
    )
    .await
    .unwrap();
    let daily = deck.boxes[0].leitner_box.clone();

    let now = Utc::now();
    let mut first = Card::new(&daily, "eins".to_string(), "one".to_string());
    let mut second = Card::new(&daily, "zwei".to_string(), "two".to_string());
    first.updated_at = now;
    second.updated_at = now;
    store.insert_card(&first).await.unwrap();
    store.insert_card(&second).await.unwrap();
    store.update_card_text(first.id, "eins", "one!", now).await.unwrap();

    let ids = |cards: Vec<Card>| cards.into_iter().map(|c| c.id).collect::<Vec<_>>();
    let oldest_first = store.list_cards(daily.id, CardOrder::OldestFirst).await.unwrap();
    assert_eq!(ids(oldest_first), vec![second.id, first.id]);
    let newest_first = store.list_cards(daily.id, CardOrder::NewestFirst).await.unwrap();
    assert_eq!(ids(newest_first), vec![first.id, second.id]);

    deck_service::delete_deck(&store, owner_id, deck.deck.id)
        .await
        .unwrap();
}
