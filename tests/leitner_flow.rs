use leitner::{
    error::AppError,
    models::{
        card::{CardEdit, CardOrder, NewCard},
        deck::DeckInput,
        leitner_box::BoxType,
        session::{Answer, SessionStatus},
    },
    repositories::store::LeitnerStore,
    services::{cards as card_service, decks as deck_service, sessions as session_service},
};
use uuid::Uuid;

mod common;

use common::{box_of, TestContext};

#[tokio::test]
async fn new_deck_gets_three_idle_boxes() {
    let ctx = TestContext::new();
    let deck = ctx.deck("Deutsch").await;

    let detail = deck_service::get_deck(&ctx.store, ctx.owner_id, deck.deck.id)
        .await
        .unwrap();
    let types: Vec<BoxType> = detail.boxes.iter().map(|b| b.leitner_box.box_type).collect();
    assert_eq!(types, vec![BoxType::Daily, BoxType::EveryOtherDay, BoxType::Weekly]);
    for summary in &detail.boxes {
        assert!(!summary.leitner_box.in_session);
        assert!(summary.leitner_box.last_used.is_none());
        assert_eq!(summary.card_count, 0);
    }
    assert!(detail.session.is_none());
}

#[tokio::test]
async fn blank_deck_description_is_rejected() {
    let ctx = TestContext::new();
    let err = deck_service::create_deck(
        &ctx.store,
        ctx.owner_id,
        DeckInput {
            description: "   ".to_string(),
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert!(deck_service::list_decks(&ctx.store, ctx.owner_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn cards_default_to_the_daily_box() {
    let ctx = TestContext::new();
    let deck = ctx.deck("Deutsch").await;

    let card = card_service::add_card(
        &ctx.store,
        ctx.owner_id,
        deck.deck.id,
        NewCard {
            front_text: "der Hund".to_string(),
            back_text: "the dog".to_string(),
            box_id: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(card.box_type, BoxType::Daily);
    assert_eq!(card.box_id, box_of(&deck, BoxType::Daily).id);
}

#[tokio::test]
async fn correct_answers_climb_to_the_weekly_box_and_stay() {
    let ctx = TestContext::new();
    let deck = ctx.deck("Deutsch").await;
    let card = ctx.card(&deck, BoxType::Daily, "der Hund").await;
    ctx.card(&deck, BoxType::Daily, "die Katze").await;

    session_service::start_session(&ctx.store, ctx.owner_id, deck.deck.id, box_of(&deck, BoxType::Daily).id)
        .await
        .unwrap();

    let mut seen = Vec::new();
    for _ in 0..3 {
        let moved = card_service::correct_answer(&ctx.store, ctx.owner_id, deck.deck.id, card.id)
            .await
            .unwrap();
        assert!(moved.box_type <= BoxType::Weekly);
        seen.push(moved.box_type);
    }
    assert_eq!(seen, vec![BoxType::EveryOtherDay, BoxType::Weekly, BoxType::Weekly]);

    let stored = card_service::get_card(&ctx.store, ctx.owner_id, deck.deck.id, card.id)
        .await
        .unwrap();
    assert_eq!(stored.box_id, box_of(&deck, BoxType::Weekly).id);

    // Answering the same card repeatedly logs it once.
    let session = ctx.store.find_session(deck.deck.id).await.unwrap().unwrap();
    assert_eq!(ctx.store.count_finished_cards(session.id).await.unwrap(), 1);
}

#[tokio::test]
async fn wrong_answer_always_resets_to_daily() {
    let ctx = TestContext::new();
    let deck = ctx.deck("Deutsch").await;
    let weekly = ctx.card(&deck, BoxType::Weekly, "das Haus").await;

    session_service::start_session(&ctx.store, ctx.owner_id, deck.deck.id, box_of(&deck, BoxType::Weekly).id)
        .await
        .unwrap();

    let moved = card_service::wrong_answer(&ctx.store, ctx.owner_id, deck.deck.id, weekly.id)
        .await
        .unwrap();
    assert_eq!(moved.box_type, BoxType::Daily);
    assert_eq!(moved.box_id, box_of(&deck, BoxType::Daily).id);
}

#[tokio::test]
async fn answering_without_a_session_is_rejected() {
    let ctx = TestContext::new();
    let deck = ctx.deck("Deutsch").await;
    let card = ctx.card(&deck, BoxType::Daily, "der Hund").await;

    let err = card_service::correct_answer(&ctx.store, ctx.owner_id, deck.deck.id, card.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));

    let err = session_service::answer(&ctx.store, ctx.owner_id, deck.deck.id, Answer::Correct)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));

    let stored = card_service::get_card(&ctx.store, ctx.owner_id, deck.deck.id, card.id)
        .await
        .unwrap();
    assert_eq!(stored, card);
}

#[tokio::test]
async fn only_one_session_per_deck() {
    let ctx = TestContext::new();
    let deck = ctx.deck("Deutsch").await;
    ctx.card(&deck, BoxType::Daily, "der Hund").await;
    ctx.card(&deck, BoxType::Weekly, "das Haus").await;

    let first = session_service::start_session(&ctx.store, ctx.owner_id, deck.deck.id, box_of(&deck, BoxType::Daily).id)
        .await
        .unwrap();
    let err = session_service::start_session(&ctx.store, ctx.owner_id, deck.deck.id, box_of(&deck, BoxType::Weekly).id)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidTransition(_)));
    let session = ctx.store.find_session(deck.deck.id).await.unwrap().unwrap();
    assert_eq!(session.id, first.id);
    let weekly = ctx.store.find_box(box_of(&deck, BoxType::Weekly).id).await.unwrap().unwrap();
    assert!(!weekly.in_session);
}

#[tokio::test]
async fn empty_box_cannot_be_studied() {
    let ctx = TestContext::new();
    let deck = ctx.deck("Deutsch").await;
    ctx.card(&deck, BoxType::Daily, "der Hund").await;

    let err = session_service::start_session(
        &ctx.store,
        ctx.owner_id,
        deck.deck.id,
        box_of(&deck, BoxType::EveryOtherDay).id,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::EmptySelection(_)));
    assert!(ctx.store.find_session(deck.deck.id).await.unwrap().is_none());
    let status = session_service::session_status(&ctx.store, ctx.owner_id, deck.deck.id)
        .await
        .unwrap();
    assert_eq!(status, SessionStatus::Inert);
    let idle = ctx
        .store
        .find_box(box_of(&deck, BoxType::EveryOtherDay).id)
        .await
        .unwrap()
        .unwrap();
    assert!(!idle.in_session);
}

#[tokio::test]
async fn session_finishes_after_every_card_is_answered() {
    let ctx = TestContext::new();
    let deck = ctx.deck("Deutsch").await;
    let daily = box_of(&deck, BoxType::Daily);
    let mut fronts = Vec::new();
    for front in ["eins", "zwei", "drei", "vier"] {
        ctx.card(&deck, BoxType::Daily, front).await;
        fronts.push(front.to_string());
    }

    let session = session_service::start_session(&ctx.store, ctx.owner_id, deck.deck.id, daily.id)
        .await
        .unwrap();
    assert_eq!(session.total_cards_on_box, 4);
    assert!(ctx.store.find_box(daily.id).await.unwrap().unwrap().in_session);

    // Alternate answers; wrong answers keep cards in the daily box without repeating them.
    let answers = [Answer::Correct, Answer::Incorrect, Answer::Incorrect, Answer::Correct];
    let mut shown = Vec::new();
    for (index, answer) in answers.into_iter().enumerate() {
        let current = session_service::current_card(&ctx.store, ctx.owner_id, deck.deck.id)
            .await
            .unwrap()
            .expect("a card is pending");
        shown.push(current.front_text.clone());

        let outcome = session_service::answer(&ctx.store, ctx.owner_id, deck.deck.id, answer)
            .await
            .unwrap();
        assert_eq!(outcome.answered.id, current.id);
        assert_eq!(outcome.status.is_finished(), index == answers.len() - 1);
    }
    assert_eq!(shown, fronts);

    assert!(session_service::current_card(&ctx.store, ctx.owner_id, deck.deck.id)
        .await
        .unwrap()
        .is_none());
    match session_service::session_status(&ctx.store, ctx.owner_id, deck.deck.id)
        .await
        .unwrap()
    {
        SessionStatus::Finished { session, progress } => {
            assert!(session.is_finished);
            assert_eq!(progress.reviewed, 4);
            assert_eq!(progress.total, 4);
        }
        other => panic!("expected a finished session, got {:?}", other),
    }

    let err = session_service::answer(&ctx.store, ctx.owner_id, deck.deck.id, Answer::Correct)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));

    let counts: Vec<i64> = deck_service::get_deck(&ctx.store, ctx.owner_id, deck.deck.id)
        .await
        .unwrap()
        .boxes
        .iter()
        .map(|b| b.card_count)
        .collect();
    assert_eq!(counts, vec![2, 2, 0]);
}

#[tokio::test]
async fn closing_releases_the_box() {
    let ctx = TestContext::new();
    let deck = ctx.deck("D").await;
    let card = ctx.card(&deck, BoxType::Daily, "C").await;
    let daily = box_of(&deck, BoxType::Daily);

    let session = session_service::start_session(&ctx.store, ctx.owner_id, deck.deck.id, daily.id)
        .await
        .unwrap();
    assert_eq!(session.total_cards_on_box, 1);
    assert_eq!(
        session_service::current_card(&ctx.store, ctx.owner_id, deck.deck.id)
            .await
            .unwrap()
            .map(|c| c.id),
        Some(card.id)
    );

    let err = session_service::finish_and_close(&ctx.store, ctx.owner_id, deck.deck.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));

    let outcome = session_service::answer(&ctx.store, ctx.owner_id, deck.deck.id, Answer::Correct)
        .await
        .unwrap();
    assert_eq!(outcome.answered.box_type, BoxType::EveryOtherDay);
    assert!(outcome.status.current_card().is_none());
    assert!(outcome.status.is_finished());
    assert!(ctx.store.find_session(deck.deck.id).await.unwrap().unwrap().is_finished);

    let released = session_service::finish_and_close(&ctx.store, ctx.owner_id, deck.deck.id)
        .await
        .unwrap();
    assert_eq!(released.id, daily.id);
    assert!(!released.in_session);
    assert!(released.last_used.is_some());
    assert!(ctx.store.find_session(deck.deck.id).await.unwrap().is_none());

    let err = session_service::finish_and_close(&ctx.store, ctx.owner_id, deck.deck.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));
}

#[tokio::test]
async fn cards_added_mid_session_join_the_queue() {
    let ctx = TestContext::new();
    let deck = ctx.deck("Deutsch").await;
    ctx.card(&deck, BoxType::Daily, "eins").await;
    let daily = box_of(&deck, BoxType::Daily);

    session_service::start_session(&ctx.store, ctx.owner_id, deck.deck.id, daily.id)
        .await
        .unwrap();
    ctx.card(&deck, BoxType::Daily, "zwei").await;

    let outcome = session_service::answer(&ctx.store, ctx.owner_id, deck.deck.id, Answer::Correct)
        .await
        .unwrap();
    match outcome.status {
        SessionStatus::Active { current_card, progress, .. } => {
            assert_eq!(current_card.front_text, "zwei");
            assert_eq!(progress.reviewed, 1);
            assert_eq!(progress.total, 1);
        }
        other => panic!("expected an active session, got {:?}", other),
    }
}

#[tokio::test]
async fn edited_cards_move_to_the_back_of_their_box() {
    let ctx = TestContext::new();
    let deck = ctx.deck("Deutsch").await;
    let first = ctx.card(&deck, BoxType::Daily, "eins").await;
    let second = ctx.card(&deck, BoxType::Daily, "zwei").await;

    card_service::edit_card(
        &ctx.store,
        ctx.owner_id,
        deck.deck.id,
        first.id,
        CardEdit {
            front_text: "eins!".to_string(),
            back_text: "one".to_string(),
        },
    )
    .await
    .unwrap();

    let daily = box_of(&deck, BoxType::Daily);
    let oldest_first: Vec<Uuid> = card_service::list_cards(&ctx.store, ctx.owner_id, deck.deck.id, daily.id, CardOrder::OldestFirst)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(oldest_first, vec![second.id, first.id]);

    let newest_first: Vec<Uuid> = card_service::list_cards(&ctx.store, ctx.owner_id, deck.deck.id, daily.id, CardOrder::NewestFirst)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(newest_first, vec![first.id, second.id]);
}

#[tokio::test]
async fn unchanged_edit_keeps_the_card_in_place() {
    let ctx = TestContext::new();
    let deck = ctx.deck("Deutsch").await;
    let first = ctx.card(&deck, BoxType::Daily, "eins").await;
    let second = ctx.card(&deck, BoxType::Daily, "zwei").await;

    let edited = card_service::edit_card(
        &ctx.store,
        ctx.owner_id,
        deck.deck.id,
        first.id,
        CardEdit {
            front_text: first.front_text.clone(),
            back_text: first.back_text.clone(),
        },
    )
    .await
    .unwrap();
    assert_eq!(edited, first);

    let daily = box_of(&deck, BoxType::Daily);
    let order: Vec<Uuid> = card_service::list_cards(&ctx.store, ctx.owner_id, deck.deck.id, daily.id, CardOrder::OldestFirst)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(order, vec![first.id, second.id]);

    session_service::start_session(&ctx.store, ctx.owner_id, deck.deck.id, daily.id)
        .await
        .unwrap();
    let current = session_service::current_card(&ctx.store, ctx.owner_id, deck.deck.id)
        .await
        .unwrap()
        .map(|c| c.id);
    assert_eq!(current, Some(first.id));
}

#[tokio::test]
async fn cards_only_move_within_their_deck() {
    let ctx = TestContext::new();
    let deck = ctx.deck("Deutsch").await;
    let other = ctx.deck("Français").await;
    let card = ctx.card(&deck, BoxType::Daily, "der Hund").await;

    let err = card_service::move_card(
        &ctx.store,
        ctx.owner_id,
        deck.deck.id,
        card.id,
        box_of(&other, BoxType::Weekly).id,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::ConstraintViolation(_)));
    let unchanged = card_service::get_card(&ctx.store, ctx.owner_id, deck.deck.id, card.id)
        .await
        .unwrap();
    assert_eq!(unchanged, card);

    let moved = card_service::move_card(
        &ctx.store,
        ctx.owner_id,
        deck.deck.id,
        card.id,
        box_of(&deck, BoxType::Weekly).id,
    )
    .await
    .unwrap();
    assert_eq!(moved.box_type, BoxType::Weekly);
}

#[tokio::test]
async fn decks_of_other_owners_are_not_found() {
    let ctx = TestContext::new();
    let deck = ctx.deck("Deutsch").await;
    ctx.card(&deck, BoxType::Daily, "der Hund").await;
    let stranger = Uuid::new_v4();

    let err = deck_service::get_deck(&ctx.store, stranger, deck.deck.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let err = session_service::start_session(&ctx.store, stranger, deck.deck.id, box_of(&deck, BoxType::Daily).id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let err = deck_service::delete_deck(&ctx.store, stranger, deck.deck.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    assert!(deck_service::get_deck(&ctx.store, ctx.owner_id, deck.deck.id).await.is_ok());
}

#[tokio::test]
async fn deleting_a_deck_removes_its_cards_and_session() {
    let ctx = TestContext::new();
    let deck = ctx.deck("Deutsch").await;
    let card = ctx.card(&deck, BoxType::Daily, "der Hund").await;
    session_service::start_session(&ctx.store, ctx.owner_id, deck.deck.id, box_of(&deck, BoxType::Daily).id)
        .await
        .unwrap();

    deck_service::delete_deck(&ctx.store, ctx.owner_id, deck.deck.id)
        .await
        .unwrap();

    assert!(ctx.store.find_session(deck.deck.id).await.unwrap().is_none());
    assert!(ctx.store.find_card(deck.deck.id, card.id).await.unwrap().is_none());
    assert!(ctx.store.list_boxes(deck.deck.id).await.unwrap().is_empty());
}
