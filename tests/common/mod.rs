#![allow(dead_code)]

use leitner::{
    models::{
        card::{Card, NewCard},
        deck::{DeckDetail, DeckInput},
        leitner_box::{BoxType, LeitnerBox},
    },
    repositories::memory::MemoryStore,
    services::{cards as card_service, decks as deck_service},
};
use uuid::Uuid;

// Shared test context
pub struct TestContext {
    pub store: MemoryStore,
    pub owner_id: Uuid,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
            owner_id: Uuid::new_v4(),
        }
    }

    pub async fn deck(&self, description: &str) -> DeckDetail {
        deck_service::create_deck(
            &self.store,
            self.owner_id,
            DeckInput {
                description: description.to_string(),
            },
        )
        .await
        .unwrap()
    }

    pub async fn card(&self, deck: &DeckDetail, box_type: BoxType, front: &str) -> Card {
        card_service::add_card(
            &self.store,
            self.owner_id,
            deck.deck.id,
            NewCard {
                front_text: front.to_string(),
                back_text: format!("back of {}", front),
                box_id: Some(box_of(deck, box_type).id),
            },
        )
        .await
        .unwrap()
    }
}

pub fn box_of(deck: &DeckDetail, box_type: BoxType) -> LeitnerBox {
    deck.boxes
        .iter()
        .map(|summary| &summary.leitner_box)
        .find(|b| b.box_type == box_type)
        .cloned()
        .expect("every deck has three boxes")
}
