//! Leitner-system flashcard study service.
//!
//! Decks own three boxes (daily, every other day, weekly). Correct answers move
//! a card one box up, wrong answers send it back to the daily box, and a study
//! session walks one box oldest card first until every card has been answered.

pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod state;

pub mod models {
    pub mod card;
    pub mod deck;
    pub mod leitner_box;
    pub mod owner;
    pub mod session;
}

pub mod repositories {
    pub mod card;
    pub mod deck;
    pub mod leitner_box;
    pub mod memory;
    pub mod postgres;
    pub mod session;
    pub mod store;
}

pub mod services {
    pub mod cards;
    pub mod decks;
    pub mod sessions;
}

pub mod handlers {
    pub mod cards;
    pub mod decks;
    pub mod extract;
    pub mod respond;
    pub mod sessions;
}

pub mod middleware_layer {
    pub mod owner;
}

pub mod validation {
    pub mod text;
}
