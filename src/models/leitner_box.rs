use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// The review cadence of a box. The declaration order is the promotion ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "i16", try_from = "i16")]
pub enum BoxType {
    /// Reviewed every day.
    Daily,
    /// Reviewed every other day.
    EveryOtherDay,
    /// Reviewed once a week.
    Weekly,
}

impl BoxType {
    /// Every rung of the ladder, lowest first.
    pub const ALL: [BoxType; 3] = [BoxType::Daily, BoxType::EveryOtherDay, BoxType::Weekly];

    /// The stored representation (0, 1 or 2).
    pub fn as_i16(self) -> i16 {
        match self {
            BoxType::Daily => 0,
            BoxType::EveryOtherDay => 1,
            BoxType::Weekly => 2,
        }
    }

    /// The description given to a freshly created box of this type.
    pub fn description(self) -> &'static str {
        match self {
            BoxType::Daily => "Every day",
            BoxType::EveryOtherDay => "Every other day",
            BoxType::Weekly => "Once a week",
        }
    }

    /// Where a card lands after a correct answer. The weekly box is the ceiling.
    pub fn after_correct(self) -> BoxType {
        match self {
            BoxType::Daily => BoxType::EveryOtherDay,
            BoxType::EveryOtherDay | BoxType::Weekly => BoxType::Weekly,
        }
    }

    /// Where a card lands after a wrong answer: always back to the daily box.
    pub fn after_wrong(self) -> BoxType {
        BoxType::Daily
    }
}

impl From<BoxType> for i16 {
    fn from(box_type: BoxType) -> Self {
        box_type.as_i16()
    }
}

impl TryFrom<i16> for BoxType {
    type Error = AppError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(BoxType::Daily),
            1 => Ok(BoxType::EveryOtherDay),
            2 => Ok(BoxType::Weekly),
            other => Err(AppError::MissingData(format!("box_type {}", other))),
        }
    }
}

impl std::fmt::Display for BoxType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Represents one of the three boxes of a deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeitnerBox {
    /// The unique identifier for the box.
    pub id: Uuid,
    /// The deck the box belongs to.
    pub deck_id: Uuid,
    /// The description of the box.
    pub description: String,
    /// The review cadence, which is also the position on the ladder.
    pub box_type: BoxType,
    /// Whether a study session is currently going through this box.
    pub in_session: bool,
    /// When the last study session over this box was closed.
    pub last_used: Option<DateTime<Utc>>,
}

impl LeitnerBox {
    /// Creates an idle box of the given type for a deck.
    pub fn new(deck_id: Uuid, box_type: BoxType) -> Self {
        Self {
            id: Uuid::new_v4(),
            deck_id,
            description: box_type.description().to_string(),
            box_type,
            in_session: false,
            last_used: None,
        }
    }

    /// The full box set for a new deck, ordered by `box_type`.
    pub fn set_for(deck_id: Uuid) -> Vec<LeitnerBox> {
        BoxType::ALL
            .into_iter()
            .map(|box_type| LeitnerBox::new(deck_id, box_type))
            .collect()
    }
}

/// A box together with the number of cards it holds.
#[derive(Debug, Clone, Serialize)]
pub struct BoxSummary {
    #[serde(flatten)]
    pub leitner_box: LeitnerBox,
    pub card_count: i64,
}
