use serde::{Deserialize, Serialize};

/// ユーザーがアイテムに付けた評価値 (1..=5)
pub type Rating = u8;

pub const MIN_RATING: Rating = 1;
pub const MAX_RATING: Rating = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub item_id: String,
    pub score: f64,
}

/// CSVの1行分
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingRecord {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "itemId")]
    pub item_id: String,
    pub rating: Rating,
}
