use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecError {
    // ユーザーが見つからない (唯一ユーザーに見せるエラー)
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("rating {rating} for user {user} / item {item} is outside 1..=5")]
    InvalidRating {
        user: String,
        item: String,
        rating: u8,
    },

    #[error("empty {field} in ratings data")]
    EmptyId { field: &'static str },

    #[error("user {user} rated item {item} more than once")]
    DuplicateRating { user: String, item: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
