use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("empty chat message")]
    EmptyMessage,
}
