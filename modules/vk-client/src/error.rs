use thiserror::Error;

pub type Result<T> = std::result::Result<T, VkError>;

#[derive(Debug, Error)]
pub enum VkError {
    #[error("VK access token not configured")]
    MissingToken,

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error (status {status}): {message}")]
    Http { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("VK API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("Group not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for VkError {
    fn from(err: reqwest::Error) -> Self {
        VkError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for VkError {
    fn from(err: serde_json::Error) -> Self {
        VkError::Parse(err.to_string())
    }
}
