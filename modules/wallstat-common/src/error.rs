use thiserror::Error;

pub type Result<T> = std::result::Result<T, WallstatError>;

#[derive(Error, Debug)]
pub enum WallstatError {
    #[error("invalid group link: {0}")]
    InvalidLink(String),

    #[error("invalid screen name format: {0}")]
    InvalidScreenName(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("reconciliation failed: {0}")]
    Reconciliation(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl WallstatError {
    /// Errors a caller should answer with a 400-equivalent: bad input or a
    /// failed upstream lookup. Everything else is a server-side failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            WallstatError::InvalidLink(_)
                | WallstatError::InvalidScreenName(_)
                | WallstatError::Upstream(_)
        )
    }
}
