use wallstat_common::{GroupId, WallstatError};

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Group {0} does not exist")]
    UnknownGroup(GroupId),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for WallstatError {
    fn from(err: StoreError) -> Self {
        WallstatError::Storage(err.to_string())
    }
}
