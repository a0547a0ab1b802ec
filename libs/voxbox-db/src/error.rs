use sea_orm::DbErr;
use uuid::Uuid;

/// Library-local result type.
pub type Result<T> = std::result::Result<T, DbError>;

/// Coarse classification used by callers at the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Lookup miss; maps to 404.
    NotFound,
    /// Malformed input; maps to 400.
    Validation,
    /// Connectivity, constraint violation or aborted transaction; maps to 500.
    Storage,
    /// Missing or invalid startup configuration.
    Configuration,
}

/// Typed error for the persistence core.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: String, id: Uuid },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Storage(DbErr),
}

impl DbError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::NotFound { .. } => ErrorKind::NotFound,
            DbError::Validation(_) => ErrorKind::Validation,
            DbError::Configuration(_) => ErrorKind::Configuration,
            DbError::Storage(_) => ErrorKind::Storage,
        }
    }

    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        DbError::Validation(message.into())
    }

    #[must_use]
    pub fn not_found(entity: impl Into<String>, id: Uuid) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<DbErr> for DbError {
    fn from(err: DbErr) -> Self {
        DbError::Storage(err)
    }
}
