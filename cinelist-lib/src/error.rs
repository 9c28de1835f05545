use cinelist_db::OperationError;
use thiserror::Error;

/// Errors surfaced by the list store, movie catalog, and access resolver.
///
/// `Denied` deliberately carries no detail: a caller must not be able to tell
/// a wrong credential apart from a list that does not exist.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Identifier, entry, user, or movie does not resolve
    #[error("Not found: {0}")]
    NotFound(String),

    /// Permission check failed
    #[error("Access denied")]
    Denied,

    /// Uniqueness violation that could not be mapped onto an existing row
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A reorder would leave two entries of one list on the same rank
    #[error("Reorder rejected: more than one entry would have rank {rank}")]
    DuplicateRank { rank: i64 },

    /// Caller-supplied value is unusable (empty name, empty title, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Freshly generated list identifiers kept colliding
    #[error("Could not allocate unique list identifiers after {0} attempts")]
    IdentifierExhausted(u32),

    /// Concurrent additions kept taking the computed rank
    #[error("Rank assignment still colliding after {0} attempts")]
    RankContention(u32),

    /// Database failure
    #[error("Database error: {0}")]
    Db(OperationError),
}

impl StoreError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<OperationError> for StoreError {
    fn from(e: OperationError) -> Self {
        match e {
            OperationError::NotFound { entity_type, id } => {
                Self::NotFound(format!("{entity_type} {id}"))
            }
            OperationError::Conflict { detail, .. } => Self::Conflict(detail),
            OperationError::RankTaken { rank, .. } => Self::DuplicateRank { rank },
            OperationError::Invalid(msg) => Self::InvalidInput(msg),
            other => Self::Db(other),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        OperationError::from(e).into()
    }
}
