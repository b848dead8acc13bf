//! Repository layer: data-access facades over SQLite.
//!
//! # Responsibility
//! - Define the memo and board data-access contracts.
//! - Keep SQL text and row decoding inside the persistence boundary.
//!
//! # Invariants
//! - Write paths validate input before any SQL runs.
//! - Lookups return `Option`; `NotFound` is reserved for operations that
//!   require an existing row.
//! - Sort fields are resolved against a fixed column whitelist.

use crate::db::DbError;
use crate::model::board::BoardValidationError;
use crate::model::memo::MemoValidationError;
use crate::model::page::PageRequestError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod board_repo;
pub mod memo_repo;
mod paging;
mod schema;

pub type RepoResult<T> = Result<T, RepoError>;

/// Write-side validation failure, per entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Memo(MemoValidationError),
    Board(BoardValidationError),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memo(err) => write!(f, "{err}"),
            Self::Board(err) => write!(f, "{err}"),
        }
    }
}

/// Error shared by both repositories.
#[derive(Debug)]
pub enum RepoError {
    /// Input rejected before reaching storage.
    Validation(ValidationError),
    /// Underlying SQLite failure, propagated unchanged.
    Db(DbError),
    /// Operation required an existing row.
    NotFound { entity: &'static str, id: i64 },
    InvalidPageRequest(PageRequestError),
    /// Sort field is not one of the repository's sortable columns.
    UnsupportedSortField(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidPageRequest(err) => write!(f, "invalid page request: {err}"),
            Self::UnsupportedSortField(field) => write!(f, "unsupported sort field `{field}`"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(ValidationError::Memo(err)) => Some(err),
            Self::Validation(ValidationError::Board(err)) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidPageRequest(err) => Some(err),
            Self::NotFound { .. }
            | Self::UnsupportedSortField(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. }
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<MemoValidationError> for RepoError {
    fn from(value: MemoValidationError) -> Self {
        Self::Validation(ValidationError::Memo(value))
    }
}

impl From<BoardValidationError> for RepoError {
    fn from(value: BoardValidationError) -> Self {
        Self::Validation(ValidationError::Board(value))
    }
}

impl From<PageRequestError> for RepoError {
    fn from(value: PageRequestError) -> Self {
        Self::InvalidPageRequest(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
