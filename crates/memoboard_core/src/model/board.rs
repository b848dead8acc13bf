//! Board, member and reply domain model.
//!
//! # Responsibility
//! - Define row shapes for `boards`, `members` and `replies`.
//! - Define named join records that replace positional result tuples.
//!
//! # Invariants
//! - Every board has exactly one writer (`writer_id`).
//! - Member email is unique and must look like an address.
//! - Reply count is never stored; join records carry the computed value.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("valid email regex"));

pub type BoardId = i64;
pub type MemberId = i64;
pub type ReplyId = i64;

/// One row of the `members` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub email: String,
    pub name: Option<String>,
}

/// One row of the `boards` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    pub content: String,
    pub writer_id: MemberId,
    /// Epoch milliseconds.
    pub registered_at: i64,
    /// Epoch milliseconds.
    pub modified_at: i64,
}

/// One row of the `replies` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub id: ReplyId,
    pub board_id: BoardId,
    pub text: String,
    pub replyer: String,
    pub registered_at: i64,
}

/// Board joined with its writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardWithWriter {
    pub board: Board,
    pub writer: Member,
}

/// Board left-joined with one of its replies.
///
/// `reply` is `None` for the single row produced by a board without replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardWithReply {
    pub board: Board,
    pub reply: Option<Reply>,
}

/// Board joined with its writer and the number of replies it has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardWithReplyCount {
    pub board: Board,
    pub writer: Member,
    pub reply_count: u64,
}

/// Validation failures for board, member and reply writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardValidationError {
    MissingTitle,
    MissingContent,
    InvalidWriterEmail(String),
    MissingReplyText,
    MissingReplyer,
}

impl Display for BoardValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTitle => write!(f, "board title is required"),
            Self::MissingContent => write!(f, "board content is required"),
            Self::InvalidWriterEmail(value) => write!(f, "invalid writer email `{value}`"),
            Self::MissingReplyText => write!(f, "reply text is required"),
            Self::MissingReplyer => write!(f, "replyer is required"),
        }
    }
}

impl Error for BoardValidationError {}

/// Checks title/content of a new or modified board.
pub fn validate_board_fields(title: &str, content: &str) -> Result<(), BoardValidationError> {
    if title.trim().is_empty() {
        return Err(BoardValidationError::MissingTitle);
    }
    if content.trim().is_empty() {
        return Err(BoardValidationError::MissingContent);
    }
    Ok(())
}

/// Checks that `email` has a single `@` with non-blank parts on both sides.
pub fn validate_member_email(email: &str) -> Result<(), BoardValidationError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(BoardValidationError::InvalidWriterEmail(email.to_string()))
    }
}

pub fn validate_reply_fields(text: &str, replyer: &str) -> Result<(), BoardValidationError> {
    if text.trim().is_empty() {
        return Err(BoardValidationError::MissingReplyText);
    }
    if replyer.trim().is_empty() {
        return Err(BoardValidationError::MissingReplyer);
    }
    Ok(())
}
