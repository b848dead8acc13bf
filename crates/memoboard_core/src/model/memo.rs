//! Memo domain model.
//!
//! # Invariants
//! - `text` is required: blank values never reach storage.
//! - `text` is at most `MEMO_TEXT_MAX_CHARS` characters.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Generated integer identifier of a memo row.
pub type MemoId = i64;

/// Upper bound on memo text length, in characters.
pub const MEMO_TEXT_MAX_CHARS: usize = 200;

/// One row of the `memos` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memo {
    pub id: MemoId,
    pub text: String,
}

impl Memo {
    /// Builds a memo with an explicit id, as used by replace-by-id updates.
    pub fn new(id: MemoId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }

    /// Validates write-side invariants.
    pub fn validate(&self) -> Result<(), MemoValidationError> {
        validate_memo_text(&self.text)
    }
}

impl Display for Memo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Memo(id={}, text={})", self.id, self.text)
    }
}

/// Projection used by the "greater than" summary listing.
///
/// Carries the date the query ran on, as reported by SQLite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoSummary {
    pub id: MemoId,
    pub text: String,
    /// `YYYY-MM-DD` in UTC.
    pub queried_on: String,
}

/// One group of the native text aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoTextCount {
    pub group_key: String,
    pub count: u64,
}

/// Validation failures for memo writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoValidationError {
    /// Text is absent or only whitespace.
    MissingText,
    /// Text exceeds the column limit.
    TextTooLong { max: usize, actual: usize },
}

impl Display for MemoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingText => write!(f, "memo text is required"),
            Self::TextTooLong { max, actual } => {
                write!(f, "memo text is {actual} characters, limit is {max}")
            }
        }
    }
}

impl Error for MemoValidationError {}

/// Checks memo text against the required/length rules.
pub fn validate_memo_text(text: &str) -> Result<(), MemoValidationError> {
    if text.trim().is_empty() {
        return Err(MemoValidationError::MissingText);
    }
    let actual = text.chars().count();
    if actual > MEMO_TEXT_MAX_CHARS {
        return Err(MemoValidationError::TextTooLong {
            max: MEMO_TEXT_MAX_CHARS,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_memo_text, Memo, MemoValidationError, MEMO_TEXT_MAX_CHARS};

    #[test]
    fn blank_text_is_rejected() {
        assert_eq!(
            validate_memo_text("   "),
            Err(MemoValidationError::MissingText)
        );
        assert_eq!(validate_memo_text(""), Err(MemoValidationError::MissingText));
    }

    #[test]
    fn length_limit_counts_characters_not_bytes() {
        let korean = "가".repeat(MEMO_TEXT_MAX_CHARS);
        assert!(validate_memo_text(&korean).is_ok());

        let too_long = "a".repeat(MEMO_TEXT_MAX_CHARS + 1);
        assert!(matches!(
            validate_memo_text(&too_long),
            Err(MemoValidationError::TextTooLong { actual, .. }) if actual == MEMO_TEXT_MAX_CHARS + 1
        ));
    }

    #[test]
    fn display_includes_id_and_text() {
        let memo = Memo::new(7, "Sample : 7");
        assert_eq!(memo.to_string(), "Memo(id=7, text=Sample : 7)");
    }
}
