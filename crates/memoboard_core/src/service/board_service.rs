//! Board use-case service.
//!
//! # Responsibility
//! - Register, read, list, modify and remove boards through `BoardDto`.
//! - Build page-navigation windows for list screens.
//!
//! # Invariants
//! - `register` validates the whole DTO before any row is written, then
//!   upserts the writer and inserts the board.
//! - `get`/`get_list` report reply counts computed at read time.

use crate::model::board::{
    validate_board_fields, validate_member_email, BoardId, BoardWithReplyCount,
};
use crate::model::page::{Page, PageRequest};
use crate::repo::board_repo::BoardRepository;
use crate::repo::RepoError;
use log::info;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Number of page links shown in one navigation window.
pub const PAGE_WINDOW: u32 = 10;

/// Flat transfer object for one board and its writer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardDto {
    /// `None` until the board has been registered.
    pub bno: Option<BoardId>,
    pub title: String,
    pub content: String,
    pub writer_email: String,
    pub writer_name: Option<String>,
    /// Epoch milliseconds.
    pub reg_date: Option<i64>,
    /// Epoch milliseconds.
    pub mod_date: Option<i64>,
    pub reply_count: u64,
}

impl From<BoardWithReplyCount> for BoardDto {
    fn from(value: BoardWithReplyCount) -> Self {
        Self {
            bno: Some(value.board.id),
            title: value.board.title,
            content: value.board.content,
            writer_email: value.writer.email,
            writer_name: value.writer.name,
            reg_date: Some(value.board.registered_at),
            mod_date: Some(value.board.modified_at),
            reply_count: value.reply_count,
        }
    }
}

/// One page of DTOs plus a 1-based navigation window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    pub dto_list: Vec<T>,
    pub total_page: u32,
    /// 1-based current page.
    pub page: u32,
    pub size: u32,
    /// First page number in the window (1-based).
    pub start: u32,
    /// Last page number in the window (1-based, inclusive).
    pub end: u32,
    /// Whether a window exists before `start`.
    pub prev: bool,
    /// Whether a window exists after `end`.
    pub next: bool,
    pub page_list: Vec<u32>,
}

impl<T> PageResult<T> {
    pub fn from_page(page: Page<T>) -> Self {
        let current = page.page_number.saturating_add(1);
        let window_end = current.div_ceil(PAGE_WINDOW).saturating_mul(PAGE_WINDOW);
        let start = window_end.saturating_sub(PAGE_WINDOW - 1);
        let end = window_end.min(page.total_pages);
        let page_list = if end >= start {
            (start..=end).collect()
        } else {
            Vec::new()
        };

        Self {
            dto_list: page.items,
            total_page: page.total_pages,
            page: current,
            size: page.page_size,
            start,
            end,
            prev: start > 1,
            next: page.total_pages > window_end,
            page_list,
        }
    }
}

/// Service error for board use-cases.
#[derive(Debug)]
pub enum BoardServiceError {
    BoardNotFound(BoardId),
    /// `modify` was called with a DTO that has no `bno`.
    MissingBoardId,
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for BoardServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BoardNotFound(bno) => write!(f, "board not found: {bno}"),
            Self::MissingBoardId => write!(f, "board id is required"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent board state: {details}"),
        }
    }
}

impl Error for BoardServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for BoardServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "board",
                id,
            } => Self::BoardNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Board service facade over a repository implementation.
pub struct BoardService<R: BoardRepository> {
    repo: R,
}

impl<R: BoardRepository> BoardService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a board and returns its generated id.
    ///
    /// `bno`, dates and `reply_count` on the input are ignored.
    pub fn register(&self, dto: &BoardDto) -> Result<BoardId, BoardServiceError> {
        validate_board_fields(&dto.title, &dto.content).map_err(RepoError::from)?;
        validate_member_email(&dto.writer_email).map_err(RepoError::from)?;

        let writer = self
            .repo
            .upsert_member(dto.writer_email.as_str(), dto.writer_name.as_deref())?;
        let board = self.repo.insert_board_with_writer(
            dto.title.as_str(),
            dto.content.as_str(),
            writer.email.as_str(),
        )?;
        info!(
            "event=board_register module=service status=ok board_id={} writer_id={}",
            board.id, writer.id
        );
        Ok(board.id)
    }

    pub fn get(&self, bno: BoardId) -> Result<BoardDto, BoardServiceError> {
        self.repo
            .get_board_by_id(bno)?
            .map(BoardDto::from)
            .ok_or(BoardServiceError::BoardNotFound(bno))
    }

    pub fn get_list(
        &self,
        request: &PageRequest,
    ) -> Result<PageResult<BoardDto>, BoardServiceError> {
        let page = self.repo.list_with_reply_count(request)?;
        Ok(PageResult::from_page(page.map(BoardDto::from)))
    }

    /// Replaces title and content of an existing board.
    pub fn modify(&self, dto: &BoardDto) -> Result<BoardDto, BoardServiceError> {
        let bno = dto.bno.ok_or(BoardServiceError::MissingBoardId)?;
        self.repo
            .update_board(bno, dto.title.as_str(), dto.content.as_str())?;
        self.repo
            .get_board_by_id(bno)?
            .map(BoardDto::from)
            .ok_or(BoardServiceError::InconsistentState(
                "modified board not found in read-back",
            ))
    }

    /// Removes a board and its replies. Returns the number of replies removed.
    pub fn remove_with_replies(&mut self, bno: BoardId) -> Result<usize, BoardServiceError> {
        let removed = self.repo.delete_board_with_replies(bno)?;
        Ok(removed)
    }
}
