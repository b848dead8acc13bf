//! SQLite data-access layer for memos and boards.
//!
//! Two independent facades share one schema: `MemoRepository` over the
//! `memos` table and `BoardRepository` over `boards`/`members`/`replies`.
//! `BoardService` converts board join records into `BoardDto`.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::board::{
    Board, BoardId, BoardValidationError, BoardWithReply, BoardWithReplyCount, BoardWithWriter,
    Member, MemberId, Reply,
};
pub use model::memo::{Memo, MemoId, MemoSummary, MemoTextCount, MemoValidationError};
pub use model::page::{Direction, Page, PageRequest, PageRequestError, Sort};
pub use repo::board_repo::{BoardRepository, SqliteBoardRepository};
pub use repo::memo_repo::{MemoRepository, SqliteMemoRepository};
pub use repo::{RepoError, RepoResult, ValidationError};
pub use service::board_service::{BoardDto, BoardService, BoardServiceError, PageResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
