//! Board/member repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist boards together with their writer (create-or-reuse by email).
//! - Serve the join reads: board+writer, board+replies, board+reply count.
//!
//! # Invariants
//! - Every board row references exactly one member.
//! - Reply counts are computed by `COUNT(replies.id)`, never stored.
//! - Join results are named records; no positional tuples leave this module.
//! - `delete_board_with_replies` removes replies and board in one transaction.

use super::paging::{count_from_sql, order_by_clause, push_page_window};
use super::schema::{ensure_connection_ready, RequiredTable};
use super::{RepoError, RepoResult};
use crate::model::board::{
    validate_board_fields, validate_member_email, validate_reply_fields, Board, BoardId,
    BoardWithReply, BoardWithReplyCount, BoardWithWriter, Member, MemberId, Reply,
};
use crate::model::page::{Page, PageRequest};
use log::info;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, TransactionBehavior};

const BOARD_COLUMNS_SQL: &str = "b.id AS board_id,
    b.title AS title,
    b.content AS content,
    b.writer_id AS writer_id,
    b.registered_at AS registered_at,
    b.modified_at AS modified_at";

const MEMBER_COLUMNS_SQL: &str = "m.id AS member_id,
    m.email AS member_email,
    m.name AS member_name";

const REPLY_COLUMNS_SQL: &str = "r.id AS reply_id,
    r.text AS reply_text,
    r.replyer AS replyer,
    r.registered_at AS reply_registered_at";

const BOARD_TABLES: &[RequiredTable] = &[
    ("members", &["id", "email", "name"]),
    (
        "boards",
        &[
            "id",
            "title",
            "content",
            "writer_id",
            "registered_at",
            "modified_at",
        ],
    ),
    (
        "replies",
        &["id", "board_id", "text", "replyer", "registered_at"],
    ),
];

/// Data-access facade for boards, their writers and reply counts.
pub trait BoardRepository {
    /// Creates the member for `email`, or reuses it. A `Some` name replaces
    /// the stored one.
    fn upsert_member(&self, email: &str, name: Option<&str>) -> RepoResult<Member>;
    fn find_member_by_email(&self, email: &str) -> RepoResult<Option<Member>>;
    /// Inserts a board written by the member owning `writer_email`.
    fn insert_board_with_writer(
        &self,
        title: &str,
        content: &str,
        writer_email: &str,
    ) -> RepoResult<Board>;
    fn insert_reply(&self, board_id: BoardId, text: &str, replyer: &str) -> RepoResult<Reply>;
    fn find_by_id(&self, id: BoardId) -> RepoResult<Option<Board>>;
    /// Loads the board, then resolves its writer.
    fn find_by_id_with_writer(&self, id: BoardId) -> RepoResult<Option<BoardWithWriter>>;
    /// Board and writer from a single join query.
    fn get_board_with_writer(&self, id: BoardId) -> RepoResult<Option<BoardWithWriter>>;
    /// One row per reply; one row with `reply: None` when there are none.
    fn get_board_with_replies(&self, id: BoardId) -> RepoResult<Vec<BoardWithReply>>;
    fn list_with_reply_count(
        &self,
        request: &PageRequest,
    ) -> RepoResult<Page<BoardWithReplyCount>>;
    fn get_board_by_id(&self, id: BoardId) -> RepoResult<Option<BoardWithReplyCount>>;
    /// Replaces title/content and bumps `modified_at`.
    fn update_board(&self, id: BoardId, title: &str, content: &str) -> RepoResult<Board>;
    /// Deletes replies and then the board. Returns the number of replies removed.
    fn delete_board_with_replies(&mut self, id: BoardId) -> RepoResult<usize>;
}

/// SQLite-backed board repository.
pub struct SqliteBoardRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteBoardRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, BOARD_TABLES)?;
        Ok(Self { conn })
    }

    fn find_member_by_id(&self, id: MemberId) -> RepoResult<Option<Member>> {
        let member = self
            .conn
            .query_row(
                &format!("SELECT {MEMBER_COLUMNS_SQL} FROM members m WHERE m.id = ?1;"),
                [id],
                parse_member_columns,
            )
            .optional()?;
        Ok(member)
    }

    fn load_required_board(&self, id: BoardId) -> RepoResult<Board> {
        self.find_by_id(id)?
            .ok_or(RepoError::NotFound { entity: "board", id })
    }

    fn query_reply_counts(
        &self,
        sql: &str,
        bind_values: Vec<Value>,
    ) -> RepoResult<Vec<BoardWithReplyCount>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(BoardWithReplyCount {
                board: parse_board_columns(row)?,
                writer: parse_member_columns(row)?,
                reply_count: count_from_sql(row.get("reply_count")?, "replies")?,
            });
        }
        Ok(items)
    }
}

impl BoardRepository for SqliteBoardRepository<'_> {
    fn upsert_member(&self, email: &str, name: Option<&str>) -> RepoResult<Member> {
        validate_member_email(email)?;
        self.conn.execute(
            "INSERT INTO members (email, name) VALUES (?1, ?2)
             ON CONFLICT(email) DO UPDATE SET name = COALESCE(excluded.name, members.name);",
            params![email, name],
        )?;
        self.find_member_by_email(email)?.ok_or_else(|| {
            RepoError::InvalidData(format!("member `{email}` missing after upsert"))
        })
    }

    fn find_member_by_email(&self, email: &str) -> RepoResult<Option<Member>> {
        let member = self
            .conn
            .query_row(
                &format!("SELECT {MEMBER_COLUMNS_SQL} FROM members m WHERE m.email = ?1;"),
                [email],
                parse_member_columns,
            )
            .optional()?;
        Ok(member)
    }

    fn insert_board_with_writer(
        &self,
        title: &str,
        content: &str,
        writer_email: &str,
    ) -> RepoResult<Board> {
        validate_board_fields(title, content)?;
        let writer = self.upsert_member(writer_email, None)?;

        self.conn.execute(
            "INSERT INTO boards (title, content, writer_id) VALUES (?1, ?2, ?3);",
            params![title, content, writer.id],
        )?;
        self.load_required_board(self.conn.last_insert_rowid())
    }

    fn insert_reply(&self, board_id: BoardId, text: &str, replyer: &str) -> RepoResult<Reply> {
        validate_reply_fields(text, replyer)?;
        self.load_required_board(board_id)?;

        self.conn.execute(
            "INSERT INTO replies (board_id, text, replyer) VALUES (?1, ?2, ?3);",
            params![board_id, text, replyer],
        )?;
        let reply_id = self.conn.last_insert_rowid();
        let reply = self.conn.query_row(
            &format!("SELECT {REPLY_COLUMNS_SQL}, r.board_id AS board_id FROM replies r WHERE r.id = ?1;"),
            [reply_id],
            |row| {
                Ok(Reply {
                    id: row.get("reply_id")?,
                    board_id: row.get("board_id")?,
                    text: row.get("reply_text")?,
                    replyer: row.get("replyer")?,
                    registered_at: row.get("reply_registered_at")?,
                })
            },
        )?;
        Ok(reply)
    }

    fn find_by_id(&self, id: BoardId) -> RepoResult<Option<Board>> {
        let board = self
            .conn
            .query_row(
                &format!("SELECT {BOARD_COLUMNS_SQL} FROM boards b WHERE b.id = ?1;"),
                [id],
                parse_board_columns,
            )
            .optional()?;
        Ok(board)
    }

    fn find_by_id_with_writer(&self, id: BoardId) -> RepoResult<Option<BoardWithWriter>> {
        let Some(board) = self.find_by_id(id)? else {
            return Ok(None);
        };
        let writer = self.find_member_by_id(board.writer_id)?.ok_or_else(|| {
            RepoError::InvalidData(format!(
                "board {} references missing member {}",
                board.id, board.writer_id
            ))
        })?;
        Ok(Some(BoardWithWriter { board, writer }))
    }

    fn get_board_with_writer(&self, id: BoardId) -> RepoResult<Option<BoardWithWriter>> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {BOARD_COLUMNS_SQL}, {MEMBER_COLUMNS_SQL}
                     FROM boards b
                     INNER JOIN members m ON m.id = b.writer_id
                     WHERE b.id = ?1;"
                ),
                [id],
                |row| {
                    Ok(BoardWithWriter {
                        board: parse_board_columns(row)?,
                        writer: parse_member_columns(row)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    fn get_board_with_replies(&self, id: BoardId) -> RepoResult<Vec<BoardWithReply>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BOARD_COLUMNS_SQL}, {REPLY_COLUMNS_SQL}
             FROM boards b
             LEFT JOIN replies r ON r.board_id = b.id
             WHERE b.id = ?1
             ORDER BY r.id ASC;"
        ))?;
        let mut rows = stmt.query([id])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            let board = parse_board_columns(row)?;
            let reply = match row.get::<_, Option<i64>>("reply_id")? {
                Some(reply_id) => Some(Reply {
                    id: reply_id,
                    board_id: board.id,
                    text: row.get("reply_text")?,
                    replyer: row.get("replyer")?,
                    registered_at: row.get("reply_registered_at")?,
                }),
                None => None,
            };
            items.push(BoardWithReply { board, reply });
        }
        Ok(items)
    }

    fn list_with_reply_count(
        &self,
        request: &PageRequest,
    ) -> RepoResult<Page<BoardWithReplyCount>> {
        request.validate()?;
        let order_by = order_by_clause(request.sort.as_ref(), board_sort_column, "b.id")?;
        let total: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM boards;", [], |row| row.get(0))?;

        let mut sql = format!(
            "SELECT {BOARD_COLUMNS_SQL}, {MEMBER_COLUMNS_SQL}, COUNT(r.id) AS reply_count
             FROM boards b
             INNER JOIN members m ON m.id = b.writer_id
             LEFT JOIN replies r ON r.board_id = b.id
             GROUP BY b.id{order_by}"
        );
        let mut bind_values = Vec::new();
        push_page_window(&mut sql, &mut bind_values, request);
        let items = self.query_reply_counts(&sql, bind_values)?;
        Ok(Page::new(items, request, count_from_sql(total, "boards")?))
    }

    fn get_board_by_id(&self, id: BoardId) -> RepoResult<Option<BoardWithReplyCount>> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {BOARD_COLUMNS_SQL}, {MEMBER_COLUMNS_SQL}, COUNT(r.id) AS reply_count
                     FROM boards b
                     INNER JOIN members m ON m.id = b.writer_id
                     LEFT JOIN replies r ON r.board_id = b.id
                     WHERE b.id = ?1
                     GROUP BY b.id;"
                ),
                [id],
                |row| {
                    Ok((
                        parse_board_columns(row)?,
                        parse_member_columns(row)?,
                        row.get::<_, i64>("reply_count")?,
                    ))
                },
            )
            .optional()?;

        row.map(|(board, writer, reply_count)| {
            Ok(BoardWithReplyCount {
                board,
                writer,
                reply_count: count_from_sql(reply_count, "replies")?,
            })
        })
        .transpose()
    }

    fn update_board(&self, id: BoardId, title: &str, content: &str) -> RepoResult<Board> {
        validate_board_fields(title, content)?;
        let changed = self.conn.execute(
            "UPDATE boards
             SET
                title = ?2,
                content = ?3,
                modified_at = (CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER))
             WHERE id = ?1;",
            params![id, title, content],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "board", id });
        }
        self.load_required_board(id)
    }

    fn delete_board_with_replies(&mut self, id: BoardId) -> RepoResult<usize> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let replies_removed = tx.execute("DELETE FROM replies WHERE board_id = ?1;", [id])?;
        let boards_removed = tx.execute("DELETE FROM boards WHERE id = ?1;", [id])?;
        if boards_removed == 0 {
            // Dropping `tx` rolls the reply delete back.
            return Err(RepoError::NotFound { entity: "board", id });
        }
        tx.commit()?;

        info!(
            "event=board_delete module=repo status=ok board_id={id} replies_removed={replies_removed}"
        );
        Ok(replies_removed)
    }
}

/// Maps a public sort field to its aliased `boards` column.
fn board_sort_column(field: &str) -> Option<&'static str> {
    match field {
        "id" | "bno" => Some("b.id"),
        "title" => Some("b.title"),
        "registered_at" | "regDate" => Some("b.registered_at"),
        "modified_at" | "modDate" => Some("b.modified_at"),
        "reply_count" | "replyCount" => Some("reply_count"),
        _ => None,
    }
}

fn parse_board_columns(row: &Row<'_>) -> rusqlite::Result<Board> {
    Ok(Board {
        id: row.get("board_id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        writer_id: row.get("writer_id")?,
        registered_at: row.get("registered_at")?,
        modified_at: row.get("modified_at")?,
    })
}

fn parse_member_columns(row: &Row<'_>) -> rusqlite::Result<Member> {
    Ok(Member {
        id: row.get("member_id")?,
        email: row.get("member_email")?,
        name: row.get("member_name")?,
    })
}
