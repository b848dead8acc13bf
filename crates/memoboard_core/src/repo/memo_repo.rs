//! Memo repository contract and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over the `memos` table.
//! - Paged, sorted and id-range listings.
//! - Parameter-bound text updates and the grouped text aggregate.
//!
//! # Invariants
//! - Memo text is validated before every write.
//! - Id ranges are inclusive on both ends.
//! - `delete_where_id_less_than` runs in one transaction that is committed
//!   before the call returns, or rolled back on error.

use super::paging::{count_from_sql, order_by_clause, push_page_window};
use super::schema::{ensure_connection_ready, RequiredTable};
use super::{RepoError, RepoResult};
use crate::model::memo::{validate_memo_text, Memo, MemoId, MemoSummary, MemoTextCount};
use crate::model::page::{Direction, Page, PageRequest};
use log::{error, info};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, TransactionBehavior};

const MEMO_SELECT_SQL: &str = "SELECT id, text FROM memos";

const MEMO_TABLES: &[RequiredTable] = &[("memos", &["id", "text"])];

/// Data-access facade for memos.
pub trait MemoRepository {
    /// Inserts a memo and returns it with its generated id.
    fn insert(&self, text: &str) -> RepoResult<Memo>;
    fn find_by_id(&self, id: MemoId) -> RepoResult<Option<Memo>>;
    /// Like `find_by_id`, but a missing row is `NotFound`.
    fn get_memo(&self, id: MemoId) -> RepoResult<Memo>;
    /// Replaces the row with `memo.id`, inserting it when absent.
    fn update(&self, memo: &Memo) -> RepoResult<Memo>;
    /// Deletes by id. Missing ids are not an error.
    fn delete_by_id(&self, id: MemoId) -> RepoResult<()>;
    /// Deletes every memo with `id < threshold` and returns the count.
    fn delete_where_id_less_than(&mut self, threshold: MemoId) -> RepoResult<usize>;
    fn list_page(&self, request: &PageRequest) -> RepoResult<Page<Memo>>;
    fn find_by_id_range(
        &self,
        low: MemoId,
        high: MemoId,
        direction: Direction,
    ) -> RepoResult<Vec<Memo>>;
    fn find_by_id_range_paged(
        &self,
        low: MemoId,
        high: MemoId,
        request: &PageRequest,
    ) -> RepoResult<Page<Memo>>;
    /// All memos, newest id first, optionally capped.
    fn list_desc(&self) -> RepoResult<Vec<Memo>>;
    fn update_text_by_id(&self, id: MemoId, text: &str) -> RepoResult<usize>;
    fn update_text_by_memo(&self, memo: &Memo) -> RepoResult<usize>;
    /// Memos with `id > bound`.
    fn list_greater_than(&self, bound: MemoId, request: &PageRequest) -> RepoResult<Page<Memo>>;
    fn list_summaries_greater_than(
        &self,
        bound: MemoId,
        request: &PageRequest,
    ) -> RepoResult<Page<MemoSummary>>;
    /// Memo counts grouped by text, via hand-written SQL.
    fn native_aggregate(&self) -> RepoResult<Vec<MemoTextCount>>;
}

/// SQLite-backed memo repository.
pub struct SqliteMemoRepository<'conn> {
    conn: &'conn mut Connection,
    list_desc_limit: Option<u32>,
}

impl<'conn> SqliteMemoRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, MEMO_TABLES)?;
        Ok(Self {
            conn,
            list_desc_limit: None,
        })
    }

    /// Caps `list_desc` to `limit` rows. `None` returns every row.
    pub fn with_list_desc_limit(mut self, limit: Option<u32>) -> Self {
        self.list_desc_limit = limit;
        self
    }

    fn query_memos(&self, sql: &str, bind_values: Vec<Value>) -> RepoResult<Vec<Memo>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut memos = Vec::new();
        while let Some(row) = rows.next()? {
            memos.push(parse_memo_row(row)?);
        }
        Ok(memos)
    }

    fn count_where(&self, where_sql: &str, bind_values: &[Value]) -> RepoResult<u64> {
        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM memos{where_sql}"),
            params_from_iter(bind_values.iter()),
            |row| row.get(0),
        )?;
        count_from_sql(total, "memos")
    }

    /// Shared body of every paged memo listing.
    fn memo_page(
        &self,
        where_sql: &str,
        where_values: Vec<Value>,
        request: &PageRequest,
    ) -> RepoResult<Page<Memo>> {
        request.validate()?;
        let order_by = order_by_clause(request.sort.as_ref(), memo_sort_column, "id")?;
        let total = self.count_where(where_sql, &where_values)?;

        let mut sql = format!("{MEMO_SELECT_SQL}{where_sql}{order_by}");
        let mut bind_values = where_values;
        push_page_window(&mut sql, &mut bind_values, request);
        let items = self.query_memos(&sql, bind_values)?;
        Ok(Page::new(items, request, total))
    }
}

impl MemoRepository for SqliteMemoRepository<'_> {
    fn insert(&self, text: &str) -> RepoResult<Memo> {
        validate_memo_text(text)?;
        self.conn
            .execute("INSERT INTO memos (text) VALUES (?1);", [text])?;
        Ok(Memo::new(self.conn.last_insert_rowid(), text))
    }

    fn find_by_id(&self, id: MemoId) -> RepoResult<Option<Memo>> {
        let memo = self
            .conn
            .query_row(
                &format!("{MEMO_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_memo_row,
            )
            .optional()?;
        Ok(memo)
    }

    fn get_memo(&self, id: MemoId) -> RepoResult<Memo> {
        self.find_by_id(id)?
            .ok_or(RepoError::NotFound { entity: "memo", id })
    }

    fn update(&self, memo: &Memo) -> RepoResult<Memo> {
        memo.validate()?;
        self.conn.execute(
            "INSERT INTO memos (id, text) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET text = excluded.text;",
            params![memo.id, memo.text.as_str()],
        )?;
        self.get_memo(memo.id)
    }

    fn delete_by_id(&self, id: MemoId) -> RepoResult<()> {
        self.conn.execute("DELETE FROM memos WHERE id = ?1;", [id])?;
        Ok(())
    }

    fn delete_where_id_less_than(&mut self, threshold: MemoId) -> RepoResult<usize> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let deleted = tx
            .execute("DELETE FROM memos WHERE id < ?1;", [threshold])
            .and_then(|deleted| tx.commit().map(|()| deleted))
            .map_err(|err| {
                error!(
                    "event=memo_bulk_delete module=repo status=error threshold={threshold} error={err}"
                );
                RepoError::from(err)
            })?;

        info!(
            "event=memo_bulk_delete module=repo status=ok threshold={threshold} deleted={deleted}"
        );
        Ok(deleted)
    }

    fn list_page(&self, request: &PageRequest) -> RepoResult<Page<Memo>> {
        self.memo_page("", Vec::new(), request)
    }

    fn find_by_id_range(
        &self,
        low: MemoId,
        high: MemoId,
        direction: Direction,
    ) -> RepoResult<Vec<Memo>> {
        let sql = format!(
            "{MEMO_SELECT_SQL} WHERE id BETWEEN ?1 AND ?2 ORDER BY id {};",
            direction.as_sql()
        );
        self.query_memos(&sql, vec![Value::Integer(low), Value::Integer(high)])
    }

    fn find_by_id_range_paged(
        &self,
        low: MemoId,
        high: MemoId,
        request: &PageRequest,
    ) -> RepoResult<Page<Memo>> {
        self.memo_page(
            " WHERE id BETWEEN ? AND ?",
            vec![Value::Integer(low), Value::Integer(high)],
            request,
        )
    }

    fn list_desc(&self) -> RepoResult<Vec<Memo>> {
        let mut sql = format!("{MEMO_SELECT_SQL} ORDER BY id DESC");
        let mut bind_values = Vec::new();
        if let Some(limit) = self.list_desc_limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }
        self.query_memos(&sql, bind_values)
    }

    fn update_text_by_id(&self, id: MemoId, text: &str) -> RepoResult<usize> {
        validate_memo_text(text)?;
        let changed = self.conn.execute(
            "UPDATE memos SET text = ?2 WHERE id = ?1;",
            params![id, text],
        )?;
        Ok(changed)
    }

    fn update_text_by_memo(&self, memo: &Memo) -> RepoResult<usize> {
        self.update_text_by_id(memo.id, memo.text.as_str())
    }

    fn list_greater_than(&self, bound: MemoId, request: &PageRequest) -> RepoResult<Page<Memo>> {
        self.memo_page(" WHERE id > ?", vec![Value::Integer(bound)], request)
    }

    fn list_summaries_greater_than(
        &self,
        bound: MemoId,
        request: &PageRequest,
    ) -> RepoResult<Page<MemoSummary>> {
        request.validate()?;
        let order_by = order_by_clause(request.sort.as_ref(), memo_sort_column, "id")?;
        let total = self.count_where(" WHERE id > ?", &[Value::Integer(bound)])?;

        let mut sql = format!(
            "SELECT id, text, date('now') AS queried_on FROM memos WHERE id > ?{order_by}"
        );
        let mut bind_values = vec![Value::Integer(bound)];
        push_page_window(&mut sql, &mut bind_values, request);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(MemoSummary {
                id: row.get("id")?,
                text: row.get("text")?,
                queried_on: row.get("queried_on")?,
            });
        }
        Ok(Page::new(items, request, total))
    }

    fn native_aggregate(&self) -> RepoResult<Vec<MemoTextCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT text AS group_key, COUNT(*) AS total
             FROM memos
             GROUP BY text
             ORDER BY text ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut groups = Vec::new();
        while let Some(row) = rows.next()? {
            groups.push(MemoTextCount {
                group_key: row.get("group_key")?,
                count: count_from_sql(row.get("total")?, "memos aggregate")?,
            });
        }
        Ok(groups)
    }
}

/// Maps a public sort field to its `memos` column.
fn memo_sort_column(field: &str) -> Option<&'static str> {
    match field {
        "id" | "mno" => Some("id"),
        "text" | "memo_text" | "memoText" => Some("text"),
        _ => None,
    }
}

fn parse_memo_row(row: &Row<'_>) -> rusqlite::Result<Memo> {
    Ok(Memo {
        id: row.get("id")?,
        text: row.get("text")?,
    })
}
