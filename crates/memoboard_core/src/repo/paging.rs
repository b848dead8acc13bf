//! SQL fragments shared by paged/sorted queries.

use super::{RepoError, RepoResult};
use crate::model::page::{PageRequest, Sort};
use rusqlite::types::Value;

/// Builds an `ORDER BY` clause for an optional sort.
///
/// Unsorted requests fall back to `id_column ASC` (insertion order). Sorted
/// requests on any other column get `id_column ASC` as a tiebreak so pages
/// never overlap.
pub(crate) fn order_by_clause<F>(
    sort: Option<&Sort>,
    resolve: F,
    id_column: &str,
) -> RepoResult<String>
where
    F: Fn(&str) -> Option<&'static str>,
{
    let Some(sort) = sort else {
        return Ok(format!(" ORDER BY {id_column} ASC"));
    };

    let column = resolve(sort.field.as_str())
        .ok_or_else(|| RepoError::UnsupportedSortField(sort.field.clone()))?;
    let direction = sort.direction.as_sql();
    if column == id_column {
        Ok(format!(" ORDER BY {column} {direction}"))
    } else {
        Ok(format!(
            " ORDER BY {column} {direction}, {id_column} ASC"
        ))
    }
}

/// Appends `LIMIT ? OFFSET ?` and the matching bind values.
pub(crate) fn push_page_window(sql: &mut String, bind_values: &mut Vec<Value>, request: &PageRequest) {
    sql.push_str(" LIMIT ? OFFSET ?");
    bind_values.push(Value::Integer(i64::from(request.size)));
    bind_values.push(Value::Integer(
        i64::try_from(request.offset()).unwrap_or(i64::MAX),
    ));
}

/// Converts a SQL `COUNT(*)` into an unsigned total.
pub(crate) fn count_from_sql(value: i64, source: &str) -> RepoResult<u64> {
    u64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("negative count `{value}` in {source}")))
}
