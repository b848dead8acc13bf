//! CLI smoke entry point.
//!
//! # Responsibility
//! - Seed a database with dummy memos and boards when it is empty.
//! - Print page metadata and one page of each store for manual checks.
//!
//! Usage: `memoboard_cli [db_path]` (in-memory when omitted). Set
//! `MEMOBOARD_LOG_DIR` to an absolute directory to enable file logging.

use memoboard_core::db::{open_db, open_db_in_memory};
use memoboard_core::{
    default_log_level, init_logging, BoardDto, BoardService, MemoRepository, PageRequest,
    SqliteBoardRepository, SqliteMemoRepository, Sort,
};
use rusqlite::Connection;
use std::error::Error;

const DUMMY_ROWS: i64 = 100;

fn main() -> Result<(), Box<dyn Error>> {
    if let Ok(log_dir) = std::env::var("MEMOBOARD_LOG_DIR") {
        init_logging(default_log_level(), &log_dir)?;
    }

    let mut conn = match std::env::args().nth(1) {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };

    seed_if_empty(&mut conn)?;
    print_memos(&mut conn)?;
    print_boards(&mut conn)?;
    Ok(())
}

fn seed_if_empty(conn: &mut Connection) -> Result<(), Box<dyn Error>> {
    {
        let memos = SqliteMemoRepository::try_new(conn)?;
        if memos.list_page(&PageRequest::of(0, 1))?.total_elements == 0 {
            for i in 1..=DUMMY_ROWS {
                memos.insert(&format!("Sample : {i}"))?;
            }
        }
    }

    let boards = BoardService::new(SqliteBoardRepository::try_new(conn)?);
    if boards.get_list(&PageRequest::of(0, 1))?.total_page == 0 {
        for i in 1..=DUMMY_ROWS {
            boards.register(&BoardDto {
                title: format!("Title:{i}"),
                content: format!("Content:{i}"),
                writer_email: format!("User{i}@naver.com"),
                writer_name: Some(format!("User{i}")),
                ..BoardDto::default()
            })?;
        }
    }
    Ok(())
}

fn print_memos(conn: &mut Connection) -> Result<(), Box<dyn Error>> {
    let memos = SqliteMemoRepository::try_new(conn)?;
    let page = memos.list_page(&PageRequest::of(0, 10).with_sort(Sort::by("id").descending()))?;

    println!("Total Pages : {}", page.total_pages);
    println!("Total Count : {}", page.total_elements);
    println!("Page Number : {}", page.page_number);
    println!("Page Size : {}", page.page_size);
    println!("Has next Page ? : {}", page.has_next());
    println!("This Page is First ? : {}", page.is_first());
    for memo in &page.items {
        println!("{memo}");
    }
    for group in memos.native_aggregate()?.iter().take(5) {
        println!("{} :: {}", group.group_key, group.count);
    }
    Ok(())
}

fn print_boards(conn: &mut Connection) -> Result<(), Box<dyn Error>> {
    let boards = BoardService::new(SqliteBoardRepository::try_new(conn)?);
    let result = boards.get_list(&PageRequest::of(0, 10).with_sort(Sort::by("bno").descending()))?;
    println!(
        "boards page={} of {} window={:?}",
        result.page, result.total_page, result.page_list
    );
    for dto in &result.dto_list {
        println!(
            "{} | {} | {} | replies={}",
            dto.bno.unwrap_or_default(),
            dto.title,
            dto.writer_email,
            dto.reply_count
        );
    }
    Ok(())
}
