use memoboard_core::db::open_db_in_memory;
use memoboard_core::{
    Direction, Memo, MemoRepository, PageRequest, PageRequestError, RepoError,
    SqliteMemoRepository, Sort,
};

fn seeded(conn: &mut rusqlite::Connection, count: i64) -> SqliteMemoRepository<'_> {
    let repo = SqliteMemoRepository::try_new(conn).unwrap();
    for i in 1..=count {
        repo.insert(&format!("Sample : {i}")).unwrap();
    }
    repo
}

fn ids(memos: &[Memo]) -> Vec<i64> {
    memos.iter().map(|memo| memo.id).collect()
}

#[test]
fn default_page_reports_totals_and_navigation() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = seeded(&mut conn, 100);

    let page = repo.list_page(&PageRequest::of(0, 10)).unwrap();
    assert_eq!(page.items.len(), 10);
    assert_eq!(page.total_elements, 100);
    assert_eq!(page.total_pages, 10);
    assert_eq!(page.page_number, 0);
    assert_eq!(page.page_size, 10);
    assert!(page.has_next());
    assert!(page.is_first());
    assert_eq!(ids(&page.items), (1..=10).collect::<Vec<_>>());

    let last = repo.list_page(&PageRequest::of(9, 10)).unwrap();
    assert!(!last.has_next());
    assert_eq!(ids(&last.items), (91..=100).collect::<Vec<_>>());

    let past_end = repo.list_page(&PageRequest::of(10, 10)).unwrap();
    assert!(past_end.items.is_empty());
    assert_eq!(past_end.total_elements, 100);
}

#[test]
fn unsorted_page_keeps_insertion_order_and_sort_reverses_it() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteMemoRepository::try_new(&mut conn).unwrap();
    repo.insert("a").unwrap();
    repo.insert("b").unwrap();

    let unsorted = repo.list_page(&PageRequest::of(0, 10)).unwrap();
    let texts: Vec<_> = unsorted.items.iter().map(|memo| memo.text.as_str()).collect();
    assert_eq!(texts, vec!["a", "b"]);

    let sorted = repo
        .list_page(&PageRequest::of(0, 10).with_sort(Sort::by("mno").descending()))
        .unwrap();
    let texts: Vec<_> = sorted.items.iter().map(|memo| memo.text.as_str()).collect();
    assert_eq!(texts, vec!["b", "a"]);
}

#[test]
fn sort_on_text_breaks_ties_by_id() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteMemoRepository::try_new(&mut conn).unwrap();
    for text in ["b", "a", "b"] {
        repo.insert(text).unwrap();
    }

    let page = repo
        .list_page(&PageRequest::of(0, 10).with_sort(Sort::by("text")))
        .unwrap();
    assert_eq!(ids(&page.items), vec![2, 1, 3]);
}

#[test]
fn id_range_is_inclusive_and_strictly_descending() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = seeded(&mut conn, 100);

    let memos = repo.find_by_id_range(70, 80, Direction::Desc).unwrap();
    assert_eq!(ids(&memos), (70..=80).rev().collect::<Vec<_>>());

    let ascending = repo.find_by_id_range(98, 120, Direction::Asc).unwrap();
    assert_eq!(ids(&ascending), vec![98, 99, 100]);

    assert!(repo
        .find_by_id_range(80, 70, Direction::Desc)
        .unwrap()
        .is_empty());
}

#[test]
fn id_range_paged_counts_only_the_range() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = seeded(&mut conn, 100);

    let request = PageRequest::of(0, 15).with_sort(Sort::by("mno").descending());
    let page = repo.find_by_id_range_paged(10, 35, &request).unwrap();
    assert_eq!(page.total_elements, 26);
    assert_eq!(page.total_pages, 2);
    assert_eq!(ids(&page.items), (21..=35).rev().collect::<Vec<_>>());

    let second = repo
        .find_by_id_range_paged(10, 35, &PageRequest { page: 1, ..request })
        .unwrap();
    assert_eq!(ids(&second.items), (10..=20).rev().collect::<Vec<_>>());
    assert!(!second.has_next());
}

#[test]
fn greater_than_listings_exclude_the_bound() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = seeded(&mut conn, 100);

    let request = PageRequest::of(0, 10).with_sort(Sort::by("mno").descending());
    let page = repo.list_greater_than(30, &request).unwrap();
    assert_eq!(page.total_elements, 70);
    assert_eq!(ids(&page.items), (91..=100).rev().collect::<Vec<_>>());

    let ascending = PageRequest::of(0, 10).with_sort(Sort::by("mno").ascending());
    let summaries = repo.list_summaries_greater_than(15, &ascending).unwrap();
    assert_eq!(summaries.total_elements, 85);
    assert_eq!(summaries.items[0].id, 16);
    assert_eq!(summaries.items[0].text, "Sample : 16");
    let date = &summaries.items[0].queried_on;
    assert_eq!(date.len(), 10, "expected YYYY-MM-DD, got {date}");
    assert_eq!(date.as_bytes()[4], b'-');
}

#[test]
fn invalid_requests_are_rejected_before_sql() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = seeded(&mut conn, 3);

    let err = repo
        .list_page(&PageRequest::of(0, 10).with_sort(Sort::by("memo_text; DROP TABLE memos")))
        .unwrap_err();
    assert!(matches!(err, RepoError::UnsupportedSortField(_)));

    let err = repo.list_page(&PageRequest::of(0, 0)).unwrap_err();
    assert!(matches!(
        err,
        RepoError::InvalidPageRequest(PageRequestError::ZeroSize)
    ));

    assert_eq!(repo.list_page(&PageRequest::of(0, 10)).unwrap().total_elements, 3);
}
