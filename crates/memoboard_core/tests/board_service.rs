use memoboard_core::db::open_db_in_memory;
use memoboard_core::{
    BoardDto, BoardRepository, BoardService, BoardServiceError, BoardValidationError,
    PageRequest, RepoError, SqliteBoardRepository, Sort, ValidationError,
};

fn dto(i: u32) -> BoardDto {
    BoardDto {
        title: format!("Title:{i}"),
        content: format!("Content:{i}"),
        writer_email: format!("User{i}@naver.com"),
        writer_name: Some(format!("User{i}")),
        ..BoardDto::default()
    }
}

#[test]
fn register_then_get_returns_flat_dto() {
    let mut conn = open_db_in_memory().unwrap();
    let service = BoardService::new(SqliteBoardRepository::try_new(&mut conn).unwrap());

    let bno = service.register(&dto(1)).unwrap();
    let loaded = service.get(bno).unwrap();

    assert_eq!(loaded.bno, Some(bno));
    assert_eq!(loaded.title, "Title:1");
    assert_eq!(loaded.writer_email, "User1@naver.com");
    assert_eq!(loaded.writer_name.as_deref(), Some("User1"));
    assert_eq!(loaded.reply_count, 0);
    assert!(loaded.reg_date.is_some());
    assert!(loaded.mod_date.is_some());
}

#[test]
fn get_reports_reply_count_and_missing_board() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteBoardRepository::try_new(&mut conn).unwrap();
    let board = repo
        .insert_board_with_writer("t", "c", "writer@naver.com")
        .unwrap();
    repo.insert_reply(board.id, "nice", "guest").unwrap();

    let service = BoardService::new(repo);
    assert_eq!(service.get(board.id).unwrap().reply_count, 1);

    let err = service.get(404).unwrap_err();
    assert!(matches!(err, BoardServiceError::BoardNotFound(404)));
}

#[test]
fn get_list_builds_navigation_window() {
    let mut conn = open_db_in_memory().unwrap();
    let service = BoardService::new(SqliteBoardRepository::try_new(&mut conn).unwrap());
    for i in 1..=25 {
        service.register(&dto(i)).unwrap();
    }

    let request = PageRequest::of(0, 10).with_sort(Sort::by("bno").descending());
    let result = service.get_list(&request).unwrap();
    assert_eq!(result.total_page, 3);
    assert_eq!(result.page, 1);
    assert_eq!(result.page_list, vec![1, 2, 3]);
    assert!(!result.prev);
    assert!(!result.next);
    assert_eq!(result.dto_list.len(), 10);
    assert_eq!(result.dto_list[0].title, "Title:25");
}

#[test]
fn modify_updates_and_requires_bno() {
    let mut conn = open_db_in_memory().unwrap();
    let service = BoardService::new(SqliteBoardRepository::try_new(&mut conn).unwrap());
    let bno = service.register(&dto(1)).unwrap();

    let mut changed = service.get(bno).unwrap();
    changed.title = "Changed".to_string();
    changed.content = "Changed body".to_string();
    let modified = service.modify(&changed).unwrap();
    assert_eq!(modified.title, "Changed");
    assert_eq!(modified.content, "Changed body");
    assert_eq!(modified.writer_email, "User1@naver.com");

    let err = service.modify(&dto(2)).unwrap_err();
    assert!(matches!(err, BoardServiceError::MissingBoardId));

    let missing = BoardDto {
        bno: Some(404),
        ..dto(3)
    };
    let err = service.modify(&missing).unwrap_err();
    assert!(matches!(err, BoardServiceError::BoardNotFound(404)));
}

#[test]
fn remove_with_replies_deletes_board() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = BoardService::new(SqliteBoardRepository::try_new(&mut conn).unwrap());
    let bno = service.register(&dto(1)).unwrap();

    assert_eq!(service.remove_with_replies(bno).unwrap(), 0);
    assert!(matches!(
        service.get(bno).unwrap_err(),
        BoardServiceError::BoardNotFound(id) if id == bno
    ));
}

#[test]
fn register_rejects_invalid_writer() {
    let mut conn = open_db_in_memory().unwrap();
    let service = BoardService::new(SqliteBoardRepository::try_new(&mut conn).unwrap());

    let bad = BoardDto {
        writer_email: "nobody".to_string(),
        ..dto(1)
    };
    let err = service.register(&bad).unwrap_err();
    assert!(matches!(err, BoardServiceError::Repo(_)));
}

#[test]
fn rejected_register_leaves_members_untouched() {
    let mut conn = open_db_in_memory().unwrap();
    let service = BoardService::new(SqliteBoardRepository::try_new(&mut conn).unwrap());
    service.register(&dto(1)).unwrap();

    let blank_title = BoardDto {
        title: " ".to_string(),
        writer_email: "orphan@naver.com".to_string(),
        writer_name: Some("Orphan".to_string()),
        ..dto(2)
    };
    let err = service.register(&blank_title).unwrap_err();
    assert!(matches!(
        err,
        BoardServiceError::Repo(RepoError::Validation(ValidationError::Board(
            BoardValidationError::MissingTitle
        )))
    ));

    let renaming = BoardDto {
        content: String::new(),
        writer_name: Some("Renamed".to_string()),
        ..dto(1)
    };
    assert!(service.register(&renaming).is_err());
    drop(service);

    let repo = SqliteBoardRepository::try_new(&mut conn).unwrap();
    assert!(repo.find_member_by_email("orphan@naver.com").unwrap().is_none());
    let writer = repo.find_member_by_email("User1@naver.com").unwrap().unwrap();
    assert_eq!(writer.name.as_deref(), Some("User1"));
}

#[test]
fn dto_serializes_with_camel_case_keys() {
    let value = serde_json::to_value(BoardDto {
        bno: Some(100),
        reply_count: 2,
        ..dto(100)
    })
    .unwrap();

    assert_eq!(value["bno"], 100);
    assert_eq!(value["writerEmail"], "User100@naver.com");
    assert_eq!(value["writerName"], "User100");
    assert_eq!(value["replyCount"], 2);
    assert!(value["regDate"].is_null());
}
