use rusqlite::Connection;
use uuid::Uuid;
use wordcorpus_core::db::migrations::latest_version;
use wordcorpus_core::db::open_db_in_memory;
use wordcorpus_core::{
    RepoError, SqliteWordRepository, UniquenessCheck, UniquenessScope, Violation, WordEntry,
    WordField, WordListQuery, WordRepository, WordService, WordServiceError,
};

fn uniqueness() -> Violation {
    Violation::Uniqueness {
        field: WordField::Name,
    }
}

fn word_with_fixed_id(id: &str, name: &str) -> WordEntry {
    WordEntry::with_id(Uuid::parse_str(id).unwrap(), name).unwrap()
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_new(&conn).unwrap();

    let entry = WordEntry::new("Ibotta");
    let id = repo.create_word(&entry).unwrap();

    let loaded = repo.get_word(id, false).unwrap().unwrap();
    assert_eq!(loaded.id(), entry.id());
    assert_eq!(loaded.name(), "Ibotta");
    assert_eq!(loaded.characters(), "abiott");
    assert!(loaded.proper_noun());
    assert!(loaded.created_at().is_some());
    assert!(loaded.updated_at().is_some());
    assert!(loaded.is_active());
}

#[test]
fn persisted_record_matches_expected_columns() {
    let conn = open_db_in_memory().unwrap();
    let service = WordService::new(SqliteWordRepository::try_new(&conn).unwrap());

    let stored = service.add_word("read").unwrap();

    let (name, characters, proper_noun, deleted_at): (String, String, i64, Option<i64>) = conn
        .query_row(
            "SELECT name, characters, proper_noun, deleted_at FROM words WHERE uuid = ?1;",
            [stored.id().to_string()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .unwrap();
    assert_eq!(name, "read");
    assert_eq!(characters, "ader");
    assert_eq!(proper_noun, 0);
    assert_eq!(deleted_at, None);
}

#[test]
fn second_identical_name_is_rejected_by_service() {
    let conn = open_db_in_memory().unwrap();
    let service = WordService::new(SqliteWordRepository::try_new(&conn).unwrap());

    service.add_word("read").unwrap();
    let err = service.add_word("read").unwrap_err();

    match err {
        WordServiceError::Rejected(errors) => assert_eq!(errors.violations(), &[uniqueness()]),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(service.find_by_name("read", true).unwrap().len(), 1);
}

#[test]
fn rejected_word_leaves_corpus_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let service = WordService::new(SqliteWordRepository::try_new(&conn).unwrap());

    let err = service.add_word("").unwrap_err();
    match err {
        WordServiceError::Rejected(errors) => {
            assert_eq!(errors.summary(), "name:required,name:length,characters:required")
        }
        other => panic!("unexpected error: {other}"),
    }

    let all = service
        .list_words(&WordListQuery {
            include_deleted: true,
            ..WordListQuery::default()
        })
        .unwrap();
    assert!(all.is_empty());
}

#[test]
fn storage_unique_index_backs_up_the_pipeline() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_new(&conn).unwrap();

    repo.create_word(&WordEntry::new("read")).unwrap();
    let err = repo.create_word(&WordEntry::new("read")).unwrap_err();
    assert!(matches!(err, RepoError::DuplicateName(ref name) if name == "read"));

    let mapped = WordServiceError::from(err);
    assert!(matches!(mapped, WordServiceError::Rejected(ref errors)
        if errors.violations() == [uniqueness()]));
}

#[test]
fn repository_write_paths_check_invariants() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_new(&conn).unwrap();

    let err = repo.create_word(&WordEntry::new("123")).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    let mut entry = WordEntry::new("read");
    repo.create_word(&entry).unwrap();
    entry.set_name("x".repeat(256));
    let err = repo.update_word(&entry).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn rename_rederives_and_checks_uniqueness() {
    let conn = open_db_in_memory().unwrap();
    let service = WordService::new(SqliteWordRepository::try_new(&conn).unwrap());

    let read = service.add_word("read").unwrap();
    service.add_word("dear").unwrap();

    let renamed = service.rename_word(read.id(), "Dare").unwrap();
    assert_eq!(renamed.name(), "Dare");
    assert_eq!(renamed.characters(), "ader");
    assert!(renamed.proper_noun());

    let same = service.rename_word(read.id(), "Dare").unwrap();
    assert_eq!(same.name(), "Dare");

    let err = service.rename_word(read.id(), "dear").unwrap_err();
    assert!(matches!(err, WordServiceError::Rejected(_)));

    let err = service.rename_word(Uuid::new_v4(), "fresh").unwrap_err();
    assert!(matches!(err, WordServiceError::NotFound(_)));
}

#[test]
fn update_not_found_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_new(&conn).unwrap();

    let entry = WordEntry::new("missing");
    let err = repo.update_word(&entry).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == entry.id()));
}

#[test]
fn soft_delete_is_idempotent_and_keeps_other_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_new(&conn).unwrap();

    let entry = WordEntry::new("read");
    repo.create_word(&entry).unwrap();
    let before = repo.get_word(entry.id(), false).unwrap().unwrap();

    repo.soft_delete_word(entry.id()).unwrap();
    let first = repo.get_word(entry.id(), true).unwrap().unwrap();
    repo.soft_delete_word(entry.id()).unwrap();
    let second = repo.get_word(entry.id(), true).unwrap().unwrap();

    assert!(repo.get_word(entry.id(), false).unwrap().is_none());
    assert!(first.deleted_at().is_some());
    assert_eq!(first.deleted_at(), second.deleted_at());
    assert_eq!(second.name(), before.name());
    assert_eq!(second.characters(), before.characters());
    assert_eq!(second.updated_at(), before.updated_at());
}

#[test]
fn deleted_name_is_reusable_only_in_active_scope() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_new(&conn).unwrap();
    let service = WordService::new(SqliteWordRepository::try_new(&conn).unwrap());

    let first = service.add_word("read").unwrap();
    service.delete_word(first.id()).unwrap();

    assert!(repo
        .name_exists("read", UniquenessScope::Global, None)
        .unwrap());
    assert!(!repo
        .name_exists("read", UniquenessScope::ActiveOnly, None)
        .unwrap());

    let global = WordService::with_scope(
        SqliteWordRepository::try_new(&conn).unwrap(),
        UniquenessScope::Global,
    );
    assert!(matches!(
        global.add_word("read"),
        Err(WordServiceError::Rejected(_))
    ));

    let second = service.add_word("read").unwrap();
    assert_ne!(second.id(), first.id());
    assert_eq!(service.find_by_name("read", false).unwrap().len(), 1);
    assert_eq!(service.find_by_name("read", true).unwrap().len(), 2);
}

#[test]
fn restore_fails_when_name_was_taken() {
    let conn = open_db_in_memory().unwrap();
    let service = WordService::new(SqliteWordRepository::try_new(&conn).unwrap());

    let first = service.add_word("read").unwrap();
    service.delete_word(first.id()).unwrap();
    let restored = service.restore_word(first.id()).unwrap();
    assert!(restored.is_active());

    service.delete_word(first.id()).unwrap();
    service.add_word("read").unwrap();

    let err = service.restore_word(first.id()).unwrap_err();
    assert!(matches!(err, WordServiceError::Rejected(ref errors)
        if errors.violations() == [uniqueness()]));
}

#[test]
fn name_exists_excludes_given_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_new(&conn).unwrap();

    let entry = WordEntry::new("read");
    repo.create_word(&entry).unwrap();

    assert!(repo
        .name_exists("read", UniquenessScope::ActiveOnly, None)
        .unwrap());
    assert!(!repo
        .name_exists("read", UniquenessScope::ActiveOnly, Some(entry.id()))
        .unwrap());
    assert!(!repo
        .name_exists("Read", UniquenessScope::ActiveOnly, None)
        .unwrap());
}

#[test]
fn list_pagination_with_limit_and_offset_is_stable() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_new(&conn).unwrap();

    let apple = word_with_fixed_id("00000000-0000-4000-8000-000000000001", "apple");
    let banana = word_with_fixed_id("00000000-0000-4000-8000-000000000002", "banana");
    let cherry = word_with_fixed_id("00000000-0000-4000-8000-000000000003", "cherry");
    repo.create_word(&cherry).unwrap();
    repo.create_word(&apple).unwrap();
    repo.create_word(&banana).unwrap();

    let query = WordListQuery {
        limit: Some(2),
        offset: 1,
        ..WordListQuery::default()
    };
    let page = repo.list_words(&query).unwrap();

    assert_eq!(page.len(), 2);
    assert_eq!(page[0].id(), banana.id());
    assert_eq!(page[1].id(), cherry.id());

    let tail = repo
        .list_words(&WordListQuery {
            offset: 2,
            ..WordListQuery::default()
        })
        .unwrap();
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].id(), cherry.id());
}

#[test]
fn read_path_rejects_tampered_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_new(&conn).unwrap();

    let entry = WordEntry::new("read");
    repo.create_word(&entry).unwrap();
    conn.execute(
        "UPDATE words SET characters = 'zzzz' WHERE uuid = ?1;",
        [entry.id().to_string()],
    )
    .unwrap();

    let err = repo.get_word(entry.id(), false).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn read_path_reports_rule_breaking_rows_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteWordRepository::try_new(&conn).unwrap();

    let name = "a".repeat(256);
    conn.execute(
        "INSERT INTO words (uuid, name, characters) VALUES (?1, ?2, ?2);",
        ["00000000-0000-4000-8000-000000000009", name.as_str()],
    )
    .unwrap();
    let id = Uuid::parse_str("00000000-0000-4000-8000-000000000009").unwrap();

    let err = repo.get_word(id, false).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));

    let service = WordService::new(repo);
    let err = service.get_word(id, false).unwrap_err();
    assert!(matches!(err, WordServiceError::Repo(RepoError::InvalidData(_))));
}

#[test]
fn names_with_embedded_nul_are_stored_like_any_other() {
    let conn = open_db_in_memory().unwrap();
    let service = WordService::new(SqliteWordRepository::try_new(&conn).unwrap());

    let stored = service.add_word("\u{0}abc").unwrap();
    assert_eq!(stored.name(), "\u{0}abc");
    assert_eq!(stored.characters(), "abc");

    let found = service.find_by_name("\u{0}abc", false).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id(), stored.id());

    let err = service.add_word("\u{0}abc").unwrap_err();
    assert!(matches!(err, WordServiceError::Rejected(ref errors) if errors.contains(&uniqueness())));
}

#[test]
fn longest_multibyte_name_fits_storage() {
    let conn = open_db_in_memory().unwrap();
    let service = WordService::new(SqliteWordRepository::try_new(&conn).unwrap());

    let name = "\u{1F600}".repeat(254) + "a";
    let stored = service.add_word(name.as_str()).unwrap();
    assert_eq!(stored.name().chars().count(), 255);
    assert_eq!(stored.characters(), "a");
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteWordRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_words_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteWordRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("words"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE words (
            uuid TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            characters TEXT NOT NULL,
            created_at INTEGER,
            updated_at INTEGER,
            deleted_at INTEGER
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteWordRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "words",
            column: "proper_noun"
        })
    ));
}
