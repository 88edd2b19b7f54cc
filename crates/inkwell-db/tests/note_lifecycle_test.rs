//! Note lifecycle integration tests: create/fetch round-trip, tag replace
//! semantics, toggles, and delete.
//!
//! These run against a live PostgreSQL test database (see
//! `test_fixtures::DEFAULT_TEST_DATABASE_URL`), so they are ignored by
//! default. Run with `cargo test -- --ignored` once the database is up.

use inkwell_db::test_fixtures::TestDatabase;
use inkwell_db::{
    CreateFolderRequest, CreateNoteRequest, FolderRepository, NoteRepository, UpdateNoteRequest,
};

fn sorted(mut v: Vec<String>) -> Vec<String> {
    v.sort();
    v
}

#[tokio::test]
#[ignore = "requires the test database"]
async fn test_create_then_fetch_preserves_tags_and_folder() {
    let test_db = TestDatabase::new().await;
    let user = test_db.create_user("ada").await;

    let folder = test_db
        .db
        .folders
        .create(CreateFolderRequest {
            name: "Work".to_string(),
            color: Some("bg-blue-500".to_string()),
            user_id: user.id,
        })
        .await
        .expect("create folder");

    let created = test_db
        .db
        .notes
        .create(CreateNoteRequest {
            title: "T".to_string(),
            content: "C".to_string(),
            folder_id: Some(folder.id),
            tags: vec!["y".to_string(), "x".to_string()],
            user_id: user.id,
        })
        .await
        .expect("create note");

    let fetched = test_db
        .db
        .notes
        .find_by_id(created.id)
        .await
        .expect("fetch note")
        .expect("note exists");

    assert_eq!(
        sorted(fetched.tags.clone()),
        vec!["x".to_string(), "y".to_string()]
    );
    assert_eq!(fetched.folder_id, Some(folder.id));
    assert_eq!(fetched.folder_name.as_deref(), Some("Work"));
    assert_eq!(fetched.folder_color.as_deref(), Some("bg-blue-500"));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires the test database"]
async fn test_update_with_tags_replaces_full_set() {
    let test_db = TestDatabase::new().await;
    let user = test_db.create_user("ada").await;

    let note = test_db
        .db
        .notes
        .create(CreateNoteRequest {
            title: "T".to_string(),
            content: "C".to_string(),
            folder_id: None,
            tags: vec!["a".to_string(), "b".to_string()],
            user_id: user.id,
        })
        .await
        .expect("create note");

    let updated = test_db
        .db
        .notes
        .update(
            note.id,
            UpdateNoteRequest {
                title: "T2".to_string(),
                content: "C2".to_string(),
                folder_id: None,
                tags: Some(vec!["b".to_string(), "c".to_string()]),
            },
        )
        .await
        .expect("update note");

    // No partial merge: "a" is gone, "c" is new.
    assert_eq!(
        sorted(updated.tags),
        vec!["b".to_string(), "c".to_string()]
    );

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires the test database"]
async fn test_update_without_tags_leaves_set_untouched() {
    let test_db = TestDatabase::new().await;
    let user = test_db.create_user("ada").await;

    let note = test_db
        .db
        .notes
        .create(CreateNoteRequest {
            title: "T".to_string(),
            content: "C".to_string(),
            folder_id: None,
            tags: vec!["keep".to_string()],
            user_id: user.id,
        })
        .await
        .expect("create note");

    let updated = test_db
        .db
        .notes
        .update(
            note.id,
            UpdateNoteRequest {
                title: "T2".to_string(),
                content: "C2".to_string(),
                folder_id: None,
                tags: None,
            },
        )
        .await
        .expect("update note");

    assert_eq!(updated.tags, vec!["keep".to_string()]);
    assert_eq!(updated.title, "T2");

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires the test database"]
async fn test_double_toggle_restores_original_state() {
    let test_db = TestDatabase::new().await;
    let user = test_db.create_user("ada").await;

    let note = test_db
        .db
        .notes
        .create(CreateNoteRequest {
            title: "T".to_string(),
            content: "C".to_string(),
            folder_id: None,
            tags: vec![],
            user_id: user.id,
        })
        .await
        .expect("create note");
    assert!(!note.pinned);
    assert!(!note.archived);

    let once = test_db.db.notes.toggle_pin(note.id).await.expect("toggle");
    assert!(once.pinned);
    let twice = test_db.db.notes.toggle_pin(note.id).await.expect("toggle");
    assert!(!twice.pinned);

    let once = test_db
        .db
        .notes
        .toggle_archive(note.id)
        .await
        .expect("toggle");
    assert!(once.archived);
    let twice = test_db
        .db
        .notes
        .toggle_archive(note.id)
        .await
        .expect("toggle");
    assert!(!twice.archived);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires the test database"]
async fn test_delete_removes_note_and_join_rows() {
    let test_db = TestDatabase::new().await;
    let user = test_db.create_user("ada").await;

    let note = test_db
        .db
        .notes
        .create(CreateNoteRequest {
            title: "T".to_string(),
            content: "C".to_string(),
            folder_id: None,
            tags: vec!["x".to_string()],
            user_id: user.id,
        })
        .await
        .expect("create note");

    test_db.db.notes.delete(note.id).await.expect("delete note");

    assert!(test_db
        .db
        .notes
        .find_by_id(note.id)
        .await
        .expect("fetch")
        .is_none());

    let join_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM note_tags WHERE note_id = $1")
            .bind(note.id)
            .fetch_one(&test_db.db.pool)
            .await
            .expect("count joins");
    assert_eq!(join_count, 0);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires the test database"]
async fn test_find_by_user_orders_pinned_then_recent() {
    let test_db = TestDatabase::new().await;
    let user = test_db.create_user("ada").await;

    let first = test_db
        .db
        .notes
        .create(CreateNoteRequest {
            title: "first".to_string(),
            content: String::new(),
            folder_id: None,
            tags: vec![],
            user_id: user.id,
        })
        .await
        .expect("create");
    let second = test_db
        .db
        .notes
        .create(CreateNoteRequest {
            title: "second".to_string(),
            content: String::new(),
            folder_id: None,
            tags: vec![],
            user_id: user.id,
        })
        .await
        .expect("create");

    // Pin the older note; it must sort ahead of the newer unpinned one.
    test_db.db.notes.toggle_pin(first.id).await.expect("pin");

    let notes = test_db
        .db
        .notes
        .find_by_user(user.id)
        .await
        .expect("list notes");
    let ids: Vec<_> = notes.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);

    test_db.cleanup().await;
}
