//! Tag and folder integration tests: idempotent tag create, cascade scope
//! on delete, folder delete nulling note references, popular-tag ordering.
//!
//! These run against a live PostgreSQL test database and are ignored by
//! default. Run with `cargo test -- --ignored` once the database is up.

use inkwell_db::test_fixtures::TestDatabase;
use inkwell_db::{
    CreateFolderRequest, CreateNoteRequest, FolderRepository, NoteRepository, TagRepository,
};

#[tokio::test]
#[ignore = "requires the test database"]
async fn test_duplicate_tag_create_returns_existing_row() {
    let test_db = TestDatabase::new().await;
    let user = test_db.create_user("ada").await;

    let first = test_db
        .db
        .tags
        .find_or_create(user.id, "reading")
        .await
        .expect("create tag");
    let second = test_db
        .db
        .tags
        .find_or_create(user.id, "reading")
        .await
        .expect("re-create tag");

    assert_eq!(first.id, second.id, "duplicate create must not add a row");

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM tags WHERE user_id = $1 AND name = $2")
            .bind(user.id)
            .bind("reading")
            .fetch_one(&test_db.db.pool)
            .await
            .expect("count tags");
    assert_eq!(count, 1);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires the test database"]
async fn test_same_tag_name_different_owners_are_distinct() {
    let test_db = TestDatabase::new().await;
    let ada = test_db.create_user("ada").await;
    let bob = test_db.create_user("bob").await;

    let ada_tag = test_db
        .db
        .tags
        .find_or_create(ada.id, "reading")
        .await
        .expect("ada tag");
    let bob_tag = test_db
        .db
        .tags
        .find_or_create(bob.id, "reading")
        .await
        .expect("bob tag");

    assert_ne!(ada_tag.id, bob_tag.id);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires the test database"]
async fn test_tag_delete_detaches_from_notes_but_keeps_them() {
    let test_db = TestDatabase::new().await;
    let user = test_db.create_user("ada").await;

    let note = test_db
        .db
        .notes
        .create(CreateNoteRequest {
            title: "T".to_string(),
            content: "C".to_string(),
            folder_id: None,
            tags: vec!["doomed".to_string(), "kept".to_string()],
            user_id: user.id,
        })
        .await
        .expect("create note");

    let doomed = test_db
        .db
        .tags
        .find_or_create(user.id, "doomed")
        .await
        .expect("resolve tag");
    test_db.db.tags.delete(doomed.id).await.expect("delete tag");

    let fetched = test_db
        .db
        .notes
        .find_by_id(note.id)
        .await
        .expect("fetch")
        .expect("note survives tag delete");
    assert_eq!(fetched.tags, vec!["kept".to_string()]);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires the test database"]
async fn test_folder_delete_nulls_note_reference() {
    let test_db = TestDatabase::new().await;
    let user = test_db.create_user("ada").await;

    let folder = test_db
        .db
        .folders
        .create(CreateFolderRequest {
            name: "Doomed".to_string(),
            color: None,
            user_id: user.id,
        })
        .await
        .expect("create folder");

    let note = test_db
        .db
        .notes
        .create(CreateNoteRequest {
            title: "T".to_string(),
            content: "C".to_string(),
            folder_id: Some(folder.id),
            tags: vec![],
            user_id: user.id,
        })
        .await
        .expect("create note");

    test_db
        .db
        .folders
        .delete(folder.id)
        .await
        .expect("delete folder");

    let fetched = test_db
        .db
        .notes
        .find_by_id(note.id)
        .await
        .expect("fetch")
        .expect("note survives folder delete");
    assert_eq!(fetched.folder_id, None);
    assert_eq!(fetched.folder_name, None);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires the test database"]
async fn test_folder_create_defaults_color() {
    let test_db = TestDatabase::new().await;
    let user = test_db.create_user("ada").await;

    let folder = test_db
        .db
        .folders
        .create(CreateFolderRequest {
            name: "Plain".to_string(),
            color: None,
            user_id: user.id,
        })
        .await
        .expect("create folder");
    assert_eq!(folder.color, "bg-gray-500");

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires the test database"]
async fn test_popular_tags_order_by_usage_then_name() {
    let test_db = TestDatabase::new().await;
    let user = test_db.create_user("ada").await;

    // "busy" on two notes; "alpha" and "beta" on one each (tie → name order)
    for tags in [
        vec!["busy".to_string(), "alpha".to_string()],
        vec!["busy".to_string(), "beta".to_string()],
    ] {
        test_db
            .db
            .notes
            .create(CreateNoteRequest {
                title: "T".to_string(),
                content: String::new(),
                folder_id: None,
                tags,
                user_id: user.id,
            })
            .await
            .expect("create note");
    }

    let popular = test_db
        .db
        .tags
        .popular(user.id, 10)
        .await
        .expect("popular tags");
    let names: Vec<_> = popular.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["busy", "alpha", "beta"]);
    assert_eq!(popular[0].usage_count, 2);

    let limited = test_db
        .db
        .tags
        .popular(user.id, 1)
        .await
        .expect("popular tags limit");
    assert_eq!(limited.len(), 1);

    test_db.cleanup().await;
}
