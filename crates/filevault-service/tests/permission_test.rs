//! Integration tests for owner-scoped access.

mod helpers;

use bytes::Bytes;

use filevault_core::error::{AppError, ErrorKind};
use filevault_entity::{FileKey, MetadataPatch, VersionSelector};
use filevault_service::{FileQuery, UpdateAllRequest, UpdateInfoRequest, UploadRequest};

use helpers::{TestStore, ctx};

fn assert_denied(err: AppError) {
    assert_eq!(err.kind, ErrorKind::Denied);
    assert!(!err.message.contains("user2"), "message leaks owner: {}", err.message);
    assert!(!err.message.contains("secret"), "message leaks key: {}", err.message);
}

#[tokio::test]
async fn test_cross_owner_operations_denied() {
    let app = TestStore::memory().await;
    app.upload("user2", "project1", "secret.txt", "classified").await;

    let attacker = ctx("user1");
    let target = FileQuery::latest("user2", "project1", "secret.txt");

    assert_denied(app.store.get_info(&attacker, &target).await.unwrap_err());
    assert_denied(app.store.download(&attacker, &target).await.unwrap_err());
    assert_denied(app.store.delete(&attacker, &target).await.unwrap_err());

    let update = UpdateInfoRequest {
        name: "secret.txt".into(),
        owner: "user2".into(),
        project: "project1".into(),
        version: VersionSelector::Latest,
        updated_metadata: r#"{"pwned": true}"#.into(),
    };
    assert_denied(app.store.update_info(&attacker, &update).await.unwrap_err());

    let update_all = UpdateAllRequest {
        owner: "user2".into(),
        updated_metadata: r#"{"pwned": true}"#.into(),
    };
    assert_denied(
        app.store
            .update_all_owner_info(&attacker, &update_all)
            .await
            .unwrap_err(),
    );
    assert_denied(
        app.store
            .delete_all_owner_files(&attacker, "user2")
            .await
            .unwrap_err(),
    );
    assert_denied(
        app.store
            .list_owner_files(&attacker, "user2")
            .await
            .unwrap_err(),
    );
    let key = FileKey::new("user2", "project1", "secret.txt");
    assert_denied(app.store.list_versions(&attacker, &key).await.unwrap_err());

    let upload = UploadRequest::new("user2", "project1", "secret.txt");
    assert_denied(
        app.store
            .upload(&attacker, &upload, Bytes::from_static(b"overwrite"))
            .await
            .unwrap_err(),
    );

    // Nothing changed for the real owner.
    let info = app.store.get_info(&ctx("user2"), &target).await.unwrap();
    assert_eq!(info.version, 1);
    assert!(info.metadata.is_empty());
    assert_eq!(app.read(&app.store, "user2", &target).await, b"classified");
}

#[tokio::test]
async fn test_denial_does_not_depend_on_existence() {
    let app = TestStore::memory().await;
    app.upload("user2", "project1", "secret.txt", "classified").await;

    let attacker = ctx("user1");
    let existing = app
        .store
        .get_info(&attacker, &FileQuery::latest("user2", "project1", "secret.txt"))
        .await
        .unwrap_err();
    let missing = app
        .store
        .get_info(&attacker, &FileQuery::latest("user2", "project1", "nothing.txt"))
        .await
        .unwrap_err();
    assert_eq!(existing.kind, missing.kind);
    assert_eq!(existing.message, missing.message);
}

#[tokio::test]
async fn test_concealed_denials_read_as_not_found() {
    let app = TestStore::memory_with(|config| config.store.conceal_denials = true).await;
    app.upload("user2", "project1", "secret.txt", "classified").await;

    let err = app
        .store
        .download(&ctx("user1"), &FileQuery::latest("user2", "project1", "secret.txt"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_apply_patch_checks_owner() {
    let app = TestStore::memory().await;
    app.upload("user2", "project1", "secret.txt", "classified").await;

    let key = FileKey::new("user2", "project1", "secret.txt");
    let patch = MetadataPatch::default().with_description("changed");
    let err = app
        .store
        .apply_patch(&ctx("user1"), &key, VersionSelector::Latest, &patch)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Denied);

    let info = app
        .store
        .apply_patch(&ctx("user2"), &key, VersionSelector::Latest, &patch)
        .await
        .unwrap();
    assert_eq!(info.description, "changed");
}

#[tokio::test]
async fn test_update_info_authorizes_before_parsing_patch() {
    let app = TestStore::memory().await;
    app.upload("user2", "project1", "secret.txt", "classified").await;

    let malformed = UpdateInfoRequest {
        name: "secret.txt".into(),
        owner: "user2".into(),
        project: "project1".into(),
        version: VersionSelector::Latest,
        updated_metadata: "{ not json".into(),
    };
    assert_denied(app.store.update_info(&ctx("user1"), &malformed).await.unwrap_err());

    let err = app
        .store
        .update_info(&ctx("user2"), &malformed)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidArgument);

    let valid = UpdateInfoRequest {
        updated_metadata: r#"{"reviewed": true}"#.into(),
        ..malformed
    };
    let info = app.store.update_info(&ctx("user2"), &valid).await.unwrap();
    assert_eq!(info.metadata.get("reviewed"), Some(&serde_json::json!(true)));
}
