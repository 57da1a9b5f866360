/// Draft retention tests with real files on disk
use lab_intake::intake::{DocumentMetadata, IntakeError, UploadedFile};
use lab_intake::workflows::Workflow;

mod fixtures;
use fixtures::test_harness::IntakeHarness;

#[tokio::test]
async fn test_keep_latest_one_of_three() {
    let harness = IntakeHarness::new().await;
    let service = &harness.service;

    let a = service.start(Workflow::Certification).await.unwrap();
    let b = service.start(Workflow::Certification).await.unwrap();
    let c = service.start(Workflow::Certification).await.unwrap();

    let report = service.cleanup_drafts(Workflow::Certification, 1).await.unwrap();
    assert_eq!(report.deleted, 2);

    assert!(service.summary(Workflow::Certification, a.id).await.unwrap_err().is_not_found());
    assert!(service.summary(Workflow::Certification, b.id).await.unwrap_err().is_not_found());
    assert!(service.summary(Workflow::Certification, c.id).await.is_ok());

    let report = service.cleanup_drafts(Workflow::Certification, 1).await.unwrap();
    assert_eq!(report.deleted, 0);
}

#[tokio::test]
async fn test_cleanup_removes_files_and_child_rows() {
    let harness = IntakeHarness::new().await;
    let service = &harness.service;

    let old = service.start(Workflow::Certification).await.unwrap();
    let documents = service
        .upload_documents(
            Workflow::Certification,
            old.id,
            vec![UploadedFile {
                file_name: "manual.pdf".to_string(),
                content: b"bytes".to_vec(),
            }],
            vec!["Manual".to_string()],
        )
        .await
        .unwrap();
    let stored = harness.stored(documents[0].file_path.as_deref().unwrap());
    assert!(stored.exists());

    service.start(Workflow::Certification).await.unwrap();

    let report = service.cleanup_drafts(Workflow::Certification, 1).await.unwrap();
    assert_eq!(report.deleted, 1);
    assert_eq!(report.files_removed, 1);
    assert_eq!(report.file_failures, 0);
    assert!(!stored.exists());

    let (orphans,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM technical_documents WHERE request_id = ?1")
            .bind(old.id)
            .fetch_one(harness.database.pool())
            .await
            .unwrap();
    assert_eq!(orphans, 0);
}

#[tokio::test]
async fn test_cleanup_leaves_submitted_and_other_workflows_alone() {
    let harness = IntakeHarness::new().await;
    let service = &harness.service;

    let submitted = service.start(Workflow::Certification).await.unwrap();
    service
        .submit(
            Workflow::Certification,
            submitted.id,
            &serde_json::from_value(serde_json::json!({ "selected_labs": ["Lab X"] })).unwrap(),
        )
        .await
        .unwrap();
    let testing = service.start(Workflow::Testing).await.unwrap();
    service.start(Workflow::Certification).await.unwrap();

    let report = service.cleanup_drafts(Workflow::Certification, 0).await.unwrap();
    assert_eq!(report.deleted, 1);
    assert!(service.summary(Workflow::Certification, submitted.id).await.is_ok());
    assert!(service.summary(Workflow::Testing, testing.id).await.is_ok());
}

#[tokio::test]
async fn test_negative_keep_latest_is_validation_error() {
    let harness = IntakeHarness::new().await;
    let error = harness
        .service
        .cleanup_drafts(Workflow::Certification, -3)
        .await
        .unwrap_err();
    assert!(matches!(error, IntakeError::Validation(_)));
}

#[tokio::test]
async fn test_cleanup_never_deletes_client_recorded_paths() {
    let harness = IntakeHarness::new().await;
    let service = &harness.service;

    let victim = harness.root().join("victim.txt");
    std::fs::write(&victim, b"keep me").unwrap();

    let old = service.start(Workflow::Certification).await.unwrap();
    service
        .save_documents(
            Workflow::Certification,
            old.id,
            vec![DocumentMetadata {
                doc_type: "Manual".to_string(),
                file_name: "victim.txt".to_string(),
                file_path: Some("victim.txt".to_string()),
                file_size: None,
            }],
        )
        .await
        .unwrap();
    service.start(Workflow::Certification).await.unwrap();

    let report = service.cleanup_drafts(Workflow::Certification, 1).await.unwrap();
    assert_eq!(report.deleted, 1);
    assert_eq!(report.files_removed, 0);
    assert_eq!(std::fs::read(&victim).unwrap(), b"keep me");
}
