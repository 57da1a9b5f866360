/// Document upload tests writing real files under a temporary root
use lab_intake::intake::{IntakeError, UploadedFile};
use lab_intake::workflows::Workflow;

mod fixtures;
use fixtures::test_harness::IntakeHarness;

fn file(name: &str, content: &[u8]) -> UploadedFile {
    UploadedFile {
        file_name: name.to_string(),
        content: content.to_vec(),
    }
}

#[tokio::test]
async fn test_upload_writes_files_and_records_rows() {
    let harness = IntakeHarness::new().await;
    let request = harness.service.start(Workflow::Certification).await.unwrap();

    let documents = harness
        .service
        .upload_documents(
            Workflow::Certification,
            request.id,
            vec![
                file("C:\\Users\\me\\manual.pdf", b"manual bytes"),
                file("../../schematic.png", b"png"),
            ],
            vec!["User Manual".to_string(), "Schematic".to_string()],
        )
        .await
        .unwrap();

    assert_eq!(documents.len(), 2);
    let expected = format!(
        "database/upload/certification_requests/{}/User Manual_manual.pdf",
        request.id
    );
    assert_eq!(documents[0].file_path.as_deref(), Some(expected.as_str()));
    assert_eq!(documents[0].file_name, "manual.pdf");
    assert_eq!(documents[0].file_size, 12);
    assert_eq!(documents[0].display_order, 0);
    assert_eq!(documents[1].file_name, "schematic.png");
    assert_eq!(documents[1].display_order, 1);

    let stored = std::fs::read(harness.stored(&expected)).unwrap();
    assert_eq!(stored, b"manual bytes");

    let full = harness.service.full(Workflow::Certification, request.id).await.unwrap();
    let ids: Vec<i64> = full.documents.iter().map(|d| d.id).collect();
    assert_eq!(ids, documents.iter().map(|d| d.id).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_mismatched_lists_fail_before_writing() {
    let harness = IntakeHarness::new().await;
    let request = harness.service.start(Workflow::Testing).await.unwrap();

    let error = harness
        .service
        .upload_documents(
            Workflow::Testing,
            request.id,
            vec![file("a.pdf", b"a")],
            vec!["Manual".to_string(), "Extra".to_string()],
        )
        .await
        .unwrap_err();
    assert!(matches!(error, IntakeError::Validation(_)));

    let request_dir = harness
        .stored(&harness.service.layout().request_dir(Workflow::Testing, request.id));
    assert!(!request_dir.exists());
    let full = harness.service.full(Workflow::Testing, request.id).await.unwrap();
    assert!(full.documents.is_empty());
}

#[tokio::test]
async fn test_upload_to_missing_request_is_not_found() {
    let harness = IntakeHarness::new().await;

    let error = harness
        .service
        .upload_documents(
            Workflow::Design,
            999,
            vec![file("a.pdf", b"a")],
            vec!["Manual".to_string()],
        )
        .await
        .unwrap_err();
    assert!(error.is_not_found());
}

#[tokio::test]
async fn test_repeat_upload_appends() {
    let harness = IntakeHarness::new().await;
    let request = harness.service.start(Workflow::Design).await.unwrap();

    for _ in 0..2 {
        harness
            .service
            .upload_documents(
                Workflow::Design,
                request.id,
                vec![file("spec.pdf", b"v")],
                vec!["Spec".to_string()],
            )
            .await
            .unwrap();
    }

    let full = harness.service.full(Workflow::Design, request.id).await.unwrap();
    assert_eq!(full.documents.len(), 2);
    assert_eq!(full.documents[0].file_path, full.documents[1].file_path);
}
