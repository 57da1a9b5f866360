/// HTTP contract tests against an ephemeral server
use reqwest::{multipart, Client, StatusCode};
use serde_json::{json, Value};

mod fixtures;
use fixtures::test_harness::IntakeHarness;

async fn start(client: &Client, base: &str, prefix: &str) -> i64 {
    let response = client
        .post(format!("{base}/{prefix}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_end_to_end_testing_request_over_http() {
    let harness = IntakeHarness::new().await;
    let base = format!("http://{}", harness.spawn_server(1).await);
    let client = Client::new();

    let response = client.post(format!("{base}/testing-request/")).send().await.unwrap();
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["status"], "submitted");
    let id = created["id"].as_i64().unwrap();

    let saved: Value = client
        .post(format!("{base}/testing-request/{id}/product"))
        .json(&json!({ "eut_name": "Widget" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(saved, json!({ "status": "saved" }));

    let response = client
        .post(format!("{base}/testing-request/{id}/requirements"))
        .json(&json!({ "test_type": "EMC", "selected_tests": ["radiated"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let submitted: Value = client
        .post(format!("{base}/testing-request/{id}/submit"))
        .json(&json!({ "selected_labs": ["Lab X"], "region": { "country": "India" } }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(submitted, json!({ "status": "submitted" }));

    let full: Value = client
        .get(format!("{base}/testing-request/{id}/full"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(full["request"]["status"], "submitted");
    assert_eq!(full["product"]["eut_name"], "Widget");
    assert_eq!(full["requirements"]["selected_tests"], json!(["radiated"]));
    assert_eq!(full["lab"]["selected_labs"], json!(["Lab X"]));
    assert_eq!(full["lab"]["region"], json!({ "country": "India" }));
    assert_eq!(full["documents"], json!([]));
    assert!(full["standards"].is_null());
}

#[tokio::test]
async fn test_not_found_and_unmounted_steps() {
    let harness = IntakeHarness::new().await;
    let base = format!("http://{}", harness.spawn_server(1).await);
    let client = Client::new();

    let response = client.get(format!("{base}/design-request/777")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("not found"));

    let response = client.get(format!("{base}/design-request/777/full")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client
        .post(format!("{base}/testing-request/777/standards"))
        .json(&json!({ "regions": [], "standards": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let id = start(&client, &base, "certification-request").await;
    let response = client
        .post(format!("{base}/certification-request/{id}/product"))
        .json(&json!({ "eut_name": "Widget" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client.get(format!("{base}/unknown-request/1")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_json_document_metadata() {
    let harness = IntakeHarness::new().await;
    let base = format!("http://{}", harness.spawn_server(1).await);
    let client = Client::new();
    let id = start(&client, &base, "design-request").await;

    let body: Value = client
        .post(format!("{base}/design-request/{id}/documents"))
        .json(&json!({ "documents": [
            { "doc_type": "Manual", "file_name": "a.pdf", "file_path": "x/a.pdf", "file_size": 10 },
            { "doc_type": "Photo", "file_name": "b.jpg" }
        ]}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({ "status": "documents saved", "count": 2 }));

    let full: Value = client
        .get(format!("{base}/design-request/{id}/full"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(full["documents"][1]["file_size"], 0);
    assert_eq!(full["documents"][1]["display_order"], 1);
}

#[tokio::test]
async fn test_multipart_upload() {
    let harness = IntakeHarness::new().await;
    let base = format!("http://{}", harness.spawn_server(1).await);
    let client = Client::new();
    let id = start(&client, &base, "certification-request").await;

    let form = multipart::Form::new()
        .part("files", multipart::Part::bytes(b"first".to_vec()).file_name("manual.pdf"))
        .part("files", multipart::Part::bytes(b"second".to_vec()).file_name("photo.jpg"))
        .text("doc_types", "Manual")
        .text("doc_types", "Photo");

    let response = client
        .post(format!("{base}/certification-request/{id}/upload-documents"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let documents: Value = response.json().await.unwrap();
    assert_eq!(documents.as_array().unwrap().len(), 2);

    let relative = documents[1]["file_path"].as_str().unwrap().to_string();
    assert_eq!(
        relative,
        format!("database/upload/certification_requests/{id}/Photo_photo.jpg")
    );
    assert_eq!(std::fs::read(harness.stored(&relative)).unwrap(), b"second");

    let form = multipart::Form::new()
        .part("files", multipart::Part::bytes(b"x".to_vec()).file_name("x.pdf"));
    let response = client
        .post(format!("{base}/certification-request/{id}/documents"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_lab_draft_keeps_region() {
    let harness = IntakeHarness::new().await;
    let base = format!("http://{}", harness.spawn_server(1).await);
    let client = Client::new();
    let id = start(&client, &base, "certification-request").await;

    client
        .post(format!("{base}/certification-request/{id}/lab-selection/draft"))
        .json(&json!({ "selected_labs": ["Lab X"], "region": { "country": "India", "city": "Pune" } }))
        .send()
        .await
        .unwrap();

    let body: Value = client
        .post(format!("{base}/certification-request/{id}/lab-selection/draft"))
        .json(&json!({ "selected_labs": ["Lab Y"], "region": null, "remarks": "call first" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "draft saved");
    assert_eq!(body["lab"]["selected_labs"], json!(["Lab Y"]));
    assert_eq!(body["lab"]["region"], json!({ "country": "India", "city": "Pune" }));
    assert_eq!(body["lab"]["remarks"], "call first");

    let summary: Value = client
        .get(format!("{base}/certification-request/{id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(summary["status"], "draft");
}

#[tokio::test]
async fn test_draft_lookup_and_cleanup() {
    let harness = IntakeHarness::new().await;
    let base = format!("http://{}", harness.spawn_server(1).await);
    let client = Client::new();

    let response = client
        .get(format!("{base}/certification-request/draft"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "No draft found");

    start(&client, &base, "certification-request").await;
    start(&client, &base, "certification-request").await;
    let newest = start(&client, &base, "certification-request").await;

    client
        .post(format!("{base}/certification-request/{newest}/details"))
        .json(&json!({
            "target_region": "EU",
            "product_name": "Lamp",
            "product_category": "Lighting",
            "standards": ["CE"],
            "estimated_fee_range": "1000-1500"
        }))
        .send()
        .await
        .unwrap();

    let draft: Value = client
        .get(format!("{base}/certification-request/draft"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(draft["id"], newest);
    assert_eq!(draft["details"]["product_name"], "Lamp");

    // default keep_latest comes from the server state
    let body: Value = client
        .delete(format!("{base}/certification-request/cleanup-drafts"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        body,
        json!({ "status": "success", "deleted_count": 2, "message": "Deleted 2 old draft(s)" })
    );

    let body: Value = client
        .delete(format!("{base}/certification-request/cleanup-drafts?keep_latest=1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["deleted_count"], 0);

    let response = client
        .delete(format!("{base}/certification-request/cleanup-drafts?keep_latest=-1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = client
        .delete(format!("{base}/testing-request/cleanup-drafts"))
        .send()
        .await
        .unwrap();
    assert_ne!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_step_bodies_use_detail_shape() {
    let harness = IntakeHarness::new().await;
    let base = format!("http://{}", harness.spawn_server(1).await);
    let client = Client::new();
    let id = start(&client, &base, "testing-request").await;

    let response = client
        .post(format!("{base}/testing-request/{id}/product"))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert!(body["detail"].is_string());

    let response = client
        .post(format!("{base}/testing-request/{id}/submit"))
        .json(&json!({ "selected_labs": "Lab X" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert!(body["detail"].is_string());

    let response = client
        .post(format!("{base}/testing-request/{id}/lab-selection/submit"))
        .json(&json!({ "selected_labs": ["Lab X"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_check() {
    let harness = IntakeHarness::new().await;
    let base = format!("http://{}", harness.spawn_server(1).await);

    let body: Value = reqwest::get(format!("{base}/healthz"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "healthy");
}
