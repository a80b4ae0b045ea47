//! Integration tests for folder creation, moves and operation polling
//!
//! - 201 and 409 on folder creation succeed, other statuses fail
//! - Move requests carry `{from, path, overwrite}`
//! - 202 answers are polled until success, failure or the poll budget runs out
//! - Status checks take rate limiter slots

use reqwest::{Method, StatusCode};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use vdmove_api::provider::DiskApiProvider;
use vdmove_api::ApiError;
use vdmove_core::ports::{FolderStatus, IDiskProvider};

use crate::common;

// ============================================================================
// Folder creation
// ============================================================================

#[tokio::test]
async fn test_ensure_folder_created() {
    let (server, client) = common::setup_disk_mock().await;
    common::mount_create_folder(&server, "vd:ABC123:disk:/Photos", 201).await;

    let provider = DiskApiProvider::new(client);
    let status = provider
        .ensure_folder("vd:ABC123:disk:/Photos")
        .await
        .expect("folder creation failed");

    assert_eq!(status, FolderStatus::Created);
}

#[tokio::test]
async fn test_ensure_folder_conflict_is_not_an_error() {
    let (server, client) = common::setup_disk_mock().await;
    common::mount_create_folder(&server, "vd:ABC123:disk:/Photos", 409).await;

    let provider = DiskApiProvider::new(client);
    let status = provider
        .ensure_folder("vd:ABC123:disk:/Photos")
        .await
        .expect("409 should be tolerated");

    assert_eq!(status, FolderStatus::AlreadyExists);
}

#[tokio::test]
async fn test_ensure_folder_forbidden_propagates() {
    let (server, client) = common::setup_disk_mock().await;
    common::mount_create_folder(&server, "vd:ABC123:disk:/Photos", 403).await;

    let provider = DiskApiProvider::new(client);
    let err = provider
        .ensure_folder("vd:ABC123:disk:/Photos")
        .await
        .expect_err("403 should fail");

    let api_err = err.downcast_ref::<ApiError>().expect("ApiError in chain");
    assert_eq!(api_err.status(), Some(StatusCode::FORBIDDEN));
    assert!(format!("{err:#}").contains("vd:ABC123:disk:/Photos"));
}

// ============================================================================
// Moves
// ============================================================================

#[tokio::test]
async fn test_move_sends_expected_body() {
    let (server, client) = common::setup_disk_mock().await;

    Mock::given(method("POST"))
        .and(path("/virtual-disks/resources/move"))
        .and(header("Authorization", "OAuth test-oauth-token"))
        .and(body_json(serde_json::json!({
            "from": "disk:/Photos/a.jpg",
            "path": "vd:ABC123:disk:/Photos/a.jpg",
            "overwrite": true
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "href": "https://cloud-api.yandex.net/v1/disk/resources?path=x",
            "method": "GET",
            "templated": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = DiskApiProvider::new(client);
    provider
        .move_resource("disk:/Photos/a.jpg", "vd:ABC123:disk:/Photos/a.jpg", true)
        .await
        .expect("move failed");
}

#[tokio::test]
async fn test_move_error_propagates() {
    let (server, client) = common::setup_disk_mock().await;

    Mock::given(method("POST"))
        .and(path("/virtual-disks/resources/move"))
        .respond_with(ResponseTemplate::new(507).set_body_string("insufficient storage"))
        .mount(&server)
        .await;

    let provider = DiskApiProvider::new(client);
    let err = provider
        .move_resource("disk:/big.iso", "vd:ABC123:disk:/big.iso", true)
        .await
        .expect_err("507 should fail");

    let api_err = err.downcast_ref::<ApiError>().expect("ApiError in chain");
    assert_eq!(api_err.status(), Some(StatusCode::INSUFFICIENT_STORAGE));
}

// ============================================================================
// Asynchronous operations
// ============================================================================

#[tokio::test]
async fn test_accepted_move_polls_until_success() {
    let (server, client) = common::setup_disk_mock().await;
    common::mount_move_accepted(&server, "op-1").await;
    common::mount_operation(&server, "op-1", 2, "success").await;

    let provider = DiskApiProvider::new(client);
    provider
        .move_resource("disk:/a.txt", "vd:ABC123:disk:/a.txt", true)
        .await
        .expect("move failed");

    let requests = server.received_requests().await.unwrap_or_default();
    let polls = requests
        .iter()
        .filter(|r| r.url.path() == "/operations/op-1")
        .count();
    assert_eq!(polls, 3);
    // 1 move + 3 status checks, all rate limited
    assert_eq!(provider.client().rate_limiter().calls_in_window(), 4);
}

#[tokio::test]
async fn test_status_checks_are_authorized() {
    let (server, client) = common::setup_disk_mock().await;
    common::mount_move_accepted(&server, "op-auth").await;

    Mock::given(method("GET"))
        .and(path("/operations/op-auth"))
        .and(header("Authorization", "OAuth test-oauth-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "success"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    client
        .call(Method::POST, "/virtual-disks/resources/move", &[], None)
        .await
        .expect("call failed");
}

#[tokio::test]
async fn test_failed_operation_is_an_error() {
    let (server, client) = common::setup_disk_mock().await;
    common::mount_move_accepted(&server, "op-2").await;
    common::mount_operation(&server, "op-2", 1, "failed").await;

    let err = client
        .call(Method::POST, "/virtual-disks/resources/move", &[], None)
        .await
        .expect_err("failed operation should be an error");

    match err {
        ApiError::OperationFailed { href } => assert!(href.ends_with("/operations/op-2")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_pending_operation_times_out() {
    let (server, client) = common::setup_disk_mock().await;
    let client = client.with_poll_policy(common::fast_poll(3));
    common::mount_move_accepted(&server, "op-3").await;

    Mock::given(method("GET"))
        .and(path("/operations/op-3"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "in-progress"})),
        )
        .expect(3)
        .mount(&server)
        .await;

    let err = client
        .call(Method::POST, "/virtual-disks/resources/move", &[], None)
        .await
        .expect_err("pending operation should time out");

    assert!(matches!(err, ApiError::OperationTimeout { attempts: 3, .. }));
}

#[tokio::test]
async fn test_accepted_without_link_is_invalid() {
    let (server, client) = common::setup_disk_mock().await;

    Mock::given(method("POST"))
        .and(path("/virtual-disks/resources/move"))
        .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let err = client
        .call(Method::POST, "/virtual-disks/resources/move", &[], None)
        .await
        .expect_err("202 without href should fail");

    assert!(matches!(err, ApiError::InvalidResponse(_)));
}
