//! End-to-end transfer through `TransferTreeUseCase` and `DiskApiProvider`
//!
//! Lists a personal tree on the mock server, then moves it into a virtual
//! disk and checks the exact calls the server received.

use std::sync::Arc;

use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use vdmove_api::provider::DiskApiProvider;
use vdmove_core::domain::{PathPrefix, ResourceDescriptor};
use vdmove_core::ports::IDiskProvider;
use vdmove_core::usecases::TransferTreeUseCase;

use crate::common::{self, item};

#[tokio::test]
async fn test_personal_tree_moves_into_virtual_disk() {
    let (server, client) = common::setup_disk_mock().await;

    common::mount_listing_page(
        &server,
        "disk:/",
        0,
        vec![item("disk:/Photos", "dir", None)],
        None,
    )
    .await;
    common::mount_listing_page(
        &server,
        "disk:/Photos",
        0,
        vec![item("disk:/Photos/a.jpg", "file", Some(100))],
        None,
    )
    .await;

    Mock::given(method("PUT"))
        .and(path("/resources"))
        .and(query_param("path", "vd:ABC123:disk:/Photos"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/virtual-disks/resources/move"))
        .and(body_json(serde_json::json!({
            "from": "disk:/Photos/a.jpg",
            "path": "vd:ABC123:disk:/Photos/a.jpg",
            "overwrite": true
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let provider: Arc<dyn IDiskProvider> = Arc::new(DiskApiProvider::new(client));
    let items = provider
        .list_tree("disk:/", true)
        .await
        .expect("listing failed");
    assert_eq!(items.len(), 2);

    let source = PathPrefix::personal();
    let dest = PathPrefix::virtual_disk("ABC123").expect("valid id");
    let report = TransferTreeUseCase::new(provider)
        .execute(&items, &source, &dest)
        .await
        .expect("transfer failed");

    assert_eq!(report.folders_created, 1);
    assert_eq!(report.folders_existing, 0);
    assert_eq!(report.files_moved, 1);

    // Folder creation precedes the move
    let requests = server.received_requests().await.unwrap_or_default();
    let writes: Vec<&str> = requests
        .iter()
        .filter(|r| r.method.as_str() != "GET")
        .map(|r| r.method.as_str())
        .collect();
    assert_eq!(writes, ["PUT", "POST"]);
}

#[tokio::test]
async fn test_second_run_tolerates_existing_folders() {
    let (server, client) = common::setup_disk_mock().await;
    common::mount_create_folder(&server, "vd:ABC123:disk:/Photos", 409).await;
    common::mount_create_folder(&server, "vd:ABC123:disk:/Photos/2020", 409).await;

    Mock::given(method("POST"))
        .and(path("/virtual-disks/resources/move"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let items = vec![
        ResourceDescriptor::dir("disk:/Photos"),
        ResourceDescriptor::dir("disk:/Photos/2020"),
        ResourceDescriptor::file("disk:/Photos/2020/b.jpg", Some(5)),
    ];

    let provider: Arc<dyn IDiskProvider> = Arc::new(DiskApiProvider::new(client));
    let report = TransferTreeUseCase::new(provider)
        .execute(
            &items,
            &PathPrefix::personal(),
            &PathPrefix::virtual_disk("ABC123").expect("valid id"),
        )
        .await
        .expect("transfer failed");

    assert_eq!(report.folders_created, 0);
    assert_eq!(report.folders_existing, 2);
    assert_eq!(report.files_moved, 1);
}

#[tokio::test]
async fn test_forbidden_folder_aborts_before_moves() {
    let (server, client) = common::setup_disk_mock().await;
    common::mount_create_folder(&server, "vd:ABC123:disk:/Photos", 403).await;

    Mock::given(method("POST"))
        .and(path("/virtual-disks/resources/move"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let items = vec![
        ResourceDescriptor::dir("disk:/Photos"),
        ResourceDescriptor::file("disk:/Photos/a.jpg", Some(100)),
    ];

    let provider: Arc<dyn IDiskProvider> = Arc::new(DiskApiProvider::new(client));
    let result = TransferTreeUseCase::new(provider)
        .execute(
            &items,
            &PathPrefix::personal(),
            &PathPrefix::virtual_disk("ABC123").expect("valid id"),
        )
        .await;

    assert!(result.is_err());
}
