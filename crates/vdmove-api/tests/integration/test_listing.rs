//! Integration tests for paginated, recursive resource listing
//!
//! - Requests per folder equal the number of pages
//! - Recursive descent into every sub-folder
//! - Non-recursive listing stops at direct children
//! - Listing errors abort with the HTTP status
//! - Describing a single resource, including a missing one

use reqwest::StatusCode;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use vdmove_api::listing;
use vdmove_api::ApiError;
use vdmove_core::domain::ResourceKind;

use crate::common::{self, item};

#[tokio::test]
async fn test_listing_issues_one_request_per_page() {
    let (server, client) = common::setup_disk_mock().await;

    // 5 items, page size 2 -> 3 requests
    common::mount_listing_page(
        &server,
        "disk:/",
        0,
        vec![item("disk:/a", "file", Some(1)), item("disk:/b", "file", Some(2))],
        Some(2),
    )
    .await;
    common::mount_listing_page(
        &server,
        "disk:/",
        2,
        vec![item("disk:/c", "file", Some(3)), item("disk:/d", "file", Some(4))],
        Some(4),
    )
    .await;
    common::mount_listing_page(&server, "disk:/", 4, vec![item("disk:/e", "file", None)], None)
        .await;

    let items = listing::list_resources(&client, "disk:/", false, 2)
        .await
        .expect("listing failed");

    let paths: Vec<&str> = items.iter().map(|i| i.path.as_str()).collect();
    assert_eq!(paths, ["disk:/a", "disk:/b", "disk:/c", "disk:/d", "disk:/e"]);
    assert_eq!(items[3].size, Some(4));
    assert_eq!(items[4].size, None);
    assert_eq!(client.rate_limiter().calls_in_window(), 3);
}

#[tokio::test]
async fn test_listing_follows_total_without_links() {
    let (server, client) = common::setup_disk_mock().await;

    for (offset, names) in [(0u64, ["x", "y"]), (2, ["z", "w"])] {
        let items: Vec<_> = names
            .iter()
            .map(|n| item(&format!("disk:/{n}"), "file", Some(1)))
            .collect();
        Mock::given(method("GET"))
            .and(path("/resources"))
            .and(query_param("offset", offset.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "_embedded": {"items": items, "offset": offset, "limit": 2, "total": 4}
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let items = listing::list_resources(&client, "disk:/", false, 2)
        .await
        .expect("listing failed");
    assert_eq!(items.len(), 4);
}

#[tokio::test]
async fn test_empty_folder_takes_one_request() {
    let (server, client) = common::setup_disk_mock().await;
    common::mount_listing_page(&server, "disk:/", 0, vec![], None).await;

    let items = listing::list_resources(&client, "disk:/", true, 1000)
        .await
        .expect("listing failed");

    assert!(items.is_empty());
}

#[tokio::test]
async fn test_recursive_listing_descends_into_folders() {
    let (server, client) = common::setup_disk_mock().await;

    common::mount_listing_page(
        &server,
        "disk:/",
        0,
        vec![item("disk:/Photos", "dir", None), item("disk:/notes.txt", "file", Some(10))],
        None,
    )
    .await;
    common::mount_listing_page(
        &server,
        "disk:/Photos",
        0,
        vec![
            item("disk:/Photos/2020", "dir", None),
            item("disk:/Photos/a.jpg", "file", Some(100)),
        ],
        None,
    )
    .await;
    common::mount_listing_page(
        &server,
        "disk:/Photos/2020",
        0,
        vec![item("disk:/Photos/2020/b.jpg", "file", Some(200))],
        None,
    )
    .await;

    let items = listing::list_resources(&client, "disk:/", true, 1000)
        .await
        .expect("listing failed");

    let mut paths: Vec<&str> = items.iter().map(|i| i.path.as_str()).collect();
    paths.sort();
    assert_eq!(
        paths,
        [
            "disk:/Photos",
            "disk:/Photos/2020",
            "disk:/Photos/2020/b.jpg",
            "disk:/Photos/a.jpg",
            "disk:/notes.txt",
        ]
    );
    let dirs = items.iter().filter(|i| i.kind == ResourceKind::Dir).count();
    assert_eq!(dirs, 2);
}

#[tokio::test]
async fn test_non_recursive_listing_does_not_descend() {
    let (server, client) = common::setup_disk_mock().await;

    common::mount_listing_page(
        &server,
        "disk:/",
        0,
        vec![item("disk:/Photos", "dir", None)],
        None,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/resources"))
        .and(query_param("path", "disk:/Photos"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let items = listing::list_resources(&client, "disk:/", false, 1000)
        .await
        .expect("listing failed");
    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn test_listing_sends_oauth_header_and_fields() {
    let (server, client) = common::setup_disk_mock().await;

    Mock::given(method("GET"))
        .and(path("/resources"))
        .and(header("Authorization", "OAuth test-oauth-token"))
        .and(query_param("limit", "50"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "_embedded": {"items": [], "offset": 0}
        })))
        .expect(1)
        .mount(&server)
        .await;

    listing::list_resources(&client, "disk:/", false, 50)
        .await
        .expect("listing failed");

    let requests = server.received_requests().await.unwrap_or_default();
    let fields = requests[0]
        .url
        .query_pairs()
        .find(|(k, _)| k == "fields")
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default();
    assert!(fields.contains("_embedded.items.path"));
    assert!(fields.contains("_embedded.items.type"));
}

#[tokio::test]
async fn test_listing_error_propagates_status() {
    let (server, client) = common::setup_disk_mock().await;

    Mock::given(method("GET"))
        .and(path("/resources"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": "UnauthorizedError"
        })))
        .mount(&server)
        .await;

    let err = listing::list_resources(&client, "disk:/", true, 1000)
        .await
        .expect_err("listing should fail");

    assert!(matches!(err, ApiError::Http { .. }));
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
}

#[tokio::test]
async fn test_resource_info_describes_file() {
    let (server, client) = common::setup_disk_mock().await;

    Mock::given(method("GET"))
        .and(path("/resources"))
        .and(query_param("path", "disk:/report.pdf"))
        .and(query_param("fields", "name,path,type,size"))
        .respond_with(ResponseTemplate::new(200).set_body_json(item(
            "disk:/report.pdf",
            "file",
            Some(2048),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let info = listing::resource_info(&client, "disk:/report.pdf")
        .await
        .expect("lookup failed")
        .expect("resource should exist");

    assert_eq!(info.kind, ResourceKind::File);
    assert_eq!(info.name, "report.pdf");
    assert_eq!(info.size, Some(2048));
}

#[tokio::test]
async fn test_resource_info_describes_folder() {
    let (server, client) = common::setup_disk_mock().await;

    Mock::given(method("GET"))
        .and(path("/resources"))
        .and(query_param("path", "disk:/Photos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(item("disk:/Photos", "dir", None)))
        .mount(&server)
        .await;

    let info = listing::resource_info(&client, "disk:/Photos")
        .await
        .expect("lookup failed")
        .expect("resource should exist");
    assert!(info.is_dir());
}

#[tokio::test]
async fn test_resource_info_missing_path_is_none() {
    let (server, client) = common::setup_disk_mock().await;

    Mock::given(method("GET"))
        .and(path("/resources"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": "DiskNotFoundError",
            "description": "Resource not found."
        })))
        .mount(&server)
        .await;

    let info = listing::resource_info(&client, "disk:/nope")
        .await
        .expect("404 is not an error");
    assert!(info.is_none());
}
