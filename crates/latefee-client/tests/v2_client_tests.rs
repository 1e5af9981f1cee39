//! # Integration Tests for the V2 Reporting Client
//!
//! Exercises pagination following, the SSRF host guard, retry on
//! transient statuses, GL-account filtering, and the tenant-directory
//! request fallback against wiremock servers.

use latefee_client::{ClientError, V2Client, V2Config};
use wiremock::matchers::{body_partial_json, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> V2Client {
    V2Client::new(V2Config {
        base: server.uri(),
        user: "reporter".into(),
        pass: "secret".into(),
        property_ids: vec!["101".into(), "102".into()],
    })
    .expect("client build")
}

fn aged_record(prop: &str, account: &str, total: &str) -> serde_json::Value {
    serde_json::json!({
        "property_name": prop,
        "unit_name": "1A",
        "payer_name": "Doe, Jane",
        "occupancy_id": "occ-1",
        "0_to30": "100.00",
        "total_amount": total,
        "account_number": account,
        "unit_id": 7,
        "property_id": 101,
        "posting_date": "2025-08-02",
        "invoice_occurred_on": "2025-08-04",
    })
}

#[tokio::test]
async fn aged_receivables_follows_next_page_url() {
    let server = MockServer::start().await;

    // First page: the full query body, envelope response with a
    // relative continuation URL.
    Mock::given(method("POST"))
        .and(path("/aged_receivables_detail.json"))
        .and(header_exists("Authorization"))
        .and(body_partial_json(serde_json::json!({
            "property_visibility": "active",
            "properties": { "properties_ids": ["101", "102"] },
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [aged_record("Elm Street", "4815-000", "1200")],
            "next_page_url": "/aged_receivables_detail.json?page=2",
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Continuation page: POSTed with an empty body, no further link.
    Mock::given(method("POST"))
        .and(path("/aged_receivables_detail.json"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [aged_record("Oak Avenue", "4815-000", "800")],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let rows = client(&server)
        .fetch_aged_receivables("")
        .await
        .expect("fetch");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].property_name, "Elm Street");
    assert_eq!(rows[1].property_name, "Oak Avenue");
    // Numeric identifier columns normalize to strings.
    assert_eq!(rows[0].v2_unit_id, "7");
    assert_eq!(rows[0].v2_property_id, "101");
}

#[tokio::test]
async fn aged_receivables_accepts_bare_array_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/aged_receivables_detail.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            aged_record("Elm Street", "4815-000", "1200"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let rows = client(&server)
        .fetch_aged_receivables("")
        .await
        .expect("fetch");
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn gl_account_filter_drops_other_accounts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/aged_receivables_detail.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [
                aged_record("Elm Street", "4815-000", "1200"),
                aged_record("Oak Avenue", "9999-000", "900"),
            ],
        })))
        .mount(&server)
        .await;

    let rows = client(&server)
        .fetch_aged_receivables("4815-000")
        .await
        .expect("fetch");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].property_name, "Elm Street");
}

#[tokio::test]
async fn pagination_refuses_foreign_host() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/aged_receivables_detail.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [aged_record("Elm Street", "4815-000", "1200")],
            "next_page_url": "http://evil.example/aged_receivables_detail.json?page=2",
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch_aged_receivables("")
        .await
        .expect_err("must refuse foreign host");
    assert!(matches!(err, ClientError::PaginationHostMismatch { .. }));
}

#[tokio::test]
async fn transient_status_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/aged_receivables_detail.json"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/aged_receivables_detail.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [aged_record("Elm Street", "4815-000", "1200")],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let rows = client(&server)
        .fetch_aged_receivables("")
        .await
        .expect("retry then succeed");
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn non_transient_status_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/aged_receivables_detail.json"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch_aged_receivables("")
        .await
        .expect_err("403 is not retryable");
    match err {
        ClientError::Api { status, body, .. } => {
            assert_eq!(status, 403);
            assert_eq!(body, "forbidden");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn tenant_directory_falls_back_through_request_bodies() {
    let server = MockServer::start().await;

    // The column-less variant is rejected by this report version.
    Mock::given(method("POST"))
        .and(path("/tenant_directory.json"))
        .respond_with(ResponseTemplate::new(400).set_body_string("columns required"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    // The "unit" column variant succeeds.
    Mock::given(method("POST"))
        .and(path("/tenant_directory.json"))
        .and(body_partial_json(serde_json::json!({
            "columns": ["property_name", "unit", "occupancy_import_uid",
                        "tenant_integration_id", "status"],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{
                "occupancy_import_uid": "UID-1",
                "tenant_integration_id": "T1",
                "status": "Current",
                "property_name": "Elm Street",
                "unit": "1A",
            }],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let entries = client(&server)
        .fetch_tenant_directory()
        .await
        .expect("fallback succeeds");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].occupancy_import_uid, "UID-1");
    assert_eq!(entries[0].unit, "1A");
}
