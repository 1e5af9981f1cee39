//! # Integration Tests for the V0 Transactional Client
//!
//! Exercises `page[number]`/`page[size]` pagination, property-ID
//! batching with dedup, and the bulk charge submission against
//! wiremock servers.

use latefee_client::{ClientError, V0Client, V0Config};
use latefee_core::model::BulkChargeItem;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, property_ids: Vec<String>) -> V0Client {
    V0Client::new(V0Config {
        base: server.uri(),
        dev_id: "dev-123".into(),
        client_id: "client".into(),
        client_secret: "secret".into(),
        property_ids,
    })
    .expect("client build")
}

fn tenant(id: &str, occ: &str) -> serde_json::Value {
    serde_json::json!({
        "Id": id,
        "IntegrationId": format!("integ-{id}"),
        "OccupancyId": occ,
        "Status": "Current",
        "UnitId": "U1",
    })
}

#[tokio::test]
async fn tenants_paginate_until_short_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tenants"))
        .and(query_param("page[number]", "1"))
        .and(query_param("page[size]", "2"))
        .and(query_param("filters[Status]", "Current,Notice,Evict"))
        .and(header("X-AppFolio-Developer-ID", "dev-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [tenant("T1", "OCC-1"), tenant("T2", "OCC-2")],
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tenants"))
        .and(query_param("page[number]", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [tenant("T3", "OCC-3")],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tenants = client(&server, vec!["p1".into()])
        .with_page_size(2)
        .fetch_tenants(false)
        .await
        .expect("fetch");
    assert_eq!(tenants.len(), 3);
    assert_eq!(tenants[2].id, "T3");
}

#[tokio::test]
async fn tenants_batch_by_property_and_dedupe_by_id() {
    let server = MockServer::start().await;

    // 25 properties split into a batch of 20 and a batch of 5; the
    // same tenant comes back from both batches.
    let ids: Vec<String> = (0..25).map(|i| format!("p{i}")).collect();
    let first_batch = ids[..20].join(",");
    let second_batch = ids[20..].join(",");

    Mock::given(method("GET"))
        .and(path("/tenants"))
        .and(query_param("filters[PropertyId]", first_batch.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [tenant("T1", "OCC-1"), tenant("T2", "OCC-2")],
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tenants"))
        .and(query_param("filters[PropertyId]", second_batch.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [tenant("T1", "OCC-1"), tenant("T9", "OCC-9")],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tenants = client(&server, ids)
        .fetch_tenants(true)
        .await
        .expect("fetch");
    let mut got: Vec<&str> = tenants.iter().map(|t| t.id.as_str()).collect();
    got.sort_unstable();
    assert_eq!(got, vec!["T1", "T2", "T9"]);
}

#[tokio::test]
async fn tenant_fetch_failure_surfaces_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tenants"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .mount(&server)
        .await;

    let err = client(&server, vec!["p1".into()])
        .fetch_tenants(false)
        .await
        .expect_err("401 fails the fetch");
    assert!(matches!(err, ClientError::Api { status: 401, .. }));
}

fn bulk_item(occ: &str, amount: &str) -> BulkChargeItem {
    BulkChargeItem {
        amount_due: amount.into(),
        charged_on: "2025-08-04".into(),
        description: "IL Custom Late Fee - 08/01/2025".into(),
        gl_account_id: "gl-9".into(),
        occupancy_id: occ.into(),
        reference_id: "11111111-2222-3333-4444-555555555555".into(),
    }
}

#[tokio::test]
async fn bulk_submission_posts_data_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/charges/bulk"))
        .and(header("X-AppFolio-Developer-ID", "dev-123"))
        .and(body_partial_json(serde_json::json!({
            "data": [
                { "AmountDue": "20.00", "OccupancyId": "OCC-1" },
                { "AmountDue": "45.00", "OccupancyId": "OCC-2" },
            ],
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"created": 2})))
        .expect(1)
        .mount(&server)
        .await;

    let submitted = client(&server, vec![])
        .submit_bulk_charges(&[bulk_item("OCC-1", "20.00"), bulk_item("OCC-2", "45.00")])
        .await
        .expect("submit");
    assert_eq!(submitted, 2);
}

#[tokio::test]
async fn empty_bulk_submission_is_a_no_op() {
    let server = MockServer::start().await;
    // No mock mounted: any network call would fail the test.
    let submitted = client(&server, vec![])
        .submit_bulk_charges(&[])
        .await
        .expect("no-op");
    assert_eq!(submitted, 0);
}

#[tokio::test]
async fn bulk_submission_failure_surfaces_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/charges/bulk"))
        .respond_with(ResponseTemplate::new(422).set_body_string("invalid occupancy"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server, vec![])
        .submit_bulk_charges(&[bulk_item("OCC-BAD", "20.00")])
        .await
        .expect_err("422 fails the submit");
    match err {
        ClientError::Api { status, body, .. } => {
            assert_eq!(status, 422);
            assert_eq!(body, "invalid occupancy");
        }
        other => panic!("unexpected error: {other}"),
    }
}
