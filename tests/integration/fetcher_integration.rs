//! Integration tests for paginated fetching against a mock Afdian API

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::fixtures::{order, page};
use crate::common::logging::{log_test_data, log_test_step};
use crate::common::mock_api::{
    endpoint, request_params, test_api_config, test_credentials, PageIs, SignatureIsValid, ORDER_PATH,
};
use sponsor_sync::api::{AfdianClient, PageParams, SponsorSource, StopReason};
use sponsor_sync::error::{FetchError, PageRejection};

fn client_for(server: &MockServer) -> AfdianClient {
    AfdianClient::new(test_credentials(), test_api_config(server)).expect("Failed to build client")
}

#[test_log::test(tokio::test)]
async fn test_stops_at_declared_total_page() {
    log_test_step("Three pages declared, page 4 must never be requested");
    let server = MockServer::start().await;

    for n in 1..=3u64 {
        Mock::given(method("POST"))
            .and(path(ORDER_PATH))
            .and(PageIs(n))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(
                vec![order(&format!("u{n}a"), 10), order(&format!("u{n}b"), 20)],
                3,
            )))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("POST"))
        .and(path(ORDER_PATH))
        .and(PageIs(4))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![order("u4", 1)], 3)))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let outcome = client.fetch_all(&endpoint(&server, ORDER_PATH)).await;
    log_test_data("Fetch outcome", &outcome.stop);

    assert_eq!(outcome.stop, StopReason::LastPage);
    assert_eq!(outcome.pages_fetched, 3);
    assert_eq!(outcome.items.len(), 6);
    assert_eq!(outcome.items[0]["user_id"], "u1a");
    assert_eq!(outcome.items[5]["user_id"], "u3b");
}

#[test_log::test(tokio::test)]
async fn test_stops_on_empty_page() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(PageIs(1))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ec": 200,
            "data": {"list": [order("u1", 1), order("u2", 2)]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(PageIs(2))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ec": 200, "data": {"list": []}})))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client_for(&server).fetch_all(&endpoint(&server, ORDER_PATH)).await;

    assert_eq!(outcome.stop, StopReason::EmptyPage);
    assert_eq!(outcome.pages_fetched, 2);
    assert_eq!(outcome.items.len(), 2);
}

#[test_log::test(tokio::test)]
async fn test_stops_at_page_cap() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![order("u", 1)], 1000)))
        .expect(4)
        .mount(&server)
        .await;

    let mut config = test_api_config(&server);
    config.max_pages = 4;
    let client = AfdianClient::new(test_credentials(), config).unwrap();

    let outcome = client.fetch_all(&endpoint(&server, ORDER_PATH)).await;

    assert_eq!(outcome.stop, StopReason::PageCap);
    assert_eq!(outcome.pages_fetched, 4);
    assert_eq!(outcome.items.len(), 4);
}

#[test_log::test(tokio::test)]
async fn test_requests_are_signed_and_paged() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(SignatureIsValid(test_credentials()))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![order("u1", 1)], 1)))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client_for(&server).fetch_all(&endpoint(&server, ORDER_PATH)).await;
    assert_eq!(outcome.stop, StopReason::LastPage);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(request_params(&requests[0]).unwrap(), json!({"page": 1, "per_page": 2}));

    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["params"], r#"{"page":1,"per_page":2}"#);
    assert_eq!(body["user_id"], "test-user");
}

#[test_log::test(tokio::test)]
async fn test_retry_exhaustion_surfaces_one_error() {
    log_test_step("Every attempt fails with 500");
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client
        .post_with_retry(&endpoint(&server, ORDER_PATH), &PageParams { page: 1, per_page: 2 })
        .await;

    match result {
        Err(FetchError::Status { status, body }) => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "upstream down");
        }
        other => panic!("expected a status error, got {:?}", other),
    }
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[test_log::test(tokio::test)]
async fn test_transient_failures_are_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![order("u1", 1)], 1)))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client_for(&server).fetch_all(&endpoint(&server, ORDER_PATH)).await;

    assert_eq!(outcome.stop, StopReason::LastPage);
    assert_eq!(outcome.items.len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_undecodable_body_is_retried_then_halts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(PageIs(1))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![order("u1", 1), order("u2", 2)], 5)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(PageIs(2))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .expect(3)
        .mount(&server)
        .await;

    let outcome = client_for(&server).fetch_all(&endpoint(&server, ORDER_PATH)).await;

    assert!(matches!(outcome.stop, StopReason::RequestFailed { page: 2, .. }));
    assert_eq!(outcome.pages_fetched, 1);
    assert_eq!(outcome.items.len(), 2);
}

#[test_log::test(tokio::test)]
async fn test_rejected_page_keeps_prior_pages() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(PageIs(1))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![order("u1", 1), order("u2", 2)], 5)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(PageIs(2))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ec": 400005, "em": "sign error"})))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client_for(&server).fetch_all(&endpoint(&server, ORDER_PATH)).await;

    assert_eq!(
        outcome.stop,
        StopReason::Rejected {
            page: 2,
            reason: PageRejection::ErrorCode {
                ec: Some(400005),
                em: Some("sign error".to_string())
            }
        }
    );
    assert_eq!(outcome.items.len(), 2);
}

#[test_log::test(tokio::test)]
async fn test_non_array_list_is_rejected_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ec": 200, "data": {"list": "nope"}})))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client_for(&server).fetch_all(&endpoint(&server, ORDER_PATH)).await;

    assert_eq!(
        outcome.stop,
        StopReason::Rejected {
            page: 1,
            reason: PageRejection::ListNotArray
        }
    );
    assert!(outcome.items.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_source_trait_uses_configured_endpoints() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/open/query-sponsor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![json!({"user": {"user_id": "u1", "name": "Alice"}})],
            1,
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(ORDER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![order("u1", 5)], 1)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let profiles = client.fetch_profiles().await.unwrap();
    let transactions = client.fetch_transactions().await.unwrap();

    assert_eq!(profiles.len(), 1);
    assert_eq!(transactions.len(), 1);
    assert_eq!(profiles[0]["user"]["name"], "Alice");
}
