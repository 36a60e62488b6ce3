//! Failure modes surfaced by the client
//!
//! Nothing is retried: every transport or decoding failure reaches the caller
//! as a `PubMedError`, and the enclosing operation stops.

#[path = "common/mod.rs"]
mod common;

use common::{esearch_json, mock_client};
use futures_util::StreamExt;
use pubmed_harvest::{ClientConfig, PubMedClient, PubMedError};
use rstest::rstest;
use serde_json::json;
use tracing_test::traced_test;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn search_answering(template: ResponseTemplate) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(template)
        .mount(&mock_server)
        .await;
    mock_server
}

async fn fetch_answering(template: ResponseTemplate) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(template)
        .mount(&mock_server)
        .await;
    mock_server
}

#[rstest]
#[case::server_error(500, "Internal Server Error")]
#[case::unavailable(503, "Service Unavailable")]
#[case::too_many_requests(429, "Too Many Requests")]
#[tokio::test]
#[traced_test]
async fn test_http_status_becomes_api_error(#[case] status: u16, #[case] reason: &str) {
    let mock_server = search_answering(ResponseTemplate::new(status)).await;
    let client = mock_client(&mock_server, 10_000);

    match client.total_count("status").await {
        Err(PubMedError::ApiError {
            status: got,
            message,
        }) => {
            assert_eq!(got, status);
            assert_eq!(message, reason);
        }
        other => panic!("expected ApiError, got {:?}", other),
    }

    // No retry
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_search_without_count_is_malformed() {
    let body = json!({"esearchresult": {"retmax": "0", "idlist": []}});
    let mock_server = search_answering(ResponseTemplate::new(200).set_body_json(body)).await;
    let client = mock_client(&mock_server, 10_000);

    let err = client.total_count("no count").await.unwrap_err();
    assert!(matches!(err, PubMedError::MalformedResponse { .. }));
    assert!(err.is_malformed());
    assert!(!err.is_transport());
}

#[tokio::test]
async fn test_search_without_idlist_is_malformed() {
    let body = json!({"esearchresult": {"count": "3"}});
    let mock_server = search_answering(ResponseTemplate::new(200).set_body_json(body)).await;
    let client = mock_client(&mock_server, 10_000);

    // The count alone is enough for `total_count`
    assert_eq!(client.total_count("no ids").await.unwrap(), 3);

    let err = client.resolve_ids("no ids", 100).await.unwrap_err();
    assert!(matches!(err, PubMedError::MalformedResponse { .. }));
}

#[tokio::test]
async fn test_search_with_invalid_json() {
    let mock_server =
        search_answering(ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await;
    let client = mock_client(&mock_server, 10_000);

    let err = client.resolve_ids("garbled", 10).await.unwrap_err();
    assert!(matches!(err, PubMedError::JsonError(_)));
    assert!(err.is_malformed());
}

#[tokio::test]
async fn test_search_error_field_becomes_api_error() {
    let body = json!({
        "esearchresult": {
            "count": "0",
            "idlist": [],
            "ERROR": "Invalid query syntax"
        }
    });
    let mock_server = search_answering(ResponseTemplate::new(200).set_body_json(body)).await;
    let client = mock_client(&mock_server, 10_000);

    let err = client.total_count("((").await.unwrap_err();
    assert!(!err.is_transport());
    match err {
        PubMedError::ApiError { status, message } => {
            assert_eq!(status, 200);
            assert!(message.contains("Invalid query syntax"));
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_not_found() {
    let mock_server = fetch_answering(ResponseTemplate::new(404)).await;
    let client = mock_client(&mock_server, 10_000);

    let err = client.fetch_records(&["31978945"]).await.unwrap_err();
    assert!(matches!(err, PubMedError::ApiError { status: 404, .. }));
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_fetch_with_malformed_xml() {
    let mock_server = fetch_answering(
        ResponseTemplate::new(200)
            .set_body_string("<PubmedArticleSet><PubmedArticle><MedlineCitation>"),
    )
    .await;
    let client = mock_client(&mock_server, 10_000);

    let err = client.fetch_from_ids(&["1", "2"], 10).await.unwrap_err();
    assert!(matches!(err, PubMedError::XmlError(_)));
    assert!(err.is_malformed());
}

#[tokio::test]
async fn test_failed_batch_aborts_the_whole_fetch() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<PubmedArticleSet>{}</PubmedArticleSet>",
            common::article_xml("1")
        )))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;
    let client = mock_client(&mock_server, 10_000);

    let err = client.fetch_from_ids(&["1", "2", "3"], 1).await.unwrap_err();

    assert!(matches!(err, PubMedError::ApiError { status: 502, .. }));
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
#[traced_test]
async fn test_failure_inside_partition_propagates() {
    let mock_server = MockServer::start().await;
    let ids: Vec<String> = (1..=10).map(|id| id.to_string()).collect();
    let ids: Vec<&str> = ids.iter().map(String::as_str).collect();

    // The top-level window overflows the cap, every sub-window search fails
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(esearch_json(&ids, 25)))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;
    let client = mock_client(&mock_server, 10);

    let err = client.resolve_ids("big", 100).await.unwrap_err();

    assert!(matches!(err, PubMedError::ApiError { status: 503, .. }));
    // Recursion stops at the first failing sub-window
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_stream_reports_resolution_failure_then_ends() {
    let mock_server = search_answering(ResponseTemplate::new(500)).await;
    let client = mock_client(&mock_server, 10_000);

    let items: Vec<_> = client.fetch_all_streaming("broken", 5).collect().await;

    assert_eq!(items.len(), 1);
    assert!(matches!(
        items[0],
        Err(PubMedError::ApiError { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_connection_failure_is_transport() {
    // Nothing listens on the discard port
    let config = ClientConfig::new()
        .with_base_url("http://127.0.0.1:9")
        .with_rate_limit(100);
    let client = PubMedClient::with_config(config);

    let err = client.total_count("unreachable").await.unwrap_err();

    assert!(matches!(err, PubMedError::RequestError(_)));
    assert!(err.is_transport());
    assert_eq!(client.rate_limiter().recorded_in_window(), 1);
}

#[tokio::test]
async fn test_invalid_ids_are_rejected_before_any_request() {
    let mock_server = MockServer::start().await;
    let client = mock_client(&mock_server, 10_000);

    for bad in ["", "abc", "0", "-5", "12a", "99999999999"] {
        let err = client.fetch_from_ids(&["1", bad], 10).await.unwrap_err();
        assert!(
            matches!(err, PubMedError::InvalidPmid { .. }),
            "{:?} should be rejected",
            bad
        );
    }

    assert!(mock_server.received_requests().await.unwrap().is_empty());
}
