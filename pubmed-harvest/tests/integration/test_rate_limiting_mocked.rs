//! Rate limiting of real requests, observed through a manual clock
//!
//! The clock's `sleep` advances virtual time instead of waiting, so elapsed
//! virtual time tells exactly how long the limiter held requests back.

#[path = "common/mod.rs"]
mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{esearch_json, mock_client};
use futures_util::future::join_all;
use pubmed_harvest::time::ManualClock;
use pubmed_harvest::{PubMedClient, PubMedError, RateLimiter};
use rstest::rstest;
use tracing_test::traced_test;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn count_server() -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(esearch_json(&["1"], 42)))
        .mount(&mock_server)
        .await;
    mock_server
}

fn limited_client(server: &MockServer, ceiling: usize) -> (PubMedClient, RateLimiter, ManualClock) {
    let clock = ManualClock::new();
    let limiter = RateLimiter::with_clock(ceiling, Arc::new(clock.clone()));
    let client = mock_client(server, 10_000).with_rate_limiter(limiter.clone());
    (client, limiter, clock)
}

#[rstest]
#[case::one_window(2, 3, 0)]
#[case::spills_over(2, 5, 1)]
#[case::two_windows(2, 7, 2)]
#[case::ncbi_default(3, 9, 2)]
#[tokio::test]
#[traced_test]
async fn test_requests_are_spread_over_windows(
    #[case] ceiling: usize,
    #[case] requests: usize,
    #[case] expected_secs: u64,
) {
    let mock_server = count_server().await;
    let (client, _limiter, clock) = limited_client(&mock_server, ceiling);

    for _ in 0..requests {
        assert_eq!(client.total_count("rate").await.unwrap(), 42);
    }

    // `ceiling + 1` requests clear each window
    assert_eq!(clock.elapsed(), Duration::from_secs(expected_secs));
    assert_eq!(mock_server.received_requests().await.unwrap().len(), requests);
}

#[tokio::test]
async fn test_window_never_holds_more_than_ceiling_plus_admitted() {
    let mock_server = count_server().await;
    let (client, limiter, clock) = limited_client(&mock_server, 3);

    for i in 0..12u64 {
        client.total_count("rate").await.unwrap();
        assert!(limiter.recorded_in_window() <= limiter.ceiling() + 1);
        clock.advance(Duration::from_millis(90 * (i % 4)));
    }
}

#[tokio::test]
async fn test_concurrent_requests_are_spread_over_windows() {
    let mock_server = count_server().await;
    let (client, limiter, clock) = limited_client(&mock_server, 3);

    let counts = join_all((0..12).map(|_| client.total_count("rate"))).await;

    assert!(counts.into_iter().all(|count| count.unwrap() == 42));
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 12);
    // Four admissions per window: 0s, 1s, 2s
    assert_eq!(clock.elapsed(), Duration::from_secs(2));
    assert_eq!(limiter.recorded_in_window(), 4);
}

#[tokio::test]
async fn test_failed_requests_still_count() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    let (client, limiter, clock) = limited_client(&mock_server, 1);

    for _ in 0..2 {
        let result = client.total_count("rate").await;
        assert!(matches!(result, Err(PubMedError::ApiError { status: 500, .. })));
    }
    assert_eq!(limiter.recorded_in_window(), 2);
    assert!(limiter.is_exceeded());

    // A third request must wait for the first to leave the window
    let _ = client.total_count("rate").await;
    assert_eq!(clock.elapsed(), Duration::from_secs(1));
}

#[tokio::test]
async fn test_clients_sharing_a_limiter_share_the_budget() {
    let mock_server = count_server().await;
    let (first, limiter, clock) = limited_client(&mock_server, 1);
    let second = mock_client(&mock_server, 10_000).with_rate_limiter(limiter.clone());

    first.total_count("a").await.unwrap();
    second.total_count("b").await.unwrap();
    assert_eq!(clock.elapsed(), Duration::ZERO);

    first.total_count("c").await.unwrap();
    assert_eq!(clock.elapsed(), Duration::from_secs(1));
}

#[tokio::test]
async fn test_partitioned_resolution_is_rate_limited() {
    let mock_server = MockServer::start().await;
    common::mount_search(&mock_server, common::Corpus::spread(600)).await;

    let clock = ManualClock::new();
    let limiter = RateLimiter::with_clock(3, Arc::new(clock.clone()));
    let client = mock_client(&mock_server, 250).with_rate_limiter(limiter);

    let resolved = client.resolve_ids("spread", 600).await.unwrap();

    assert_eq!(resolved.len(), 600);
    let requests = resolved.search_requests as u64;
    assert_eq!(clock.elapsed(), Duration::from_secs((requests - 1) / 4));
}
