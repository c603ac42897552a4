//! Fetch classification tests
//!
//! These tests use wiremock to serve canned responses and check how each
//! outcome is classified.

use iterscraper::config::{ColumnSpec, HttpConfig};
use iterscraper::crawler::{extract_task_rows, Columns, FetchError, MismatchPolicy, PageFetcher};
use iterscraper::Task;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher() -> PageFetcher {
    PageFetcher::from_config(&HttpConfig { timeout_secs: 1 }).expect("Failed to build client")
}

#[tokio::test]
async fn test_fetch_success_returns_body() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><p class=\"n\">A</p></body></html>")
                .insert_header("content-type", "text/html"),
        )
        .mount(&mock_server)
        .await;

    let url = format!("{}/1", mock_server.uri());
    let page = fetcher().fetch(&url).await.expect("fetch should succeed");

    assert_eq!(page.url, url);
    assert_eq!(page.status_code, 200);
    assert!(page.body.contains("class=\"n\""));
}

#[tokio::test]
async fn test_fetch_429_is_rate_limited() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let url = format!("{}/1", mock_server.uri());
    let err = fetcher().fetch(&url).await.unwrap_err();

    assert!(err.is_rate_limited());
    assert!(matches!(err, FetchError::RateLimited { .. }));
    assert!(err.to_string().contains("rate limited"));
}

#[tokio::test]
async fn test_fetch_500_is_http_error_not_rate_limited() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let url = format!("{}/1", mock_server.uri());
    let err = fetcher().fetch(&url).await.unwrap_err();

    assert!(!err.is_rate_limited());
    match &err {
        FetchError::Http { url: failed, status } => {
            assert_eq!(failed, &url);
            assert_eq!(status.as_u16(), 500);
        }
        other => panic!("expected Http error, got {:?}", other),
    }
    assert!(err.to_string().contains("500 Internal Server Error"));
}

#[tokio::test]
async fn test_fetch_404_is_http_error() {
    let mock_server = MockServer::start().await;

    // Nothing mounted: wiremock answers 404
    let url = format!("{}/missing", mock_server.uri());
    let err = fetcher().fetch(&url).await.unwrap_err();

    assert!(matches!(err, FetchError::Http { status, .. } if status.as_u16() == 404));
}

#[tokio::test]
async fn test_fetch_decodes_declared_latin1_charset() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            b"<p class=\"n\">Caf\xE9</p>".to_vec(),
            "text/html; charset=iso-8859-1",
        ))
        .mount(&mock_server)
        .await;

    let url = format!("{}/1", mock_server.uri());
    let page = fetcher().fetch(&url).await.expect("latin-1 page should decode");

    assert!(page.body.contains("Café"));

    let columns = Columns::compile(&[ColumnSpec::new("name", ".n")]).unwrap();
    let task = Task { url: url.clone(), id: 1 };
    let rows = extract_task_rows(&task, &page.body, &columns, MismatchPolicy::Pad).unwrap();
    assert_eq!(rows, vec![vec![url, "1".to_string(), "Café".to_string()]]);
}

#[tokio::test]
async fn test_fetch_windows_1252_charset() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            b"<p>\x93quoted\x94</p>".to_vec(),
            "text/html; charset=windows-1252",
        ))
        .mount(&mock_server)
        .await;

    let url = format!("{}/1", mock_server.uri());
    let page = fetcher().fetch(&url).await.expect("windows-1252 page should decode");

    assert!(page.body.contains("\u{201C}quoted\u{201D}"));
}

#[tokio::test]
async fn test_fetch_binary_body_is_parse_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"%PDF-1.4\x00\x01\x02\x03".to_vec(), "application/pdf"),
        )
        .mount(&mock_server)
        .await;

    let url = format!("{}/1", mock_server.uri());
    let err = fetcher().fetch(&url).await.unwrap_err();

    assert!(matches!(err, FetchError::Parse { .. }));
    assert_eq!(err.url(), url);
}

#[tokio::test]
async fn test_fetch_timeout_is_transport_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let url = format!("{}/slow", mock_server.uri());
    let err = fetcher().fetch(&url).await.unwrap_err();

    assert!(matches!(err, FetchError::Transport { .. }));
    assert!(err.to_string().contains(&url));
}

#[tokio::test]
async fn test_fetch_connection_refused_is_transport_error() {
    // Reserve a free port, then release it so nothing is listening there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("No local addr").port();
    drop(listener);

    let url = format!("http://127.0.0.1:{}/1", port);
    let err = fetcher().fetch(&url).await.unwrap_err();

    assert!(matches!(err, FetchError::Transport { .. }));
    assert_eq!(err.url(), url);
}
