use std::time::Duration;

use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use postperson_tui::network::{create_client, execute};
use postperson_tui::{ExecutionError, Headers, HttpMethod};

#[tokio::test]
async fn test_json_response_is_captured() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"id": 1, "name": "Alice"})),
        )
        .mount(&server)
        .await;

    let client = create_client(None);
    let url = format!("{}/users/1", server.uri());
    let response = execute(&client, HttpMethod::GET, &url, &Headers::new(), "")
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert!(response.is_json());
    assert_eq!(response.content_type.as_deref(), Some("application/json"));
    assert!(response.display_body().contains("\"name\": \"Alice\""));
}

#[tokio::test]
async fn test_error_status_is_still_a_response() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
        .mount(&server)
        .await;

    let client = create_client(None);
    let url = format!("{}/missing", server.uri());
    let response = execute(&client, HttpMethod::DELETE, &url, &Headers::new(), "")
        .await
        .unwrap();

    assert_eq!(response.status, 404);
    assert_eq!(response.body, "not here");
    assert!(!response.is_json());
}

#[tokio::test]
async fn test_headers_and_body_are_sent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/items"))
        .and(header("X-Token", "abc"))
        .and(header("Content-Type", "application/json"))
        .and(body_string(r#"{"a": 1}"#))
        .respond_with(ResponseTemplate::new(201).insert_header("X-Id", "42"))
        .expect(1)
        .mount(&server)
        .await;

    let headers: Headers = [
        ("X-Token".to_string(), "abc".to_string()),
        ("Content-Type".to_string(), "application/json".to_string()),
    ]
    .into_iter()
    .collect();

    let client = create_client(None);
    let url = format!("{}/items", server.uri());
    let response = execute(&client, HttpMethod::POST, &url, &headers, r#"{"a": 1}"#)
        .await
        .unwrap();

    assert_eq!(response.status, 201);
    assert_eq!(response.headers.get("x-id"), Some("42"));
}

#[tokio::test]
async fn test_body_sent_with_get() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(body_string("query"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(None);
    let url = format!("{}/search", server.uri());
    let response = execute(&client, HttpMethod::GET, &url, &Headers::new(), "query")
        .await
        .unwrap();
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_timeout_is_a_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let client = create_client(Some(Duration::from_millis(50)));
    let url = format!("{}/slow", server.uri());
    let err = execute(&client, HttpMethod::GET, &url, &Headers::new(), "")
        .await
        .unwrap_err();

    assert!(matches!(err, ExecutionError::Transport(ref msg) if msg.starts_with("Request timed out")));
}

#[tokio::test]
async fn test_refused_connection_is_a_transport_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let client = create_client(None);
    let url = format!("http://{}/ping", addr);
    let err = execute(&client, HttpMethod::GET, &url, &Headers::new(), "")
        .await
        .unwrap_err();

    assert!(matches!(err, ExecutionError::Transport(_)));
}

#[tokio::test]
async fn test_invalid_url_never_reaches_server() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = create_client(None);
    let url = server.uri().replacen("http", "ftp", 1) + "/x";
    let err = execute(&client, HttpMethod::GET, &url, &Headers::new(), "")
        .await
        .unwrap_err();
    assert!(matches!(err, ExecutionError::InvalidUrl(_)));

    let err = execute(&client, HttpMethod::GET, "not a url", &Headers::new(), "")
        .await
        .unwrap_err();
    assert!(matches!(err, ExecutionError::InvalidUrl(_)));
}
