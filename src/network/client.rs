//! HTTP client wrapper - validates, executes requests and captures responses

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use url::Url;

use crate::error::ExecutionError;
use crate::models::{Headers, HttpMethod, RequestDefinition, Response};

/// Check that a URL can be dispatched: it must parse, use http(s), and carry
/// a host and a path.
pub fn validate_url(raw: &str) -> Result<Url, ExecutionError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ExecutionError::InvalidUrl("URL is empty".into()));
    }

    let url = Url::parse(raw).map_err(|e| ExecutionError::InvalidUrl(format!("{}: {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ExecutionError::InvalidUrl(format!(
            "{}: unsupported scheme '{}'",
            raw,
            url.scheme()
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ExecutionError::InvalidUrl(format!("{}: missing host", raw)));
    }
    // http(s) URLs always parse with at least "/", so look at what was typed
    if !has_explicit_path(raw) {
        return Err(ExecutionError::InvalidUrl(format!("{}: missing path", raw)));
    }

    Ok(url)
}

/// True when the text after the authority starts with `/`
fn has_explicit_path(raw: &str) -> bool {
    let rest = raw.split_once("://").map_or(raw, |(_, rest)| rest);
    rest.find(['/', '?', '#'])
        .is_some_and(|i| rest[i..].starts_with('/'))
}

fn build_header_map(headers: &Headers) -> Result<HeaderMap, ExecutionError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (key, value) in headers.iter() {
        let name = HeaderName::try_from(key)
            .map_err(|e| ExecutionError::InvalidHeader(format!("{}: {}", key, e)))?;
        let value = HeaderValue::try_from(value)
            .map_err(|e| ExecutionError::InvalidHeader(format!("{}: {}", key, e)))?;
        map.append(name, value);
    }
    Ok(map)
}

fn collect_headers(map: &HeaderMap) -> Headers {
    let mut headers = Headers::new();
    for (name, value) in map {
        if let Ok(v) = value.to_str() {
            let combined = match headers.get(name.as_str()) {
                Some(existing) => format!("{}, {}", existing, v),
                None => v.to_string(),
            };
            headers.set(name.as_str(), combined);
        }
    }
    headers
}

/// Execute an HTTP request.
///
/// Any status code the server answers with is a successful `Response`; only
/// an undispatchable request or a transport failure is an error. Nothing is
/// sent when validation fails.
pub async fn execute(
    client: &reqwest::Client,
    method: HttpMethod,
    url: &str,
    headers: &Headers,
    body: &str,
) -> Result<Response, ExecutionError> {
    let url = validate_url(url)?;
    let header_map = build_header_map(headers)?;

    let mut req_builder = client.request(method.into(), url).headers(header_map);
    if !body.is_empty() {
        req_builder = req_builder.body(body.to_string());
    }

    let start = Instant::now();
    let resp = req_builder.send().await?;

    let status = resp.status().as_u16();
    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let headers = collect_headers(resp.headers());
    let body = resp
        .text()
        .await
        .map_err(|e| ExecutionError::Transport(format!("Error reading body: {}", e)))?;

    Ok(Response {
        status,
        headers,
        body,
        content_type,
        time_ms: start.elapsed().as_millis() as u64,
        received_at: chrono::Utc::now(),
    })
}

/// Execute the request a record describes
pub async fn execute_definition(
    client: &reqwest::Client,
    definition: &RequestDefinition,
) -> Result<Response, ExecutionError> {
    execute(
        client,
        definition.method,
        &definition.url,
        &definition.headers,
        &definition.body,
    )
    .await
}

/// Create an HTTP client. Without a timeout the client's own defaults apply.
pub fn create_client(timeout: Option<Duration>) -> reqwest::Client {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Falling back to default HTTP client");
        reqwest::Client::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_scheme_is_invalid() {
        assert!(matches!(
            validate_url("example.com/path"),
            Err(ExecutionError::InvalidUrl(_))
        ));
        // Parses with "localhost" as the scheme, but has no host
        assert!(matches!(
            validate_url("localhost:8080/path"),
            Err(ExecutionError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_other_invalid_urls() {
        for raw in ["", "   ", "ftp://example.com/file", "http://", "mailto:a@b.c"] {
            assert!(
                matches!(validate_url(raw), Err(ExecutionError::InvalidUrl(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_valid_urls() {
        let url = validate_url("https://api.example.com/users?page=2").unwrap();
        assert_eq!(url.host_str(), Some("api.example.com"));
        assert_eq!(url.path(), "/users");
        assert!(validate_url("http://localhost:8080/").is_ok());
        assert!(validate_url("  http://127.0.0.1/health ").is_ok());
    }

    #[test]
    fn test_bare_host_has_no_path() {
        for raw in ["http://example.com", "https://example.com:8443", "http://example.com?q=1"] {
            assert!(
                matches!(validate_url(raw), Err(ExecutionError::InvalidUrl(ref m)) if m.ends_with("missing path")),
                "{raw:?} should be rejected"
            );
        }
        assert!(validate_url("http://example.com/?q=1").is_ok());
    }

    #[test]
    fn test_bad_header_name_is_rejected() {
        let headers: Headers = [("Bad Header", "x")].into_iter().collect();
        assert!(matches!(
            build_header_map(&headers),
            Err(ExecutionError::InvalidHeader(_))
        ));
    }

    #[tokio::test]
    async fn test_execute_invalid_url_makes_no_call() {
        let client = create_client(None);
        let result = execute(
            &client,
            HttpMethod::GET,
            "example.com/path",
            &Headers::new(),
            "",
        )
        .await;
        assert!(matches!(result, Err(ExecutionError::InvalidUrl(_))));
    }
}
