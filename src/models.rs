use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::DEFAULT_RECORD_NAME;
use crate::error::SessionError;

/// HTTP Method enum
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    #[default]
    GET,
    POST,
    PUT,
    DELETE,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 4] = [
        HttpMethod::GET,
        HttpMethod::POST,
        HttpMethod::PUT,
        HttpMethod::DELETE,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
        }
    }

    pub fn next(&self) -> HttpMethod {
        match self {
            HttpMethod::GET => HttpMethod::POST,
            HttpMethod::POST => HttpMethod::PUT,
            HttpMethod::PUT => HttpMethod::DELETE,
            HttpMethod::DELETE => HttpMethod::GET,
        }
    }
}

impl FromStr for HttpMethod {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| SessionError::InvalidMethod(s.to_string()))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::GET => reqwest::Method::GET,
            HttpMethod::POST => reqwest::Method::POST,
            HttpMethod::PUT => reqwest::Method::PUT,
            HttpMethod::DELETE => reqwest::Method::DELETE,
        }
    }
}

/// Header mapping with unique, case-sensitive keys kept in insertion order.
///
/// Serialized as a JSON object.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Headers(Vec::new())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Insert or replace. A replaced key keeps its position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.0.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.set(k, v);
        }
        headers
    }
}

impl Serialize for Headers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Headers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HeadersVisitor;

        impl<'de> Visitor<'de> for HeadersVisitor {
            type Value = Headers;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping header names to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Headers, A::Error> {
                let mut headers = Headers::new();
                while let Some((k, v)) = access.next_entry::<String, String>()? {
                    headers.set(k, v);
                }
                Ok(headers)
            }
        }

        deserializer.deserialize_map(HeadersVisitor)
    }
}

/// The persisted shape of a request: what `compile` produces and what a
/// session file holds, one per array entry.
///
/// Field order here is the key order on disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "PartialDefinition")]
pub struct RequestDefinition {
    pub name: String,
    pub method: HttpMethod,
    pub url: String,
    pub headers: Headers,
    pub body: String,
}

impl Default for RequestDefinition {
    fn default() -> Self {
        RequestDefinition {
            name: String::from(DEFAULT_RECORD_NAME),
            method: HttpMethod::GET,
            url: String::new(),
            headers: Headers::new(),
            body: String::new(),
        }
    }
}

/// On-disk entry as read; any key may be missing or `null`.
#[derive(Deserialize, Default)]
#[serde(default)]
struct PartialDefinition {
    name: Option<String>,
    method: Option<HttpMethod>,
    url: Option<String>,
    headers: Option<Headers>,
    body: Option<String>,
}

impl From<PartialDefinition> for RequestDefinition {
    fn from(p: PartialDefinition) -> Self {
        let defaults = RequestDefinition::default();
        RequestDefinition {
            name: p.name.unwrap_or(defaults.name),
            method: p.method.unwrap_or(defaults.method),
            url: p.url.unwrap_or(defaults.url),
            headers: p.headers.unwrap_or(defaults.headers),
            body: p.body.unwrap_or(defaults.body),
        }
    }
}

/// Editable scalar fields of a request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Name,
    Method,
    Url,
    Body,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Method => "method",
            Field::Url => "url",
            Field::Body => "body",
        }
    }

    /// Whether an edit to this field changes what would be sent
    pub fn shapes_request(&self) -> bool {
        !matches!(self, Field::Name)
    }
}

impl FromStr for Field {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Field::Name),
            "method" => Ok(Field::Method),
            "url" => Ok(Field::Url),
            "body" => Ok(Field::Body),
            other => Err(SessionError::UnknownField(other.to_string())),
        }
    }
}

/// Transient identity of a record.
///
/// Never persisted; used to route an asynchronous send result back to the
/// record it was sent from even after deletions shift positions. Ids are
/// unique for the whole process, so a record in a later session never
/// shares one with a record of a closed session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub u64);

static NEXT_RECORD_ID: AtomicU64 = AtomicU64::new(1);

impl RecordId {
    pub fn next() -> Self {
        RecordId(NEXT_RECORD_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Response from HTTP request
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    pub status: u16,
    pub headers: Headers,
    pub body: String,
    /// Declared `Content-Type`, if any
    pub content_type: Option<String>,
    pub time_ms: u64,
    pub received_at: chrono::DateTime<chrono::Utc>,
}

impl Response {
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| {
                let mime = ct.split(';').next().unwrap_or("").trim();
                mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
            })
            .unwrap_or(false)
    }

    /// Body as it should be shown: pretty-printed when it is declared JSON
    /// and parses as such, verbatim otherwise.
    pub fn display_body(&self) -> String {
        if self.is_json() {
            if let Ok(json) = serde_json::from_str::<serde_json::Value>(&self.body) {
                return serde_json::to_string_pretty(&json).unwrap_or_else(|_| self.body.clone());
            }
        }
        self.body.clone()
    }
}

/// One editable request inside an open session
#[derive(Clone, Debug)]
pub struct RequestRecord {
    pub id: RecordId,
    pub definition: RequestDefinition,
    pub last_response: Option<Response>,
    /// Inline error from the most recent send
    pub last_error: Option<String>,
    /// Dispatch id of the send currently in flight
    pub pending: Option<u64>,
}

impl RequestRecord {
    pub fn new(id: RecordId, definition: RequestDefinition) -> Self {
        RequestRecord {
            id,
            definition,
            last_response: None,
            last_error: None,
            pending: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_and_null_fields_take_defaults() {
        let def: RequestDefinition =
            serde_json::from_value(json!({"name": null, "url": "http://x/y"})).unwrap();
        assert_eq!(def.name, "Name");
        assert_eq!(def.method, HttpMethod::GET);
        assert_eq!(def.url, "http://x/y");
        assert!(def.headers.is_empty());
        assert_eq!(def.body, "");
    }

    #[test]
    fn test_serialized_key_order() {
        let def = RequestDefinition {
            name: "A".into(),
            method: HttpMethod::PUT,
            url: "u".into(),
            headers: [("b", "2"), ("a", "1")].into_iter().collect(),
            body: "{}".into(),
        };
        let text = serde_json::to_string(&def).unwrap();
        assert_eq!(
            text,
            r#"{"name":"A","method":"PUT","url":"u","headers":{"b":"2","a":"1"},"body":"{}"}"#
        );
    }

    #[test]
    fn test_headers_preserve_order_and_replace_in_place() {
        let mut headers = Headers::new();
        headers.set("X-One", "1");
        headers.set("X-Two", "2");
        assert_eq!(headers.set("X-One", "uno"), Some("1".to_string()));
        let keys: Vec<_> = headers.keys().collect();
        assert_eq!(keys, vec!["X-One", "X-Two"]);
        assert_eq!(headers.get("X-One"), Some("uno"));
        assert_eq!(headers.get("x-one"), None);
        assert_eq!(headers.remove("X-Two"), Some("2".to_string()));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_unsupported_method_is_rejected() {
        assert_eq!(
            "PATCH".parse::<HttpMethod>(),
            Err(SessionError::InvalidMethod("PATCH".into()))
        );
        assert!(serde_json::from_value::<RequestDefinition>(json!({"method": "PATCH"})).is_err());
    }

    #[test]
    fn test_field_parsing() {
        assert_eq!("url".parse::<Field>(), Ok(Field::Url));
        assert_eq!(
            "headers".parse::<Field>(),
            Err(SessionError::UnknownField("headers".into()))
        );
    }

    #[test]
    fn test_json_content_type_detection() {
        let mut resp = Response {
            status: 200,
            headers: Headers::new(),
            body: r#"{"a":1}"#.into(),
            content_type: Some("application/json; charset=utf-8".into()),
            time_ms: 3,
            received_at: chrono::Utc::now(),
        };
        assert!(resp.is_json());
        assert_eq!(resp.display_body(), "{\n  \"a\": 1\n}");

        resp.content_type = Some("text/plain".into());
        assert!(!resp.is_json());
        assert_eq!(resp.display_body(), r#"{"a":1}"#);
    }
}
