// HTTP execution layer: one request in, one status + body out. The trait
// is the seam the folder client is written against, so tests can swap
// the network for a recording fake.

use crate::error::TransportError;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP verbs used by the drive folders endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

/// A fully composed request. Headers keep insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body as UTF-8 text, for display and logging.
    pub fn body_text(&self) -> Option<String> {
        self.body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }
}

/// A request as it went out, kept for display. The token is already masked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSummary {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// Status code and body of a completed exchange, whatever the status.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResult {
    pub status_code: u16,
    pub raw_body: String,
    /// The body parsed as JSON, when it is JSON.
    pub parsed: Option<Value>,
}

impl ApiResult {
    pub fn new(status_code: u16, raw_body: String) -> Self {
        let parsed = serde_json::from_str(&raw_body).ok();
        ApiResult {
            status_code,
            raw_body,
            parsed,
        }
    }

    pub fn status_in(&self, accepted: &[u16]) -> bool {
        accepted.contains(&self.status_code)
    }
}

/// Executes a single HTTP request.
///
/// Implementations must return `Ok` for every response the server sends,
/// including 4xx/5xx, and reserve `Err` for connection-level failures.
pub trait HttpExecutor {
    fn execute(&self, request: &HttpRequest) -> Result<ApiResult, TransportError>;
}

impl<E: HttpExecutor + ?Sized> HttpExecutor for &E {
    fn execute(&self, request: &HttpRequest) -> Result<ApiResult, TransportError> {
        (**self).execute(request)
    }
}

/// Connect and read bounds for every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Duration,
    pub read: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Timeouts {
            connect: Duration::from_secs(10),
            read: Duration::from_secs(10),
        }
    }
}

/// Blocking reqwest-backed executor.
#[derive(Clone)]
pub struct ReqwestExecutor {
    client: Client,
}

impl ReqwestExecutor {
    pub fn new(timeouts: Timeouts) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(timeouts.connect)
            .timeout(timeouts.read)
            .build()?;
        Ok(ReqwestExecutor { client })
    }

    fn header_map(headers: &[(String, String)]) -> Result<HeaderMap, TransportError> {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TransportError::InvalidRequest(format!("header name {name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| TransportError::InvalidRequest(format!("header {name}: {e}")))?;
            map.insert(name, value);
        }
        Ok(map)
    }
}

impl HttpExecutor for ReqwestExecutor {
    fn execute(&self, request: &HttpRequest) -> Result<ApiResult, TransportError> {
        let headers = Self::header_map(&request.headers)?;
        let mut builder = self
            .client
            .request(request.method.into(), &request.url)
            .headers(headers);
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        debug!(method = %request.method, url = %request.url, "sending request");
        let response = builder.send().map_err(|e| {
            warn!(url = %request.url, error = %e, "request failed before a response arrived");
            TransportError::from(e)
        })?;

        let status = response.status();
        // Error responses may come without a readable body; that is still a result.
        let raw_body = match response.text() {
            Ok(text) => text,
            Err(_) if status.is_client_error() || status.is_server_error() => String::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(status = status.as_u16(), bytes = raw_body.len(), "received response");

        Ok(ApiResult::new(status.as_u16(), raw_body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::mpsc;
    use std::thread;

    fn read_request(stream: &mut TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            data.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&data).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|l| {
                        let lower = l.to_ascii_lowercase();
                        lower
                            .strip_prefix("content-length:")
                            .map(|v| v.trim().parse::<usize>().unwrap())
                    })
                    .unwrap_or(0);
                if data.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&data).to_string()
    }

    /// Serve exactly one canned response and hand back the raw request text.
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/v2/Drive/Folders", listener.local_addr().unwrap());
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            tx.send(request).unwrap();
        });
        (url, rx)
    }

    fn request(method: Method, url: String, body: Option<&str>) -> HttpRequest {
        HttpRequest {
            method,
            url,
            headers: vec![
                ("api_token".to_string(), "tok-123".to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            body: body.map(|b| b.as_bytes().to_vec()),
        }
    }

    #[test]
    fn test_execute_sends_headers_and_body() {
        let (url, rx) = serve_once("201 Created", r#"{"data":{"media_folder_id":"F1"}}"#);
        let executor = ReqwestExecutor::new(Timeouts::default()).unwrap();

        let result = executor
            .execute(&request(Method::Post, url, Some(r#"{"title":"A"}"#)))
            .unwrap();

        assert_eq!(result.status_code, 201);
        assert_eq!(result.parsed.unwrap()["data"]["media_folder_id"], "F1");
        let raw = rx.recv().unwrap();
        assert!(raw.starts_with("POST /v2/Drive/Folders HTTP/1.1"));
        assert!(raw.contains("api_token: tok-123"));
        assert!(raw.to_ascii_lowercase().contains("content-type: application/json"));
        assert!(raw.ends_with(r#"{"title":"A"}"#));
    }

    #[test]
    fn test_execute_error_status_is_a_result() {
        let (url, _rx) = serve_once("404 Not Found", r#"{"message":"missing"}"#);
        let executor = ReqwestExecutor::new(Timeouts::default()).unwrap();

        let result = executor.execute(&request(Method::Get, url, None)).unwrap();

        assert_eq!(result.status_code, 404);
        assert_eq!(result.raw_body, r#"{"message":"missing"}"#);
    }

    #[test]
    fn test_execute_refused_connection_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        drop(listener);
        let executor = ReqwestExecutor::new(Timeouts::default()).unwrap();

        let err = executor.execute(&request(Method::Get, url, None)).unwrap_err();

        assert!(matches!(err, TransportError::Connect(_)), "got {err:?}");
    }

    #[test]
    fn test_execute_read_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            thread::sleep(Duration::from_millis(800));
            drop(stream);
        });
        let executor = ReqwestExecutor::new(Timeouts {
            connect: Duration::from_secs(2),
            read: Duration::from_millis(200),
        })
        .unwrap();

        let err = executor.execute(&request(Method::Get, url, None)).unwrap_err();

        assert!(matches!(err, TransportError::Timeout(_)), "got {err:?}");
        handle.join().unwrap();
    }

    #[test]
    fn test_invalid_header_value_rejected_before_sending() {
        let executor = ReqwestExecutor::new(Timeouts::default()).unwrap();
        let mut req = request(Method::Get, "http://127.0.0.1:9/".to_string(), None);
        req.headers[0].1 = "bad\ntoken".to_string();

        let err = executor.execute(&req).unwrap_err();

        assert!(matches!(err, TransportError::InvalidRequest(_)));
    }

    #[test]
    fn test_api_result_parsed_only_for_json() {
        assert!(ApiResult::new(200, "not json".into()).parsed.is_none());
        assert!(ApiResult::new(200, "{}".into()).parsed.is_some());
        assert!(ApiResult::new(204, String::new()).status_in(&[200, 204]));
    }
}
