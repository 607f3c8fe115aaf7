//! [`StubServer`], a one-shot HTTP server on the loopback interface.
//!
//! Realism level: REAL socket, canned response. Lets tests drive the real
//! `HttpTransport` without an etcd cluster.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::JoinHandle;

/// The request a [`StubServer`] received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The body parsed as JSON
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("RecordedRequest::json: body is not JSON")
    }
}

/// Serves exactly one HTTP request with a fixed status and body
///
/// # Example
///
/// ```rust,no_run
/// use eec_test_utils::StubServer;
///
/// let server = StubServer::start(200, "{}");
/// let endpoint = server.endpoint(); // http://127.0.0.1:<port>
/// // ... point the code under test at `endpoint` ...
/// let request = server.received();
/// assert_eq!(request.method, "POST");
/// ```
pub struct StubServer {
    endpoint: String,
    handle: JoinHandle<RecordedRequest>,
}

impl StubServer {
    /// Bind an ephemeral port and answer the first connection
    pub fn start(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let listener =
            TcpListener::bind("127.0.0.1:0").expect("StubServer::start: failed to bind");
        let addr = listener
            .local_addr()
            .expect("StubServer::start: no local address");

        let handle = std::thread::spawn(move || {
            let (stream, _) = listener.accept().expect("StubServer: accept failed");
            let mut reader = BufReader::new(stream);
            let request = read_request(&mut reader);

            let response = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {len}\r\nConnection: close\r\n\r\n{body}",
                reason = reason_phrase(status),
                len = body.len(),
            );
            let mut stream = reader.into_inner();
            stream
                .write_all(response.as_bytes())
                .expect("StubServer: write failed");
            stream.flush().expect("StubServer: flush failed");
            request
        });

        Self {
            endpoint: format!("http://{addr}"),
            handle,
        }
    }

    /// Base URL of the server, without a trailing slash
    pub fn endpoint(&self) -> String {
        self.endpoint.clone()
    }

    /// Wait for the request to be served and return it
    pub fn received(self) -> RecordedRequest {
        self.handle
            .join()
            .expect("StubServer: server thread panicked")
    }
}

fn read_request<R: BufRead>(reader: &mut R) -> RecordedRequest {
    let mut request_line = String::new();
    reader
        .read_line(&mut request_line)
        .expect("StubServer: failed reading request line");
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader
            .read_line(&mut line)
            .expect("StubServer: failed reading header");
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
    }

    let length = headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0; length];
    reader
        .read_exact(&mut body)
        .expect("StubServer: failed reading body");

    RecordedRequest {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
