//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use serde_json::{Value, json};

/// Builder for lead objects as the scrape endpoint returns them
pub struct LeadJsonBuilder {
    value: Value,
}

impl LeadJsonBuilder {
    pub fn new(name: &str) -> Self {
        Self { value: json!({ "name": name }) }
    }

    pub fn email(mut self, email: &str) -> Self {
        self.value["email"] = json!(email);
        self
    }

    pub fn phone(mut self, phone: &str) -> Self {
        self.value["phone"] = json!(phone);
        self
    }

    pub fn website(mut self, website: &str) -> Self {
        self.value["website"] = json!(website);
        self
    }

    pub fn rating(mut self, rating: f64) -> Self {
        self.value["rating"] = json!(rating);
        self
    }

    /// Set any field to a raw JSON value (blank strings, nulls, arrays)
    pub fn raw(mut self, key: &str, value: Value) -> Self {
        self.value[key] = value;
        self
    }

    pub fn build(self) -> Value {
        self.value
    }
}

/// Seven dentists in Berlin, four of them with an email address
pub fn dentist_leads() -> Vec<Value> {
    (1..=7)
        .map(|i| {
            let lead = LeadJsonBuilder::new(&format!("Zahnarztpraxis {}", i))
                .phone(&format!("+49 30 55{}", i))
                .rating(4.0 + i as f64 / 10.0);
            let lead = if i <= 4 {
                lead.email(&format!("praxis{}@example.de", i))
            } else {
                lead.raw("email", json!(""))
            };
            lead.build()
        })
        .collect()
}

/// A successful `/scrape` body
pub fn scrape_body(leads: Vec<Value>, daily: u64, daily_limit: u64) -> String {
    json!({
        "results": leads,
        "usage": {
            "daily": daily,
            "monthly": daily,
            "daily_limit": daily_limit,
            "monthly_limit": daily_limit * 30,
            "reset_daily": "2030-01-02T00:00:00Z"
        },
        "stats": { "time": 1.5 }
    })
    .to_string()
}

/// A successful `/status` body
pub fn status_body(tier: &str, daily: u64, daily_limit: u64) -> String {
    json!({
        "tier": tier,
        "usage": {
            "daily": daily,
            "monthly": daily,
            "daily_limit": daily_limit,
            "monthly_limit": daily_limit * 30
        },
        "reset": { "daily": "2030-01-02T00:00:00Z", "monthly": "2030-02-01T00:00:00Z" }
    })
    .to_string()
}

/// One request as received by the stub server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Header names lowercased
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("request body is not JSON")
    }
}

/// Local HTTP server that answers a fixed sequence of requests, one per connection
pub struct StubServer {
    url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: Option<JoinHandle<()>>,
}

impl StubServer {
    /// Serve `responses` in order as `(status, body)`, then stop accepting
    pub fn start(responses: Vec<(u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind stub server");
        let url = format!("http://{}", listener.local_addr().expect("no local addr"));
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&requests);
        let handle = thread::spawn(move || {
            for (status, body) in responses {
                let Ok((stream, _)) = listener.accept() else {
                    return;
                };
                if let Some(request) = serve_one(stream, status, &body) {
                    recorded.lock().expect("poisoned").push(request);
                }
            }
        });

        Self { url, requests, handle: Some(handle) }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Wait for every queued response to be served, then return what was received
    pub fn finish(mut self) -> Vec<RecordedRequest> {
        if let Some(handle) = self.handle.take() {
            handle.join().expect("stub server thread panicked");
        }
        self.requests.lock().expect("poisoned").clone()
    }

    /// Requests received so far, without waiting
    pub fn received(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("poisoned").clone()
    }
}

fn serve_one(stream: TcpStream, status: u16, body: &str) -> Option<RecordedRequest> {
    let mut reader = BufReader::new(stream.try_clone().ok()?);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut headers = HashMap::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).ok()?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    let length: usize = headers.get("content-length").and_then(|v| v.parse().ok()).unwrap_or(0);
    let mut request_body = vec![0; length];
    reader.read_exact(&mut request_body).ok()?;

    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason(status),
        body.len(),
        body
    );
    let mut stream = stream;
    stream.write_all(response.as_bytes()).ok()?;
    stream.flush().ok()?;

    Some(RecordedRequest {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&request_body).to_string(),
    })
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
