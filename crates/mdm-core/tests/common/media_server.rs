//! Minimal HTTP/1.1 server for fetch integration tests.
//!
//! Serves a fixed set of paths, honours `Range: bytes=a-b` / `bytes=a-` with
//! 206 Partial Content, records every request, and tracks how many requests
//! were being served at the same time. One thread per connection; every
//! response carries `Connection: close`.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct MediaServerOptions {
    /// Answer ranged GETs with 200 and the full body.
    pub ignore_ranges: bool,
    /// Answer every request with this status (and a short error body).
    pub force_status: Option<u16>,
    /// Sleep before responding, to make requests overlap.
    pub delay: Duration,
    /// Serve at most this many bytes per ranged response (Content-Range says so).
    pub cap: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Raw `Range` header value, e.g. `bytes=0-1023`.
    pub range: Option<String>,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
}

struct State {
    routes: HashMap<String, Vec<u8>>,
    opts: MediaServerOptions,
    requests: Mutex<Vec<RecordedRequest>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

pub struct MediaServer {
    base: String,
    state: Arc<State>,
}

impl MediaServer {
    /// Serves `routes` (path without leading slash → body) until the process exits.
    pub fn start(routes: Vec<(&str, Vec<u8>)>) -> Self {
        Self::start_with_options(routes, MediaServerOptions::default())
    }

    pub fn start_with_options(routes: Vec<(&str, Vec<u8>)>, opts: MediaServerOptions) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(State {
            routes: routes
                .into_iter()
                .map(|(p, b)| (format!("/{p}"), b))
                .collect(),
            opts,
            requests: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let server_state = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let state = Arc::clone(&server_state);
                thread::spawn(move || handle(stream, &state));
            }
        });
        Self {
            base: format!("http://127.0.0.1:{port}/"),
            state,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }

    /// Highest number of requests served at the same time so far.
    pub fn peak_concurrency(&self) -> usize {
        self.state.peak.load(Ordering::SeqCst)
    }
}

fn read_head(stream: &mut TcpStream) -> Option<String> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    while !data.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return None,
            Ok(n) => data.extend_from_slice(&buf[..n]),
        }
        if data.len() > 64 * 1024 {
            return None;
        }
    }
    String::from_utf8(data).ok()
}

fn parse_request(head: &str) -> RecordedRequest {
    let mut lines = head.lines();
    let mut start = lines.next().unwrap_or("").split_whitespace();
    let method = start.next().unwrap_or("").to_string();
    let path = start.next().unwrap_or("").to_string();
    let mut headers: HashMap<String, String> = HashMap::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }
    RecordedRequest {
        method,
        path,
        range: headers.remove("range"),
        referer: headers.remove("referer"),
        user_agent: headers.remove("user-agent"),
    }
}

/// `bytes=a-b` / `bytes=a-` → (start, inclusive end clamped to the body).
fn parse_range(value: &str, total: u64) -> Option<(u64, u64)> {
    let spec = value.strip_prefix("bytes=")?;
    let (a, b) = spec.split_once('-')?;
    let start = a.trim().parse::<u64>().ok()?;
    let end = match b.trim() {
        "" => total.saturating_sub(1),
        e => e.parse::<u64>().ok()?.min(total.saturating_sub(1)),
    };
    Some((start, end))
}

fn handle(mut stream: TcpStream, state: &State) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(30)));
    let Some(head) = read_head(&mut stream) else {
        return;
    };
    let req = parse_request(&head);
    state.requests.lock().unwrap().push(req.clone());

    let now = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    state.peak.fetch_max(now, Ordering::SeqCst);
    if !state.opts.delay.is_zero() {
        thread::sleep(state.opts.delay);
    }
    respond(&mut stream, state, &req);
    state.in_flight.fetch_sub(1, Ordering::SeqCst);
}

fn respond(stream: &mut TcpStream, state: &State, req: &RecordedRequest) {
    let error = |stream: &mut TcpStream, status: &str| {
        let body = format!("error {status}\n");
        let head = format!(
            "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        let _ = stream.write_all(head.as_bytes());
        let _ = stream.write_all(body.as_bytes());
    };

    if let Some(code) = state.opts.force_status {
        return error(stream, &format!("{code} Forced"));
    }
    let Some(body) = state.routes.get(&req.path) else {
        return error(stream, "404 Not Found");
    };
    let total = body.len() as u64;

    let range = req
        .range
        .as_deref()
        .filter(|_| !state.opts.ignore_ranges)
        .and_then(|r| parse_range(r, total));
    let (status, content_range, slice) = match range {
        Some((start, end)) if start > end || start >= total => {
            return error(stream, "416 Range Not Satisfiable");
        }
        Some((start, end)) => {
            let end = match state.opts.cap {
                Some(cap) => end.min(start + cap.max(1) as u64 - 1),
                None => end,
            };
            (
                "206 Partial Content",
                Some(format!("bytes {start}-{end}/{total}")),
                &body[start as usize..=end as usize],
            )
        }
        None => ("200 OK", None, &body[..]),
    };

    let mut head = format!(
        "HTTP/1.1 {status}\r\nContent-Length: {}\r\nAccept-Ranges: bytes\r\nConnection: close\r\n",
        slice.len()
    );
    if let Some(cr) = content_range {
        head.push_str(&format!("Content-Range: {cr}\r\n"));
    }
    head.push_str("\r\n");
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(slice);
}
