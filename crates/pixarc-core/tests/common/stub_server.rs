//! Minimal HTTP/1.1 stub of the upstream platform for integration tests.
//!
//! Serves the profile listing endpoint, artwork pages with embedded
//! metadata JSON, page assets (404 past the last page), and a webhook sink.
//! Every request is recorded so tests can assert what the pipeline fetched.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
pub struct StubWork {
    pub id: String,
    pub title: String,
    /// Number of pages that exist; page indexes >= this return 404.
    pub pages: u32,
    /// Asset suffix including the dot, e.g. ".png".
    pub suffix: String,
    /// Serve the artwork page without the meta-preload-data marker.
    pub broken_meta: bool,
}

impl StubWork {
    pub fn new(id: &str, title: &str, pages: u32, suffix: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            pages,
            suffix: suffix.to_string(),
            broken_meta: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StubAccount {
    pub id: String,
    /// `None` simulates the malformed listing response (no `body.illusts`).
    pub works: Option<Vec<StubWork>>,
}

pub struct StubUpstream {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubUpstream {
    /// All requests seen so far, as `"METHOD /path"` (query string stripped).
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count_matching(&self, needle: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.contains(needle))
            .count()
    }
}

/// Deterministic body served for one page asset.
pub fn page_body(work_id: &str, page: u32) -> Vec<u8> {
    format!("asset {work_id} page {page}").into_bytes()
}

/// Starts the stub in a background thread. Runs until the process exits.
pub fn start(accounts: Vec<StubAccount>) -> StubUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let base_url = format!("http://127.0.0.1:{port}/");
    let requests = Arc::new(Mutex::new(Vec::new()));

    let accounts = Arc::new(accounts);
    let base = base_url.clone();
    let log = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let accounts = Arc::clone(&accounts);
            let base = base.clone();
            let log = Arc::clone(&log);
            thread::spawn(move || handle(stream, &accounts, &base, &log));
        }
    });

    StubUpstream { base_url, requests }
}

fn handle(
    mut stream: std::net::TcpStream,
    accounts: &[StubAccount],
    base: &str,
    log: &Mutex<Vec<String>>,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let mut parts = request.split_whitespace();
    let method = parts.next().unwrap_or("");
    let target = parts.next().unwrap_or("");
    let path = target.split('?').next().unwrap_or("");
    log.lock().unwrap().push(format!("{method} {path}"));

    if method.eq_ignore_ascii_case("POST") && path == "/webhook" {
        respond(&mut stream, "200 OK", "application/json", b"{}");
        return;
    }

    if let Some(rest) = path.strip_prefix("/ajax/user/") {
        if let Some(account_id) = rest.strip_suffix("/profile/all") {
            respond_listing(&mut stream, accounts, account_id);
            return;
        }
    }

    if let Some(work_id) = path.strip_prefix("/artworks/") {
        respond_artwork(&mut stream, accounts, base, work_id);
        return;
    }

    if let Some(asset) = path.strip_prefix("/img/") {
        respond_asset(&mut stream, accounts, asset);
        return;
    }

    respond(&mut stream, "404 Not Found", "text/plain", b"not found");
}

fn respond_listing(stream: &mut std::net::TcpStream, accounts: &[StubAccount], account_id: &str) {
    let Some(account) = accounts.iter().find(|a| a.id == account_id) else {
        respond(stream, "404 Not Found", "text/plain", b"no such user");
        return;
    };
    let body = match &account.works {
        Some(works) => {
            let mut illusts = serde_json::Map::new();
            for w in works {
                illusts.insert(w.id.clone(), serde_json::Value::Null);
            }
            serde_json::json!({ "error": false, "message": "", "body": { "illusts": illusts } })
        }
        None => serde_json::json!({ "error": true, "message": "bad session", "body": null }),
    };
    respond(
        stream,
        "200 OK",
        "application/json",
        body.to_string().as_bytes(),
    );
}

fn respond_artwork(
    stream: &mut std::net::TcpStream,
    accounts: &[StubAccount],
    base: &str,
    work_id: &str,
) {
    let Some(work) = find_work(accounts, work_id) else {
        respond(stream, "404 Not Found", "text/html", b"<html>gone</html>");
        return;
    };
    if work.broken_meta {
        respond(
            stream,
            "200 OK",
            "text/html",
            b"<html><head></head><body>please log in</body></html>",
        );
        return;
    }
    let mut illust = serde_json::Map::new();
    illust.insert(
        work.id.clone(),
        serde_json::json!({
            "title": work.title,
            "urls": { "original": format!("{base}img/{}_p0{}", work.id, work.suffix) }
        }),
    );
    let preload = serde_json::json!({ "illust": illust });
    let html = format!(
        "<html><head><meta id=\"meta-preload-data\" content='{preload}'></head><body></body></html>"
    );
    respond(stream, "200 OK", "text/html", html.as_bytes());
}

fn respond_asset(stream: &mut std::net::TcpStream, accounts: &[StubAccount], asset: &str) {
    for account in accounts {
        let Some(works) = &account.works else { continue };
        for w in works {
            let prefix = format!("{}_p", w.id);
            let Some(rest) = asset.strip_prefix(&prefix) else {
                continue;
            };
            let Some(page_str) = rest.strip_suffix(&w.suffix) else {
                continue;
            };
            let Ok(page) = page_str.parse::<u32>() else {
                continue;
            };
            if page < w.pages {
                respond(
                    stream,
                    "200 OK",
                    "application/octet-stream",
                    &page_body(&w.id, page),
                );
            } else {
                respond(stream, "404 Not Found", "text/plain", b"no such page");
            }
            return;
        }
    }
    respond(stream, "404 Not Found", "text/plain", b"no such asset");
}

fn find_work<'a>(accounts: &'a [StubAccount], work_id: &str) -> Option<&'a StubWork> {
    accounts
        .iter()
        .filter_map(|a| a.works.as_ref())
        .flatten()
        .find(|w| w.id == work_id)
}

fn respond(stream: &mut std::net::TcpStream, status: &str, content_type: &str, body: &[u8]) {
    let header = format!(
        "HTTP/1.1 {status}\r\nContent-Length: {}\r\nContent-Type: {content_type}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    let _ = stream.write_all(header.as_bytes());
    let _ = stream.write_all(body);
}
