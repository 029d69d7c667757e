//! Minimal in-process HTTP responder for fetcher and pipeline tests.
//!
//! Serves canned bodies by path over HTTP/1.1 with `Connection: close`,
//! counts hits per path and remembers the last `User-Agent` seen. Unknown
//! paths answer 404.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
pub struct Route {
    path: String,
    status: u16,
    body: String,
}

impl Route {
    pub fn ok(path: &str, body: &str) -> Self {
        Self {
            path: path.to_string(),
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn status(path: &str, status: u16) -> Self {
        Self {
            path: path.to_string(),
            status,
            body: String::new(),
        }
    }
}

#[derive(Default)]
struct State {
    hits: HashMap<String, usize>,
    last_user_agent: Option<String>,
}

pub struct TestServer {
    base: String,
    state: Arc<Mutex<State>>,
}

impl TestServer {
    pub async fn start(routes: Vec<Route>) -> Self {
        Self::start_with(|_| routes).await
    }

    /// Like [`TestServer::start`], for bodies that link back to the server.
    /// `routes` receives the base URL (`http://127.0.0.1:PORT`).
    pub async fn start_with(routes: impl FnOnce(&str) -> Vec<Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let routes = routes(&base);
        let routes: Arc<HashMap<String, Route>> =
            Arc::new(routes.into_iter().map(|r| (r.path.clone(), r)).collect());
        let state = Arc::new(Mutex::new(State::default()));

        let accept_state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let routes = Arc::clone(&routes);
                let state = Arc::clone(&accept_state);
                tokio::spawn(async move {
                    let _ = respond(stream, &routes, &state).await;
                });
            }
        });

        Self { base, state }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn hits(&self, path: &str) -> usize {
        self.state.lock().unwrap().hits.get(path).copied().unwrap_or(0)
    }

    pub fn last_user_agent(&self) -> Option<String> {
        self.state.lock().unwrap().last_user_agent.clone()
    }
}

async fn respond(
    mut stream: TcpStream,
    routes: &HashMap<String, Route>,
    state: &Mutex<State>,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let request = String::from_utf8_lossy(&buf);
    let target = request.split_whitespace().nth(1).unwrap_or("/");
    let path = target.split('?').next().unwrap_or(target).to_string();
    let user_agent = request
        .lines()
        .find(|l| l.to_ascii_lowercase().starts_with("user-agent:"))
        .map(|l| l["user-agent:".len()..].trim().to_string());

    {
        let mut state = state.lock().unwrap();
        *state.hits.entry(path.clone()).or_insert(0) += 1;
        if user_agent.is_some() {
            state.last_user_agent = user_agent;
        }
    }

    let (status, body) = match routes.get(&path) {
        Some(route) => (route.status, route.body.as_str()),
        None => (404, ""),
    };
    let response = format!(
        "HTTP/1.1 {status} Test\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}
