//! Local preview server.
//!
//! Serves a built site from `127.0.0.1` with `tiny_http`, one request at a
//! time on the calling thread:
//!
//! 1. Exact file match → the file, content type from its extension
//! 2. Directory containing `index.html` → that `index.html`
//! 3. Anything else, including paths with `..` segments → 404
//!
//! Ctrl+C unblocks the request loop so [`SiteServer::run`] returns normally.

use std::fs;
use std::io::Cursor;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tiny_http::{Header, Request, Response, Server, StatusCode};

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("cannot listen on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("{} has no index.html; build the site first", .0.display())]
    NotBuilt(PathBuf),
    #[error("cannot install Ctrl+C handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

/// A bound server for one output directory.
pub struct SiteServer {
    server: Arc<Server>,
    root: PathBuf,
    addr: SocketAddr,
}

impl SiteServer {
    /// Bind to `127.0.0.1:port`. Port `0` picks a free port.
    ///
    /// Fails with [`ServeError::NotBuilt`] when `root` has no `index.html`.
    pub fn bind(root: impl Into<PathBuf>, port: u16) -> Result<Self, ServeError> {
        let root = root.into();
        if !root.join("index.html").is_file() {
            return Err(ServeError::NotBuilt(root));
        }

        let requested = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
        let server = Server::http(requested).map_err(|source| ServeError::Bind {
            addr: requested,
            source,
        })?;
        let addr = server.server_addr().to_ip().unwrap_or(requested);

        Ok(Self {
            server: Arc::new(server),
            root,
            addr,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Handle requests until Ctrl+C.
    pub fn run(self) -> Result<(), ServeError> {
        let for_signal = Arc::clone(&self.server);
        ctrlc::set_handler(move || {
            tracing::info!("shutting down");
            for_signal.unblock();
        })?;

        for request in self.server.incoming_requests() {
            self.handle(request);
        }
        Ok(())
    }

    /// Block for one request and answer it.
    pub fn serve_one(&self) {
        match self.server.recv() {
            Ok(request) => self.handle(request),
            Err(e) => tracing::warn!(error = %e, "failed to receive request"),
        }
    }

    fn handle(&self, request: Request) {
        let url = request.url().to_string();
        let result = match resolve_path(&self.root, &url) {
            Some(path) => {
                tracing::debug!(%url, path = %path.display(), "200");
                serve_file(request, &path)
            }
            None => {
                tracing::debug!(%url, "404");
                serve_not_found(request)
            }
        };
        if let Err(e) = result {
            tracing::warn!(%url, error = %e, "request failed");
        }
    }
}

/// Map a request URL to a file under `root`.
///
/// Returns `None` for missing files, directories without `index.html`,
/// and any path that tries to leave `root`.
pub fn resolve_path(root: &Path, url: &str) -> Option<PathBuf> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let decoded = urlencoding::decode(path).ok()?;
    let relative = Path::new(decoded.trim_start_matches('/'));

    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return None;
    }

    let local = root.join(relative);
    if local.is_file() {
        return Some(local);
    }
    let index = local.join("index.html");
    index.is_file().then_some(index)
}

fn serve_file(request: Request, path: &Path) -> std::io::Result<()> {
    let content = match fs::read(path) {
        Ok(content) => content,
        Err(_) => return serve_not_found(request),
    };
    let mut response = Response::from_data(content);
    if let Ok(header) = Header::from_bytes("Content-Type", guess_content_type(path)) {
        response.add_header(header);
    }
    request.respond(response)
}

fn serve_not_found(request: Request) -> std::io::Result<()> {
    let body = "404 Not Found";
    let headers = Header::from_bytes("Content-Type", "text/plain; charset=utf-8")
        .into_iter()
        .collect();
    let response = Response::new(
        StatusCode(404),
        headers,
        Cursor::new(body),
        Some(body.len()),
        None,
    );
    request.respond(response)
}

/// MIME type from file extension; `application/octet-stream` when unknown.
pub fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("txt") => "text/plain; charset=utf-8",
        Some("md") => "text/markdown; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        _ => "application/octet-stream",
    }
}
