//! Embedded web console for grap.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - The console pages (users & keys, legal holds & backups, reports)
//! - JSON API endpoints for the simulated console actions and the audit log
//!
//! Launched via `grap serve` (default: `http://127.0.0.1:9750`).

pub mod api;
pub mod frontend;

use std::io::Cursor;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::config::GrapConfig;
use crate::console::Console;

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";
pub const CONTENT_TYPE_HTML: &str = "text/html; charset=utf-8";
pub const CONTENT_TYPE_JS: &str = "text/javascript; charset=utf-8";

/// A fully built response, independent of the server library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    pub fn html(body: String) -> Self {
        Self {
            status: 200,
            content_type: CONTENT_TYPE_HTML,
            body,
        }
    }

    pub fn json(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: CONTENT_TYPE_JSON,
            body,
        }
    }

    fn into_response(self) -> Response<Cursor<Vec<u8>>> {
        let response =
            Response::from_data(self.body.into_bytes()).with_status_code(StatusCode(self.status));
        match Header::from_bytes("Content-Type", self.content_type) {
            Ok(header) => response.with_header(header),
            Err(()) => response,
        }
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the console server on the given address.
///
/// Blocks the current thread. Requests are handled sequentially, each action
/// running to completion before the next request is read, so the console
/// state needs no locking. Errors are handled per request without stopping
/// the server.
pub fn serve(addr: &str, config: &GrapConfig) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!("grap console running at http://{addr}");
    println!("Press Ctrl+C to stop.\n");

    if config.server.open_browser {
        let _ = open_browser(&format!("http://{addr}"));
    }

    let mut console = Console::from_config(config);
    run(&server, &mut console, config.logging.access_log);
    Ok(())
}

/// Serve requests from `server` until it is unblocked or shut down.
pub fn run(server: &Server, console: &mut Console, access_log: bool) {
    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        // Read body up-front for methods that carry one
        let body = if matches!(method, Method::Put | Method::Post | Method::Patch) {
            let mut buf = Vec::new();
            request.as_reader().read_to_end(&mut buf).map(|_| Some(buf))
        } else {
            Ok(None)
        };

        let reply = match body {
            Ok(body) => dispatch(console, &method, &url, body.as_deref()).unwrap_or_else(|e| {
                api::error_reply(500, "internal error", Some(format!("{e:#}")))
            }),
            Err(e) => api::error_reply(400, "failed to read request body", Some(e.to_string())),
        };
        let status = reply.status;
        let _ = request.respond(reply.into_response());

        if access_log {
            println!(
                "{} {} {} {}",
                method,
                url,
                status,
                chrono::Local::now().format("%H:%M:%S")
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatch an incoming request to the appropriate handler.
pub fn dispatch(
    console: &mut Console,
    method: &Method,
    url: &str,
    body: Option<&[u8]>,
) -> Result<Reply> {
    // Strip query string for path matching
    let path = url.split('?').next().unwrap_or(url);

    // Frontend pages
    if *method == Method::Get
        && let Some(page) = frontend::Page::from_path(path)
    {
        return Ok(Reply::html(frontend::render_page(page, path, console)));
    }

    match (method, path) {
        (&Method::Get, "/assets/app.js") => Ok(Reply {
            status: 200,
            content_type: CONTENT_TYPE_JS,
            body: frontend::APP_JS.to_string(),
        }),

        // API
        (&Method::Get, "/api/ping") => api::ping(),
        (&Method::Get, "/api/state") => api::get_state(console),
        (&Method::Get, "/api/audit") => api::get_audit(console, url),
        (&Method::Post, _) if path.starts_with(api::ACTIONS_PREFIX) => {
            let name = &path[api::ACTIONS_PREFIX.len()..];
            api::post_action(console, name, body.unwrap_or_default())
        }

        // 404
        _ => Ok(api::error_reply(404, "not found", None)),
    }
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
