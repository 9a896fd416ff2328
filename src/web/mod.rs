//! Embedded web server for the dashboard.
//!
//! A sync `tiny_http` loop that serves:
//! - the single-page dashboard (`/`)
//! - the layout and callback graph the page renders from
//! - reactive update requests, one chart per request
//!
//! Requests are handled sequentially against the shared, read-only
//! [`Dashboard`]. A failing request gets a JSON error body and never stops
//! the server.

mod api;
mod frontend;

use std::io::Cursor;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::callbacks::DispatchError;
use crate::config::schema::ServerConfig;
use crate::dashboard::Dashboard;

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the dashboard server. Blocks the current thread.
pub fn serve(dashboard: &Dashboard, config: &ServerConfig) -> Result<()> {
    let addr = config.addr();
    let server = Server::http(&addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    log::info!("dashboard running at http://{addr}");
    if config.debug {
        log::info!("debug mode on: error responses include full context");
    }

    if config.open_browser {
        let url = format!("http://{addr}");
        if let Err(e) = open_browser(&url) {
            log::warn!("{e:#}");
        }
    }

    handle_requests(&server, dashboard, config);
    Ok(())
}

/// Answer requests from `server` until it shuts down.
fn handle_requests(server: &Server, dashboard: &Dashboard, config: &ServerConfig) {
    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let body = if matches!(method, Method::Post | Method::Put) {
            let mut buf = String::new();
            match request.as_reader().read_to_string(&mut buf) {
                Ok(_) => Some(buf),
                Err(e) => {
                    log::warn!("failed to read request body for {url}: {e}");
                    None
                }
            }
        } else {
            None
        };

        if config.debug
            && let Some(body) = &body
        {
            log::debug!("{method} {url} body: {body}");
        }

        let reply = match route(dashboard, &method, &url, body.as_deref()) {
            Ok(reply) => reply,
            Err(e) => e.into_reply(config.debug),
        };
        let status = reply.status;

        if let Err(e) = request.respond(reply.into_response()) {
            log::warn!("failed to send response for {url}: {e}");
        }

        log::info!(
            "{} {} {} {}",
            method,
            url,
            status,
            chrono::Local::now().format("%H:%M:%S")
        );
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatch an incoming request to the appropriate handler.
fn route(
    dashboard: &Dashboard,
    method: &Method,
    url: &str,
    body: Option<&str>,
) -> Result<Reply, ApiError> {
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        (&Method::Get, "/") | (&Method::Get, "/index.html") => Ok(Reply::html(frontend::INDEX_HTML)),

        (&Method::Get, "/_dash-layout") => api::get_layout(dashboard),
        (&Method::Get, "/_dash-dependencies") => api::get_dependencies(dashboard),
        (&Method::Post, "/_dash-update-component") => {
            api::post_update(dashboard, body.unwrap_or_default())
        }

        (&Method::Get, "/api/health") => api::get_health(dashboard),

        _ => Err(ApiError::not_found(format!("no route for {method} {path}"))),
    }
}

// ---------------------------------------------------------------------------
// Replies and errors
// ---------------------------------------------------------------------------

/// A fully rendered response, kept independent of `tiny_http` so handlers
/// can be tested directly.
#[derive(Debug)]
pub(crate) struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Reply {
    fn html(html: &str) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body: html.as_bytes().to_vec(),
        }
    }

    fn json(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: "application/json; charset=utf-8",
            body: body.into_bytes(),
        }
    }

    fn into_response(self) -> Response<Cursor<Vec<u8>>> {
        Response::from_data(self.body)
            .with_header(content_type(self.content_type))
            .with_status_code(StatusCode(self.status))
    }
}

/// Request failure carrying the HTTP status it maps to.
#[derive(Debug)]
pub(crate) struct ApiError {
    pub status: u16,
    pub error: anyhow::Error,
}

impl ApiError {
    fn bad_request(error: impl Into<anyhow::Error>) -> Self {
        Self {
            status: 400,
            error: error.into(),
        }
    }

    fn not_found(message: String) -> Self {
        Self {
            status: 404,
            error: anyhow::anyhow!(message),
        }
    }

    /// Render as `{"error": "..."}`. Debug mode includes the context chain.
    fn into_reply(self, debug: bool) -> Reply {
        let message = if debug {
            format!("{:#}", self.error)
        } else {
            self.error.to_string()
        };
        if self.status >= 500 {
            log::error!("{:#}", self.error);
        }
        let body = serde_json::json!({ "error": message }).to_string();
        Reply::json(self.status, body)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        Self { status: 500, error }
    }
}

impl From<DispatchError> for ApiError {
    fn from(error: DispatchError) -> Self {
        let status = match error {
            DispatchError::UnknownOutput(_) => 404,
            DispatchError::MissingInput(_) | DispatchError::InvalidInput { .. } => 400,
        };
        Self {
            status,
            error: error.into(),
        }
    }
}

fn content_type(value: &str) -> Header {
    Header::from_bytes("Content-Type", value).expect("static content-type header is valid")
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader;

    fn dashboard() -> Dashboard {
        let csv = "country,continent,year,pop,gdpPercap\n\
                   Canada,Americas,1952,14785584,11367.2\n\
                   Canada,Americas,2007,33390141,36319.2\n";
        Dashboard::from_table(loader::from_reader(csv.as_bytes()).unwrap(), "inline")
    }

    fn body_json(reply: &Reply) -> serde_json::Value {
        serde_json::from_slice(&reply.body).unwrap()
    }

    #[test]
    fn index_is_served_as_html() {
        let reply = route(&dashboard(), &Method::Get, "/", None).unwrap();
        assert_eq!(reply.status, 200);
        assert!(reply.content_type.starts_with("text/html"));
    }

    #[test]
    fn unknown_route_is_404() {
        let err = route(&dashboard(), &Method::Get, "/nope", None).unwrap_err();
        assert_eq!(err.status, 404);
    }

    #[test]
    fn query_string_is_ignored_for_routing() {
        let reply = route(&dashboard(), &Method::Get, "/_dash-layout?v=2", None).unwrap();
        assert_eq!(reply.status, 200);
    }

    #[test]
    fn update_for_unknown_output_is_404() {
        let body = r#"{"output": "map-chart", "inputs": {}}"#;
        let err = route(&dashboard(), &Method::Post, "/_dash-update-component", Some(body))
            .unwrap_err();
        assert_eq!(err.status, 404);
    }

    #[test]
    fn malformed_update_body_is_400() {
        let err = route(&dashboard(), &Method::Post, "/_dash-update-component", Some("{"))
            .unwrap_err();
        assert_eq!(err.status, 400);
    }

    #[test]
    fn posted_update_body_reaches_the_router() {
        let server = Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        std::thread::spawn(move || {
            let config = ServerConfig::default();
            handle_requests(&server, &dashboard(), &config);
        });

        let url = format!("http://127.0.0.1:{port}/_dash-update-component");
        let body = r#"{"output": "line-chart", "inputs": {"dropdown-selection": ["Canada"], "y-axis-selection": "pop"}}"#;
        let resp = ureq::post(&url)
            .set("Content-Type", "application/json")
            .send_string(body)
            .unwrap();
        assert_eq!(resp.status(), 200);

        let json: serde_json::Value = serde_json::from_str(&resp.into_string().unwrap()).unwrap();
        assert_eq!(json["output"], "line-chart");
        assert_eq!(json["figure"]["data"][0]["name"], "Canada");
    }

    #[test]
    fn error_reply_hides_context_unless_debug() {
        let make = || ApiError::from(anyhow::anyhow!("root cause").context("outer"));

        let quiet = make().into_reply(false);
        assert_eq!(quiet.status, 500);
        assert_eq!(body_json(&quiet)["error"], "outer");

        let loud = make().into_reply(true);
        assert_eq!(body_json(&loud)["error"], "outer: root cause");
    }
}
