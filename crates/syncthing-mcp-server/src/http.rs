//! JSON-RPC over HTTP
//!
//! `POST /mcp` carries one JSON-RPC message per request. `GET /health` is
//! open; every other route requires `Authorization: Bearer <token>` when a
//! token is configured.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::rpc::{McpHandler, PARSE_ERROR};

/// Largest request body accepted on `/mcp`
pub const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// HTTP server that serves MCP on `/mcp`
pub struct HttpServer {
    handler: Arc<McpHandler>,
    addr: SocketAddr,
    bearer_token: Option<Arc<str>>,
}

impl HttpServer {
    /// Creates a new `HttpServer`.
    ///
    /// # Arguments
    /// * `handler` - Shared MCP request handler
    /// * `bind` - Address to bind, e.g. `"127.0.0.1:8385"`
    /// * `bearer_token` - Token required on `/mcp`; blank means none
    pub fn new(handler: McpHandler, bind: &str, bearer_token: Option<&str>) -> anyhow::Result<Self> {
        let addr: SocketAddr = bind.parse()?;
        let bearer_token = bearer_token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(Arc::from);
        Ok(Self {
            handler: Arc::new(handler),
            addr,
            bearer_token,
        })
    }

    /// Serves until the cancellation token is triggered
    pub async fn run(&self, shutdown: CancellationToken) -> anyhow::Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        info!(addr = %self.addr, auth = self.bearer_token.is_some(), "MCP HTTP transport listening");
        if self.bearer_token.is_none() {
            warn!("No bearer token configured; /mcp is unauthenticated");
        }

        loop {
            tokio::select! {
                result = listener.accept() => {
                    let (stream, peer) = result?;
                    let io = TokioIo::new(stream);
                    let handler = Arc::clone(&self.handler);
                    let token = self.bearer_token.clone();

                    tokio::spawn(async move {
                        let service = service_fn(move |req| {
                            let handler = Arc::clone(&handler);
                            let token = token.clone();
                            async move {
                                Ok::<_, Infallible>(handle_request(req, &handler, token.as_deref()).await)
                            }
                        });

                        if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                            error!(error = %e, peer = %peer, "MCP HTTP connection error");
                        }
                    });
                }
                _ = shutdown.cancelled() => {
                    info!("HTTP transport shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}

fn json_response(status: StatusCode, body: &Value) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body.to_string())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

fn empty_response(status: StatusCode) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

fn unauthorized() -> Response<Full<Bytes>> {
    let mut response = json_response(
        StatusCode::UNAUTHORIZED,
        &json!({ "error": "Invalid or missing bearer token" }),
    );
    response
        .headers_mut()
        .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    response
}

fn authorized<B>(req: &Request<B>, token: Option<&str>) -> bool {
    let Some(expected) = token else {
        return true;
    };
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|given| given.trim() == expected)
}

/// Handles a single HTTP request
pub async fn handle_request<B>(
    req: Request<B>,
    handler: &McpHandler,
    token: Option<&str>,
) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let path = req.uri().path();
    if path == "/health" && req.method() == Method::GET {
        return json_response(StatusCode::OK, &json!({ "status": "ok" }));
    }
    if !authorized(&req, token) {
        debug!(path, "Rejected unauthenticated request");
        return unauthorized();
    }
    if path != "/mcp" {
        return empty_response(StatusCode::NOT_FOUND);
    }
    if req.method() != Method::POST {
        let mut response = empty_response(StatusCode::METHOD_NOT_ALLOWED);
        response
            .headers_mut()
            .insert(hyper::header::ALLOW, HeaderValue::from_static("POST"));
        return response;
    }

    let body = match Limited::new(req.into_body(), MAX_BODY_BYTES).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            return empty_response(StatusCode::PAYLOAD_TOO_LARGE);
        }
        Err(e) => {
            warn!(error = %e, "Failed to read request body");
            return empty_response(StatusCode::BAD_REQUEST);
        }
    };

    let message: Value = match serde_json::from_slice(&body) {
        Ok(message) => message,
        Err(e) => {
            return json_response(
                StatusCode::BAD_REQUEST,
                &json!({
                    "jsonrpc": "2.0",
                    "id": null,
                    "error": { "code": PARSE_ERROR, "message": format!("Parse error: {e}") },
                }),
            );
        }
    };

    match handler.handle(message).await {
        Some(reply) => json_response(StatusCode::OK, &reply),
        None => empty_response(StatusCode::ACCEPTED),
    }
}
