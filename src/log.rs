use std::{io, net::SocketAddr};

use axum::{
    extract::{ConnectInfo, Request},
    http::{Method, Uri},
    middleware::Next,
    response::Response,
};
use tracing::Level;

/// Installs the stderr subscriber. Later calls are no-ops.
pub fn init(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .compact()
        .try_init();
}

/// Logs every request before handing it on, never touches the response.
pub async fn log_request(req: Request, next: Next) -> Response {
    let remote = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    tracing::info!("{}", request_line(req.method(), req.uri(), remote));
    next.run(req).await
}

#[must_use]
pub fn request_line(method: &Method, uri: &Uri, remote: Option<SocketAddr>) -> String {
    match remote {
        Some(addr) => format!("{method} {uri} from {addr}"),
        None => format!("{method} {uri} from -"),
    }
}
