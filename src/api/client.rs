//! Caller identity for rate limiting.

use super::handlers::AppState;
use crate::types::ClientKey;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use std::convert::Infallible;
use std::net::SocketAddr;

const FORWARDED_FOR: &str = "x-forwarded-for";
const REAL_IP: &str = "x-real-ip";
const ANONYMOUS: &str = "anonymous";

/// Best-effort caller address.
///
/// The socket peer, or `anonymous` without one. With `trust_forwarded`, the
/// first `X-Forwarded-For` entry and then `X-Real-IP` take precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity(pub String);

impl ClientIdentity {
    pub fn resolve(headers: &HeaderMap, peer: Option<SocketAddr>, trust_forwarded: bool) -> Self {
        let forwarded = trust_forwarded.then(|| forwarded_identity(headers)).flatten();
        let identity = forwarded
            .or_else(|| peer.map(|addr| addr.ip().to_string()))
            .unwrap_or_else(|| ANONYMOUS.to_string());
        Self(identity)
    }

    pub fn key(&self) -> ClientKey {
        ClientKey::for_ip(&self.0)
    }
}

fn forwarded_identity(headers: &HeaderMap) -> Option<String> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    header(FORWARDED_FOR)
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| header(REAL_IP))
        .map(str::to_string)
}

impl FromRequestParts<AppState> for ClientIdentity {
    type Rejection = Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        std::future::ready(Ok(Self::resolve(
            &parts.headers,
            peer,
            state.trust_forwarded_headers,
        )))
    }
}
