//! Farcaster FID bearer authentication
//!
//! The mini-app client authenticates with `Authorization: Bearer <fid>`,
//! where the FID is the numeric Farcaster identifier from the frame
//! context. The middleware validates the header shape and makes the FID
//! available to handlers; user resolution happens against the ledger.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::Response,
};

/// Authenticated Farcaster identifier, inserted into request extensions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthFid(pub i64);

pub async fn auth_middleware(
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let fid = auth_header
        .and_then(parse_bearer_fid)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(AuthFid(fid));
    Ok(next.run(request).await)
}

fn parse_bearer_fid(header: &str) -> Option<i64> {
    let token = header.strip_prefix("Bearer ")?.trim();
    let fid: i64 = token.parse().ok()?;
    if fid <= 0 {
        return None;
    }
    Some(fid)
}
