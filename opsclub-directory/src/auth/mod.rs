//! Session resolution
//!
//! API callers send `Authorization: Bearer <token>`; page-rendered calls
//! carry the token in a session cookie instead. Either way the token itself
//! is opaque here - verification happens at the identity provider.

use axum::http::{HeaderMap, header};

use crate::error::{Error, Result};
use crate::identity::{IdentityClient, VerifiedUser};

/// Extract and validate the Authorization header
pub fn extract_bearer(auth_header: Option<&str>) -> Result<String> {
    let header = auth_header
        .ok_or_else(|| Error::Unauthorized("Missing Authorization header".to_string()))?;

    if !header.starts_with("Bearer ") {
        return Err(Error::Unauthorized(
            "Invalid Authorization header format".to_string(),
        ));
    }

    Ok(header[7..].to_string())
}

/// Pull the named cookie out of the request's Cookie headers
pub fn extract_session_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(value) = value.to_str() else { continue };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let name = parts.next().unwrap_or_default();
            if name == cookie_name {
                let token = parts.next().unwrap_or_default();
                if !token.is_empty() {
                    return Some(token.to_string());
                }
            }
        }
    }
    None
}

/// The access token for this request: bearer header first, session cookie
/// second. Fails with Unauthorized before any network or store access.
pub fn request_token(headers: &HeaderMap, cookie_name: &str) -> Result<String> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if auth_header.is_some() {
        return extract_bearer(auth_header);
    }

    extract_session_cookie(headers, cookie_name)
        .ok_or_else(|| Error::Unauthorized("No credentials supplied".to_string()))
}

/// Resolve the authenticated user for a request
pub async fn resolve_identity(
    identity: &IdentityClient,
    headers: &HeaderMap,
    cookie_name: &str,
) -> Result<VerifiedUser> {
    let token = request_token(headers, cookie_name)?;
    identity.get_user(&token).await
}
