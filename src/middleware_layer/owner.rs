use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{error::AppError, models::owner::Owner};

/// The header the upstream authentication proxy sets to the user's ID.
pub const OWNER_HEADER: &str = "x-owner-id";

/// Extracts the owner ID from the request headers.
///
/// # Arguments
///
/// * `request` - The incoming request.
///
/// # Returns
///
/// An `Option` containing the owner ID if present and well formed.
fn extract_owner_id(request: &Request<Body>) -> Option<Uuid> {
    request
        .headers()
        .get(OWNER_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
}

/// A middleware that requires the request to carry an owner.
///
/// # Arguments
///
/// * `request` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// A `Response` or an `AppError::Unauthorized`.
pub async fn require_owner(mut request: Request<Body>, next: Next) -> Result<Response, AppError> {
    let owner_id = extract_owner_id(&request).ok_or_else(|| {
        tracing::warn!("❌ Missing or malformed {} header", OWNER_HEADER);
        AppError::Unauthorized(format!("A valid {} header is required", OWNER_HEADER))
    })?;

    tracing::debug!("✅ Request on behalf of owner: {}", owner_id);

    request.extensions_mut().insert(Owner { id: owner_id });

    Ok(next.run(request).await)
}
