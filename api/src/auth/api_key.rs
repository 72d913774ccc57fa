//! API key authentication middleware

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};

use crate::app::hash_api_key;
use crate::domain::entities::User;
use crate::error::AppError;
use crate::AppState;

/// Extract the API key from the Authorization header
fn extract_api_key(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Update last seen (fire and forget, log errors)
fn touch_in_background(state: &AppState, user: &User) {
    let user_id = user.id;
    let user_service = state.user_service.clone();
    tokio::spawn(async move {
        if let Err(e) = user_service.touch(&user_id).await {
            tracing::warn!(error = %e, user_id = %user_id, "Failed to update last_seen");
        }
    });
}

/// Authentication middleware
///
/// Validates the API key and injects the User into request extensions.
/// Routes that require authentication should use this middleware.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let api_key = extract_api_key(&request).ok_or(AppError::Unauthorized)?;
    let key_hash = hash_api_key(api_key);

    let user = state
        .user_service
        .find_by_api_key(&key_hash)
        .await?
        .ok_or(AppError::Unauthorized)?;

    touch_in_background(&state, &user);
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Optional authentication middleware
///
/// Like auth_middleware but doesn't fail if no auth is provided.
/// Handlers read `Option<Extension<User>>`.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if let Some(api_key) = extract_api_key(&request) {
        let key_hash = hash_api_key(api_key);

        match state.user_service.find_by_api_key(&key_hash).await {
            Ok(Some(user)) => {
                touch_in_background(&state, &user);
                request.extensions_mut().insert(user);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "API key lookup failed, continuing anonymously"),
        }
    }

    next.run(request).await
}

/// Moderator gate
///
/// Must run after auth_middleware; rejects users without the admin role.
pub async fn moderator_middleware(request: Request<Body>, next: Next) -> Result<Response, AppError> {
    let is_moderator = request
        .extensions()
        .get::<User>()
        .ok_or(AppError::Unauthorized)?
        .is_moderator();

    if !is_moderator {
        return Err(AppError::Forbidden);
    }

    Ok(next.run(request).await)
}
