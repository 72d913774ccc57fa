//! User handlers
//!
//! Registration endpoint.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::AppState;

/// Request body for user registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Display name (unique)
    pub name: String,
}

/// Response body for user registration
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub id: String,
    pub name: String,
    pub role: String,
    /// API key for authenticated calls (Authorization: Bearer <api_key>)
    pub api_key: String,
    pub message: String,
}

/// POST /users/register
///
/// Register a new user. Returns the API key (only shown once).
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let (user, api_key) = state.user_service.register(&request.name).await?;

    let message = format!(
        "Welcome to MedShare! Save your API key - it won't be shown again.\n\n\
         API Usage:\n\
           curl -H \"Authorization: Bearer {}\" {}/models/mine",
        api_key, state.api_base_url,
    );

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id.to_string(),
            name: user.name,
            role: user.role.to_string(),
            api_key,
            message,
        }),
    ))
}
