//! Disc deletion.

use aceback_core::DiscId;
use axum::{Json, body::Bytes, extract::State};
use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Response body for a successful deletion.
#[derive(Debug, Serialize)]
pub struct DeleteDiscResponse {
    pub success: bool,
    pub message: &'static str,
}

/// Delete a disc owned by the caller.
///
/// Body: `{"disc_id": "<uuid>"}`. The body is read raw so that a missing
/// field and malformed JSON get distinct messages.
pub async fn delete_disc(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    body: Bytes,
) -> Result<Json<DeleteDiscResponse>> {
    let raw_id = disc_id_from_body(&body)?;

    // A value that is not a UUID cannot name any disc.
    let disc_id: DiscId = raw_id
        .parse()
        .map_err(|_| AppError::NotFound("Disc not found".to_string()))?;

    let disc = state
        .discs()
        .find_disc(disc_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Disc not found".to_string()))?;

    if !disc.is_owned_by(user.id) {
        tracing::warn!(
            disc_id = %disc_id,
            user_id = %user.id,
            owner_id = %disc.owner_id,
            "Delete attempted by non-owner"
        );
        return Err(AppError::Forbidden("You do not own this disc".to_string()));
    }

    if !state.discs().delete_disc(disc_id).await? {
        // Removed by a concurrent request between lookup and delete.
        return Err(AppError::NotFound("Disc not found".to_string()));
    }

    tracing::info!(disc_id = %disc_id, user_id = %user.id, "Disc deleted");

    Ok(Json(DeleteDiscResponse {
        success: true,
        message: "Disc deleted successfully",
    }))
}

/// Extract `disc_id` from a raw request body.
fn disc_id_from_body(body: &[u8]) -> Result<String> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(disc_id_required());
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|_| AppError::BadRequest("Invalid JSON body".to_string()))?;

    match value.get("disc_id") {
        Some(Value::String(id)) if !id.trim().is_empty() => Ok(id.trim().to_string()),
        _ => Err(disc_id_required()),
    }
}

fn disc_id_required() -> AppError {
    AppError::BadRequest("disc_id is required".to_string())
}
