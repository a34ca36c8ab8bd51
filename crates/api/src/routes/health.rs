use axum::extract::State;

use crate::error::AppError;
use crate::state::AppState;

/// Liveness + quick store probe.
pub async fn health(State(state): State<AppState>) -> Result<&'static str, AppError> {
    state.repos().health().check_connection().await?;
    Ok("ok")
}
