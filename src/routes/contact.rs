//! Contact form endpoint

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;
use crate::services::contact::{self, ContactRequest};
use crate::services::error::ApiError;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/contact", post(submit_contact))
}

#[derive(Debug, Serialize)]
struct ContactSuccess {
    message: &'static str,
}

/// POST /api/contact - Validate a submission and dispatch both emails.
/// No state is mutated; resubmission sends duplicate mail.
async fn submit_contact(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ContactRequest>,
) -> Result<(StatusCode, Json<ContactSuccess>), ApiError> {
    let submission = contact::validate(&req)?;

    contact::notify(&state.mailer, &state.config.operator_address, &submission).await?;

    Ok((
        StatusCode::OK,
        Json(ContactSuccess {
            message: "Emails sent successfully",
        }),
    ))
}
