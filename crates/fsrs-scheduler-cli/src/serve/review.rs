// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use fsrs_scheduler_core::ErrorKind;
use fsrs_scheduler_core::ErrorReport;
use fsrs_scheduler_core::Fallible;
use fsrs_scheduler_core::Timestamp;
use serde_json::json;

use crate::serve::state::ServerState;
use crate::wire::ReviewResponse;
use crate::wire::parse_request;
use crate::wire::process;

/// An error on its way to the client.
pub struct ApiError(ErrorReport);

impl From<ErrorReport> for ApiError {
    fn from(value: ErrorReport) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.kind() {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.message() }))).into_response()
    }
}

pub async fn review_handler(
    State(state): State<ServerState>,
    body: String,
) -> Result<Json<ReviewResponse>, ApiError> {
    match review_action(&state, &body) {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            log::error!("Error processing review: {e}");
            Err(e.into())
        }
    }
}

fn review_action(state: &ServerState, body: &str) -> Fallible<ReviewResponse> {
    let request = parse_request(body)?;
    let rating = request.rating;
    let response = process(&state.scheduler, request, Timestamp::now())?;
    log::info!(
        "Reviewed card: rating={}, old_state={}, new_state={}",
        rating,
        response.review_log.state_before,
        response.review_log.state_after
    );
    Ok(response)
}

pub async fn not_found_handler() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
}
