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

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use axum::routing::post;
use fsrs_scheduler_core::Fallible;
use fsrs_scheduler_core::Scheduler;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;

use crate::serve::health::health_handler;
use crate::serve::review::not_found_handler;
use crate::serve::review::review_handler;
use crate::serve::state::ServerState;

pub fn router(state: ServerState) -> Router {
    let app = Router::new();
    let app = app.route("/health", get(health_handler));
    let app = app.route("/review", post(review_handler));
    let app = app.fallback(not_found_handler);
    app.with_state(state)
}

pub async fn start_server(host: &str, port: u16, scheduler: Scheduler) -> Fallible<()> {
    let state = ServerState {
        scheduler: Arc::new(scheduler),
    };
    let app = router(state);
    let bind = format!("{host}:{port}");

    log::info!("Starting FSRS service on {bind}");
    let listener = TcpListener::bind(&bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    match ctrl_c().await {
        Ok(()) => log::info!("Shutting down."),
        Err(e) => log::error!("Failed to listen for the shutdown signal: {e}"),
    }
}
