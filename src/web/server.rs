//! Axum server for the prediction form

use crate::config::{PresentationConfig, ServerConfig};
use crate::error::PredictError;
use crate::metrics::{MetricsSnapshot, PredictionMetrics};
use crate::models::inference::ModelBundle;
use crate::types::student::{Sex, StudentInput};
use crate::validation::{parse_absences, validate_input};
use crate::web::render;
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Message shown when inference fails
pub const GENERIC_ERROR: &str = "Terjadi kesalahan saat melakukan prediksi. Silakan coba lagi.";

/// Shared, read-only handler state
#[derive(Clone)]
pub struct AppState {
    pub bundle: Arc<ModelBundle>,
    pub metrics: Arc<PredictionMetrics>,
    pub presentation: Arc<PresentationConfig>,
}

impl AppState {
    pub fn new(
        bundle: Arc<ModelBundle>,
        metrics: Arc<PredictionMetrics>,
        presentation: PresentationConfig,
    ) -> Self {
        Self {
            bundle,
            metrics,
            presentation: Arc::new(presentation),
        }
    }
}

/// Raw form fields, kept as text so they can be echoed back on error
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub absences: String,
    #[serde(default)]
    pub sex: String,
}

impl PredictForm {
    /// Parse the fields into a student input
    pub fn to_input(&self, max_absences: u32) -> Result<StudentInput, PredictError> {
        let absences = parse_absences(&self.absences, max_absences)?;
        let sex: Sex = self
            .sex
            .parse()
            .map_err(|_| PredictError::InvalidInput("Pilih jenis kelamin.".to_string()))?;

        Ok(StudentInput::new(self.name.trim(), self.class.trim(), absences, sex))
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict))
        .route("/healthz", get(healthz))
        .route("/stats", get(stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn serve<F>(config: &ServerConfig, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind {}", addr))?;

    info!("Prediction form listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let defaults = PredictForm {
        absences: "0".to_string(),
        sex: Sex::Male.form_value().to_string(),
        ..PredictForm::default()
    };
    Html(render::form_page(
        &state.presentation.title,
        &defaults,
        None,
        state.presentation.max_absences,
    ))
}

async fn predict(State(state): State<AppState>, Form(form): Form<PredictForm>) -> (StatusCode, Html<String>) {
    let start_time = Instant::now();
    let presentation = &state.presentation;

    let input = match form
        .to_input(presentation.max_absences)
        .and_then(|input| validate_input(&input, presentation).map(|_| input))
    {
        Ok(input) => input,
        Err(e) => {
            state.metrics.record_rejected();
            let message = match &e {
                PredictError::InvalidInput(message) => message.clone(),
                other => other.to_string(),
            };
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(render::form_page(
                    &presentation.title,
                    &form,
                    Some(&message),
                    presentation.max_absences,
                )),
            );
        }
    };

    match state.bundle.predict(&input) {
        Ok(result) => {
            let latency = start_time.elapsed();
            state
                .metrics
                .record_prediction("web", latency, result.probability, result.outcome.is_pass());
            info!(
                outcome = ?result.outcome,
                probability_percent = result.probability_percent,
                latency_us = latency.as_micros(),
                "Form prediction served"
            );
            (
                StatusCode::OK,
                Html(render::result_page(&presentation.title, &input, &result)),
            )
        }
        Err(e) => {
            error!(error = %e, "Form prediction failed");
            state.metrics.record_failure();
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render::error_page(&presentation.title, GENERIC_ERROR)),
            )
        }
    }
}

async fn healthz() -> &'static str {
    "ok"
}

async fn stats(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
