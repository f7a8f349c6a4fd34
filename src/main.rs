//! Student Pass Predictor - Main Entry Point
//!
//! Loads (or trains) the model bundle once, then serves the prediction
//! form over HTTP and, when enabled, prediction requests over NATS.

use anyhow::Result;
use std::sync::Arc;
use student_pass_predictor::{
    config::AppConfig,
    metrics::{MetricsReporter, PredictionMetrics},
    models::ArtifactLoader,
    responder::PredictionResponder,
    telemetry,
    web::{self, AppState},
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    telemetry::init(&config.logging, "student_pass_predictor")?;
    info!("Starting Student Pass Predictor");

    // Load artifacts; missing artifacts or dataset stop the process here
    let loader = ArtifactLoader::new(&config.artifacts);
    let bundle = Arc::new(loader.load_or_train(&config.training)?);
    info!(
        features = bundle.schema().len(),
        classifier = %bundle.classifier_name(),
        "Model bundle ready"
    );

    let metrics = Arc::new(PredictionMetrics::new());

    if config.metrics.report_interval_secs > 0 {
        let reporter = MetricsReporter::new(metrics.clone(), config.metrics.report_interval_secs);
        tokio::spawn(reporter.start());
    }

    if config.nats.enabled {
        let client = async_nats::connect(&config.nats.url).await?;
        info!("Connected to NATS at {}", config.nats.url);

        let responder =
            PredictionResponder::new(bundle.clone(), metrics.clone(), config.presentation.clone());
        let subject = config.nats.request_subject.clone();
        tokio::spawn(async move {
            if let Err(e) = responder.run(client, &subject).await {
                error!(error = %e, "Prediction responder failed");
            }
        });
    }

    let state = AppState::new(bundle, metrics.clone(), config.presentation.clone());
    web::serve(&config.server, state, shutdown_signal()).await?;

    info!("Predictor shutting down...");
    metrics.print_summary();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
