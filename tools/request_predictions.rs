//! Prediction Request Generator
//!
//! Sends random student prediction requests over NATS and logs the replies.

use rand::Rng;
use std::time::Duration;
use student_pass_predictor::types::{PredictRequest, PredictResponse, Sex, StudentInput};
use tracing::{info, warn};
use uuid::Uuid;

const FIRST_NAMES: [&str; 8] = ["Budi", "Sari", "Andi", "Dewi", "Rizky", "Putri", "Agus", "Nur"];
const CLASSES: [&str; 4] = ["X IPA 1", "XI IPA 2", "XI IPS 1", "XII IPS 3"];

/// Random student generator for testing
struct StudentGenerator {
    rng: rand::rngs::ThreadRng,
}

impl StudentGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }

    fn generate(&mut self, frequent_absence_rate: f64) -> PredictRequest {
        let absences = if self.rng.gen_bool(frequent_absence_rate) {
            self.rng.gen_range(15..=75)
        } else {
            self.rng.gen_range(0..10)
        };
        let sex = if self.rng.gen_bool(0.5) { Sex::Male } else { Sex::Female };

        PredictRequest {
            request_id: Some(Uuid::new_v4()),
            student: StudentInput::new(
                FIRST_NAMES[self.rng.gen_range(0..FIRST_NAMES.len())],
                CLASSES[self.rng.gen_range(0..CLASSES.len())],
                absences,
                sex,
            ),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("request_predictions=info".parse()?),
        )
        .init();

    info!("Starting Prediction Request Generator");

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let nats_url = args.get(1).map(|s| s.as_str()).unwrap_or("nats://localhost:4222");
    let subject = args.get(2).map(|s| s.as_str()).unwrap_or("students.predict");
    let count: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(20);
    let absence_rate: f64 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(0.3);
    let delay_ms: u64 = args.get(5).and_then(|s| s.parse().ok()).unwrap_or(200);

    info!(
        nats_url = %nats_url,
        subject = %subject,
        count = count,
        absence_rate = absence_rate,
        delay_ms = delay_ms,
        "Configuration loaded"
    );

    let client = match async_nats::connect(nats_url).await {
        Ok(c) => {
            info!("Connected to NATS");
            c
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to NATS. Running in dry-run mode.");
            return run_dry_mode(count, absence_rate, delay_ms).await;
        }
    };

    let mut generator = StudentGenerator::new();
    let mut passes = 0u64;
    let mut errors = 0u64;

    for i in 0..count {
        let request = generator.generate(absence_rate);
        let payload = serde_json::to_vec(&request)?;

        let reply = client.request(subject.to_string(), payload.into()).await?;
        let response: PredictResponse = serde_json::from_slice(&reply.payload)?;

        match (&response.prediction, &response.error) {
            (Some(prediction), _) => {
                if prediction.outcome.is_pass() {
                    passes += 1;
                }
                info!(
                    request_id = %response.request_id,
                    absences = request.student.absences,
                    sex = %request.student.sex,
                    outcome = prediction.outcome.display_label(),
                    probability = format!("{:.2}%", prediction.probability_percent),
                    "Prediction received"
                );
            }
            (None, error) => {
                errors += 1;
                warn!(request_id = %response.request_id, error = ?error, "Prediction rejected");
            }
        }

        if (i + 1) % 10 == 0 {
            info!("Sent {}/{} requests ({} passes, {} errors)", i + 1, count, passes, errors);
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    info!(
        "Completed! Sent {} requests ({} passes, {} errors)",
        count, passes, errors
    );

    Ok(())
}

async fn run_dry_mode(count: u64, absence_rate: f64, delay_ms: u64) -> anyhow::Result<()> {
    info!("Running in dry-run mode (no NATS connection)");

    let mut generator = StudentGenerator::new();

    for i in 0..count {
        let request = generator.generate(absence_rate);
        let json = serde_json::to_string_pretty(&request)?;

        if (i + 1) % 10 == 0 || i == 0 {
            info!("Sample request {}:\n{}", i + 1, json);
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    Ok(())
}
