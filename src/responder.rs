//! Request/reply prediction surface over NATS

use crate::config::PresentationConfig;
use crate::metrics::PredictionMetrics;
use crate::models::inference::ModelBundle;
use crate::producer::ReplyProducer;
use crate::types::prediction::{PredictRequest, PredictResponse};
use crate::validation::validate_input;
use anyhow::Result;
use async_nats::Client;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Answers JSON prediction requests with JSON replies
#[derive(Clone)]
pub struct PredictionResponder {
    bundle: Arc<ModelBundle>,
    metrics: Arc<PredictionMetrics>,
    presentation: PresentationConfig,
}

impl PredictionResponder {
    pub fn new(
        bundle: Arc<ModelBundle>,
        metrics: Arc<PredictionMetrics>,
        presentation: PresentationConfig,
    ) -> Self {
        Self {
            bundle,
            metrics,
            presentation,
        }
    }

    /// Turn one request payload into a reply. Never fails: every problem
    /// becomes an error reply.
    pub fn handle(&self, payload: &[u8]) -> PredictResponse {
        let start_time = Instant::now();

        let request = match serde_json::from_slice::<PredictRequest>(payload) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Failed to deserialize prediction request");
                self.metrics.record_rejected();
                return PredictResponse::failure(Uuid::new_v4(), format!("invalid request: {}", e));
            }
        };
        let request_id = request.request_id.unwrap_or_else(Uuid::new_v4);

        if let Err(e) = validate_input(&request.student, &self.presentation) {
            self.metrics.record_rejected();
            return PredictResponse::failure(request_id, e.to_string());
        }

        match self.bundle.predict(&request.student) {
            Ok(prediction) => {
                self.metrics.record_prediction(
                    "nats",
                    start_time.elapsed(),
                    prediction.probability,
                    prediction.outcome.is_pass(),
                );
                PredictResponse::success(request_id, prediction)
            }
            Err(e) => {
                error!(request_id = %request_id, error = %e, "Prediction failed");
                self.metrics.record_failure();
                PredictResponse::failure(request_id, "prediction failed")
            }
        }
    }

    /// Serve requests until the subscription ends.
    pub async fn run(self, client: Client, subject: &str) -> Result<()> {
        let mut subscription = client.subscribe(subject.to_string()).await?;
        let producer = ReplyProducer::new(client);

        info!(subject = %subject, "Prediction responder started");

        while let Some(message) = subscription.next().await {
            let response = self.handle(&message.payload);

            match message.reply {
                Some(inbox) => {
                    if let Err(e) = producer.reply(inbox, &response).await {
                        error!(
                            request_id = %response.request_id,
                            error = %e,
                            "Failed to publish prediction reply"
                        );
                    }
                }
                None => warn!(
                    request_id = %response.request_id,
                    "Prediction request had no reply subject, dropping reply"
                ),
            }
        }

        info!("Prediction responder stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_assembler::FeatureSchema;
    use crate::error::{PredictError, PredictResult};
    use crate::models::classifier::{Classifier, LogisticRegression};
    use crate::models::scaler::StandardScaler;
    use crate::types::prediction::Outcome;

    struct BrokenClassifier;

    impl Classifier for BrokenClassifier {
        fn name(&self) -> &str {
            "broken"
        }

        fn feature_count(&self) -> Option<usize> {
            None
        }

        fn predict_proba(&self, _row: &[f64]) -> PredictResult<[f64; 2]> {
            Err(PredictError::Model("session output missing".to_string()))
        }
    }

    fn responder() -> PredictionResponder {
        responder_with(Box::new(LogisticRegression::new(vec![1.0, 1.0], 0.0)))
    }

    fn responder_with(classifier: Box<dyn Classifier>) -> PredictionResponder {
        let bundle = ModelBundle::new(
            FeatureSchema::new(["absences", "sex_M"]),
            StandardScaler::identity(2),
            classifier,
        )
        .unwrap();

        PredictionResponder::new(
            Arc::new(bundle),
            Arc::new(PredictionMetrics::new()),
            PresentationConfig::default(),
        )
    }

    #[test]
    fn test_handle_valid_request() {
        let id = Uuid::new_v4();
        let payload = format!(
            r#"{{"request_id":"{}","name":"Budi","class":"XI IPA 1","absences":5,"sex":"male"}}"#,
            id
        );

        let response = responder().handle(payload.as_bytes());

        assert_eq!(response.request_id, id);
        let prediction = response.prediction.unwrap();
        assert_eq!(prediction.outcome, Outcome::Pass);
        assert_eq!(prediction.probability_percent, 99.75);
    }

    #[test]
    fn test_handle_malformed_payload() {
        let responder = responder();
        let response = responder.handle(b"not json");

        assert!(response.prediction.is_none());
        assert!(response.error.unwrap().starts_with("invalid request"));
        assert_eq!(responder.metrics.snapshot().rejected, 1);
    }

    #[test]
    fn test_handle_missing_identity() {
        let payload = br#"{"name":"","class":"","absences":5,"sex":"female"}"#;
        let response = responder().handle(payload);

        assert!(response.prediction.is_none());
        assert!(response.error.is_some());
    }

    #[test]
    fn test_handle_inference_failure() {
        let responder = responder_with(Box::new(BrokenClassifier));
        let id = Uuid::new_v4();
        let payload = format!(
            r#"{{"request_id":"{}","name":"Budi","class":"XI IPA 1","absences":5,"sex":"male"}}"#,
            id
        );

        let response = responder.handle(payload.as_bytes());

        assert_eq!(response.request_id, id);
        assert!(response.prediction.is_none());
        assert_eq!(response.error.as_deref(), Some("prediction failed"));

        let snapshot = responder.metrics.snapshot();
        assert_eq!(snapshot.failures, 1);
        assert_eq!(snapshot.predictions, 0);
    }
}
