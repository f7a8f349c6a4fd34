//! End-to-end tests driving the form router in-process

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use std::sync::Arc;
use student_pass_predictor::{
    config::{ArtifactsConfig, PresentationConfig, TrainingConfig},
    error::{PredictError, PredictResult},
    feature_assembler::FeatureSchema,
    metrics::PredictionMetrics,
    models::{ArtifactLoader, Classifier, LogisticRegression, ModelBundle, StandardScaler},
    web::{router, server::GENERIC_ERROR, AppState},
};
use tower::ServiceExt;

fn hand_set_bundle() -> ModelBundle {
    // identity scaler; z = absences + sex_M
    ModelBundle::new(
        FeatureSchema::new(["absences", "sex_M"]),
        StandardScaler::identity(2),
        Box::new(LogisticRegression::new(vec![1.0, 1.0], 0.0)),
    )
    .unwrap()
}

fn app_with(bundle: ModelBundle, presentation: PresentationConfig) -> (axum::Router, Arc<PredictionMetrics>) {
    let metrics = Arc::new(PredictionMetrics::new());
    let state = AppState::new(Arc::new(bundle), metrics.clone(), presentation);
    (router(state), metrics)
}

fn post_form(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_index_renders_form() {
    let (app, _) = app_with(hand_set_bundle(), PresentationConfig::default());

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<form method=\"post\" action=\"/predict\">"));
    assert!(html.contains("Laki-laki"));
    assert!(html.contains("Perempuan"));
}

#[tokio::test]
async fn test_prediction_result_page() {
    let (app, metrics) = app_with(hand_set_bundle(), PresentationConfig::default());

    let response = app
        .oneshot(post_form("name=Budi&class=XI+IPA+1&absences=5&sex=male"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<strong>Prediksi:</strong> Lulus"));
    assert!(html.contains("<strong>Probabilitas Lulus:</strong> 99.75%"));
    assert!(html.contains("notice success"));
    assert!(html.contains("XI IPA 1"));
    assert_eq!(metrics.snapshot().predictions, 1);
}

#[tokio::test]
async fn test_failing_prediction_uses_error_notice() {
    let bundle = ModelBundle::new(
        FeatureSchema::new(["absences", "sex_M"]),
        StandardScaler::identity(2),
        Box::new(LogisticRegression::new(vec![-0.5, 0.0], 2.0)),
    )
    .unwrap();
    let (app, _) = app_with(bundle, PresentationConfig::default());

    let response = app
        .oneshot(post_form("name=Sari&class=XII+IPS+2&absences=20&sex=female"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<strong>Prediksi:</strong> Tidak Lulus"));
    assert!(html.contains("notice error"));
}

/// Classifier whose every call fails, as a broken exported model would
struct BrokenClassifier;

impl Classifier for BrokenClassifier {
    fn name(&self) -> &str {
        "broken"
    }

    fn feature_count(&self) -> Option<usize> {
        None
    }

    fn predict_proba(&self, _row: &[f64]) -> PredictResult<[f64; 2]> {
        Err(PredictError::Model("tensor shape [1, 0]".to_string()))
    }
}

#[tokio::test]
async fn test_inference_failure_shows_generic_error() {
    let bundle = ModelBundle::new(
        FeatureSchema::new(["absences", "sex_M"]),
        StandardScaler::identity(2),
        Box::new(BrokenClassifier),
    )
    .unwrap();
    let (app, metrics) = app_with(bundle, PresentationConfig::default());

    let response = app
        .oneshot(post_form("name=Budi&class=XI+IPA+1&absences=5&sex=male"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let html = body_text(response).await;
    assert!(html.contains(GENERIC_ERROR));
    assert!(!html.contains("tensor shape"));
    assert!(!html.contains("Prediksi:"));

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.failures, 1);
    assert_eq!(snapshot.predictions, 0);
}

#[tokio::test]
async fn test_missing_identity_is_blocked() {
    let (app, metrics) = app_with(hand_set_bundle(), PresentationConfig::default());

    let response = app
        .oneshot(post_form("name=&class=&absences=5&sex=male"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("Nama dan Kelas wajib diisi."));
    assert_eq!(metrics.snapshot().predictions, 0);
    assert_eq!(metrics.snapshot().rejected, 1);
}

#[tokio::test]
async fn test_missing_identity_allowed_when_not_required() {
    let presentation = PresentationConfig {
        require_identity: false,
        ..PresentationConfig::default()
    };
    let (app, _) = app_with(hand_set_bundle(), presentation);

    let response = app
        .oneshot(post_form("name=&class=&absences=0&sex=female"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    // z = 0 -> 50.00%, which counts as a pass
    let html = body_text(response).await;
    assert!(html.contains("50.00%"));
    assert!(html.contains("<strong>Prediksi:</strong> Lulus"));
}

#[tokio::test]
async fn test_invalid_absences_is_rejected() {
    let (app, _) = app_with(hand_set_bundle(), PresentationConfig::default());

    let response = app
        .oneshot(post_form("name=Budi&class=XI&absences=-3&sex=male"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("value=\"-3\""));
}

#[tokio::test]
async fn test_healthz_and_stats() {
    let (app, _) = app_with(hand_set_bundle(), PresentationConfig::default());

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(body_text(response).await, "ok");

    let response = app
        .oneshot(Request::builder().uri("/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let stats: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(stats["predictions"], 0);
}

#[tokio::test]
async fn test_self_trained_bundle_serves_form() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = dir.path().join("student_data.csv");
    let mut csv = String::from("school,sex,age,absences,G3\n");
    for i in 0..25 {
        let sex = if i % 2 == 0 { "M" } else { "F" };
        csv.push_str(&format!("GP,{},16,{},{}\n", sex, i % 3, 15));
        csv.push_str(&format!("MS,{},17,{},{}\n", sex, 30 + i % 3, 5));
    }
    std::fs::write(&dataset, csv).unwrap();

    let artifacts = ArtifactsConfig {
        dir: dir.path().join("models").display().to_string(),
        train_if_missing: true,
        dataset_path: dataset.display().to_string(),
        ..ArtifactsConfig::default()
    };
    let bundle = ArtifactLoader::new(&artifacts)
        .load_or_train(&TrainingConfig::default())
        .unwrap();
    let (app, _) = app_with(bundle, PresentationConfig::default());

    let response = app
        .oneshot(post_form("name=Andi&class=X+IPA+1&absences=1&sex=male"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("<strong>Prediksi:</strong> Lulus"));
}
