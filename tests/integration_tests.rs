// Integration tests for PetMatch

use actix_web::{test, web, App};
use petmatch::config::{ScoringSettings, Settings};
use petmatch::core::generate_dataset;
use petmatch::ml::{train, TrainingConfig};
use petmatch::models::{BatchPredictResponse, ErrorResponse, HealthResponse, ModelInfoResponse, ScoreResult, FEATURE_NAMES};
use petmatch::routes::{configure_routes, AppState};
use petmatch::services::{ModelArtifact, ModelStore};
use petmatch::BatchPolicy;
use serde_json::{json, Value};
use std::sync::Arc;

fn trained_artifact() -> ModelArtifact {
    let dataset = generate_dataset(600, 42);
    ModelArtifact::new(train(&dataset, &TrainingConfig::default()).unwrap())
}

fn app_state(scoring: &ScoringSettings) -> AppState {
    AppState::new(Arc::new(trained_artifact()), scoring)
}

fn good_user() -> Value {
    json!({
        "housing_type": "house_large",
        "available_time": 8,
        "experience": "expert",
        "has_children": true,
        "has_other_pets": true
    })
}

fn animal(id: &str, size: &str, good_with_children: bool) -> Value {
    json!({
        "id": id,
        "species": "dog",
        "age": 4,
        "size": size,
        "energy_level": 5,
        "good_with_children": good_with_children,
        "good_with_pets": good_with_children
    })
}

#[actix_web::test]
async fn test_integration_predict_single() {
    let state = app_state(&ScoringSettings::default());
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(json!({ "user": good_user(), "animal": animal("1", "large", true) }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: ScoreResult = test::read_body_json(resp).await;
    assert!((0.0..=100.0).contains(&body.compatibility_score));
    assert_eq!(body.recommendation, petmatch::classify(body.compatibility_score));
}

#[actix_web::test]
async fn test_integration_predict_missing_animal_is_bad_request() {
    let state = app_state(&ScoringSettings::default());
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(json!({ "user": good_user() }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.status_code, 400);
    assert_eq!(body.error, "Invalid input format");
}

#[actix_web::test]
async fn test_integration_predict_bad_field_is_server_error() {
    let state = app_state(&ScoringSettings::default());
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/predict")
        .set_json(json!({ "user": good_user(), "animal": { "age": "ancient" } }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 500);

    let body: ErrorResponse = test::read_body_json(resp).await;
    assert!(body.message.contains("animal.age"));
}

#[actix_web::test]
async fn test_integration_batch_is_ranked() {
    let state = app_state(&ScoringSettings::default());
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_routes)).await;

    let animals = vec![
        animal("bad-fit", "large", false),
        animal("great-fit", "large", true),
        animal("ok-fit", "small", true),
    ];
    let req = test::TestRequest::post()
        .uri("/predict/batch")
        .set_json(json!({ "user": good_user(), "animals": animals }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: BatchPredictResponse = test::read_body_json(resp).await;
    assert_eq!(body.predictions.len(), 3);
    for pair in body.predictions.windows(2) {
        assert!(pair[0].compatibility_score >= pair[1].compatibility_score);
    }
    // Children and pets this dog cannot live with sink it to the bottom
    assert_eq!(body.predictions[2].animal_id, Some(json!("bad-fit")));
}

#[actix_web::test]
async fn test_integration_batch_fail_fast_and_skip_invalid() {
    let animals = json!([animal("1", "small", true), { "id": "2", "energy_level": "lots" }]);

    let strict = app_state(&ScoringSettings::default());
    let app = test::init_service(App::new().app_data(web::Data::new(strict)).configure(configure_routes)).await;
    let req = test::TestRequest::post()
        .uri("/predict/batch")
        .set_json(json!({ "user": good_user(), "animals": animals.clone() }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 500);

    let lenient = app_state(&ScoringSettings {
        batch_policy: BatchPolicy::SkipInvalid,
        ..ScoringSettings::default()
    });
    let app = test::init_service(App::new().app_data(web::Data::new(lenient)).configure(configure_routes)).await;
    let req = test::TestRequest::post()
        .uri("/predict/batch")
        .set_json(json!({ "user": good_user(), "animals": animals }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: BatchPredictResponse = test::read_body_json(resp).await;
    assert_eq!(body.predictions.len(), 1);
    assert_eq!(body.predictions[0].animal_id, Some(json!("1")));
}

#[actix_web::test]
async fn test_integration_batch_over_limit() {
    let state = app_state(&ScoringSettings {
        max_batch_size: 2,
        ..ScoringSettings::default()
    });
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_routes)).await;

    let animals: Vec<Value> = (0..3).map(|i| animal(&i.to_string(), "small", true)).collect();
    let req = test::TestRequest::post()
        .uri("/predict/batch")
        .set_json(json!({ "user": good_user(), "animals": animals }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_integration_health_and_model_info() {
    let state = app_state(&ScoringSettings::default());
    let model_id = state.model.model_id;
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_routes)).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), 200);
    let health: HealthResponse = test::read_body_json(resp).await;
    assert_eq!(health.status, "healthy");
    assert_eq!(health.model, "decision_tree");

    let resp = test::call_service(&app, test::TestRequest::get().uri("/model").to_request()).await;
    assert_eq!(resp.status(), 200);
    let info: ModelInfoResponse = test::read_body_json(resp).await;
    assert_eq!(info.model_id, model_id);
    assert_eq!(info.feature_names, FEATURE_NAMES.to_vec());
}

#[actix_web::test]
async fn test_integration_artifact_round_trip_scores_identically() {
    let dir = tempfile::tempdir().unwrap();
    let store = ModelStore::new(dir.path().join("compatibility_model.json"));
    let artifact = trained_artifact();
    store.save(&artifact).unwrap();
    let loaded = store.load().await.unwrap();

    let settings = Settings::default();
    let original = AppState::new(Arc::new(artifact), &settings.scoring);
    let reloaded = AppState::new(Arc::new(loaded), &settings.scoring);

    let user = good_user();
    for a in [animal("1", "large", true), animal("2", "small", false)] {
        assert_eq!(
            original.scorer.score_json(&user, &a).unwrap(),
            reloaded.scorer.score_json(&user, &a).unwrap()
        );
    }
}
