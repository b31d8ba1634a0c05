//! HTTP surface tests against the router with stubbed upstreams

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use common::{heuristic_service, service_with, MapGeocoder, UnreachableVegetation};
use serde_json::{json, Value};
use soil_assessment_backend::config::JobsConfig;
use soil_assessment_backend::services::{
    AreaAssessor, InMemoryJobStore, JobManager, PredictionEngine, SoilAssessmentService,
};
use soil_assessment_backend::{create_app, AppState};
use tower::ServiceExt;

fn app_with(service: SoilAssessmentService) -> Router {
    let assessments = Arc::new(service);
    let jobs = Arc::new(JobManager::start(
        Arc::new(InMemoryJobStore::new()),
        assessments.clone() as Arc<dyn AreaAssessor>,
        &JobsConfig {
            workers: 2,
            queue_capacity: 8,
            retention_secs: 0,
        },
    ));
    create_app(AppState::new(assessments, jobs))
}

fn app() -> Router {
    app_with(heuristic_service())
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_reports_heuristic_only() {
    let (status, body) = send(&app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["predictionModel"], "heuristic-only");
}

#[tokio::test]
async fn test_point_assessment_payload_shape() {
    let (status, body) = send(&app(), get("/soil?lat=18.52&lon=73.86")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["centroid"], json!({"lon": 73.86, "lat": 18.52}));
    assert_eq!(body["locationName"], "18.52, 73.86");
    assert_eq!(body["soilBaseline"]["pH"]["value"], 6.8);
    assert_eq!(body["nutrientEstimates"].as_object().unwrap().len(), 12);
    assert_eq!(body["nutrientEstimates"]["Zn"]["method"], "heuristic");
    assert!(body["confidenceReport"]["perNutrient"]["pH"].is_string());
    assert!(body["recommendation"]
        .as_str()
        .unwrap()
        .contains("laboratory confirmation"));
}

#[tokio::test]
async fn test_place_lookup_falls_back_to_village() {
    let geocoder = Arc::new(MapGeocoder::with("Wagholi", 18.58, 73.98));
    let app = app_with(service_with(
        geocoder.clone(),
        Arc::new(UnreachableVegetation),
        PredictionEngine::heuristic_only(),
    ));

    let (status, body) = send(
        &app,
        get("/soil?village=Wagholi&city=Pune&state=Maharashtra&country=India"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["locationName"], "Wagholi, Maharashtra, India");
    assert_eq!(geocoder.calls.lock().unwrap()[0], "Wagholi, Pune, Maharashtra, India");
}

#[tokio::test]
async fn test_missing_location_is_400() {
    let (status, body) = send(&app(), get("/soil")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "MISSING_LOCATION");
}

#[tokio::test]
async fn test_unresolvable_place_is_404() {
    let (status, body) = send(&app(), get("/soil?city=Atlantis")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "LOCATION_NOT_FOUND");
}

#[tokio::test]
async fn test_area_assessment_and_bad_geometry() {
    let app = app();
    let polygon = json!({
        "type": "Polygon",
        "coordinates": [[[77.0, 12.9], [77.002, 12.9], [77.002, 12.902], [77.0, 12.902], [77.0, 12.9]]]
    });

    let (status, body) = send(
        &app,
        post_json("/soil/area", json!({"polygon": polygon, "cropType": "rice"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["areaHectares"].as_f64().unwrap() > 4.0);
    assert_eq!(body["cropType"], "rice");

    let (status, body) = send(
        &app,
        post_json("/soil/area", json!({"polygon": {"type": "LineString", "coordinates": []}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_GEOMETRY");
}

#[tokio::test]
async fn test_submit_then_poll_until_completed() {
    let app = app();
    let (status, body) = send(
        &app,
        post_json(
            "/soil/assess",
            json!({
                "area": {"type": "Point", "coordinates": [73.86, 18.52]},
                "requestedDepthCm": 15,
                "cropType": "cotton"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["status"], "processing");
    let job_id = body["jobId"].as_str().unwrap().to_string();

    let mut job = Value::Null;
    for _ in 0..200 {
        let (status, polled) = send(&app, get(&format!("/soil/assess/{}", job_id))).await;
        assert_eq!(status, StatusCode::OK);
        if polled["status"] != "processing" {
            job = polled;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(job["status"], "completed");
    assert_eq!(job["id"], job_id.as_str());
    assert_eq!(job["result"]["soilBaseline"]["pH"]["depthCm"], 15);
    assert_eq!(job["result"]["cropType"], "cotton");
}

#[tokio::test]
async fn test_submit_validation() {
    let app = app();

    let (status, body) = send(
        &app,
        post_json(
            "/soil/assess",
            json!({"area": {"type": "Point", "coordinates": [73.86, 18.52]}, "requestedDepthCm": 0}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, _) = send(
        &app,
        post_json(
            "/soil/assess",
            json!({"area": {"type": "Point", "coordinates": [73.86, 18.52]}, "cropType": ""}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        post_json(
            "/soil/assess",
            json!({
                "area": {"type": "Point", "coordinates": [73.86, 18.52]},
                "fromDate": "2024-06-01T00:00:00Z",
                "toDate": "2024-01-01T00:00:00Z"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_job_is_404() {
    let (status, body) = send(&app(), get("/soil/assess/not-a-real-job")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "JOB_NOT_FOUND");
}
