use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use runguide_rs::{app, config::Config, state::AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).method(method);
    let request = match body {
        Some(json) => request
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => request.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn fix(latitude: f64, second: u32) -> Value {
    json!({
        "coordinate": { "latitude": latitude, "longitude": 126.9780 },
        "accuracy_meters": 5.0,
        "timestamp": format!("2026-05-01T07:00:{:02}Z", second)
    })
}

async fn setup() -> (Router, String) {
    let app = app(AppState::new(Config::default()));
    let course = json!({
        "id": "city-hall-north",
        "name": "City Hall north",
        "waypoints": [
            { "latitude": 37.5665, "longitude": 126.9780 },
            { "latitude": 37.5755, "longitude": 126.9780 }
        ]
    });
    let (status, _) = send(&app, "POST", "/api/courses", Some(course)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, created) = send(
        &app,
        "POST",
        "/api/runs",
        Some(json!({ "course_id": "city-hall-north" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["status"]["state"], "idle");
    let run_id = created["run_id"].as_str().expect("run id").to_string();
    (app, run_id)
}

#[tokio::test]
async fn run_for_unknown_course_is_not_found() {
    let app = app(AppState::new(Config::default()));
    let (status, _) = send(&app, "POST", "/api/runs", Some(json!({ "course_id": "missing" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/api/runs/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn fixes_before_start_are_ignored() {
    let (app, run_id) = setup().await;
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/runs/{}/fixes", run_id),
        Some(fix(37.5670, 0)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["received"], 1);
    assert_eq!(body["delivered"], 1);
    assert_eq!(body["status"]["total_distance_meters"], 0.0);
    assert!(body["status"]["last_fix"].is_null());
}

#[tokio::test]
async fn full_run_lifecycle() {
    let (app, run_id) = setup().await;
    let base = format!("/api/runs/{}", run_id);

    let (status, started) = send(&app, "POST", &format!("{}/start", base), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(started["status"]["state"], "running");

    let batch = json!([fix(37.5665, 0), fix(37.5674, 30), fix(37.5683, 60)]);
    let (status, pushed) = send(&app, "POST", &format!("{}/fixes", base), Some(batch)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pushed["received"], 3);
    let distance = pushed["status"]["total_distance_meters"].as_f64().expect("distance");
    assert!((distance - 200.0).abs() < 1.0, "distance {distance}");
    let percent = pushed["status"]["progress"]["progress_percent"].as_f64().expect("percent");
    assert!((percent - 20.0).abs() < 0.5, "percent {percent}");
    assert_eq!(pushed["status"]["progress"]["is_off_course"], false);

    let (status, paused) = send(&app, "POST", &format!("{}/pause", base), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paused["status"]["state"], "paused");

    let (status, error) = send(&app, "POST", &format!("{}/pause", base), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(error["error"].as_str().expect("message").contains("paused"));

    let (status, resumed) = send(&app, "POST", &format!("{}/resume", base), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resumed["status"]["state"], "running");

    let (status, _) = send(&app, "GET", &format!("{}/summary", base), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, completed) = send(&app, "POST", &format!("{}/stop", base), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["run_id"], run_id.as_str());
    assert_eq!(completed["course_id"], "city-hall-north");
    assert_eq!(completed["summary"]["route_samples"].as_array().map(|s| s.len()), Some(3));

    let (status, _) = send(&app, "POST", &format!("{}/start", base), None).await;
    assert_eq!(status, StatusCode::GONE);

    let (status, summary) = send(&app, "GET", &format!("{}/summary", base), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["run"]["run_id"], run_id.as_str());
    assert!(summary["verification"]["confidence"].as_f64().is_some());
    assert!(summary["verification"]["recommendation"].is_string());
}

#[tokio::test]
async fn off_course_fix_is_reported() {
    let (app, run_id) = setup().await;
    let base = format!("/api/runs/{}", run_id);
    send(&app, "POST", &format!("{}/start", base), None).await;

    // Roughly 130 m east of the course line.
    let off_course = json!({
        "coordinate": { "latitude": 37.5700, "longitude": 126.9795 },
        "accuracy_meters": 8.0,
        "timestamp": "2026-05-01T07:01:00Z"
    });
    let (status, body) = send(&app, "POST", &format!("{}/fixes", base), Some(off_course)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"]["progress"]["is_off_course"], true);
    assert_eq!(body["status"]["deviation_warnings"], 1);
}

#[tokio::test]
async fn inaccurate_fix_is_dropped() {
    let (app, run_id) = setup().await;
    let base = format!("/api/runs/{}", run_id);
    send(&app, "POST", &format!("{}/start", base), None).await;

    let blurry = json!({
        "coordinate": { "latitude": 37.5700, "longitude": 126.9780 },
        "accuracy_meters": 80.0,
        "timestamp": "2026-05-01T07:01:00Z"
    });
    let (_, body) = send(&app, "POST", &format!("{}/fixes", base), Some(blurry)).await;
    assert_eq!(body["status"]["progress"]["passed_distance_meters"], 0.0);
    assert!(body["status"]["last_fix"].is_null());
}

#[tokio::test]
async fn course_split_and_estimates_in_status() {
    let (app, run_id) = setup().await;
    let base = format!("/api/runs/{}", run_id);

    let (status, split) = send(&app, "GET", &format!("{}/course", base), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(split["segment_index"], 0);
    assert_eq!(split["passed"].as_array().map(|p| p.len()), Some(1));
    assert_eq!(split["upcoming"].as_array().map(|p| p.len()), Some(2));

    let (_, body) = send(&app, "GET", &base, None).await;
    assert!(body["status"]["estimated_remaining_seconds"].is_null());
    assert!(body["status"]["next_turn"].is_null());
    assert_eq!(body["status"]["average_speed_kmh"], 0.0);

    let (status, _) = send(&app, "GET", "/api/runs/missing/course", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
