use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use runguide_rs::{app, config::Config, state::AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn router() -> Router {
    app(AppState::new(Config::default()))
}

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

fn han_river_course() -> Value {
    json!({
        "id": "han-river",
        "name": "Han River loop",
        "area": "Yeouido",
        "waypoints": [
            { "latitude": 37.5280, "longitude": 126.9320 },
            { "latitude": 37.5300, "longitude": 126.9340 },
            { "latitude": 37.5320, "longitude": 126.9370 },
            { "latitude": 37.5330, "longitude": 126.9410 },
            { "latitude": 37.5310, "longitude": 126.9440 },
            { "latitude": 37.5290, "longitude": 126.9420 }
        ]
    })
}

#[tokio::test]
async fn create_and_fetch_course() {
    let app = router();
    let (status, created) = send(&app, "POST", "/api/courses", Some(han_river_course())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["course_id"], "han-river");
    assert!(created["total_distance_meters"].as_f64().expect("distance") > 1000.0);
    assert_eq!(created["info"]["waypoint_count"], 6);

    let (status, fetched) = send(&app, "GET", "/api/courses/han-river", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Han River loop");
    assert_eq!(fetched["waypoints"].as_array().map(|w| w.len()), Some(6));
}

#[tokio::test]
async fn rejects_single_point_course() {
    let app = router();
    let body = json!({
        "name": "Too short",
        "waypoints": [{ "latitude": 37.5, "longitude": 127.0 }]
    });
    let (status, error) = send(&app, "POST", "/api/courses", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["error"].as_str().expect("message").contains("at least 2 points"));
}

#[tokio::test]
async fn rejects_out_of_range_waypoint() {
    let app = router();
    let body = json!({
        "name": "Broken",
        "waypoints": [
            { "latitude": 37.5, "longitude": 127.0 },
            { "latitude": 137.5, "longitude": 127.0 }
        ]
    });
    let (status, _) = send(&app, "POST", "/api/courses", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_course_is_not_found() {
    let (status, _) = send(&router(), "GET", "/api/courses/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn key_waypoints_are_limited() {
    let app = router();
    send(&app, "POST", "/api/courses", Some(han_river_course())).await;

    let (status, body) = send(&app, "GET", "/api/courses/han-river/waypoints?max=3", None).await;
    assert_eq!(status, StatusCode::OK);
    let waypoints = body["waypoints"].as_array().expect("waypoints");
    assert_eq!(waypoints.len(), 3);
    assert_eq!(waypoints[0]["latitude"], 37.5280);
    assert_eq!(waypoints[2]["latitude"], 37.5290);

    let (status, body) = send(
        &app,
        "GET",
        "/api/courses/han-river/waypoints?max=4&optimize=true",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["waypoints"].as_array().map(|w| w.len()), Some(4));
}

#[tokio::test]
async fn navigate_to_course_start() {
    let app = router();
    send(&app, "POST", "/api/courses", Some(han_river_course())).await;

    let body = json!({ "current": { "latitude": 37.5250, "longitude": 126.9300 } });
    let (status, nav) = send(&app, "POST", "/api/courses/han-river/navigate", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(nav["route"]["segments"].as_array().map(|s| s.len()), Some(1));
    assert_eq!(nav["instruction"]["turn_type"], "straight");
    assert_eq!(nav["instruction"]["target_coordinate"]["latitude"], 37.5280);
    assert_eq!(nav["icon"], "↑");
    let distance = nav["instruction"]["distance_to_turn_meters"].as_f64().expect("distance");
    assert!(distance > 350.0 && distance < 420.0, "distance {distance}");
}

#[tokio::test]
async fn stage_plan_for_course() {
    let app = router();
    send(&app, "POST", "/api/courses", Some(han_river_course())).await;

    let body = json!({
        "current": { "latitude": 37.5250, "longitude": 126.9300 },
        "stages": 2
    });
    let (status, plan) = send(&app, "POST", "/api/courses/han-river/stages", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["progress"]["total_stages"], 2);
    assert_eq!(plan["current"]["id"], 1);
    assert_eq!(plan["plan"]["is_completed"], false);
}

#[tokio::test]
async fn standalone_route_and_next_turn() {
    let app = router();
    let body = json!({
        "origin": { "latitude": 37.5665, "longitude": 126.9780 },
        "destination": { "latitude": 37.5700, "longitude": 126.9780 },
        "waypoints": [{ "latitude": 37.5680, "longitude": 126.9780 }]
    });
    let (status, route) = send(&app, "POST", "/api/navigation/route", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(route["segments"].as_array().map(|s| s.len()), Some(2));

    let body = json!({
        "route": route,
        "current": { "latitude": 37.5690, "longitude": 126.9780 }
    });
    let (status, turn) = send(&app, "POST", "/api/navigation/next-turn", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(turn["instruction"]["target_coordinate"]["latitude"], 37.5700);
}

#[tokio::test]
async fn navigation_rejects_invalid_origin() {
    let body = json!({
        "origin": { "latitude": -95.0, "longitude": 126.9780 },
        "destination": { "latitude": 37.5700, "longitude": 126.9780 }
    });
    let (status, _) = send(&router(), "POST", "/api/navigation/route", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
