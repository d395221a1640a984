mod common;

use common::{approx_eq, east_of, north_of, seoul_city_hall};
use runguide_rs::engine::stages::MultiStageNavigation;
use runguide_rs::engine::waypoints::{extract_waypoints, optimize_waypoints, route_info};
use runguide_rs::types::geo::Coordinate;

fn straight_line(count: usize, spacing: f64) -> Vec<Coordinate> {
    let start = seoul_city_hall();
    (0..count).map(|i| north_of(start, i as f64 * spacing)).collect()
}

#[test]
fn short_routes_are_returned_unchanged() {
    let points = straight_line(2, 100.0);
    assert_eq!(extract_waypoints(&points, 8), points);
    assert_eq!(optimize_waypoints(&points, 8), points);
}

#[test]
fn extraction_keeps_endpoints_and_respects_limit() {
    let points = straight_line(50, 20.0);
    let waypoints = extract_waypoints(&points, 8);
    assert_eq!(waypoints.len(), 8);
    assert_eq!(waypoints[0], points[0]);
    assert_eq!(waypoints[7], points[49]);
    // stride of 50 / 7 = 7 points
    assert_eq!(waypoints[1], points[7]);
    assert_eq!(waypoints[2], points[14]);
}

#[test]
fn extraction_never_exceeds_limit_on_dense_routes() {
    let points = straight_line(10, 20.0);
    let waypoints = extract_waypoints(&points, 8);
    assert!(waypoints.len() <= 8);
    assert_eq!(waypoints[0], points[0]);
    assert_eq!(waypoints[waypoints.len() - 1], points[9]);
}

#[test]
fn optimization_prefers_sharp_turns() {
    // Straight north, a right-angle turn east, then straight on.
    let start = seoul_city_hall();
    let mut points: Vec<Coordinate> = (0..6).map(|i| north_of(start, i as f64 * 150.0)).collect();
    let corner = points[5];
    points.extend((1..6).map(|i| east_of(corner, i as f64 * 150.0)));

    let waypoints = optimize_waypoints(&points, 3);
    assert_eq!(waypoints, vec![points[0], corner, points[10]]);
}

#[test]
fn optimization_discounts_short_legs() {
    let start = seoul_city_hall();
    let a = north_of(start, 200.0);
    // Tiny zig-zag: big angle but only 5 m legs.
    let zig = east_of(north_of(a, 5.0), 5.0);
    let b = north_of(a, 10.0);
    let far = north_of(b, 200.0);
    let turn = east_of(far, 200.0);
    let end = east_of(turn, 200.0);
    let points = vec![start, a, zig, b, far, turn, end];

    let waypoints = optimize_waypoints(&points, 3);
    assert_eq!(waypoints, vec![start, far, end]);
}

#[test]
fn route_info_estimates_duration_at_running_pace() {
    let points = straight_line(11, 300.0);
    let info = route_info(&points);
    assert!(approx_eq(info.total_distance_meters, 3000.0, 1.0));
    // 3 km at 15 km/h
    assert_eq!(info.estimated_duration_minutes, 12.0);
    assert_eq!(info.waypoint_count, 11);
}

#[test]
fn stages_lead_from_runner_to_key_waypoints() {
    let course = straight_line(31, 50.0);
    let runner = east_of(course[0], 400.0);

    let plan = MultiStageNavigation::plan(runner, &course, 5);
    assert_eq!(plan.total_stages(), 5);
    assert_eq!(plan.stages[0].start, runner);
    assert_eq!(plan.stages[0].end, course[6]);
    assert_eq!(plan.stages[1].start, course[6]);
    assert_eq!(plan.stages[4].end, course[30]);
    assert!(plan.stages.windows(2).all(|w| w[0].end == w[1].start));
    assert_eq!(plan.current().map(|s| s.id), Some(1));
}

#[test]
fn proceeding_through_stages() {
    let course = straight_line(31, 50.0);
    let mut plan = MultiStageNavigation::plan(course[0], &course, 5);

    plan.proceed();
    plan.proceed();
    let progress = plan.progress();
    assert_eq!(progress.completed_stages, 2);
    assert_eq!(progress.total_stages, 5);
    assert_eq!(progress.progress_percent, 40);
    assert_eq!(plan.current().map(|s| s.id), Some(3));
    assert!(!plan.is_completed);

    for _ in 0..5 {
        plan.proceed();
    }
    assert!(plan.is_completed);
    assert!(plan.current().is_none());
    assert_eq!(plan.progress().progress_percent, 100);
}

#[test]
fn two_point_course_is_a_single_stage() {
    let course = straight_line(2, 500.0);
    let runner = east_of(course[0], 100.0);
    let plan = MultiStageNavigation::plan(runner, &course, 5);
    assert_eq!(plan.total_stages(), 1);
    assert_eq!(plan.stages[0].end, course[1]);
}
