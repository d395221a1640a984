use crate::engine::geo::{bearing_degrees, signed_bearing_delta};
use crate::engine::route::Route;
use crate::types::navigation::{TurnInstruction, TurnType};

/// How far ahead of the runner the course is scanned for a turn.
pub const LOOKAHEAD_METERS: f64 = 100.0;
/// Heading changes up to this many degrees count as going straight.
const TURN_THRESHOLD_DEG: f64 = 30.0;
const SHARP_TURN_DEG: f64 = 90.0;
const U_TURN_DEG: f64 = 135.0;

/// Next turn along the course polyline ahead of the runner.
///
/// Every vertex within [`LOOKAHEAD_METERS`] of `distance_along_route` is
/// compared against the heading of the current segment; the first one that
/// changes it by more than 30° is the turn. Without such a vertex the
/// instruction is to keep straight. Returns `None` on the final segment.
pub fn next_course_turn(route: &Route, segment_index: usize, distance_along_route: f64) -> Option<TurnInstruction> {
    let points = route.points();
    let cumulative = route.cumulative_distance_meters();
    if segment_index + 2 >= points.len() {
        return None;
    }

    let heading = bearing_degrees(&points[segment_index], &points[segment_index + 1]);

    for vertex in segment_index + 1..points.len() - 1 {
        let distance = (cumulative[vertex] - distance_along_route).max(0.0);
        if distance > LOOKAHEAD_METERS {
            break;
        }

        let angle = signed_bearing_delta(heading, bearing_degrees(&points[vertex], &points[vertex + 1]));
        if angle.abs() > TURN_THRESHOLD_DEG {
            let (turn_type, text) = classify(angle, distance);
            return Some(TurnInstruction {
                distance_to_turn_meters: distance.round(),
                turn_type,
                target_coordinate: points[vertex],
                text,
            });
        }
    }

    Some(TurnInstruction {
        distance_to_turn_meters: LOOKAHEAD_METERS,
        turn_type: TurnType::Straight,
        target_coordinate: points[segment_index + 1],
        text: "Continue straight".to_string(),
    })
}

fn classify(angle: f64, distance: f64) -> (TurnType, String) {
    let meters = distance.round();
    let magnitude = angle.abs();
    if magnitude > U_TURN_DEG {
        return (TurnType::UTurn, format!("Make a U-turn in {} m", meters));
    }

    let (turn_type, side) = if angle > 0.0 {
        (TurnType::Right, "right")
    } else {
        (TurnType::Left, "left")
    };
    let text = if magnitude > SHARP_TURN_DEG {
        format!("Sharp {} in {} m", side, meters)
    } else {
        format!("Turn {} in {} m", side, meters)
    };
    (turn_type, text)
}
