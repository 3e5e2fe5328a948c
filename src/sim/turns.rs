//! Turn detection
//!
//! A waypoint is a turn when the path bends there by more than a threshold
//! angle. Turns are the points where the player has to act.

use glam::Vec3;

use crate::angle_between_deg;

/// Indices of interior waypoints whose bend exceeds `min_angle_deg`.
///
/// The first and last waypoints are never turns. The result is strictly
/// increasing.
pub fn find_turns(points: &[Vec3], min_angle_deg: f32) -> Vec<usize> {
    if points.len() < 3 {
        return Vec::new();
    }
    (1..points.len() - 1)
        .filter(|&i| {
            let incoming = points[i] - points[i - 1];
            let outgoing = points[i + 1] - points[i];
            angle_between_deg(incoming, outgoing) > min_angle_deg
        })
        .collect()
}
