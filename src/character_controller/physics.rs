use crate::character_controller::movement::Pose;

/// Keeps the character on the floor reported by the floor probe.
///
/// Below the floor it is lifted at once; above it, it falls no faster than
/// `max_fall_speed`. Without a floor under it the pose is left alone.
pub fn settle_on_floor(pose: &mut Pose, floor_height: Option<f32>, max_fall_speed: f32, dt: f32) {
    let Some(floor) = floor_height else { return };
    let y = pose.position.y;
    if y < floor {
        pose.position.y = floor;
    } else if y > floor {
        pose.position.y = (y - max_fall_speed * dt).max(floor);
    }
}
