use crate::geometry::math::{angle_distance_deg, ground, signed_angle_deg};
use crate::geometry::tolerance::WALK_TOL_DEG;
use crate::Tour;

/// Resolve a requested heading to the neighbor it points at. For every
/// neighbor of the current node the signed angle between the ground-plane
/// view direction and the direction to that neighbor is compared against the
/// heading; candidates within the tolerance compete on Euclidean distance,
/// nearest wins. No candidate within tolerance resolves to `None`.
pub fn resolve_heading(tour: &Tour, heading_deg: f32) -> Option<u32> {
    let curr = tour.node(tour.current_node())?;
    let view_dir = ground(tour.view().pose().target.sub(curr.center));

    let mut best: Option<(u32, f32)> = None; // (node, euclidean distance)
    for &n in tour.neighbors(tour.current_node()) {
        let Some(next) = tour.node(n) else { continue };
        let node_dir = ground(next.center.sub(curr.center));
        let node_heading = signed_angle_deg(view_dir, node_dir);
        if angle_distance_deg(heading_deg, node_heading) < WALK_TOL_DEG {
            let dist = curr.center.distance(next.center);
            if best.map_or(true, |(_, bd)| dist < bd) {
                best = Some((n, dist));
            }
        }
    }
    best.map(|(n, _)| n)
}
