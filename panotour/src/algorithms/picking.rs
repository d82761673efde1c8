use crate::geometry::math::dot;
use crate::geometry::tolerance::MARKER_SIZE;
use crate::model::Vec3;
use crate::Tour;

/// Pick the nearest visible marker along a ray. Only markers flagged
/// visible (the navigable destinations) are eligible; `dir` must be a unit
/// vector. Returns the hit node id.
pub fn pick_marker(tour: &Tour, origin: Vec3, dir: Vec3) -> Option<u32> {
    let half = 0.5 * MARKER_SIZE;
    let mut best: Option<(u32, f32)> = None; // (node, distance along ray)
    for &n in tour.visible_markers() {
        let Some(center) = tour.marker_position(n) else { continue };
        let to_center = center.sub(origin);
        let t = dot(to_center, dir);
        if t <= 0.0 {
            continue; // behind the camera
        }
        let closest = origin.add(dir.scale(t));
        if closest.distance(center) <= half && best.map_or(true, |(_, bt)| t < bt) {
            best = Some((n, t));
        }
    }
    best.map(|(n, _)| n)
}
