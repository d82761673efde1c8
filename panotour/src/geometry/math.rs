use super::tolerance::{clamp01, EPS_LEN};
use crate::model::Vec3;

pub fn deg_to_rad(d: f32) -> f32 { d * std::f32::consts::PI / 180.0 }
pub fn rad_to_deg(r: f32) -> f32 { r * 180.0 / std::f32::consts::PI }

pub fn dot(a: Vec3, b: Vec3) -> f32 { a.x * b.x + a.y * b.y + a.z * b.z }

pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(
        a.y * b.z - a.z * b.y,
        a.z * b.x - a.x * b.z,
        a.x * b.y - a.y * b.x,
    )
}

pub fn normalize(v: Vec3) -> Vec3 {
    let len = v.length();
    if len > EPS_LEN { v.scale(1.0 / len) } else { Vec3::default() }
}

/// Projection onto the ground plane (z dropped).
pub fn ground(v: Vec3) -> Vec3 { Vec3::new(v.x, v.y, 0.0) }

/// Signed angle in degrees from `a` to `b` in the ground plane,
/// anticlockwise positive. The sign comes from the z component of a x b.
pub fn signed_angle_deg(a: Vec3, b: Vec3) -> f32 {
    let la = (a.x * a.x + a.y * a.y).sqrt();
    let lb = (b.x * b.x + b.y * b.y).sqrt();
    if la <= EPS_LEN || lb <= EPS_LEN {
        return 0.0;
    }
    let cos = ((a.x * b.x + a.y * b.y) / (la * lb)).clamp(-1.0, 1.0);
    let ang = rad_to_deg(cos.acos());
    let cross_z = a.x * b.y - a.y * b.x;
    if cross_z < 0.0 { -ang } else { ang }
}

/// Angular separation of two headings in degrees, wrapped to [0, 180].
pub fn angle_distance_deg(a: f32, b: f32) -> f32 {
    let mut dist = (b - a).abs();
    while dist > 360.0 {
        dist -= 360.0;
    }
    if dist > 180.0 { 360.0 - dist } else { dist }
}

/// Quadratic ease-in/out over t in [0, 1].
pub fn ease_quad_in_out(t: f32) -> f32 {
    let t = clamp01(t) * 2.0;
    if t < 1.0 {
        0.5 * t * t
    } else {
        let t = t - 1.0;
        -0.5 * (t * (t - 2.0) - 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_angle_sign_convention() {
        let cam = Vec3::new(1.0, 0.0, 0.0);
        let left = Vec3::new(0.0, 1.0, 0.0);
        let right = Vec3::new(0.0, -1.0, 0.0);
        assert!((signed_angle_deg(cam, left) - 90.0).abs() < 1e-3);
        assert!((signed_angle_deg(cam, right) + 90.0).abs() < 1e-3);
    }

    #[test]
    fn angle_distance_wraps() {
        assert!((angle_distance_deg(170.0, -170.0) - 20.0).abs() < 1e-3);
        assert!((angle_distance_deg(0.0, 180.0) - 180.0).abs() < 1e-3);
        assert!((angle_distance_deg(10.0, 40.0) - 30.0).abs() < 1e-3);
    }

    #[test]
    fn easing_endpoints_and_midpoint() {
        assert_eq!(ease_quad_in_out(0.0), 0.0);
        assert!((ease_quad_in_out(0.5) - 0.5).abs() < 1e-6);
        assert!((ease_quad_in_out(1.0) - 1.0).abs() < 1e-6);
    }
}
