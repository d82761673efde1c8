// Centralized tolerances and behavioral constants for navigation

pub const WALK_TOL_DEG: f32 = 30.0;        // heading tolerance for directional walks
pub const TRANSIT_DURATION_MS: f32 = 1500.0; // walk cross-fade window
pub const TICK_CLAMP_MS: f32 = 25.0;       // max elapsed time credited per tick
pub const POLL_INTERVAL_MS: f32 = 250.0;   // resource-wait re-check interval

pub const LAT_LIMIT_DEG: f32 = 60.0;       // camera pitch clamp
pub const TURN_GAIN_DEG: f32 = 90.0;       // degrees of spin per unit drag

pub const DEFAULT_TRIPOD_HEIGHT: f32 = 150.0;
pub const DEFAULT_RADIUS: f32 = 25.0;
pub const DEFAULT_FOV_DEG: f32 = 60.0;

pub const MARKER_SIZE: f32 = 25.0;         // marker billboard edge in world units

// Balloon scale applied to the transit endpoints, relative to sphere radius
pub const TRANSIT_FROM_SCALE: f32 = 2.01;
pub const TRANSIT_TO_SCALE: f32 = 1.0;

pub const EPS_LEN: f32 = 1e-6;             // zero-length vector threshold

#[inline] pub fn clamp01(x: f32) -> f32 { x.max(0.0).min(1.0) }
#[inline] pub fn clamp(x: f32, lo: f32, hi: f32) -> f32 { x.max(lo).min(hi) }
