// Centralized ingestion limits to harden against untrusted input (JSON)

// Document size caps
pub const MAX_NODES: usize = 10_000;
pub const MAX_GROUPS: usize = 2_000;
pub const MAX_EDGES_PER_NODE: usize = 64;
pub const MAX_TAGS_PER_GROUP: usize = 256;

// Numeric bounds
pub const COORD_MIN: f32 = -1_000_000.0;
pub const COORD_MAX: f32 = 1_000_000.0;
pub const RADIUS_MAX: f32 = 100_000.0;

#[inline]
pub fn in_coord_bounds(x: f32) -> bool { x.is_finite() && x >= COORD_MIN && x <= COORD_MAX }

#[inline]
pub fn in_radius_bounds(r: f32) -> bool { r.is_finite() && r > 0.0 && r <= RADIUS_MAX }
