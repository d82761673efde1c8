use crate::geometry::math::ease_quad_in_out;
use crate::geometry::tolerance::{
    TICK_CLAMP_MS, TRANSIT_DURATION_MS, TRANSIT_FROM_SCALE, TRANSIT_TO_SCALE,
};
use crate::model::Vec3;

/// Outcome of advancing a transit by one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransitStep {
    Running { camera: Vec3, opacity: f32 },
    Done,
}

/// A walk transition in flight: linear camera interpolation between the two
/// sphere centers plus an eased opacity cross-fade over a fixed window.
/// Pure time integrator; owns no graph or resource logic.
#[derive(Clone, Copy, Debug)]
pub struct Transit {
    pub from: u32,
    pub to: u32,
    origin: Vec3,
    delta: Vec3,
    t: f32,
    opacity: f32,
    from_scale: f32,
    to_scale: f32,
}

impl Transit {
    pub fn new(
        from: u32,
        from_center: Vec3,
        from_radius: f32,
        to: u32,
        to_center: Vec3,
        to_radius: f32,
    ) -> Transit {
        let dist = from_center.distance(to_center);
        Transit {
            from,
            to,
            origin: from_center,
            delta: to_center.sub(from_center),
            t: 0.0,
            opacity: 0.0,
            // balloon the spheres so the destination grows through the source
            from_scale: TRANSIT_FROM_SCALE * dist / from_radius,
            to_scale: TRANSIT_TO_SCALE * dist / to_radius,
        }
    }

    /// Advance by one tick. Elapsed-time increments are clamped so a stalled
    /// frame cannot jump the animation.
    pub fn advance(&mut self, dt_ms: f32) -> TransitStep {
        self.t += dt_ms.clamp(0.0, TICK_CLAMP_MS) / TRANSIT_DURATION_MS;
        if self.t >= 1.0 {
            self.opacity = 1.0;
            return TransitStep::Done;
        }
        let lambda = ease_quad_in_out(self.t);
        self.opacity = lambda;
        TransitStep::Running {
            camera: self.origin.add(self.delta.scale(lambda)),
            opacity: lambda,
        }
    }

    pub fn progress(&self) -> f32 {
        self.t
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn from_scale(&self) -> f32 {
        self.from_scale
    }

    pub fn to_scale(&self) -> f32 {
        self.to_scale
    }
}
