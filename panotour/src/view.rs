use crate::geometry::math::{cross, deg_to_rad, normalize, rad_to_deg};
use crate::geometry::tolerance::{clamp, LAT_LIMIT_DEG, TURN_GAIN_DEG};
use crate::model::{CameraPose, Vec3};

/// Camera orientation inside the current sphere. Latitude/longitude are in
/// degrees; +z is up and longitude 0 looks along +y. Longitude wraps to
/// (-180, 180], latitude is clamped to the pitch limit.
#[derive(Clone, Copy, Debug)]
pub struct View {
    latitude: f32,
    longitude: f32,
    fov: f32,
    aspect: f32,
    position: Vec3,
}

impl View {
    pub fn new(fov: f32, aspect: f32) -> View {
        View {
            latitude: 0.0,
            longitude: 0.0,
            fov,
            aspect,
            position: Vec3::default(),
        }
    }

    pub fn latitude(&self) -> f32 {
        self.latitude
    }

    pub fn longitude(&self) -> f32 {
        self.longitude
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, p: Vec3) {
        self.position = p;
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn set_orientation(&mut self, latitude: f32, longitude: f32) {
        self.latitude = clamp(latitude, -LAT_LIMIT_DEG, LAT_LIMIT_DEG);
        self.longitude = longitude;
        if self.longitude > 180.0 {
            self.longitude -= 360.0;
        }
        if self.longitude < -180.0 {
            self.longitude += 360.0;
        }
    }

    /// Spin the view by normalized drag deltas (one unit of drag is the full
    /// turn gain).
    pub fn turn(&mut self, spin_x: f32, spin_y: f32) {
        self.longitude += TURN_GAIN_DEG * spin_x;
        self.latitude += TURN_GAIN_DEG * spin_y;

        if self.longitude > 180.0 {
            self.longitude -= 360.0;
        }
        if self.longitude < -180.0 {
            self.longitude += 360.0;
        }
        self.latitude = clamp(self.latitude, -LAT_LIMIT_DEG, LAT_LIMIT_DEG);
    }

    /// Unit look direction for the current orientation.
    pub fn direction(&self) -> Vec3 {
        let phi = deg_to_rad(90.0 - self.latitude);
        let theta = deg_to_rad(-self.longitude);
        Vec3::new(phi.sin() * theta.sin(), phi.sin() * theta.cos(), phi.cos())
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.position,
            target: self.position.add(self.direction()),
        }
    }

    /// Heading in signed degrees (anticlockwise positive) for a screen point
    /// given in normalized device x.
    pub fn walk_direction_from_screen(&self, ndc_x: f32) -> f32 {
        let direction = (deg_to_rad(0.5 * self.fov * self.aspect).tan() * ndc_x).atan();
        -rad_to_deg(direction)
    }

    /// World-space ray direction through a screen point in normalized device
    /// coordinates, for marker picking.
    pub fn unproject(&self, ndc_x: f32, ndc_y: f32) -> Vec3 {
        let forward = self.direction();
        let right = normalize(cross(forward, Vec3::new(0.0, 0.0, 1.0)));
        let up = cross(right, forward);
        let t = deg_to_rad(0.5 * self.fov).tan();
        normalize(
            forward
                .add(right.scale(t * self.aspect * ndc_x))
                .add(up.scale(t * ndc_y)),
        )
    }
}
