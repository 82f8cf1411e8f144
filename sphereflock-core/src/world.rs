use crate::error::{positive_finite, ConfigError};
use crate::vec3::Vec3;

/// Spherical region the flock lives in.
///
/// Agents leaving the sphere wrap around to the antipodal side instead of
/// bouncing, so their velocity is never touched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct World {
    center: Vec3,
    radius: f32,
}

impl World {
    /// World centered on the origin.
    pub fn new(radius: f32) -> Result<Self, ConfigError> {
        if !positive_finite(radius) {
            return Err(ConfigError::WorldRadius(radius));
        }
        Ok(Self {
            center: Vec3::ZERO,
            radius,
        })
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn contains(&self, position: Vec3) -> bool {
        position.distance_squared(&self.center) <= self.radius * self.radius
    }

    /// Wraps `position` to the opposite side of the boundary when it is
    /// outside, flattening it onto the plane. Inside positions are returned
    /// unchanged.
    pub fn contain(&self, position: Vec3) -> Vec3 {
        if self.contains(position) {
            return position;
        }
        let wrapped = position
            .spherical_wrap_around(self.center, self.radius)
            .with_y_zero();
        log::trace!("wrapped {:?} -> {:?}", position, wrapped);
        wrapped
    }
}
