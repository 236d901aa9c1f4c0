use math::hcm::{Point3, Vec3};
use std::fmt::{Display, Formatter, Result};

use crate::Surface;

/// A point where a ray meets a surface:
///  - `surface`: the surface that was struck,
///  - `pos`: position of intersection,
///  - `ray_t`: t-value of the ray at the intersection; since ray directions are unit-length,
///    this is also the distance from the ray origin.
#[derive(Debug, Clone, Copy)]
pub struct Hit<'a> {
    pub surface: &'a Surface,
    pub pos: Point3,
    pub ray_t: f32,
}

impl<'a> Hit<'a> {
    pub fn new(surface: &'a Surface, pos: Point3, ray_t: f32) -> Self {
        Hit {
            surface,
            pos,
            ray_t,
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.surface.normal_at(self.pos)
    }

    /// Squared distance to the origin of the ray that produced this hit.
    pub fn distance_squared(&self) -> f32 {
        self.ray_t * self.ray_t
    }
}

impl Display for Hit<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "pos = {}, t = {:.2}, on {}",
            self.pos,
            self.ray_t,
            self.surface.summary()
        )
    }
}
