use std::fmt::{Display, Formatter, Result};

use math::hcm;

/// Distance by which secondary rays are pushed off the surface they start on, so that they do
/// not immediately re-hit it.
pub const DELTA: f32 = 0.1;

/// Represents a ray:
///
///   origin + t * direction
///
/// where t is positive and `dir` is always unit-length.
///
/// A `Ray` object can be used to intersect a `Shape`, a `BBox`, and an aggregator. Please see
/// their respective documentation for details.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: hcm::Point3,
    pub dir: hcm::Vec3,
}

impl Ray {
    /// Creates a ray, normalizing `dir`. Panics if `dir` is the zero vector.
    pub fn new(origin: hcm::Point3, dir: hcm::Vec3) -> Self {
        Ray {
            origin,
            dir: dir.hat(),
        }
    }

    /// Creates a secondary ray starting near `head`, moved by `DELTA` along `normal` toward the
    /// side that `dir` points to.
    pub fn nudged(head: hcm::Point3, dir: hcm::Vec3, normal: hcm::Vec3) -> Self {
        let nd = math::align_zero(normal.dot(dir));
        let origin = if nd == 0.0 {
            head
        } else if nd > 0.0 {
            head + normal * DELTA
        } else {
            head - normal * DELTA
        };
        Ray::new(origin, dir)
    }

    pub fn position_at(&self, t: f32) -> hcm::Point3 {
        self.origin + t * self.dir
    }
}

impl Display for Ray {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let precision = f.precision().unwrap_or(2);
        write!(
            f,
            "{:.precision$} + t{:.precision$}",
            self.origin,
            self.dir,
            precision = precision
        )
    }
}
