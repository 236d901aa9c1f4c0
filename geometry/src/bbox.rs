use std::fmt::{Display, Formatter, Result};

use crate::ray::Ray;
use math::{
    float::{is_zero, min_max},
    hcm::{Point3, Vec3},
};

/// 3D axis-aligned bounding-box type. Boundary check is closed (`[min, max]`) on all axes.
/// - Build one from 2 `Point3`s in any order, or from a set of points with `from_points()`;
/// - Expand it by `b.union()`, `union(b1, b2)`, or `union_opt()` where `None` is the identity;
/// - Check if it `contains()` a point or `encloses()` another box, or `intersect()`s a `Ray`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    min: Point3,
    max: Point3,
}

impl BBox {
    pub fn new(p0: Point3, p1: Point3) -> BBox {
        let (xmin, xmax) = min_max(p0.x, p1.x);
        let (ymin, ymax) = min_max(p0.y, p1.y);
        let (zmin, zmax) = min_max(p0.z, p1.z);
        BBox {
            min: Point3::new(xmin, ymin, zmin),
            max: Point3::new(xmax, ymax, zmax),
        }
    }

    /// Smallest box enclosing all `points`. Returns `None` for an empty iterator.
    pub fn from_points<I: IntoIterator<Item = Point3>>(points: I) -> Option<BBox> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(BBox::new(first, first), BBox::union_point))
    }

    pub fn union_point(self, p: Point3) -> BBox {
        let mut result = self;
        for i in 0..3 {
            result.min[i] = self.min[i].min(p[i]);
            result.max[i] = self.max[i].max(p[i]);
        }
        result
    }

    pub fn union(self, other: BBox) -> BBox {
        self.union_point(other.min).union_point(other.max)
    }

    pub fn center(&self) -> Point3 {
        (self.max - self.min) * 0.5 + self.min
    }

    /// Size of the box along each axis.
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Axis (0, 1, 2) along which the box is largest. Ties resolve to x, then y, then z.
    pub fn max_extent_axis(&self) -> usize {
        self.extent().max_dimension()
    }

    pub fn min(&self) -> Point3 {
        self.min
    }
    pub fn max(&self) -> Point3 {
        self.max
    }

    /// Slab test. Returns true if the infinite line of `r` passes through the box; a box lying
    /// entirely behind the ray origin may still report a hit, so callers must rely on the exact
    /// surface test to discard negative ray parameters.
    pub fn intersect(&self, r: &Ray) -> bool {
        let (mut t_min, mut t_max) = (f32::NEG_INFINITY, f32::INFINITY);
        for axis in 0..3 {
            let (o, d) = (r.origin[axis], r.dir[axis]);
            if is_zero(d) {
                // Parallel to this pair of slabs: inside them or never.
                if o < self.min[axis] || o > self.max[axis] {
                    return false;
                }
                continue;
            }
            let inv_dir = 1.0 / d;
            let t0 = (self.min[axis] - o) * inv_dir;
            let t1 = (self.max[axis] - o) * inv_dir;
            let (t0, t1) = min_max(t0, t1);
            // Shrinks [t_min, t_max] by intersecting it with [t0, t1].
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_max < t_min {
                return false;
            }
        }
        true
    }

    pub fn encloses(&self, other: Self) -> bool {
        for axis in 0..3 {
            if self.min[axis] > other.min[axis] {
                return false;
            }
            if self.max[axis] < other.max[axis] {
                return false;
            }
        }
        true
    }

    pub fn contains(&self, p: Point3) -> bool {
        for axis in 0..3 {
            if self.min[axis] > p[axis] {
                return false;
            }
            if self.max[axis] < p[axis] {
                return false;
            }
        }
        true
    }
}

impl Display for BBox {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "box[{} -> {}]", self.min, self.max)
    }
}

pub fn union(b0: BBox, b1: BBox) -> BBox {
    b0.union(b1)
}

/// Union treating `None` as the identity element: `union_opt(Some(a), None) == Some(a)`.
pub fn union_opt(b0: Option<BBox>, b1: Option<BBox>) -> Option<BBox> {
    match (b0, b1) {
        (Some(b0), Some(b1)) => Some(b0.union(b1)),
        (b, None) | (None, b) => b,
    }
}
