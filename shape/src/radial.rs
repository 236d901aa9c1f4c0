use geometry::{bbox::BBox, ray::Ray};
use math::float::{align_zero, is_zero};
use math::hcm::{Point3, Vec3, VectorError};

use crate::{plane_t, Roots, Shape, ShapeError};

/// Infinite circular tube of radius `radius` around the axis `origin + s * axis`.
#[derive(Debug, Clone, Copy)]
pub struct Tube {
    origin: Point3,
    axis: Vec3,
    radius: f32,
}

impl Tube {
    pub fn new(origin: Point3, axis: Vec3, radius: f32) -> Result<Tube, ShapeError> {
        let axis = axis.try_hat().ok_or(VectorError::Zero)?;
        if radius > 0.0 {
            Ok(Tube {
                origin,
                axis,
                radius,
            })
        } else {
            Err(ShapeError::NonPositiveRadius(radius))
        }
    }

    pub fn origin(&self) -> Point3 {
        self.origin
    }
    pub fn axis(&self) -> Vec3 {
        self.axis
    }
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Signed distance of the projection of `p` along the axis, measured from `origin`.
    fn axial(&self, p: Point3) -> f32 {
        self.axis.dot(p - self.origin)
    }
}

/// Finite tube closed by two disks: the base around `origin` and the top `height` along the axis.
#[derive(Debug, Clone, Copy)]
pub struct Cylinder {
    tube: Tube,
    height: f32,
}

impl Cylinder {
    pub fn new(origin: Point3, axis: Vec3, radius: f32, height: f32) -> Result<Self, ShapeError> {
        let tube = Tube::new(origin, axis, radius)?;
        if height > 0.0 {
            Ok(Cylinder { tube, height })
        } else {
            Err(ShapeError::NonPositiveHeight(height))
        }
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    fn top(&self) -> Point3 {
        self.tube.origin + self.tube.axis * self.height
    }
}

impl Shape for Tube {
    fn summary(&self) -> String {
        format!(
            "Tube{{ {} + s{}, radius = {} }}",
            self.origin, self.axis, self.radius
        )
    }
    fn bbox(&self) -> Option<BBox> {
        None
    }
    fn intersect(&self, r: &Ray) -> Roots {
        // Same construction as the sphere, carried out in the plane orthogonal to the axis: the
        // ray direction and the origin-to-axis offset are both projected onto that plane. The
        // projected direction has length `len` < 1, so distances found there are rescaled by it.
        let dir_perp = r.dir - self.axis * self.axis.dot(r.dir);
        let len2 = dir_perp.norm_squared();
        if is_zero(len2) {
            // Parallel to the axis.
            return Roots::new();
        }
        let len = len2.sqrt();
        let u = self.origin - r.origin;
        let u_perp = u - self.axis * self.axis.dot(u);

        let tm = dir_perp.dot(u_perp) / len;
        let d2 = u_perp.norm_squared() - tm * tm;
        let r2 = self.radius * self.radius;
        if align_zero((r2 - d2) / r2) <= 0.0 {
            return Roots::new();
        }
        let th = (r2 - d2).sqrt();
        [tm - th, tm + th]
            .iter()
            .map(|s| align_zero(s / len))
            .filter(|t| *t > 0.0)
            .collect()
    }
    fn normal_at(&self, p: Point3) -> Vec3 {
        let s = self.axial(p);
        let on_axis = if is_zero(s) {
            self.origin
        } else {
            self.origin + self.axis * s
        };
        (p - on_axis).hat()
    }
}

impl Shape for Cylinder {
    fn summary(&self) -> String {
        format!(
            "Cylinder{{ {} + s{}, radius = {}, height = {} }}",
            self.tube.origin, self.tube.axis, self.tube.radius, self.height
        )
    }
    fn bbox(&self) -> Option<BBox> {
        // Each end disk reaches r * sqrt(1 - a_i^2) from its center along axis i.
        let a = self.tube.axis;
        let r = self.tube.radius;
        let reach = Vec3::new(
            r * (1.0 - a.x * a.x).max(0.0).sqrt(),
            r * (1.0 - a.y * a.y).max(0.0).sqrt(),
            r * (1.0 - a.z * a.z).max(0.0).sqrt(),
        );
        let (base, top) = (self.tube.origin, self.top());
        Some(BBox::new(base - reach, base + reach).union(BBox::new(top - reach, top + reach)))
    }
    fn intersect(&self, r: &Ray) -> Roots {
        let radius2 = self.tube.radius * self.tube.radius;
        let mut roots: Roots = self
            .tube
            .intersect(r)
            .into_iter()
            .filter(|t| {
                let s = self.tube.axial(r.position_at(*t));
                align_zero(s) > 0.0 && align_zero(s - self.height) < 0.0
            })
            .collect();

        for &center in [self.tube.origin, self.top()].iter() {
            if let Some(t) = plane_t(center, self.tube.axis, r) {
                let d2 = r.position_at(t).squared_distance_to(center);
                if align_zero((d2 - radius2) / radius2) < 0.0 {
                    roots.push(t);
                }
            }
        }

        roots.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        roots.dedup_by(|a, b| is_zero(*a - *b));
        roots
    }
    fn normal_at(&self, p: Point3) -> Vec3 {
        let s = self.tube.axial(p);
        if is_zero(s) {
            -self.tube.axis
        } else if is_zero(s - self.height) {
            self.tube.axis
        } else {
            self.tube.normal_at(p)
        }
    }
}
