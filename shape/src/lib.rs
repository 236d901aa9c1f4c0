mod interaction;
mod radial;
mod simple;
mod surface;

use enum_dispatch::enum_dispatch;
use geometry::{bbox::BBox, ray::Ray};
use math::hcm::{Point3, Vec3, VectorError};
use smallvec::SmallVec;
use thiserror::Error;

pub use interaction::Hit;
pub use radial::{Cylinder, Tube};
pub use simple::{Plane, Polygon, Sphere, Triangle};
pub use surface::Surface;

/// Ray parameters `t` of the points where a ray meets a shape, ascending, all strictly positive.
pub type Roots = SmallVec<[f32; 2]>;

/// Represents the characteristics of a shape: may have a bounding box, and can interact with a ray.
/// - See `simple.rs` for flat and spherical shapes: `Plane`, `Sphere`, `Triangle`, `Polygon`.
/// - See `radial.rs` for shapes built around an axis: `Tube` and `Cylinder`.
#[enum_dispatch]
pub trait Shape {
    fn summary(&self) -> String;
    /// Returns `None` for shapes that extend to infinity.
    fn bbox(&self) -> Option<BBox>;
    fn intersect(&self, r: &Ray) -> Roots;
    /// Unit normal at a point `p` assumed to lie on the surface.
    fn normal_at(&self, p: Point3) -> Vec3;
}

/// Closed set of surface primitives the renderer understands.
#[enum_dispatch(Shape)]
#[derive(Debug, Clone)]
pub enum Geometry {
    Plane,
    Sphere,
    Triangle,
    Polygon,
    Tube,
    Cylinder,
}

/// Rejected shape parameters. Degenerate *rays* never produce an error, only an empty `Roots`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ShapeError {
    #[error(transparent)]
    Vector(#[from] VectorError),
    #[error("a polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
    #[error("vertex {index} repeats its predecessor")]
    DuplicateVertex { index: usize },
    #[error("vertex {index} is collinear with its neighbors")]
    CollinearVertices { index: usize },
    #[error("vertex {index} is off the polygon plane")]
    NotCoplanar { index: usize },
    #[error("polygon is not convex (or vertices are out of order) at vertex {index}")]
    NotConvex { index: usize },
    #[error("the three points defining a plane are collinear")]
    CollinearPoints,
    #[error("radius must be positive, got {0}")]
    NonPositiveRadius(f32),
    #[error("height must be positive, got {0}")]
    NonPositiveHeight(f32),
}

/// Ray parameter at which `r` meets the plane through `point` with normal `normal`.
///
/// `None` if the ray is parallel to the plane, starts on it, or the plane lies behind the origin.
pub(crate) fn plane_t(point: Point3, normal: Vec3, r: &Ray) -> Option<f32> {
    // (o + t d - q) . n = 0  =>  t = (q - o) . n / (d . n)
    let nv = math::align_zero(normal.dot(r.dir));
    if nv == 0.0 {
        return None;
    }
    let numerator = math::align_zero(normal.dot(point - r.origin));
    if numerator == 0.0 {
        return None;
    }
    let t = math::align_zero(numerator / nv);
    if t > 0.0 {
        Some(t)
    } else {
        None
    }
}
