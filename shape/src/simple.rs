use geometry::{bbox::BBox, ray::Ray};
use itertools::Itertools;
use math::float::align_zero;
use math::hcm::{Point3, Vec3, VectorError};
use smallvec::smallvec;

use crate::{plane_t, Roots, Shape, ShapeError};

/// Infinite plane through `point` with unit `normal`.
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    point: Point3,
    normal: Vec3,
}

impl Plane {
    pub fn new(point: Point3, normal: Vec3) -> Result<Plane, ShapeError> {
        let normal = normal.try_hat().ok_or(VectorError::Zero)?;
        Ok(Plane { point, normal })
    }

    /// Plane through three points. The normal follows the right-hand rule on p0 -> p1 -> p2.
    pub fn from_points(p0: Point3, p1: Point3, p2: Point3) -> Result<Plane, ShapeError> {
        let v1 = p1.try_sub(p0)?;
        let v2 = p2.try_sub(p0)?;
        let normal = v1
            .try_cross(v2)
            .map_err(|_| ShapeError::CollinearPoints)?;
        Plane::new(p0, normal)
    }

    pub fn point(&self) -> Point3 {
        self.point
    }
    pub fn normal(&self) -> Vec3 {
        self.normal
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Sphere {
    center: Point3,
    radius: f32,
}

impl Sphere {
    pub fn new(center: Point3, radius: f32) -> Result<Sphere, ShapeError> {
        if radius > 0.0 {
            Ok(Sphere { center, radius })
        } else {
            Err(ShapeError::NonPositiveRadius(radius))
        }
    }
    pub fn center(&self) -> Point3 {
        self.center
    }
    pub fn radius(&self) -> f32 {
        self.radius
    }
}

/// Convex planar polygon. Vertices are validated at construction:
/// at least 3, no repeated neighbors, all on one plane, and turning the same way at every corner.
#[derive(Debug, Clone)]
pub struct Polygon {
    vertices: Vec<Point3>,
    plane: Plane,
}

impl Polygon {
    pub fn new(vertices: Vec<Point3>) -> Result<Polygon, ShapeError> {
        let n = vertices.len();
        if n < 3 {
            return Err(ShapeError::TooFewVertices(n));
        }
        // edges[i] goes from vertex i to vertex i + 1 (mod n).
        let edges = vertices
            .iter()
            .circular_tuple_windows()
            .enumerate()
            .map(|(i, (a, b))| {
                b.try_sub(*a)
                    .map_err(|_| ShapeError::DuplicateVertex { index: (i + 1) % n })
            })
            .collect::<Result<Vec<Vec3>, _>>()?;

        let normal = edges[0]
            .try_cross(edges[1])
            .map_err(|_| ShapeError::CollinearVertices { index: 1 })?
            .hat();
        let plane = Plane::new(vertices[0], normal)?;

        for (i, v) in vertices.iter().enumerate().skip(3) {
            if align_zero((*v - vertices[0]).dot(normal)) != 0.0 {
                return Err(ShapeError::NotCoplanar { index: i });
            }
        }

        // Every corner must turn the same way as corner 1, which defined the normal. The turn is
        // the sine of the corner's exterior angle, so the tolerance does not depend on edge lengths.
        for (i, (e_in, e_out)) in edges.iter().circular_tuple_windows().enumerate() {
            let corner = (i + 1) % n;
            let turn = align_zero(e_in.cross(*e_out).dot(normal) / (e_in.norm() * e_out.norm()));
            if turn == 0.0 {
                return Err(ShapeError::CollinearVertices { index: corner });
            } else if turn < 0.0 {
                return Err(ShapeError::NotConvex { index: corner });
            }
        }

        Ok(Polygon { vertices, plane })
    }

    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }
    pub fn plane(&self) -> &Plane {
        &self.plane
    }
}

#[derive(Debug, Clone)]
pub struct Triangle {
    polygon: Polygon,
}

impl Triangle {
    pub fn new(p0: Point3, p1: Point3, p2: Point3) -> Result<Triangle, ShapeError> {
        let polygon = Polygon::new(vec![p0, p1, p2])?;
        Ok(Triangle { polygon })
    }
    pub fn vertices(&self) -> &[Point3] {
        self.polygon.vertices()
    }
}

/// Intersects `r` with a convex polygon.
///
/// Each edge together with the ray origin spans a side of a pyramid; the ray passes through the
/// polygon iff it is on the same side of every one of them.
fn intersect_polygon(vertices: &[Point3], plane: &Plane, r: &Ray) -> Roots {
    let mut sign = 0.0f32;
    for (a, b) in vertices.iter().circular_tuple_windows() {
        let side = match (*a - r.origin).cross(*b - r.origin).try_hat() {
            Some(n) => align_zero(r.dir.dot(n)),
            None => 0.0,
        };
        if side == 0.0 || side.signum() * sign < 0.0 {
            return Roots::new();
        }
        sign = side.signum();
    }
    plane_t(plane.point, plane.normal, r)
        .into_iter()
        .collect()
}

// Implementation of the `Shape` trait for the shape implementations.

impl Shape for Plane {
    fn summary(&self) -> String {
        format!("Plane{{ {}, normal = {} }}", self.point, self.normal)
    }
    fn bbox(&self) -> Option<BBox> {
        None
    }
    fn intersect(&self, r: &Ray) -> Roots {
        plane_t(self.point, self.normal, r).into_iter().collect()
    }
    fn normal_at(&self, _p: Point3) -> Vec3 {
        self.normal
    }
}

impl Shape for Sphere {
    fn summary(&self) -> String {
        format!("Sphere{{ {}, radius = {} }}", self.center, self.radius)
    }
    fn bbox(&self) -> Option<BBox> {
        let half_diagonal = Vec3::new(1.0, 1.0, 1.0) * self.radius;
        Some(BBox::new(
            self.center - half_diagonal,
            self.center + half_diagonal,
        ))
    }
    fn intersect(&self, r: &Ray) -> Roots {
        // u connects the ray origin to the center; tm is the foot of the perpendicular from the
        // center onto the ray, d its length, and th half the chord.
        //
        //        o ----------tm---------+---th---> (exit)
        //                               |
        //                               d
        //                               |
        //                               c
        let u = self.center - r.origin;
        if u.is_zero() {
            return smallvec![self.radius];
        }
        let tm = r.dir.dot(u);
        let d2 = u.norm_squared() - tm * tm;
        let r2 = self.radius * self.radius;
        // Tangency is judged relative to r^2.
        if align_zero((r2 - d2) / r2) <= 0.0 {
            // Missed, or tangent.
            return Roots::new();
        }
        let th = (r2 - d2).sqrt();
        [tm - th, tm + th]
            .iter()
            .map(|t| align_zero(*t))
            .filter(|t| *t > 0.0)
            .collect()
    }
    fn normal_at(&self, p: Point3) -> Vec3 {
        (p - self.center).hat()
    }
}

impl Shape for Polygon {
    fn summary(&self) -> String {
        format!(
            "Polygon{{ {} }}",
            self.vertices.iter().map(|v| v.to_string()).join(", ")
        )
    }
    fn bbox(&self) -> Option<BBox> {
        BBox::from_points(self.vertices.iter().copied())
    }
    fn intersect(&self, r: &Ray) -> Roots {
        intersect_polygon(&self.vertices, &self.plane, r)
    }
    fn normal_at(&self, _p: Point3) -> Vec3 {
        self.plane.normal
    }
}

impl Shape for Triangle {
    fn summary(&self) -> String {
        let v = self.vertices();
        format!("Triangle{{ {}, {}, {} }}", v[0], v[1], v[2])
    }
    fn bbox(&self) -> Option<BBox> {
        self.polygon.bbox()
    }
    fn intersect(&self, r: &Ray) -> Roots {
        self.polygon.intersect(r)
    }
    fn normal_at(&self, p: Point3) -> Vec3 {
        self.polygon.normal_at(p)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use math::{assert_close, assert_lt};
    use math::hcm::{point3, vec3};

    #[test]
    fn sphere_through_center_is_symmetric() {
        let sphere = Sphere::new(point3(1.0, 1.0, 0.0), 1.0).unwrap();
        let r = Ray::new(point3(-1.0, 1.0, 0.0), vec3(3.0, 0.0, 0.0));
        let roots = sphere.intersect(&r);
        assert_eq!(roots.len(), 2);
        assert_close!(r.position_at(roots[0]), point3(0.0, 1.0, 0.0));
        assert_close!(r.position_at(roots[1]), point3(2.0, 1.0, 0.0));
        // Symmetric about the center.
        let mid = (roots[0] + roots[1]) * 0.5;
        assert_close!(r.position_at(mid), sphere.center());
    }

    #[test]
    fn sphere_edge_cases() {
        let sphere = Sphere::new(point3(1.0, 1.0, 0.0), 1.0).unwrap();
        // Starts inside: one exit point.
        let inside = Ray::new(point3(1.0, 1.5, 0.0), Vec3::Y);
        let roots = sphere.intersect(&inside);
        assert_eq!(roots.len(), 1);
        assert_close!(inside.position_at(roots[0]), point3(1.0, 2.0, 0.0));
        // Starts at the center.
        let centered = Ray::new(point3(1.0, 1.0, 0.0), Vec3::Y);
        assert_eq!(sphere.intersect(&centered).as_slice(), &[1.0]);
        // Pointing away.
        let away = Ray::new(point3(-1.0, -1.0, 0.0), -Vec3::Y);
        assert!(sphere.intersect(&away).is_empty());
        // Tangent at (1, 2, 0).
        let tangent = Ray::new(point3(-1.0, 2.0, 0.0), Vec3::X);
        assert!(sphere.intersect(&tangent).is_empty());
        // Starts on the surface, going out.
        let leaving = Ray::new(point3(1.0, 2.0, 0.0), Vec3::Y);
        assert!(sphere.intersect(&leaving).is_empty());

        assert_eq!(
            Sphere::new(Point3::ORIGIN, 0.0).err(),
            Some(ShapeError::NonPositiveRadius(0.0))
        );
    }

    #[test]
    fn tiny_sphere_is_hit_through_center() {
        let sphere = Sphere::new(Point3::ORIGIN, 0.002).unwrap();
        let r = Ray::new(point3(0.0, 0.0, 1.0), -Vec3::Z);
        let roots = sphere.intersect(&r);
        assert_eq!(roots.len(), 2);
        assert_lt!((roots[0] - 0.998).abs(), 1e-5);
        assert_lt!((roots[1] - 1.002).abs(), 1e-5);

        let beside = Ray::new(point3(0.003, 0.0, 1.0), -Vec3::Z);
        assert!(sphere.intersect(&beside).is_empty());
    }

    #[test]
    fn triangle_hit_at_centroid() {
        let triangle = Triangle::new(
            point3(0.0, 0.0, 1.0),
            point3(1.0, 0.0, 0.0),
            point3(0.0, 1.0, 0.0),
        )
        .unwrap();
        let r = Ray::new(point3(-1.0, -1.0, -1.0), vec3(1.0, 1.0, 1.0));
        let roots = triangle.intersect(&r);
        assert_eq!(roots.len(), 1);
        let third = 1.0 / 3.0;
        assert_close!(r.position_at(roots[0]), point3(third, third, third));

        // Through the plane, but outside against an edge and beyond a vertex.
        let outside = Ray::new(point3(-1.0, -1.0, -1.0), vec3(3.0, 1.0, 1.0));
        assert!(triangle.intersect(&outside).is_empty());
        let beyond = Ray::new(point3(2.0, 2.0, 2.0), vec3(-1.0, -1.0, -1.0) + vec3(0.0, 2.0, 0.0));
        assert!(triangle.intersect(&beyond).is_empty());
        let on_edge = Ray::new(point3(0.5, 0.5, 1.0), -Vec3::Z);
        assert!(triangle.intersect(&on_edge).is_empty());
    }

    #[test]
    fn millimetre_triangle() {
        let triangle = Triangle::new(
            Point3::ORIGIN,
            point3(0.003, 0.0, 0.0),
            point3(0.0, 0.003, 0.0),
        )
        .unwrap();
        let r = Ray::new(point3(0.001, 0.001, 1.0), -Vec3::Z);
        let roots = triangle.intersect(&r);
        assert_eq!(roots.len(), 1);
        assert_close!(r.position_at(roots[0]), point3(0.001, 0.001, 0.0));

        // Still rejected when the corner is collinear, however small.
        assert_eq!(
            Triangle::new(Point3::ORIGIN, point3(0.003, 0.0, 0.0), point3(0.006, 0.0, 0.0)).err(),
            Some(ShapeError::CollinearVertices { index: 1 })
        );
    }

    #[test]
    fn plane_cases() {
        let plane = Plane::from_points(
            point3(0.0, 0.0, 1.0),
            point3(1.0, 0.0, 0.0),
            point3(0.0, 1.0, 0.0),
        )
        .unwrap();
        assert_close!(plane.normal(), vec3(1.0, 1.0, 1.0).hat());

        let crossing = Ray::new(point3(-1.0, 0.0, 0.0), Vec3::X);
        let roots = plane.intersect(&crossing);
        assert_eq!(roots.len(), 1);
        assert_close!(crossing.position_at(roots[0]), point3(1.0, 0.0, 0.0));

        // Parallel, behind, and starting on the plane.
        let parallel = Ray::new(point3(0.0, 0.0, 3.0), vec3(1.0, -1.0, 0.0));
        assert!(plane.intersect(&parallel).is_empty());
        let behind = Ray::new(point3(-1.0, 0.0, 0.0), -Vec3::X);
        assert!(plane.intersect(&behind).is_empty());
        let embedded = Ray::new(point3(0.0, 0.0, 1.0), Vec3::Z);
        assert!(plane.intersect(&embedded).is_empty());

        assert_eq!(
            Plane::from_points(Point3::ORIGIN, point3(1.0, 1.0, 1.0), point3(2.0, 2.0, 2.0)).err(),
            Some(ShapeError::CollinearPoints)
        );
        assert_eq!(
            Plane::from_points(Point3::ORIGIN, Point3::ORIGIN, point3(2.0, 2.0, 2.0)).err(),
            Some(ShapeError::Vector(VectorError::Zero))
        );
        assert!(plane.bbox().is_none());
    }

    #[test]
    fn polygon_intersection_and_box() {
        let quad = Polygon::new(vec![
            point3(0.0, 0.0, 0.0),
            point3(2.0, 0.0, 0.0),
            point3(2.0, 2.0, 0.0),
            point3(0.0, 2.0, 0.0),
        ])
        .unwrap();
        assert_close!(quad.normal_at(Point3::ORIGIN), Vec3::Z);
        let down = |x, y| Ray::new(point3(x, y, 5.0), -Vec3::Z);
        assert_eq!(quad.intersect(&down(1.0, 1.0)).as_slice(), &[5.0]);
        assert_eq!(quad.intersect(&down(1.9, 0.1)).len(), 1);
        assert!(quad.intersect(&down(2.1, 1.0)).is_empty());
        assert!(quad.intersect(&down(-0.1, 1.0)).is_empty());

        let b = quad.bbox().unwrap();
        assert_eq!(b.min(), Point3::ORIGIN);
        assert_eq!(b.max(), point3(2.0, 2.0, 0.0));
    }
}
