use std::sync::OnceLock;

use geometry::{bbox::BBox, ray::Ray};
use material::Material;
use math::hcm::{Point3, Vec3};
use radiometry::color::Color;
use smallvec::SmallVec;

use crate::{Geometry, Hit, Shape};

/// A shape placed in a scene, together with what it looks like.
///
/// The bounding box is computed on first request and cached; the cache is safe to fill from
/// several threads at once.
#[derive(Debug, Clone)]
pub struct Surface {
    geometry: Geometry,
    emission: Color,
    material: Material,
    bbox: OnceLock<Option<BBox>>,
}

impl Surface {
    pub fn new<G: Into<Geometry>>(geometry: G) -> Self {
        Surface {
            geometry: geometry.into(),
            emission: Color::black(),
            material: Material::default(),
            bbox: OnceLock::new(),
        }
    }
    pub fn with_emission<C: Into<Color>>(self, emission: C) -> Self {
        Self {
            emission: emission.into(),
            ..self
        }
    }
    pub fn with_material(self, material: Material) -> Self {
        Self { material, ..self }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }
    pub fn emission(&self) -> Color {
        self.emission
    }
    pub fn material(&self) -> &Material {
        &self.material
    }
    pub fn summary(&self) -> String {
        self.geometry.summary()
    }

    pub fn bbox(&self) -> Option<BBox> {
        *self.bbox.get_or_init(|| self.geometry.bbox())
    }

    pub fn normal_at(&self, p: Point3) -> Vec3 {
        self.geometry.normal_at(p)
    }

    /// All points where `r` meets this surface, nearest first.
    pub fn intersect(&self, r: &Ray) -> SmallVec<[Hit<'_>; 2]> {
        self.geometry
            .intersect(r)
            .into_iter()
            .map(|t| Hit::new(self, r.position_at(t), t))
            .collect()
    }

    /// The nearest point where `r` meets this surface.
    pub fn nearest(&self, r: &Ray) -> Option<Hit<'_>> {
        self.geometry
            .intersect(r)
            .first()
            .map(|&t| Hit::new(self, r.position_at(t), t))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Plane, Sphere};
    use math::hcm::point3;

    #[test]
    fn bbox_is_cached_and_absent_for_planes() {
        let sphere = Surface::new(Sphere::new(point3(0.0, 0.0, -3.0), 1.0).unwrap());
        let b = sphere.bbox().unwrap();
        assert_eq!(b.min(), point3(-1.0, -1.0, -4.0));
        assert_eq!(sphere.bbox(), Some(b));

        let plane = Surface::new(Plane::new(Point3::ORIGIN, Vec3::Y).unwrap());
        assert!(plane.bbox().is_none());
    }

    #[test]
    fn hits_reference_the_surface() {
        let sphere = Surface::new(Sphere::new(point3(0.0, 0.0, -3.0), 1.0).unwrap())
            .with_emission(0.5)
            .with_material(Material::new().with_kd(0.2));
        let r = Ray::new(Point3::ORIGIN, -Vec3::Z);
        let hits = sphere.intersect(&r);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].pos, point3(0.0, 0.0, -2.0));
        assert_eq!(hits[1].pos, point3(0.0, 0.0, -4.0));
        assert!(std::ptr::eq(hits[0].surface, &sphere));
        assert_eq!(hits[0].surface.emission(), Color::gray(0.5));

        let nearest = sphere.nearest(&r).unwrap();
        assert_eq!(nearest.ray_t, 2.0);
        assert_eq!(nearest.normal(), Vec3::Z);
    }
}
