use geometry::ray::Ray;
use light::LightSource;
use math::float::align_zero;
use math::hcm::{self, Vec3};
use radiometry::color::Color;
use scene::Scene;
use shape::Hit;

/// Recursion limits of the shading engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingOptions {
    /// Number of bounces, counting the camera ray's own hit as 1.
    pub max_level: u32,
    /// Contributions whose accumulated attenuation is below this on every channel are dropped.
    pub min_k: f32,
}

impl Default for ShadingOptions {
    fn default() -> Self {
        ShadingOptions {
            max_level: 10,
            min_k: 0.001,
        }
    }
}

/// A hit together with what shading needs to know about the incoming ray.
///  - `dir`: direction of the ray that produced the hit,
///  - `normal`: surface normal at the hit,
///  - `nv`: `normal · dir`, never zero.
#[derive(Debug, Clone, Copy)]
struct ShadingPoint<'a> {
    hit: Hit<'a>,
    dir: Vec3,
    normal: Vec3,
    nv: f32,
}

/// One light as seen from a shading point. `l` points from the light toward the point.
#[derive(Debug, Clone, Copy)]
struct LightSample<'a> {
    light: &'a LightSource,
    l: Vec3,
    nl: f32,
}

/// Returns `None` if the ray grazes the surface (`normal · dir` is zero), in which case the point
/// contributes nothing.
fn preprocess<'a>(hit: Hit<'a>, r: &Ray) -> Option<ShadingPoint<'a>> {
    let normal = hit.normal();
    let nv = align_zero(normal.dot(r.dir));
    if nv == 0.0 {
        None
    } else {
        Some(ShadingPoint {
            hit,
            dir: r.dir,
            normal,
            nv,
        })
    }
}

/// Whitted-style tracer: Phong local lighting with shadows that dim through transparent
/// occluders, plus mirror reflection and straight-through transmission.
pub struct WhittedTracer<'s> {
    scene: &'s Scene,
    options: ShadingOptions,
}

impl<'s> WhittedTracer<'s> {
    pub fn new(scene: &'s Scene, options: ShadingOptions) -> Self {
        Self { scene, options }
    }

    pub fn options(&self) -> ShadingOptions {
        self.options
    }

    /// Color seen along `r`.
    pub fn trace_ray(&self, r: &Ray) -> Color {
        match self.scene.root.find_closest(r) {
            None => self.scene.background,
            Some(hit) => self.shade_primary(hit, r),
        }
    }

    /// Color of the camera ray's first hit: ambient term plus the full recursion.
    fn shade_primary(&self, hit: Hit, r: &Ray) -> Color {
        match preprocess(hit, r) {
            None => Color::black(),
            Some(sp) => {
                let ambient = self.scene.ambient.intensity() * sp.hit.surface.material().k_a;
                ambient + self.calc_color(&sp, self.options.max_level, Color::ONE)
            }
        }
    }

    /// `k` is the attenuation accumulated along the path from the camera to this point.
    fn calc_color(&self, sp: &ShadingPoint, level: u32, k: Color) -> Color {
        if level == 0 || k.lower_than(self.options.min_k) {
            return Color::black();
        }
        let local = self.local_effects(sp);
        if level == 1 {
            local
        } else {
            local + self.global_effects(sp, level, k)
        }
    }

    fn local_effects(&self, sp: &ShadingPoint) -> Color {
        let surface = sp.hit.surface;
        let mut color = surface.emission();
        for light in self.scene.lights.iter() {
            let sample = match self.sample_light(sp, light) {
                Some(sample) => sample,
                None => continue,
            };
            let ktr = self.transparency(sp, &sample);
            if ktr.lower_than(self.options.min_k) {
                continue;
            }
            let il = light.intensity_at(sp.hit.pos) * ktr;
            color += il * (self.diffuse(sp, &sample) + self.specular(sp, &sample));
        }
        color
    }

    /// Skips lights at the point itself, and lights on the other side of the surface from the
    /// viewer.
    fn sample_light<'l>(&self, sp: &ShadingPoint, light: &'l LightSource) -> Option<LightSample<'l>> {
        let l = light.direction_at(sp.hit.pos)?;
        let nl = align_zero(sp.normal.dot(l));
        if nl * sp.nv > 0.0 {
            Some(LightSample { light, l, nl })
        } else {
            None
        }
    }

    fn diffuse(&self, sp: &ShadingPoint, sample: &LightSample) -> Color {
        sp.hit.surface.material().k_d * sample.nl.abs()
    }

    fn specular(&self, sp: &ShadingPoint, sample: &LightSample) -> Color {
        let material = sp.hit.surface.material();
        let r = sample.l - sp.normal * (2.0 * sample.nl);
        let minus_vr = (-sp.dir.dot(r)).max(0.0);
        material.k_s * minus_vr.powi(material.shininess)
    }

    /// Fraction of the light that passes the occluders between the point and the light: the
    /// product of their `k_t`, or exactly zero once it drops below `min_k`.
    fn transparency(&self, sp: &ShadingPoint, sample: &LightSample) -> Color {
        let shadow_ray = Ray::nudged(sp.hit.pos, -sample.l, sp.normal);
        let light_distance = sample.light.distance_to(shadow_ray.origin);

        let mut ktr = Color::ONE;
        let occluders = self
            .scene
            .root
            .find_intersections_within(&shadow_ray, light_distance);
        for occluder in occluders {
            ktr = ktr * occluder.surface.material().k_t;
            if ktr.lower_than(self.options.min_k) {
                return Color::ZERO;
            }
        }
        ktr
    }

    fn global_effects(&self, sp: &ShadingPoint, level: u32, k: Color) -> Color {
        let material = sp.hit.surface.material();
        let pos = sp.hit.pos;
        let reflected = Ray::nudged(pos, hcm::reflect(sp.normal, sp.dir), sp.normal);
        let refracted = Ray::nudged(pos, sp.dir, sp.normal);
        self.global_effect(&reflected, level, k, material.k_r)
            + self.global_effect(&refracted, level, k, material.k_t)
    }

    fn global_effect(&self, r: &Ray, level: u32, k: Color, kx: Color) -> Color {
        let kk = k * kx;
        if kk.lower_than(self.options.min_k) {
            return Color::black();
        }
        match self.scene.root.find_closest(r) {
            None => self.scene.background * kx,
            Some(hit) => match preprocess(hit, r) {
                None => Color::black(),
                Some(sp) => self.calc_color(&sp, level - 1, kk) * kx,
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use light::AmbientLight;
    use material::Material;
    use math::hcm::{point3, Point3};
    use shape::{Sphere, Surface};
    use tlas::{AccelStrategy, Aggregator};

    fn close(a: Color, b: Color) -> bool {
        (a.r - b.r).abs() < 1e-5 && (a.g - b.g).abs() < 1e-5 && (a.b - b.b).abs() < 1e-5
    }

    fn sphere(center: Point3, radius: f32, material: Material) -> Surface {
        Surface::new(Sphere::new(center, radius).unwrap()).with_material(material)
    }

    fn scene_of(surfaces: Vec<Surface>) -> Scene {
        Scene::new("test", Aggregator::build(AccelStrategy::Bvh, surfaces).unwrap())
    }

    fn forward() -> Ray {
        Ray::new(Point3::ORIGIN, -Vec3::Z)
    }

    #[test]
    fn recursion_limits() {
        let scene = scene_of(vec![
            sphere(point3(0.0, 0.0, -3.0), 1.0, Material::new()).with_emission(0.5)
        ]);
        let tracer = WhittedTracer::new(&scene, ShadingOptions::default());
        let r = forward();
        let sp = preprocess(scene.root.find_closest(&r).unwrap(), &r).unwrap();
        assert!(tracer.calc_color(&sp, 0, Color::ONE).is_black());
        assert!(tracer.calc_color(&sp, 5, Color::gray(0.0005)).is_black());
        assert_eq!(tracer.calc_color(&sp, 1, Color::ONE), Color::gray(0.5));
    }

    #[test]
    fn grazing_hits_are_black() {
        let surface = sphere(Point3::ORIGIN, 1.0, Material::new()).with_emission(0.5);
        let scene = scene_of(vec![surface.clone()])
            .with_ambient_light(AmbientLight(Color::gray(0.5)));
        let tracer = WhittedTracer::new(&scene, ShadingOptions::default());

        // The normal at the top of the sphere is +Y, perpendicular to the ray.
        let grazing = Ray::new(point3(-2.0, 1.0, 0.0), Vec3::X);
        let hit = Hit::new(&surface, point3(0.0, 1.0, 0.0), 2.0);
        assert!(preprocess(hit, &grazing).is_none());
        assert!(tracer.shade_primary(hit, &grazing).is_black());

        let head_on = Ray::new(point3(-3.0, 0.0, 0.0), Vec3::X);
        let hit = Hit::new(&surface, point3(-1.0, 0.0, 0.0), 2.0);
        assert!(preprocess(hit, &head_on).is_some());
        assert!(!tracer.shade_primary(hit, &head_on).is_black());
    }

    #[test]
    fn ambient_only_sphere() {
        let emission = Color::new(0.1, 0.2, 0.3);
        let scene = scene_of(vec![
            sphere(point3(0.0, 0.0, -3.0), 1.0, Material::new()).with_emission(emission)
        ])
        .with_background(Color::new(0.3, 0.5, 0.35))
        .with_ambient_light(AmbientLight(Color::gray(10.0)));
        let options = ShadingOptions {
            max_level: 1,
            ..Default::default()
        };
        let tracer = WhittedTracer::new(&scene, options);
        assert!(close(tracer.trace_ray(&forward()), Color::gray(10.0) + emission));
        let miss = Ray::new(Point3::ORIGIN, Vec3::X);
        assert_eq!(tracer.trace_ray(&miss), Color::new(0.3, 0.5, 0.35));
    }

    #[test]
    fn diffuse_and_specular() {
        let material = Material::new().with_kd(0.5).with_ks(0.25).with_shininess(10);
        // The light sits at the eye, so the mirror direction points straight back at it.
        let scene = scene_of(vec![sphere(point3(0.0, 0.0, -3.0), 1.0, material)])
            .with_lights(vec![LightSource::point(Color::white(), Point3::ORIGIN)]);
        let tracer = WhittedTracer::new(&scene, ShadingOptions::default());
        assert!(close(tracer.trace_ray(&forward()), Color::gray(0.75)));

        // Lights behind the surface contribute nothing.
        let scene = scene_of(vec![sphere(point3(0.0, 0.0, -3.0), 1.0, material)])
            .with_lights(vec![LightSource::point(Color::white(), point3(0.0, 0.0, -10.0))]);
        let tracer = WhittedTracer::new(&scene, ShadingOptions::default());
        assert!(tracer.trace_ray(&forward()).is_black());
    }

    #[test]
    fn shadows_through_occluders() {
        let lit = sphere(point3(0.0, 0.0, -3.0), 1.0, Material::new().with_kd(1.0));
        let light = LightSource::point(Color::white(), point3(0.0, 0.0, 10.0));

        let check = |occluder_kt: f32, expected: Color| {
            let occluder = sphere(point3(0.0, 0.0, 2.0), 0.5, Material::new().with_kt(occluder_kt));
            let scene = scene_of(vec![lit.clone(), occluder]).with_lights(vec![light]);
            let tracer = WhittedTracer::new(&scene, ShadingOptions::default());
            let r = forward();
            let sp = preprocess(scene.root.find_closest(&r).unwrap(), &r).unwrap();
            let sample = tracer.sample_light(&sp, &light).unwrap();
            let ktr = tracer.transparency(&sp, &sample);
            assert!(close(ktr, expected), "k_t {} gives {}", occluder_kt, ktr);
        };
        // Opaque: exactly zero.
        check(0.0, Color::ZERO);
        // The shadow ray crosses both walls of the occluder.
        check(0.5, Color::gray(0.25));
        check(1.0, Color::ONE);
    }

    #[test]
    fn occluders_beyond_the_light_cast_no_shadow() {
        let lit = sphere(point3(0.0, 0.0, -3.0), 1.0, Material::new().with_kd(1.0));
        let occluder = sphere(point3(0.0, 0.0, 2.0), 0.5, Material::new());
        let light = LightSource::point(Color::white(), point3(0.0, 0.0, 0.5));
        let scene = scene_of(vec![lit, occluder]).with_lights(vec![light]);
        let tracer = WhittedTracer::new(&scene, ShadingOptions::default());
        let r = forward();
        let sp = preprocess(scene.root.find_closest(&r).unwrap(), &r).unwrap();
        let sample = tracer.sample_light(&sp, &light).unwrap();
        assert_eq!(tracer.transparency(&sp, &sample), Color::ONE);
    }

    #[test]
    fn mirror_reflects_background() {
        let mirror = sphere(point3(0.0, 0.0, -3.0), 1.0, Material::new().with_kr(1.0));
        let background = Color::new(0.2, 0.4, 0.6);
        let scene = scene_of(vec![mirror]).with_background(background);
        let tracer = WhittedTracer::new(&scene, ShadingOptions::default());
        assert!(close(tracer.trace_ray(&forward()), background));

        // With a single level there is no reflection.
        let options = ShadingOptions {
            max_level: 1,
            ..Default::default()
        };
        let tracer = WhittedTracer::new(&scene, options);
        assert!(tracer.trace_ray(&forward()).is_black());
    }

    #[test]
    fn transparent_sphere_shows_what_is_behind() {
        let glass = sphere(point3(0.0, 0.0, -3.0), 1.0, Material::new().with_kt(0.5));
        let wall = sphere(point3(0.0, 0.0, -20.0), 5.0, Material::new()).with_emission(0.8);
        let scene = scene_of(vec![glass, wall]);
        let tracer = WhittedTracer::new(&scene, ShadingOptions::default());
        // Through both glass walls: 0.8 * 0.5 * 0.5.
        assert!(close(tracer.trace_ray(&forward()), Color::gray(0.2)));
    }
}
