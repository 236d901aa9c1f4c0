//! Built-in scenes, selected by name.
//!
//! Intensities and emissions below are written on a 0-255 scale and divided down with [`c255`],
//! so a light of `c255(1000.0, 600.0, 0.0)` is about four times brighter than full red.

use geometry::camera::Camera;
use light::{AmbientLight, LightSource};
use material::Material;
use math::hcm::{point3, vec3, Point3, Vec3};
use radiometry::color::Color;
use rand::{rngs::StdRng, Rng, SeedableRng};
use shape::{Cylinder, Plane, Polygon, Sphere, Surface, Triangle, Tube};
use tlas::{AccelStrategy, Aggregator, Element};

use crate::{Scene, SceneError};

/// Names accepted by [`build`], in the order they are listed to the user.
pub const NAMES: [&str; 6] = [
    "ambient-sphere",
    "shadow",
    "refraction",
    "mirrors",
    "primitives",
    "sphere-grid",
];

const BLUE: Color = Color::new(0.0, 0.0, 1.0);
const RED: Color = Color::new(1.0, 0.0, 0.0);

fn c255(r: f32, g: f32, b: f32) -> Color {
    Color::new(r, g, b) / 255.0
}

/// Builds the named scene and a camera looking at it with the given resolution.
pub fn build(
    name: &str, strategy: AccelStrategy, resolution: (u32, u32),
) -> Result<(Scene, Camera), SceneError> {
    let (scene, camera) = match name {
        "ambient-sphere" => ambient_sphere(strategy, resolution)?,
        "shadow" => shadow(strategy, resolution)?,
        "refraction" => refraction(strategy, resolution)?,
        "mirrors" => mirrors(strategy, resolution)?,
        "primitives" => primitives(strategy, resolution)?,
        "sphere-grid" => sphere_grid(strategy, resolution)?,
        _ => return Err(SceneError::UnknownPreset(name.to_owned())),
    };
    log::info!(
        "Scene '{}': {} top-level elements, {} lights, {} strategy",
        scene.name,
        scene.root.len(),
        scene.lights.len(),
        strategy
    );
    Ok((scene, camera))
}

/// Puts the bounded surfaces in one group using `strategy`. Unbounded surfaces (planes, tubes)
/// can't go in a hierarchy, so they sit next to that group in a linear root.
fn assemble(
    strategy: AccelStrategy, surfaces: Vec<Surface>,
) -> Result<Aggregator, SceneError> {
    let (bounded, unbounded): (Vec<Surface>, Vec<Surface>) =
        surfaces.into_iter().partition(|s| s.bbox().is_some());
    if unbounded.is_empty() {
        return Ok(Aggregator::build(strategy, bounded)?);
    }
    log::debug!(
        "{} unbounded surfaces kept out of the {} group",
        unbounded.len(),
        strategy
    );
    let group = Aggregator::build(strategy, bounded)?;
    let mut children: Vec<Element> = vec![group.into()];
    children.extend(unbounded.into_iter().map(Element::from));
    Ok(Aggregator::build(AccelStrategy::Linear, children)?)
}

/// Camera on the +z axis looking at the origin, `distance` away, seeing a `size` square.
fn front_camera(distance: f32, size: f32, (nx, ny): (u32, u32)) -> Result<Camera, SceneError> {
    let camera = Camera::builder()
        .location(point3(0.0, 0.0, distance))
        .look_at(Point3::ORIGIN, Vec3::Y)
        .vp_distance(distance)
        .vp_size(size, size)
        .resolution(nx, ny)
        .build()?;
    Ok(camera)
}

/// One sphere lit only by ambient light.
fn ambient_sphere(
    strategy: AccelStrategy, (nx, ny): (u32, u32),
) -> Result<(Scene, Camera), SceneError> {
    let sphere = Surface::new(Sphere::new(point3(0.0, 0.0, -3.0), 1.0)?);
    let scene = Scene::new("ambient-sphere", assemble(strategy, vec![sphere])?)
        .with_background(c255(75.0, 127.0, 90.0))
        .with_ambient_light(AmbientLight(c255(10.0, 10.0, 10.0)));
    let camera = Camera::builder()
        .location(Point3::ORIGIN)
        .direction(-Vec3::Z, Vec3::Y)
        .vp_distance(1.0)
        .vp_size(3.0, 3.0)
        .resolution(nx, ny)
        .build()?;
    Ok((scene, camera))
}

/// Two tilted triangles behind a small sphere, under a spot light.
fn shadow(strategy: AccelStrategy, resolution: (u32, u32)) -> Result<(Scene, Camera), SceneError> {
    let glossy = Material::new().with_ks(0.8).with_shininess(60);
    let surfaces = vec![
        Surface::new(Triangle::new(
            point3(-150.0, -150.0, -115.0),
            point3(150.0, -150.0, -135.0),
            point3(75.0, 75.0, -150.0),
        )?)
        .with_material(glossy),
        Surface::new(Triangle::new(
            point3(-150.0, -150.0, -115.0),
            point3(-70.0, 70.0, -140.0),
            point3(75.0, 75.0, -150.0),
        )?)
        .with_material(glossy),
        Surface::new(Sphere::new(point3(0.0, 0.0, -11.0), 30.0)?)
            .with_emission(BLUE)
            .with_material(Material::new().with_kd(0.5).with_ks(0.5).with_shininess(30)),
    ];
    let spot = LightSource::spot(
        c255(700.0, 400.0, 400.0),
        point3(40.0, 40.0, 115.0),
        vec3(-1.0, -1.0, -4.0),
    )?
    .with_attenuation(1.0, 4e-4, 2e-5);
    let scene = Scene::new("shadow", assemble(strategy, surfaces)?)
        .with_ambient_light(AmbientLight(c255(38.0, 38.0, 38.0)))
        .with_lights(vec![spot]);
    Ok((scene, front_camera(1000.0, 200.0, resolution)?))
}

/// A sphere inside a partly transparent one.
fn refraction(
    strategy: AccelStrategy, resolution: (u32, u32),
) -> Result<(Scene, Camera), SceneError> {
    let surfaces = vec![
        Surface::new(Sphere::new(point3(0.0, 0.0, -50.0), 50.0)?)
            .with_emission(BLUE)
            .with_material(
                Material::new()
                    .with_kd(0.4)
                    .with_ks(0.3)
                    .with_shininess(100)
                    .with_kt(0.3),
            ),
        Surface::new(Sphere::new(point3(0.0, 0.0, -50.0), 25.0)?)
            .with_emission(RED)
            .with_material(Material::new().with_kd(0.5).with_ks(0.5).with_shininess(100)),
    ];
    let spot = LightSource::spot(
        c255(1000.0, 600.0, 0.0),
        point3(-100.0, -100.0, 500.0),
        vec3(-1.0, -1.0, -2.0),
    )?
    .with_attenuation(1.0, 4e-4, 6e-7);
    let scene = Scene::new("refraction", assemble(strategy, surfaces)?).with_lights(vec![spot]);
    Ok((scene, front_camera(1000.0, 150.0, resolution)?))
}

/// Nested spheres reflected in two large mirror triangles.
fn mirrors(strategy: AccelStrategy, resolution: (u32, u32)) -> Result<(Scene, Camera), SceneError> {
    let center = point3(-950.0, -900.0, -1000.0);
    let mirror_emission = c255(20.0, 20.0, 20.0);
    let surfaces = vec![
        Surface::new(Sphere::new(center, 400.0)?)
            .with_emission(c255(0.0, 50.0, 100.0))
            .with_material(
                Material::new()
                    .with_kd(0.25)
                    .with_ks(0.25)
                    .with_shininess(20)
                    .with_kt(Color::new(0.5, 0.0, 0.0)),
            ),
        Surface::new(Sphere::new(center, 200.0)?)
            .with_emission(c255(100.0, 50.0, 20.0))
            .with_material(Material::new().with_kd(0.25).with_ks(0.25).with_shininess(20)),
        Surface::new(Triangle::new(
            point3(1500.0, -1500.0, -1500.0),
            point3(-1500.0, 1500.0, -1500.0),
            point3(670.0, 670.0, 3000.0),
        )?)
        .with_emission(mirror_emission)
        .with_material(Material::new().with_kr(1.0)),
        Surface::new(Triangle::new(
            point3(1500.0, -1500.0, -1500.0),
            point3(-1500.0, 1500.0, -1500.0),
            point3(-1500.0, -1500.0, -2000.0),
        )?)
        .with_emission(mirror_emission)
        .with_material(Material::new().with_kr(Color::new(0.5, 0.0, 0.4))),
    ];
    let spot = LightSource::spot(
        c255(1020.0, 400.0, 400.0),
        point3(-750.0, -750.0, -150.0),
        vec3(-1.0, -1.0, -4.0),
    )?
    .with_attenuation(1.0, 1e-5, 5e-6);
    let scene = Scene::new("mirrors", assemble(strategy, surfaces)?)
        .with_ambient_light(AmbientLight(c255(26.0, 26.0, 26.0)))
        .with_lights(vec![spot]);
    Ok((scene, front_camera(10000.0, 2500.0, resolution)?))
}

/// One of every kind of surface, lit by each kind of light.
fn primitives(
    strategy: AccelStrategy, resolution: (u32, u32),
) -> Result<(Scene, Camera), SceneError> {
    let surfaces = vec![
        Surface::new(Plane::new(point3(0.0, -70.0, 0.0), Vec3::Y)?)
            .with_emission(c255(50.0, 50.0, 50.0))
            .with_material(Material::new().with_kd(0.6).with_ks(0.2).with_kr(0.3)),
        Surface::new(Plane::new(point3(0.0, 0.0, -200.0), Vec3::Z)?)
            .with_emission(c255(40.0, 40.0, 40.0))
            .with_material(Material::new().with_kd(0.6).with_ks(0.3)),
        Surface::new(Sphere::new(point3(-120.0, 0.0, -120.0), 40.0)?)
            .with_emission(c255(70.0, 50.0, 110.0))
            .with_material(Material::new().with_kd(0.4).with_ks(0.3).with_shininess(70)),
        Surface::new(Sphere::new(point3(0.0, 50.0, -100.0), 35.0)?)
            .with_emission(c255(140.0, 140.0, 50.0))
            .with_material(
                Material::new()
                    .with_kd(0.4)
                    .with_ks(0.4)
                    .with_shininess(70)
                    .with_kr(0.5),
            ),
        Surface::new(Triangle::new(
            point3(50.0, 60.0, -150.0),
            point3(100.0, 150.0, -140.0),
            point3(30.0, 120.0, -200.0),
        )?)
        .with_emission(c255(150.0, 130.0, 40.0))
        .with_material(Material::new().with_kd(0.5).with_ks(0.4).with_shininess(80)),
        Surface::new(Polygon::new(vec![
            point3(-80.0, -60.0, -150.0),
            point3(-20.0, -60.0, -150.0),
            point3(0.0, -20.0, -150.0),
            point3(-50.0, 0.0, -150.0),
            point3(-100.0, -20.0, -150.0),
        ])?)
        .with_emission(c255(80.0, 130.0, 170.0))
        .with_material(
            Material::new()
                .with_kd(0.4)
                .with_ks(0.5)
                .with_shininess(70)
                .with_kt(0.4),
        ),
        Surface::new(Cylinder::new(point3(70.0, -70.0, -100.0), Vec3::Y, 15.0, 60.0)?)
            .with_emission(c255(40.0, 100.0, 140.0))
            .with_material(
                Material::new()
                    .with_kd(0.4)
                    .with_ks(0.5)
                    .with_shininess(60)
                    .with_kt(0.3),
            ),
        Surface::new(Tube::new(point3(-60.0, -70.0, -110.0), Vec3::Y, 10.0)?)
            .with_emission(c255(160.0, 70.0, 40.0))
            .with_material(
                Material::new()
                    .with_kd(0.4)
                    .with_ks(0.6)
                    .with_shininess(90)
                    .with_kr(0.5),
            ),
    ];
    let lights = vec![
        LightSource::spot(
            c255(700.0, 500.0, 500.0),
            point3(0.0, 250.0, 0.0),
            vec3(-0.3, -1.0, -0.2),
        )?
        .with_attenuation(1.0, 8e-5, 3e-5),
        LightSource::point(c255(350.0, 350.0, 350.0), point3(-150.0, 120.0, 50.0))
            .with_attenuation(1.0, 4e-4, 4e-4),
        LightSource::directional(c255(120.0, 120.0, 120.0), vec3(-1.0, -1.0, -1.0))?,
    ];
    let scene = Scene::new("primitives", assemble(strategy, surfaces)?)
        .with_ambient_light(AmbientLight(c255(18.0, 18.0, 18.0)))
        .with_lights(lights);
    Ok((scene, front_camera(800.0, 300.0, resolution)?))
}

/// A square grid of small spheres with random colors over a floor.
fn sphere_grid(
    strategy: AccelStrategy, (nx, ny): (u32, u32),
) -> Result<(Scene, Camera), SceneError> {
    const N: i32 = 24;
    const SPACING: f32 = 10.0;
    let mut rng = StdRng::seed_from_u64(N as u64);

    let mut surfaces = vec![Surface::new(Plane::new(point3(0.0, -4.0, 0.0), Vec3::Y)?)
        .with_emission(c255(30.0, 30.0, 30.0))
        .with_material(Material::new().with_kd(0.5).with_kr(0.2))];
    for i in 0..N {
        for j in 0..N {
            let center = point3(
                (i - N / 2) as f32 * SPACING,
                0.0,
                -(j as f32) * SPACING,
            );
            let emission = Color::new(rng.gen(), rng.gen(), rng.gen()) * 0.6;
            let material = if rng.gen::<f32>() < 0.2 {
                Material::new().with_kd(0.2).with_ks(0.6).with_shininess(80).with_kr(0.4)
            } else {
                Material::new().with_kd(0.6).with_ks(0.3).with_shininess(30)
            };
            surfaces.push(
                Surface::new(Sphere::new(center, 4.0)?)
                    .with_emission(emission)
                    .with_material(material),
            );
        }
    }
    let lights = vec![
        LightSource::point(c255(500.0, 500.0, 450.0), point3(0.0, 80.0, 40.0))
            .with_attenuation(1.0, 1e-3, 1e-5),
        LightSource::directional(c255(60.0, 60.0, 80.0), vec3(1.0, -1.0, -0.5))?,
    ];
    let scene = Scene::new("sphere-grid", assemble(strategy, surfaces)?)
        .with_background(c255(20.0, 24.0, 40.0))
        .with_ambient_light(AmbientLight(c255(15.0, 15.0, 15.0)))
        .with_lights(lights);
    let camera = Camera::builder()
        .location(point3(0.0, 60.0, 80.0))
        .look_at(point3(0.0, 0.0, -100.0), Vec3::Y)
        .vp_distance(100.0)
        .vp_size(160.0, 160.0 * ny as f32 / nx as f32)
        .resolution(nx, ny)
        .build()?;
    Ok((scene, camera))
}

#[cfg(test)]
mod test {
    use super::*;
    use math::assert_close;

    #[test]
    fn every_listed_preset_builds() {
        for name in NAMES.iter() {
            for &strategy in [AccelStrategy::Linear, AccelStrategy::Coarse, AccelStrategy::Bvh].iter()
            {
                let (scene, camera) = build(name, strategy, (16, 12)).unwrap();
                assert_eq!(scene.name, *name);
                assert!(scene.root.geometric_sound());
                assert_eq!(camera.resolution(), (16, 12));
            }
        }
    }

    #[test]
    fn unknown_preset() {
        match build("teapot", AccelStrategy::Linear, (4, 4)) {
            Err(SceneError::UnknownPreset(name)) => assert_eq!(name, "teapot"),
            other => panic!("unexpected {:?}", other.map(|(s, _)| s.name)),
        }
    }

    #[test]
    fn unbounded_surfaces_stay_out_of_the_hierarchy() {
        let (scene, _) = build("primitives", AccelStrategy::Bvh, (4, 4)).unwrap();
        // The bvh group plus two planes and the tube.
        assert_eq!(scene.root.strategy(), AccelStrategy::Linear);
        assert_eq!(scene.root.len(), 4);
        assert!(scene.root.bbox().is_none());

        let (scene, _) = build("shadow", AccelStrategy::Bvh, (4, 4)).unwrap();
        assert_eq!(scene.root.strategy(), AccelStrategy::Bvh);
        assert!(scene.root.bbox().is_some());
    }

    #[test]
    fn ambient_sphere_camera_sees_the_sphere() {
        let (scene, camera) = build("ambient-sphere", AccelStrategy::Linear, (9, 9)).unwrap();
        let hit = scene.root.find_closest(&camera.construct_ray(4, 4)).unwrap();
        assert_close!(hit.pos, point3(0.0, 0.0, -2.0));
        assert!(scene.root.find_closest(&camera.construct_ray(0, 0)).is_none());
    }
}
