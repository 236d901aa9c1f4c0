pub mod preset;

use geometry::camera::CameraError;
use light::{AmbientLight, LightSource};
use math::hcm::VectorError;
use radiometry::color::Color;
use shape::ShapeError;
use thiserror::Error;
use tlas::{AccelStrategy, Aggregator, BuildError};

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("invalid shape: {0}")]
    Shape(#[from] ShapeError),
    #[error("failed building the aggregate: {0}")]
    Build(#[from] BuildError),
    #[error("invalid camera: {0}")]
    Camera(#[from] CameraError),
    #[error(transparent)]
    Vector(#[from] VectorError),
    #[error("no preset scene named '{0}'")]
    UnknownPreset(String),
}

/// Everything the tracer needs to know besides the camera: the surfaces, the lights, the color
/// of rays that escape, and the ambient term.
#[derive(Debug)]
pub struct Scene {
    pub name: String,
    pub root: Aggregator,
    pub lights: Vec<LightSource>,
    pub background: Color,
    pub ambient: AmbientLight,
}

impl Scene {
    /// A scene with black background, no ambient light and no light sources.
    pub fn new<S: Into<String>>(name: S, root: Aggregator) -> Self {
        Self {
            name: name.into(),
            root,
            lights: vec![],
            background: Color::black(),
            ambient: AmbientLight::NONE,
        }
    }

    /// An empty scene; every ray misses and sees the background.
    pub fn empty<S: Into<String>>(name: S, strategy: AccelStrategy) -> Result<Self, SceneError> {
        let root = Aggregator::build(strategy, Vec::<tlas::Element>::new())?;
        Ok(Self::new(name, root))
    }

    pub fn with_lights(self, lights: Vec<LightSource>) -> Self {
        Self { lights, ..self }
    }

    pub fn with_background<C: Into<Color>>(self, background: C) -> Self {
        Self {
            background: background.into(),
            ..self
        }
    }

    pub fn with_ambient_light(self, ambient: AmbientLight) -> Self {
        if !self.ambient.intensity().is_black() {
            log::warn!("Discarding the existing ambient light {}", self.ambient.intensity());
        }
        Self { ambient, ..self }
    }

    pub fn strategy(&self) -> AccelStrategy {
        self.root.strategy()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use math::hcm::point3;
    use shape::{Sphere, Surface};

    #[test]
    fn builder_sets_fields() {
        let sphere = Surface::new(Sphere::new(point3(0.0, 0.0, -3.0), 1.0).unwrap());
        let root = Aggregator::build(AccelStrategy::Bvh, vec![sphere]).unwrap();
        let scene = Scene::new("one sphere", root)
            .with_background(0.25)
            .with_ambient_light(AmbientLight(Color::gray(0.1)))
            .with_lights(vec![LightSource::point(Color::white(), point3(0.0, 5.0, 0.0))]);
        assert_eq!(scene.name, "one sphere");
        assert_eq!(scene.background, Color::gray(0.25));
        assert_eq!(scene.ambient.intensity(), Color::gray(0.1));
        assert_eq!(scene.lights.len(), 1);
        assert_eq!(scene.strategy(), AccelStrategy::Bvh);
    }

    #[test]
    fn empty_scene() {
        let scene = Scene::empty("nothing", AccelStrategy::Coarse).unwrap();
        assert!(scene.root.is_empty());
        assert!(scene.lights.is_empty());
        assert!(scene.background.is_black());
    }
}
