use math::float::align_zero;
use math::hcm::{Point3, Vec3, VectorError};
use radiometry::color::Color;

/// Light that reaches every point equally from all directions, casting no shadows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight(pub Color);

impl AmbientLight {
    pub const NONE: AmbientLight = AmbientLight(Color::ZERO);

    /// Ambient light of `intensity` scaled by the per-channel factor `ka`.
    pub fn new(intensity: Color, ka: Color) -> Self {
        AmbientLight(intensity * ka)
    }
    pub fn intensity(&self) -> Color {
        self.0
    }
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self::NONE
    }
}

/// Distance falloff `1 / (kc + kl * d + kq * d^2)` of point and spot lights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    pub kc: f32,
    pub kl: f32,
    pub kq: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Attenuation {
            kc: 1.0,
            kl: 0.0,
            kq: 0.0,
        }
    }
}

impl Attenuation {
    pub fn factor(&self, distance: f32) -> f32 {
        1.0 / (self.kc + self.kl * distance + self.kq * distance * distance)
    }
}

// Various kinds of lights.

#[derive(Debug, Clone, Copy)]
pub enum LightSource {
    /// Infinitely far away: constant intensity along a fixed direction.
    Directional { direction: Vec3, intensity: Color },
    Point {
        position: Point3,
        intensity: Color,
        attenuation: Attenuation,
    },
    /// A point light emitting mostly along `direction`, fading as `cos` of the angle off it and
    /// dark behind it.
    Spot {
        position: Point3,
        direction: Vec3,
        intensity: Color,
        attenuation: Attenuation,
    },
}

impl LightSource {
    /// Creates a directional light shining along `direction`.
    pub fn directional(intensity: Color, direction: Vec3) -> Result<Self, VectorError> {
        let direction = direction.try_hat().ok_or(VectorError::Zero)?;
        Ok(Self::Directional {
            direction,
            intensity,
        })
    }

    /// Creates a point light with the given position and intensity and no falloff.
    pub fn point(intensity: Color, position: Point3) -> Self {
        Self::Point {
            position,
            intensity,
            attenuation: Attenuation::default(),
        }
    }

    /// Creates a spot light at `position` aimed along `direction`.
    pub fn spot(intensity: Color, position: Point3, direction: Vec3) -> Result<Self, VectorError> {
        let direction = direction.try_hat().ok_or(VectorError::Zero)?;
        Ok(Self::Spot {
            position,
            direction,
            intensity,
            attenuation: Attenuation::default(),
        })
    }

    /// Sets the distance falloff coefficients. Directional lights have no falloff and are
    /// returned unchanged.
    pub fn with_attenuation(self, kc: f32, kl: f32, kq: f32) -> Self {
        let attenuation = Attenuation { kc, kl, kq };
        match self {
            Self::Directional { .. } => self,
            Self::Point { position, intensity, .. } => Self::Point {
                position,
                intensity,
                attenuation,
            },
            Self::Spot { position, direction, intensity, .. } => Self::Spot {
                position,
                direction,
                intensity,
                attenuation,
            },
        }
    }
}

#[rustfmt::skip]
impl LightSource {
    /// Intensity arriving at `p`, regardless of occlusion.
    pub fn intensity_at(&self, p: Point3) -> Color {
        match *self {
            Self::Directional { intensity, .. } => intensity,
            Self::Point { position, intensity, attenuation } => {
                intensity * attenuation.factor(position.distance_to(p))
            }
            Self::Spot { position, direction, intensity, attenuation } => {
                let l = (p - position).try_hat().unwrap_or(direction);
                let cos = align_zero(direction.dot(l));
                if cos <= 0.0 {
                    Color::black()
                } else {
                    intensity * attenuation.factor(position.distance_to(p)) * cos
                }
            }
        }
    }

    /// Unit direction of the light travelling toward `p`. `None` if `p` is at the light itself.
    pub fn direction_at(&self, p: Point3) -> Option<Vec3> {
        match *self {
            Self::Directional { direction, .. } => Some(direction),
            Self::Point { position, .. } | Self::Spot { position, .. } => (p - position).try_hat(),
        }
    }

    /// Distance from the light to `p`; infinite for directional lights.
    pub fn distance_to(&self, p: Point3) -> f32 {
        match *self {
            Self::Directional { .. } => f32::INFINITY,
            Self::Point { position, .. } | Self::Spot { position, .. } => position.distance_to(p),
        }
    }
}
