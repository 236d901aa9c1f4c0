use radiometry::color::Color;

/// Phong-style surface coefficients, each an RGB triple in [0, 1]:
/// - `k_a`: ambient reflectance, scales the scene's ambient light,
/// - `k_d`, `k_s`: diffuse and specular reflectance of direct light,
/// - `k_t`: transparency; light passes straight through and shadows are softened by it,
/// - `k_r`: mirror reflectance,
///
/// plus the specular exponent `shininess`.
///
/// A fresh material fully reflects ambient light and is otherwise black and opaque.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub k_a: Color,
    pub k_d: Color,
    pub k_s: Color,
    pub k_t: Color,
    pub k_r: Color,
    pub shininess: i32,
}

impl Default for Material {
    fn default() -> Self {
        Material {
            k_a: Color::ONE,
            k_d: Color::ZERO,
            k_s: Color::ZERO,
            k_t: Color::ZERO,
            k_r: Color::ZERO,
            shininess: 0,
        }
    }
}

#[rustfmt::skip]
impl Material {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_ka<C: Into<Color>>(self, k_a: C) -> Self { Self { k_a: k_a.into(), ..self } }
    pub fn with_kd<C: Into<Color>>(self, k_d: C) -> Self { Self { k_d: k_d.into(), ..self } }
    pub fn with_ks<C: Into<Color>>(self, k_s: C) -> Self { Self { k_s: k_s.into(), ..self } }
    pub fn with_kt<C: Into<Color>>(self, k_t: C) -> Self { Self { k_t: k_t.into(), ..self } }
    pub fn with_kr<C: Into<Color>>(self, k_r: C) -> Self { Self { k_r: k_r.into(), ..self } }
    pub fn with_shininess(self, shininess: i32) -> Self { Self { shininess, ..self } }

    pub fn is_opaque(&self) -> bool {
        self.k_t.is_black()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_reflect_ambient_only() {
        let m = Material::default();
        assert_eq!(m.k_a, Color::ONE);
        assert!(m.k_d.is_black() && m.k_s.is_black() && m.k_r.is_black());
        assert!(m.is_opaque());
        assert_eq!(m.shininess, 0);
    }

    #[test]
    fn builder_accepts_scalars_and_triples() {
        let m = Material::new()
            .with_kd(0.5)
            .with_ks(Color::new(0.1, 0.2, 0.3))
            .with_kt(0.4)
            .with_shininess(30);
        assert_eq!(m.k_d, Color::gray(0.5));
        assert_eq!(m.k_s, Color::new(0.1, 0.2, 0.3));
        assert!(!m.is_opaque());
        assert_eq!(m.shininess, 30);
        assert_eq!(m.k_a, Color::ONE);
    }
}
