use std::{
    iter::Sum,
    ops::{Add, AddAssign, Div, Mul, Sub},
};

/// Unclamped RGB triple. Radiance values may exceed 1.0 freely; clamping happens only when a
/// pixel is quantized by `to_u8`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// Clamps an f32 value to [0, 1], mutiplies it by 255 and casts it to u8.
/// Returns 0 if `f` is NaN.
fn saturate_cast_u8(f: f32) -> u8 {
    if f > 1.0 {
        255
    } else if f >= 0.0 {
        (f * 255.0).round() as u8
    } else {
        0
    }
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Color {
        Color { r, g, b }
    }
    pub fn black() -> Color {
        Color::new(0.0, 0.0, 0.0)
    }
    pub fn white() -> Color {
        Color::new(1.0, 1.0, 1.0)
    }
    pub const ONE: Color = Self::new(1.0, 1.0, 1.0);
    pub const ZERO: Color = Self::new(0.0, 0.0, 0.0);

    pub fn gray(level: f32) -> Color {
        Color::new(level, level, level)
    }
    pub fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }
    pub fn is_black(&self) -> bool {
        self.r <= 0.0 && self.g <= 0.0 && self.b <= 0.0
    }

    /// True if every channel is strictly below `k`. Used to truncate recursion once an
    /// attenuation coefficient has become negligible on all channels.
    pub fn lower_than(&self, k: f32) -> bool {
        self.r < k && self.g < k && self.b < k
    }

    pub fn to_u8(&self) -> [u8; 3] {
        [
            saturate_cast_u8(self.r),
            saturate_cast_u8(self.g),
            saturate_cast_u8(self.b),
        ]
    }
    pub fn has_nan(&self) -> bool {
        self.r.is_nan() || self.g.is_nan() || self.b.is_nan()
    }

    pub fn average(colors: &[Self]) -> Self {
        match colors.len() {
            0 => Self::black(),
            num => colors.iter().copied().sum::<Self>() * (1.0 / num as f32),
        }
    }
}

impl From<f32> for Color {
    fn from(level: f32) -> Self {
        Color::gray(level)
    }
}

impl Add for Color {
    type Output = Color;
    fn add(self, rhs: Self) -> Self {
        Color::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, rhs: Self) {
        self.r += rhs.r;
        self.g += rhs.g;
        self.b += rhs.b;
    }
}

impl Sub for Color {
    type Output = Color;
    fn sub(self, rhs: Self) -> Self::Output {
        Color::new(self.r - rhs.r, self.g - rhs.g, self.b - rhs.b)
    }
}

impl Mul<f32> for Color {
    type Output = Color;
    fn mul(self, s: f32) -> Self {
        Color::new(self.r * s, self.g * s, self.b * s)
    }
}

impl Mul<Color> for f32 {
    type Output = Color;
    fn mul(self, c: Color) -> Color {
        c * self
    }
}

/// Component-wise (per RGB channel) product.
impl Mul for Color {
    type Output = Color;
    fn mul(self, rhs: Color) -> Self::Output {
        Color::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}

impl Div<f32> for Color {
    type Output = Color;
    fn div(self, s: f32) -> Self::Output {
        Color::new(self.r / s, self.g / s, self.b / s)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let precision = f.precision().unwrap_or(2);
        write!(
            f,
            "rgb({:.precision$}, {:.precision$}, {:.precision$})",
            self.r,
            self.g,
            self.b,
            precision = precision
        )
    }
}

impl std::fmt::LowerHex for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [r, g, b] = self.to_u8();
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
    }
}

impl Sum for Color {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Color::black(), |c0, c1| c0 + c1)
    }
}

#[cfg(test)]
mod test {
    use super::Color;

    #[test]
    fn quantization_clamps_out_of_range() {
        assert_eq!(Color::new(10.0, -3.0, 0.5).to_u8(), [255, 0, 128]);
        assert_eq!(Color::new(f32::NAN, 1.0, 0.0).to_u8(), [0, 255, 0]);
        assert_eq!(format!("{:x}", Color::rgb(255, 0, 16)), "#ff0010");
    }

    #[test]
    fn lower_than_requires_every_channel() {
        assert!(Color::gray(0.0005).lower_than(0.001));
        assert!(!Color::new(0.0005, 0.5, 0.0).lower_than(0.001));
        assert!(!Color::gray(0.001).lower_than(0.001));
    }

    #[test]
    fn products_and_averages() {
        let k = Color::new(0.5, 0.25, 1.0) * Color::new(2.0, 4.0, 0.0);
        assert_eq!(k, Color::new(1.0, 1.0, 0.0));
        let avg = Color::average(&[Color::gray(1.0), Color::gray(3.0)]);
        assert_eq!(avg, Color::gray(2.0));
        assert_eq!(Color::average(&[]), Color::black());
        assert_eq!(Color::from(0.3), Color::gray(0.3));
    }
}
