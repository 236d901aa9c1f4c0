use std::{
    fmt,
    ops::{Add, AddAssign, Div, Index, IndexMut, Mul, Neg, Sub},
};

use thiserror::Error;

pub fn vec3(x: f32, y: f32, z: f32) -> Vec3 {
    Vec3::new(x, y, z)
}

pub fn point3(x: f32, y: f32, z: f32) -> Point3 {
    Point3::new(x, y, z)
}

/// Raised by the checked vector constructors. A zero-length vector carries no direction, so every
/// API that turns user input into a direction refuses it.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VectorError {
    #[error("zero vector has no direction")]
    Zero,
    #[error("cross product of parallel vectors is the zero vector")]
    Parallel,
}

/// Represents a 3D vector. Each component is a `f32` number.
/// Components can be accessed using `v.x` `v.y` `v.z`,
/// or indices `v[i]` where i is 0, 1, or 2.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(2);
        write!(
            f,
            "({:.p$}, {:.p$}, {:.p$})",
            self.x,
            self.y,
            self.z,
            p = precision
        )
    }
}
impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(2);
        write!(
            f,
            "[{:.p$}, {:.p$}, {:.p$}]",
            self.x,
            self.y,
            self.z,
            p = precision
        )
    }
}

impl Vec3 {
    /// Unchecked constructor; used for constants and intermediate arithmetic where a zero result
    /// is meaningful. Use `try_new` for directions coming from outside.
    pub const fn new(x: f32, y: f32, z: f32) -> Vec3 {
        Vec3 { x, y, z }
    }
    pub fn try_new(x: f32, y: f32, z: f32) -> Result<Vec3, VectorError> {
        let v = Vec3::new(x, y, z);
        if v.is_zero() {
            Err(VectorError::Zero)
        } else {
            Ok(v)
        }
    }
    pub const X: Vec3 = Self::new(1.0, 0.0, 0.0);
    pub const Y: Vec3 = Self::new(0.0, 1.0, 0.0);
    pub const Z: Vec3 = Self::new(0.0, 0.0, 1.0);
    pub const ZERO: Vec3 = Self::new(0.0, 0.0, 0.0);

    pub fn dot(self, v: Vec3) -> f32 {
        self.x * v.x + self.y * v.y + self.z * v.z
    }
    pub fn cross(self, v: Vec3) -> Vec3 {
        // x1 y1 z1
        // x2 y2 z2
        // i  j  k
        Vec3::new(
            self.y * v.z - self.z * v.y,
            self.z * v.x - self.x * v.z,
            self.x * v.y - self.y * v.x,
        )
    }
    /// Cross product that fails instead of producing the zero vector.
    pub fn try_cross(self, v: Vec3) -> Result<Vec3, VectorError> {
        let c = self.cross(v);
        if c.is_zero() {
            Err(VectorError::Parallel)
        } else {
            Ok(c)
        }
    }

    pub fn norm_squared(self) -> f32 {
        self.dot(self)
    }
    pub fn norm(self) -> f32 {
        f32::sqrt(self.norm_squared())
    }
    pub fn is_zero(self) -> bool {
        self.norm_squared() == 0.0
    }

    /// Returns a normalized (unit-length) `self` vector.
    /// Panics if the vector length is zero, NaN or infinite.
    pub fn hat(self) -> Vec3 {
        let norm2 = self.norm_squared();
        assert!(norm2 != 0.0 && norm2.is_finite(), "cannot normalize {}", self);
        let inv_sqrt = 1.0 / self.norm();
        self * inv_sqrt
    }
    pub fn try_hat(self) -> Option<Self> {
        let inv_length = 1.0 / self.norm();
        (inv_length.is_finite() && inv_length != 0.0).then(|| inv_length * self)
    }

    /// Index of the component with the largest value (not magnitude). Ties go to the lower index.
    pub fn max_dimension(self) -> usize {
        let res = if self.x >= self.y { 0 } else { 1 };
        if self[2] > self[res] {
            2
        } else {
            res
        }
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, other: Self) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}
impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
impl Add<Point3> for Vec3 {
    type Output = Point3;
    fn add(self, other: Point3) -> Point3 {
        Point3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, other: Self) -> Vec3 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}
impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}
impl Index<usize> for Vec3 {
    type Output = f32;
    fn index(&self, i: usize) -> &f32 {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("invalid index"),
        }
    }
}
impl IndexMut<usize> for Vec3 {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        match index {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("invalid index"),
        }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, s: f32) -> Vec3 {
        Vec3::new(self.x * s, self.y * s, self.z * s)
    }
}
impl Mul<Vec3> for f32 {
    type Output = Vec3;
    fn mul(self, v: Vec3) -> Vec3 {
        v * self
    }
}
impl Div<f32> for Vec3 {
    type Output = Self;
    fn div(self, s: f32) -> Vec3 {
        Vec3::new(self.x / s, self.y / s, self.z / s)
    }
}

// Implementation of Points
impl Point3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Point3 {
        Point3 { x, y, z }
    }
    pub const ORIGIN: Point3 = Point3::new(0.0, 0.0, 0.0);

    /// Displacement from `from` to `self`, refusing coincident points.
    pub fn try_sub(self, from: Point3) -> Result<Vec3, VectorError> {
        let v = self - from;
        if v.is_zero() {
            Err(VectorError::Zero)
        } else {
            Ok(v)
        }
    }

    pub fn distance_to(self, p: Self) -> f32 {
        (self - p).norm()
    }
    pub fn squared_distance_to(self, p: Self) -> f32 {
        (self - p).norm_squared()
    }
}

impl Add<Vec3> for Point3 {
    type Output = Point3;
    fn add(self, v: Vec3) -> Point3 {
        Point3::new(self.x + v.x, self.y + v.y, self.z + v.z)
    }
}

impl Sub for Point3 {
    type Output = Vec3;
    fn sub(self, from: Point3) -> Vec3 {
        Vec3::new(self.x - from.x, self.y - from.y, self.z - from.z)
    }
}
impl Sub<Vec3> for Point3 {
    type Output = Point3;
    fn sub(self, t: Vec3) -> Point3 {
        Point3::new(self.x - t.x, self.y - t.y, self.z - t.z)
    }
}
impl Index<usize> for Point3 {
    type Output = f32;
    fn index(&self, i: usize) -> &f32 {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("invalid index"),
        }
    }
}
impl IndexMut<usize> for Point3 {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        match index {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("invalid index"),
        }
    }
}

// Explicit conversion between Vec3 and Point3.
// -------------------------------------------------------------------------------------------------
impl From<Vec3> for Point3 {
    fn from(v: Vec3) -> Self {
        Point3::new(v.x, v.y, v.z)
    }
}

impl From<Point3> for Vec3 {
    fn from(p: Point3) -> Self {
        Vec3::new(p.x, p.y, p.z)
    }
}

// Mod-level functions
pub fn normalize(x: f32, y: f32, z: f32) -> Vec3 {
    Vec3::new(x, y, z).hat()
}

/// Mirrors direction `v` about the (unit-length) `normal`: `v - 2 (n.v) n`.
///
/// Unlike a BSDF-style reflect, `v` points *toward* the surface and the result points away from
/// it, so a ray travelling straight down onto a floor bounces straight up.
pub fn reflect(normal: Vec3, v: Vec3) -> Vec3 {
    v - normal * (2.0 * normal.dot(v))
}

#[macro_export]
macro_rules! assert_close {
    ($left:expr, $right:expr) => {
        if ($left - $right).norm_squared() > 1e-6 {
            panic!(
                "Assertion failed: Close({}, {}) values: {} vs. {}, dist = {}",
                stringify!($left),
                stringify!($right),
                $left,
                $right,
                ($left - $right).norm()
            )
        }
    };
}
