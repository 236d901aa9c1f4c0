/// Defines tolerance helpers and small numeric tools shared by the other crates:
/// - `EPSILON`, `is_zero()` and `align_zero()` to snap near-zero values to exactly zero,
/// - `min_max()` and the `Inside` trait for interval checks,
/// - Macros to check if two math quantities are less than / greater than (or equal to) each other.
pub mod float;

/// Homogeneous-coordinate maths module.
/// - Types: 3D points and vectors.
/// - `VectorError` for the checked constructors that refuse a zero vector.
/// - Function `reflect()` to mirror a direction about a surface normal.
pub mod hcm;

pub use float::{align_zero, is_zero, EPSILON};
