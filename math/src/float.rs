/// Threshold under which a computed quantity is treated as exactly zero.
///
/// Every geometric predicate in the renderer (parallel rays, tangent spheres, embedded origins,
/// shadow-ray filtering) goes through this constant, so changing it changes which boundary cases
/// count as hits.
pub const EPSILON: f32 = 1e-5;

/// Returns true if `x` is within `EPSILON` of zero.
/// ```
/// assert!(math::float::is_zero(4e-6));
/// assert!(!math::float::is_zero(-2e-5));
/// ```
pub fn is_zero(x: f32) -> bool {
    x.abs() < EPSILON
}

/// Snaps `x` to exactly 0.0 if it is within `EPSILON` of zero; otherwise returns `x` unchanged.
/// Callers can then compare the result against zero with plain `>` / `<`.
/// ```
/// use math::float::align_zero;
/// assert_eq!(align_zero(-3e-6), 0.0);
/// assert_eq!(align_zero(0.25), 0.25);
/// ```
pub fn align_zero(x: f32) -> f32 {
    if is_zero(x) {
        0.0
    } else {
        x
    }
}

pub fn min_max(a: f32, b: f32) -> (f32, f32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

pub trait Inside
where
    Self: std::cmp::PartialOrd + Sized + Copy,
{
    fn inside(self, interval: (Self, Self)) -> bool {
        let (left, right) = interval;
        left <= self && self <= right
    }
}

impl Inside for f32 {}

#[macro_export]
macro_rules! assert_le {
    ($left:expr, $right:expr) => {
        if $left > $right {
            panic!(
                "Assertion failed: {} <= {} (values: {} vs. {})",
                stringify!($left),
                stringify!($right),
                $left,
                $right
            )
        }
    };
}

#[macro_export]
macro_rules! assert_lt {
    ($left:expr, $right:expr) => {
        if $left >= $right {
            panic!(
                "Assertion failed: {} < {} (values: {} vs. {})",
                stringify!($left),
                stringify! {$right},
                $left,
                $right
            )
        }
    };
}

#[macro_export]
macro_rules! assert_gt {
    ($left:expr, $right:expr) => {
        if $left <= $right {
            panic!(
                "Assertion failed: {} > {} (values: {} vs. {})",
                stringify!($left),
                stringify! {$right},
                $left,
                $right
            )
        }
    };
}
