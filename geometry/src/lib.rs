/// Defines the `BBox` axis-aligned bounding-box type and its slab test against a `Ray`.
pub mod bbox;
/// Regular (optionally jittered) sub-pixel sampling grid.
pub mod blackboard;
pub mod camera;
pub mod ray;

pub use bbox::BBox;
pub use ray::Ray;
