/// RGB triples used both as light/surface colors and as per-channel attenuation coefficients.
pub mod color;

pub use color::Color;
