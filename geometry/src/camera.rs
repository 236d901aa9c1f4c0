use crate::ray::Ray;
use math::{
    float::is_zero,
    hcm::{Point3, Vec3, VectorError},
};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CameraError {
    #[error("missing camera parameter: {0}")]
    Missing(&'static str),
    #[error("camera forward and up vectors are not orthogonal")]
    NotOrthogonal,
    #[error("camera {what} must be positive, got {value}")]
    NonPositive { what: &'static str, value: f32 },
    #[error("camera location coincides with its target")]
    TargetAtLocation,
    #[error("invalid camera orientation: {0}")]
    Orientation(#[from] VectorError),
}

/// Pinhole camera looking through a rectangular view plane.
///
/// The view plane sits `vp_distance` in front of `location` along `v_to`, spans `vp_width` along
/// `v_right` and `vp_height` along `v_up`, and is divided into `nx` x `ny` pixels. Pixel
/// `(col, row)` = `(0, 0)` is the top-left one.
#[derive(Debug, Clone)]
pub struct Camera {
    location: Point3,
    v_to: Vec3,
    v_up: Vec3,
    v_right: Vec3,

    vp_width: f32,
    vp_height: f32,
    vp_distance: f32,

    // Film image resolution.
    nx: u32,
    ny: u32,
}

impl Camera {
    pub fn builder() -> CameraBuilder {
        CameraBuilder::default()
    }

    /// Point on the view plane at the center of pixel `(col, row)`.
    pub fn pixel_center(&self, col: u32, row: u32) -> Point3 {
        let (rx, ry) = self.pixel_size();
        let x = (col as f32 - (self.nx - 1) as f32 * 0.5) * rx;
        let y = -(row as f32 - (self.ny - 1) as f32 * 0.5) * ry;
        self.location + self.v_to * self.vp_distance + self.v_right * x + self.v_up * y
    }

    /// Ray from the camera location through the center of pixel `(col, row)`.
    pub fn construct_ray(&self, col: u32, row: u32) -> Ray {
        self.construct_ray_offset(col, row, (0.0, 0.0))
    }

    /// Ray through the point `(dx, dy)` away from the center of pixel `(col, row)`, measured in
    /// view-plane units along `v_right` and `v_up`.
    pub fn construct_ray_offset(&self, col: u32, row: u32, (dx, dy): (f32, f32)) -> Ray {
        let target = self.pixel_center(col, row) + self.v_right * dx + self.v_up * dy;
        Ray::new(self.location, target - self.location)
    }

    /// Size of one pixel on the view plane: (width, height).
    pub fn pixel_size(&self) -> (f32, f32) {
        (
            self.vp_width / self.nx as f32,
            self.vp_height / self.ny as f32,
        )
    }

    /// Returns resolution (width x height) of the camera film.
    pub fn resolution(&self) -> (u32, u32) {
        (self.nx, self.ny)
    }

    pub fn location(&self) -> Point3 {
        self.location
    }
}

/// Collects camera parameters and validates them in `build()`.
#[derive(Debug, Clone, Default)]
pub struct CameraBuilder {
    location: Option<Point3>,
    orientation: Option<Result<(Vec3, Vec3, Vec3), CameraError>>,
    vp_size: Option<(f32, f32)>,
    vp_distance: Option<f32>,
    resolution: Option<(u32, u32)>,
}

impl CameraBuilder {
    pub fn location(self, location: Point3) -> Self {
        Self {
            location: Some(location),
            ..self
        }
    }

    /// Orients the camera with explicit forward and up vectors, which must be orthogonal.
    pub fn direction(self, to: Vec3, up: Vec3) -> Self {
        let orientation = if !is_zero(to.dot(up)) {
            Err(CameraError::NotOrthogonal)
        } else {
            Self::frame_from(to, up)
        };
        Self {
            orientation: Some(orientation),
            ..self
        }
    }

    /// Points the camera at `target`; `up` only needs to be non-parallel to the view direction
    /// and is re-orthogonalized. Must be called after `location()`.
    pub fn look_at(self, target: Point3, up: Vec3) -> Self {
        let orientation = match self.location {
            None => Err(CameraError::Missing("location")),
            Some(location) => match target.try_sub(location) {
                Err(_) => Err(CameraError::TargetAtLocation),
                Ok(forward) => forward
                    .try_cross(up)
                    .map_err(CameraError::from)
                    .and_then(|right| Self::frame_from(forward, right.cross(forward))),
            },
        };
        Self {
            orientation: Some(orientation),
            ..self
        }
    }

    fn frame_from(to: Vec3, up: Vec3) -> Result<(Vec3, Vec3, Vec3), CameraError> {
        let to = to.try_hat().ok_or(VectorError::Zero)?;
        let up = up.try_hat().ok_or(VectorError::Zero)?;
        let right = to.try_cross(up)?.hat();
        Ok((to, up, right))
    }

    pub fn vp_size(self, width: f32, height: f32) -> Self {
        Self {
            vp_size: Some((width, height)),
            ..self
        }
    }

    pub fn vp_distance(self, distance: f32) -> Self {
        Self {
            vp_distance: Some(distance),
            ..self
        }
    }

    pub fn resolution(self, nx: u32, ny: u32) -> Self {
        Self {
            resolution: Some((nx, ny)),
            ..self
        }
    }

    pub fn build(&self) -> Result<Camera, CameraError> {
        let location = self.location.ok_or(CameraError::Missing("location"))?;
        let (v_to, v_up, v_right) = self
            .orientation
            .clone()
            .ok_or(CameraError::Missing("direction"))??;
        let (vp_width, vp_height) = self.vp_size.ok_or(CameraError::Missing("view plane size"))?;
        let vp_distance = self
            .vp_distance
            .ok_or(CameraError::Missing("view plane distance"))?;
        let (nx, ny) = self.resolution.unwrap_or((1, 1));

        let positive = [
            ("view plane width", vp_width),
            ("view plane height", vp_height),
            ("view plane distance", vp_distance),
            ("horizontal resolution", nx as f32),
            ("vertical resolution", ny as f32),
        ];
        if let Some(&(what, value)) = positive.iter().find(|(_, v)| !(*v > 0.0)) {
            return Err(CameraError::NonPositive { what, value });
        }

        Ok(Camera {
            location,
            v_to,
            v_up,
            v_right,
            vp_width,
            vp_height,
            vp_distance,
            nx,
            ny,
        })
    }
}
