use std::panic::{self, AssertUnwindSafe};

use geometry::blackboard::Blackboard;
use geometry::camera::Camera;
use indicatif::{ProgressBar, ProgressStyle};
use radiometry::color::Color;
use rayon::prelude::*;

use crate::image::ImageWriter;
use crate::whitted::WhittedTracer;

/// Painted on pixels whose evaluation panicked.
pub const ERROR_COLOR: Color = Color::new(1.0, 0.0, 1.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// `None` uses rayon's global pool, `Some(0)` renders on the calling thread.
    pub threads: Option<usize>,
    /// Supersampling grid size per pixel side; 1 shoots a single ray through the pixel center.
    pub grid: u32,
    /// Randomly perturbs each supersample within its cell.
    pub jitter: bool,
    pub quiet: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            threads: None,
            grid: 1,
            jitter: false,
            quiet: false,
        }
    }
}

/// Color of pixel `(col, row)`, averaged over the sampling grid if there is one.
fn pixel_color(
    tracer: &WhittedTracer, camera: &Camera, board: Option<&Blackboard>, jitter: bool,
    (col, row): (u32, u32),
) -> Color {
    match board {
        None => tracer.trace_ray(&camera.construct_ray(col, row)),
        Some(board) => {
            let jittered;
            let board = if jitter {
                jittered = board.jittered(&mut rand::thread_rng());
                &jittered
            } else {
                board
            };
            let colors: Vec<Color> = board
                .offsets()
                .iter()
                .map(|&offset| tracer.trace_ray(&camera.construct_ray_offset(col, row, offset)))
                .collect();
            Color::average(&colors)
        }
    }
}

/// Evaluates one pixel, turning a panic into `ERROR_COLOR` so the rest of the image survives.
fn guarded_pixel_color<F>(shade: &F, pixel: (u32, u32)) -> Color
where
    F: Fn((u32, u32)) -> Color,
{
    match panic::catch_unwind(AssertUnwindSafe(|| shade(pixel))) {
        Ok(color) => {
            if color.has_nan() {
                log::warn!("NaN color at pixel {:?}", pixel);
            }
            color
        }
        Err(_) => {
            log::error!("panicked while rendering pixel {:?}", pixel);
            ERROR_COLOR
        }
    }
}

/// Renders the full camera image.
pub fn render(
    tracer: &WhittedTracer, camera: &Camera, options: &RenderOptions,
) -> Result<ImageWriter, rayon::ThreadPoolBuildError> {
    let board = match options.grid {
        0 | 1 => None,
        n => Some(Blackboard::new(camera.pixel_size(), n)),
    };
    let board = board.as_ref();
    let jitter = options.jitter;

    let start = std::time::Instant::now();
    let image = render_pixels(camera.resolution(), options, |pixel| {
        pixel_color(tracer, camera, board, jitter, pixel)
    })?;
    log::info!(
        "Rendered {}x{} pixels ({} samples each) in {:.2?}",
        image.width(),
        image.height(),
        board.map_or(1, |b| b.offsets().len()),
        start.elapsed()
    );
    Ok(image)
}

/// Fills an `nx` x `ny` image with `shade((col, row))`, one guarded call per pixel.
fn render_pixels<F>(
    (nx, ny): (u32, u32), options: &RenderOptions, shade: F,
) -> Result<ImageWriter, rayon::ThreadPoolBuildError>
where
    F: Fn((u32, u32)) -> Color + Sync,
{
    let mut image = ImageWriter::new(nx, ny);
    let pb = if options.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(image.pixels_mut().len() as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})"),
    );

    let nx = nx as usize;
    let fill = |(i, pixel): (usize, &mut Color)| {
        *pixel = guarded_pixel_color(&shade, ((i % nx) as u32, (i / nx) as u32));
        pb.inc(1);
    };

    match options.threads {
        Some(0) => image.pixels_mut().iter_mut().enumerate().for_each(fill),
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(n).build()?;
            pool.install(|| image.pixels_mut().par_iter_mut().enumerate().for_each(fill));
        }
        None => image.pixels_mut().par_iter_mut().enumerate().for_each(fill),
    }
    pb.finish();
    Ok(image)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::whitted::ShadingOptions;
    use light::AmbientLight;
    use math::hcm::{point3, Point3, Vec3};
    use scene::Scene;
    use shape::{Sphere, Surface};
    use tlas::{AccelStrategy, Aggregator};

    fn ambient_scene(strategy: AccelStrategy) -> Scene {
        let sphere = Surface::new(Sphere::new(point3(0.0, 0.0, -3.0), 1.0).unwrap())
            .with_emission(Color::new(0.0, 0.25, 0.0));
        Scene::new("ambient", Aggregator::build(strategy, vec![sphere]).unwrap())
            .with_background(Color::new(0.0, 0.0, 0.5))
            .with_ambient_light(AmbientLight(Color::gray(0.5)))
    }

    fn camera(n: u32) -> Camera {
        Camera::builder()
            .location(Point3::ORIGIN)
            .direction(-Vec3::Z, Vec3::Y)
            .vp_distance(1.0)
            .vp_size(3.0, 3.0)
            .resolution(n, n)
            .build()
            .unwrap()
    }

    #[test]
    fn hit_pixels_get_ambient_plus_emission() {
        let scene = ambient_scene(AccelStrategy::Bvh);
        let options = ShadingOptions {
            max_level: 1,
            ..Default::default()
        };
        let tracer = WhittedTracer::new(&scene, options);
        let render_options = RenderOptions {
            threads: Some(2),
            quiet: true,
            ..Default::default()
        };
        let image = render(&tracer, &camera(9), &render_options).unwrap();
        assert_eq!(image.pixel(4, 4), Color::new(0.5, 0.75, 0.5));
        assert_eq!(image.pixel(0, 0), Color::new(0.0, 0.0, 0.5));
        assert_eq!(image.pixel(8, 8), Color::new(0.0, 0.0, 0.5));
    }

    #[test]
    fn panicking_pixel_is_isolated() {
        let options = RenderOptions {
            threads: Some(2),
            quiet: true,
            ..Default::default()
        };
        let image = render_pixels((4, 3), &options, |(col, row)| {
            if (col, row) == (2, 1) {
                panic!("bad pixel");
            }
            Color::gray(0.5)
        })
        .unwrap();
        assert_eq!(image.pixel(2, 1), ERROR_COLOR);
        for &(col, row) in [(1, 1), (3, 1), (2, 0), (2, 2), (0, 0)].iter() {
            assert_eq!(image.pixel(col, row), Color::gray(0.5));
        }
    }

    #[test]
    fn thread_settings_give_identical_images() {
        let scene = ambient_scene(AccelStrategy::Coarse);
        let tracer = WhittedTracer::new(&scene, ShadingOptions::default());
        let render_with = |threads| {
            let options = RenderOptions {
                threads,
                grid: 3,
                quiet: true,
                ..Default::default()
            };
            render(&tracer, &camera(12), &options).unwrap().to_rgb8()
        };
        let single = render_with(Some(0));
        assert_eq!(single, render_with(Some(3)));
        assert_eq!(single, render_with(None));
    }
}
