use rand::Rng;

/// A square grid of sample offsets covering one pixel of the view plane.
///
/// Offsets are measured from the pixel center, in view-plane units, along the camera's right
/// (`x`) and up (`y`) axes. A grid of size 1 contains only the pixel center itself.
#[derive(Debug, Clone)]
pub struct Blackboard {
    pixel_width: f32,
    pixel_height: f32,
    size: u32,
    offsets: Vec<(f32, f32)>,
}

impl Blackboard {
    /// Builds a `size` x `size` grid over a pixel of the given dimensions. Each sample sits at
    /// the center of its cell. Panics if `size` is 0.
    pub fn new((pixel_width, pixel_height): (f32, f32), size: u32) -> Self {
        assert!(size > 0, "sampling grid needs at least one cell");
        let (step_x, step_y) = (pixel_width / size as f32, pixel_height / size as f32);
        let offsets = (0..size)
            .flat_map(|row| (0..size).map(move |col| (row, col)))
            .map(|(row, col)| {
                (
                    -pixel_width * 0.5 + (col as f32 + 0.5) * step_x,
                    -pixel_height * 0.5 + (row as f32 + 0.5) * step_y,
                )
            })
            .collect();
        Blackboard {
            pixel_width,
            pixel_height,
            size,
            offsets,
        }
    }

    /// Randomly moves each sample within its own cell. The sample count and the covered area
    /// stay the same.
    pub fn jittered<R: Rng>(&self, rng: &mut R) -> Self {
        let (step_x, step_y) = self.cell_size();
        let offsets = self
            .offsets
            .iter()
            .map(|&(x, y)| {
                (
                    x + rng.gen_range(-0.5..0.5) * step_x,
                    y + rng.gen_range(-0.5..0.5) * step_y,
                )
            })
            .collect();
        Blackboard {
            offsets,
            ..self.clone()
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn cell_size(&self) -> (f32, f32) {
        (
            self.pixel_width / self.size as f32,
            self.pixel_height / self.size as f32,
        )
    }

    pub fn offsets(&self) -> &[(f32, f32)] {
        &self.offsets
    }
}
