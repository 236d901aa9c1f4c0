use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use radiometry::color::Color;

/// Number of pixels in an `nx` x `ny` image, counted in `usize` so large sizes do not wrap.
fn pixel_count(nx: u32, ny: u32) -> usize {
    nx as usize * ny as usize
}

/// Row-major buffer of unclamped pixel colors, written out as an 8-bit RGB png.
pub struct ImageWriter {
    nx: u32,
    ny: u32,
    pixels: Vec<Color>,
}

impl ImageWriter {
    /// A black image of `nx` columns and `ny` rows.
    pub fn new(nx: u32, ny: u32) -> Self {
        Self {
            nx,
            ny,
            pixels: vec![Color::black(); pixel_count(nx, ny)],
        }
    }

    pub fn width(&self) -> u32 {
        self.nx
    }
    pub fn height(&self) -> u32 {
        self.ny
    }

    fn index(&self, col: u32, row: u32) -> usize {
        assert!(col < self.nx && row < self.ny, "pixel ({}, {}) out of range", col, row);
        row as usize * self.nx as usize + col as usize
    }

    pub fn write_pixel(&mut self, col: u32, row: u32, color: Color) {
        let i = self.index(col, row);
        self.pixels[i] = color;
    }

    pub fn pixel(&self, col: u32, row: u32) -> Color {
        self.pixels[self.index(col, row)]
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    /// Paints every pixel whose column or row is a multiple of `interval`.
    pub fn draw_grid(&mut self, interval: u32, color: Color) {
        assert!(interval > 0);
        for row in 0..self.ny {
            for col in 0..self.nx {
                if col % interval == 0 || row % interval == 0 {
                    self.write_pixel(col, row, color);
                }
            }
        }
    }

    /// Quantized pixel data, 3 bytes per pixel.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| c.to_u8()).collect()
    }

    pub fn write_png<P: AsRef<Path>>(&self, path: P) -> Result<(), png::EncodingError> {
        let file = File::create(path)?;
        let w = BufWriter::new(file);

        let mut encoder = png::Encoder::new(w, self.nx, self.ny);
        encoder.set_color(png::ColorType::RGB);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.to_rgb8())?;
        Ok(())
    }
}
