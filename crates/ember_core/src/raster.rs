//! Render raster: the row-major color grid produced by a render invocation.

use ember_math::Vec3;
use image::RgbImage;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// A 2D grid of linear colors, row-major, with the maximum channel value
/// downstream encoders should use.
///
/// The raster is owned exclusively by the render invocation that fills it
/// until it is handed to an encoding collaborator; no gamma or other
/// post-processing is applied here.
pub struct Raster {
    width: u32,
    height: u32,
    max_value: u16,
    pixels: Vec<Color>,
}

impl Raster {
    /// Create a raster filled with black.
    pub fn new(width: u32, height: u32, max_value: u16) -> Self {
        Self {
            width,
            height,
            max_value,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Maximum channel value declared for later encoding.
    pub fn max_value(&self) -> u16 {
        self.max_value
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// All pixels in row-major order.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Mutable access to the pixel grid, row-major. Each cell is disjoint,
    /// so parallel writers may split this slice freely.
    pub fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    /// Convert to an 8-bit RGB image for the encoding collaborator.
    ///
    /// Channels are clamped to [0, 1] and scaled by the declared maximum
    /// value (itself clamped to the 8-bit range).
    pub fn to_rgb_image(&self) -> RgbImage {
        let scale = self.max_value.min(255) as f32;
        let mut image = RgbImage::new(self.width, self.height);

        for (i, pixel) in self.pixels.iter().enumerate() {
            let x = i as u32 % self.width;
            let y = i as u32 / self.width;
            image.put_pixel(
                x,
                y,
                image::Rgb([
                    (pixel.x.clamp(0.0, 1.0) * scale) as u8,
                    (pixel.y.clamp(0.0, 1.0) * scale) as u8,
                    (pixel.z.clamp(0.0, 1.0) * scale) as u8,
                ]),
            );
        }

        image
    }
}
