//! Render settings threaded explicitly through the renderer.
//!
//! Acceleration toggles and camera/render parameters are a plain value
//! passed into mesh construction and the render entry point; there is no
//! process-wide mutable configuration.

use serde::{Deserialize, Serialize};

/// Configuration consumed by the render core, supplied externally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Output image width in pixels; height derives from the aspect ratio.
    pub image_width: u32,
    /// Width / height.
    pub aspect_ratio: f32,
    /// Vertical field of view in degrees.
    pub vertical_fov: f32,
    /// Lens aperture diameter; 0 disables depth of field.
    pub aperture: f32,
    /// Distance from camera to the plane of perfect focus.
    pub focus_distance: f32,
    /// Independent sample rays drawn per pixel.
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth before forced termination.
    pub max_depth: u32,
    /// Test mesh bounding boxes before per-triangle work.
    pub use_bounding_volumes: bool,
    /// Build and traverse octrees inside triangle meshes.
    pub use_mesh_octree: bool,
    /// Run the per-pixel loop sequentially instead of on the worker pool.
    pub single_threaded: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            image_width: 800,
            aspect_ratio: 16.0 / 9.0,
            vertical_fov: 90.0,
            aperture: 0.0,
            focus_distance: 1.0,
            samples_per_pixel: 10,
            max_depth: 50,
            use_bounding_volumes: true,
            use_mesh_octree: true,
            single_threaded: false,
        }
    }
}

impl RenderSettings {
    /// Image height derived from width and aspect ratio, at least 1.
    pub fn image_height(&self) -> u32 {
        ((self.image_width as f32 / self.aspect_ratio) as u32).max(1)
    }

    /// Total pixel count of the output raster.
    pub fn pixel_count(&self) -> usize {
        self.image_width as usize * self.image_height() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_height_from_aspect() {
        let settings = RenderSettings {
            image_width: 800,
            aspect_ratio: 16.0 / 9.0,
            ..Default::default()
        };
        assert_eq!(settings.image_height(), 450);
        assert_eq!(settings.pixel_count(), 800 * 450);
    }

    #[test]
    fn test_image_height_never_zero() {
        let settings = RenderSettings {
            image_width: 1,
            aspect_ratio: 100.0,
            ..Default::default()
        };
        assert_eq!(settings.image_height(), 1);
    }

    #[test]
    fn test_default_toggles() {
        let settings = RenderSettings::default();
        assert!(settings.use_bounding_volumes);
        assert!(settings.use_mesh_octree);
        assert!(!settings.single_threaded);
    }
}
