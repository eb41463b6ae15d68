//! Camera for ray generation.

use crate::sampling::{gen_f32, random_in_unit_disk};
use ember_core::RenderSettings;
use ember_math::{Ray, Vec3};
use rand::RngCore;

/// Camera for generating rays into the scene.
///
/// Owns projection parameters (position, look-at target, up vector,
/// vertical field of view, aspect ratio, aperture and focus distance) and
/// render parameters (image size, samples per pixel, bounce depth). The
/// viewport basis is derived from these on every use, never cached, so the
/// camera can be repositioned freely without stale state.
#[derive(Debug, Clone)]
pub struct Camera {
    // Camera positioning
    pub look_from: Vec3,
    pub look_at: Vec3,
    pub vup: Vec3,

    // Lens settings
    pub vfov: f32, // Vertical field of view in degrees
    pub aspect_ratio: f32,
    pub aperture: f32,
    pub focus_dist: f32,

    // Image settings
    pub image_width: u32,
    pub image_height: u32,
    pub samples_per_pixel: u32,
    pub max_depth: u32,
}

/// Viewport basis derived from the camera parameters.
struct Viewport {
    origin: Vec3,
    lower_left: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    lens_radius: f32,
}

impl Camera {
    /// Create a camera from render settings, looking down -Z from the origin.
    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self {
            look_from: Vec3::ZERO,
            look_at: -Vec3::Z,
            vup: Vec3::Y,
            vfov: settings.vertical_fov,
            aspect_ratio: settings.aspect_ratio,
            aperture: settings.aperture,
            focus_dist: settings.focus_distance,
            image_width: settings.image_width,
            image_height: settings.image_height(),
            samples_per_pixel: settings.samples_per_pixel,
            max_depth: settings.max_depth,
        }
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Derive the orthonormal basis and focus-plane viewport rectangle.
    fn viewport(&self) -> Viewport {
        let theta = self.vfov.to_radians();
        let half_height = (theta / 2.0).tan();
        let viewport_height = 2.0 * half_height;
        let viewport_width = viewport_height * self.aspect_ratio;

        // Forward axis points from the target back toward the camera
        let w = (self.look_from - self.look_at).normalize();
        let u = self.vup.cross(w).normalize();
        let v = w.cross(u);

        let horizontal = self.focus_dist * viewport_width * u;
        let vertical = self.focus_dist * viewport_height * v;
        let lower_left =
            self.look_from - horizontal / 2.0 - vertical / 2.0 - self.focus_dist * w;

        Viewport {
            origin: self.look_from,
            lower_left,
            horizontal,
            vertical,
            u,
            v,
            lens_radius: self.aperture / 2.0,
        }
    }

    /// Generate a ray through normalized viewport coordinates (s, t) in
    /// [0,1]^2, measured from the lower-left corner.
    ///
    /// The origin is offset by a random point on the lens disk for depth
    /// of field; the ray aims at the matching point on the focus plane.
    pub fn sample_ray(&self, s: f32, t: f32, rng: &mut dyn RngCore) -> Ray {
        let vp = self.viewport();

        let offset = if vp.lens_radius > 0.0 {
            let rd = vp.lens_radius * random_in_unit_disk(rng);
            vp.u * rd.x + vp.v * rd.y
        } else {
            Vec3::ZERO
        };

        Ray::new(
            vp.origin + offset,
            vp.lower_left + s * vp.horizontal + t * vp.vertical - vp.origin - offset,
        )
    }

    /// Jittered viewport coordinates for pixel (x, y); y runs top-down in
    /// the raster while t runs bottom-up in the viewport.
    pub fn pixel_uv(&self, x: u32, y: u32, rng: &mut dyn RngCore) -> (f32, f32) {
        let s = (x as f32 + gen_f32(rng)) / self.image_width as f32;
        let t = ((self.image_height - 1 - y) as f32 + gen_f32(rng)) / self.image_height as f32;
        (s, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn test_camera() -> Camera {
        Camera::from_settings(&RenderSettings {
            image_width: 100,
            aspect_ratio: 1.0,
            vertical_fov: 90.0,
            aperture: 0.0,
            focus_distance: 1.0,
            ..Default::default()
        })
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let camera = test_camera();
        let mut rng = StdRng::seed_from_u64(42);

        // The middle of the viewport looks straight down -Z
        let ray = camera.sample_ray(0.5, 0.5, &mut rng);
        assert!(ray.direction().z < 0.0);
        assert!(ray.direction().x.abs() < 1e-5);
        assert!(ray.direction().y.abs() < 1e-5);
        assert_eq!(ray.origin(), Vec3::ZERO);
    }

    #[test]
    fn test_corner_rays_span_field_of_view() {
        let camera = test_camera();
        let mut rng = StdRng::seed_from_u64(42);

        // vfov 90, square aspect: the viewport corners sit at 45 degrees
        let bottom_left = camera.sample_ray(0.0, 0.0, &mut rng);
        assert!(bottom_left.direction().x < 0.0);
        assert!(bottom_left.direction().y < 0.0);

        let top_right = camera.sample_ray(1.0, 1.0, &mut rng);
        assert!(top_right.direction().x > 0.0);
        assert!(top_right.direction().y > 0.0);
    }

    #[test]
    fn test_repositioned_camera_derives_fresh_basis() {
        let camera = test_camera().with_position(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::ZERO,
            Vec3::Y,
        );
        let mut rng = StdRng::seed_from_u64(42);

        let ray = camera.sample_ray(0.5, 0.5, &mut rng);
        assert_eq!(ray.origin(), Vec3::new(0.0, 0.0, 5.0));
        assert!(ray.direction().z < 0.0);
    }

    #[test]
    fn test_zero_aperture_fixes_origin() {
        let camera = test_camera();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..20 {
            let ray = camera.sample_ray(0.3, 0.7, &mut rng);
            assert_eq!(ray.origin(), camera.look_from);
        }
    }

    #[test]
    fn test_aperture_spreads_origins() {
        let mut camera = test_camera();
        camera.aperture = 2.0;
        camera.focus_dist = 5.0;
        let mut rng = StdRng::seed_from_u64(42);

        let origins: Vec<Vec3> = (0..20)
            .map(|_| camera.sample_ray(0.5, 0.5, &mut rng).origin())
            .collect();

        // Lens sampling moves the origin within the aperture disk
        assert!(origins.iter().any(|o| *o != camera.look_from));
        for origin in &origins {
            assert!((*origin - camera.look_from).length() <= 1.0 + 1e-5);
        }
    }

    #[test]
    fn test_pixel_uv_within_unit_square() {
        let camera = test_camera();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..50 {
            let (s, t) = camera.pixel_uv(99, 0, &mut rng);
            assert!((0.0..=1.0).contains(&s));
            assert!((0.0..=1.0).contains(&t));
        }

        // Top raster row maps to the top of the viewport
        let (_, t) = camera.pixel_uv(0, 0, &mut rng);
        assert!(t > 0.98);
    }
}
