//! Path-trace integrator.
//!
//! Follows one camera ray through the scene, multiplying per-bounce
//! attenuation until the ray escapes to the environment, is absorbed, or
//! runs out of bounces.

use crate::{Camera, HitRecord, Hittable};
use ember_core::Color;
use ember_math::{Interval, Ray, Vec3};
use rand::RngCore;

/// Minimum hit distance; below this a bounce would re-hit its own surface.
const T_MIN: f32 = 1e-3;

/// Source of light for rays that leave the scene.
///
/// Implementations must be pure: the color depends only on the direction.
pub trait Environment: Send + Sync {
    fn color(&self, direction: Vec3) -> Color;
}

/// Vertical gradient from a horizon color up to a zenith color.
pub struct SkyGradient {
    horizon: Color,
    zenith: Color,
}

impl SkyGradient {
    pub fn new(horizon: Color, zenith: Color) -> Self {
        Self { horizon, zenith }
    }
}

impl Default for SkyGradient {
    /// White at the horizon blending to light blue overhead.
    fn default() -> Self {
        Self {
            horizon: Color::new(1.0, 1.0, 1.0),
            zenith: Color::new(0.5, 0.7, 1.0),
        }
    }
}

impl Environment for SkyGradient {
    fn color(&self, direction: Vec3) -> Color {
        let unit = direction.normalize();
        let a = 0.5 * (unit.y + 1.0);
        self.horizon * (1.0 - a) + self.zenith * a
    }
}

/// Compute the color seen by a ray.
///
/// Iterative, depth-bounded loop: each bounce either escapes to the
/// environment (the only non-black terminal case), is absorbed, or
/// scatters with its attenuation folded into the running product. Rays
/// still bouncing after `max_depth` contribute black.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    environment: &dyn Environment,
    max_depth: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let mut attenuation = Color::ONE;
    let mut current = *ray;

    for _ in 0..max_depth {
        let mut rec = HitRecord::default();

        if !world.hit(&current, Interval::new(T_MIN, f32::INFINITY), &mut rec) {
            return attenuation * environment.color(current.direction());
        }

        match rec.material.scatter(&current, &rec, rng) {
            Some(scatter) => {
                attenuation *= scatter.attenuation;
                current = scatter.scattered;
            }
            None => return Color::ZERO,
        }
    }

    Color::ZERO
}

/// Estimate one pixel's color by averaging jittered samples.
pub fn sample_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    environment: &dyn Environment,
    x: u32,
    y: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let mut accumulated = Color::ZERO;

    for _ in 0..camera.samples_per_pixel {
        let (s, t) = camera.pixel_uv(x, y, rng);
        let ray = camera.sample_ray(s, t, rng);
        accumulated += ray_color(&ray, world, environment, camera.max_depth, rng);
    }

    accumulated / camera.samples_per_pixel as f32
}
