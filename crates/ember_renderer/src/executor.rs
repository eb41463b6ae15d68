//! Concurrent work scheduling for per-pixel rendering.
//!
//! Every pixel's sample-and-integrate computation is one independent task:
//! tasks share the read-only scene and each writes a disjoint raster cell,
//! so the output needs no synchronization. A shared atomic counter,
//! decremented as tasks finish, is the only cross-task coordination and
//! feeds an advisory progress fraction. Once started a render runs to
//! completion; progress is observable, not controllable.

use crate::{integrator::sample_pixel, Camera, Environment, Hittable};
use ember_core::{Raster, RenderSettings};
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Maximum channel value declared on the output raster.
const RASTER_MAX_VALUE: u16 = 255;

/// Task counters for one render invocation.
///
/// Tracks total enqueued and remaining pixel tasks. `fraction` is
/// monotonically non-decreasing over a render and read without
/// synchronization; it is advisory only.
#[derive(Debug, Default)]
pub struct RenderProgress {
    total: AtomicUsize,
    remaining: AtomicUsize,
}

impl RenderProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total tasks enqueued by the current render.
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    /// Tasks not yet finished.
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Relaxed)
    }

    /// Completed fraction in [0, 1]; 0 before any tasks are enqueued.
    pub fn fraction(&self) -> f32 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (total - self.remaining()) as f32 / total as f32
    }

    fn enqueue(&self, count: usize) {
        self.total.store(count, Ordering::Relaxed);
        self.remaining.store(count, Ordering::Relaxed);
    }

    fn complete_one(&self) {
        self.remaining.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Render the scene, dispatching on the configured threading mode.
pub fn render(
    camera: &Camera,
    world: &dyn Hittable,
    environment: &dyn Environment,
    settings: &RenderSettings,
    progress: &RenderProgress,
) -> Raster {
    if settings.single_threaded {
        render_sequential(camera, world, environment, progress)
    } else {
        render_parallel(camera, world, environment, progress)
    }
}

/// Render with one task per pixel on the shared worker pool.
///
/// The pool join is the blocking completion gate; there is no ordering
/// guarantee between pixels.
pub fn render_parallel(
    camera: &Camera,
    world: &dyn Hittable,
    environment: &dyn Environment,
    progress: &RenderProgress,
) -> Raster {
    let width = camera.image_width;
    let height = camera.image_height;
    let mut raster = Raster::new(width, height, RASTER_MAX_VALUE);
    progress.enqueue(raster.pixels().len());

    log::info!(
        "rendering {}x{} at {} spp across {} workers",
        width,
        height,
        camera.samples_per_pixel,
        rayon::current_num_threads()
    );

    raster
        .pixels_mut()
        .par_iter_mut()
        .enumerate()
        .for_each_init(rand::thread_rng, |rng, (index, pixel)| {
            let x = index as u32 % width;
            let y = index as u32 / width;
            *pixel = sample_pixel(camera, world, environment, x, y, rng);
            progress.complete_one();
        });

    raster
}

/// Render every pixel on the calling thread.
///
/// Performs the identical per-pixel computation without task submission,
/// for deterministic sequential execution and profiling.
pub fn render_sequential(
    camera: &Camera,
    world: &dyn Hittable,
    environment: &dyn Environment,
    progress: &RenderProgress,
) -> Raster {
    let width = camera.image_width;
    let height = camera.image_height;
    let mut raster = Raster::new(width, height, RASTER_MAX_VALUE);
    progress.enqueue(raster.pixels().len());

    log::info!(
        "rendering {}x{} at {} spp on one thread",
        width,
        height,
        camera.samples_per_pixel
    );

    let mut rng = rand::thread_rng();
    for y in 0..height {
        for x in 0..width {
            let color = sample_pixel(camera, world, environment, x, y, &mut rng);
            raster.set(x, y, color);
            progress.complete_one();
        }
    }

    raster
}
