//! Simple path tracer example.
//!
//! Renders a sphere field with a small pyramid mesh, reports progress
//! while the worker pool runs, and saves a PNG.

use anyhow::Context;
use ember_renderer::{
    render, Camera, Color, Dielectric, HittableList, Lambertian, Material, Metal, RenderProgress,
    RenderSettings, SkyGradient, Sphere, TriangleMesh, Vec3,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let settings = RenderSettings {
        image_width: 800,
        aspect_ratio: 16.0 / 9.0,
        vertical_fov: 20.0,
        aperture: 0.1,
        focus_distance: 10.0,
        samples_per_pixel: 50,
        max_depth: 10,
        ..Default::default()
    };

    let start = std::time::Instant::now();
    let world = build_scene(&settings)?;
    println!("Scene built in {:?}", start.elapsed());

    let camera = Camera::from_settings(&settings).with_position(
        Vec3::new(13.0, 2.0, 3.0),
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    );
    let sky = SkyGradient::default();

    println!(
        "Rendering {}x{} @ {} spp...",
        camera.image_width, camera.image_height, settings.samples_per_pixel
    );

    let progress = Arc::new(RenderProgress::new());
    let done = Arc::new(AtomicBool::new(false));

    let bar_progress = Arc::clone(&progress);
    let bar_done = Arc::clone(&done);
    let bar_handle = thread::spawn(move || {
        let bar = ProgressBar::new(1000);
        bar.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {wide_bar} {percent}%")
                .expect("valid progress template"),
        );
        while !bar_done.load(Ordering::Relaxed) {
            bar.set_position((bar_progress.fraction() * 1000.0) as u64);
            thread::sleep(Duration::from_millis(100));
        }
        bar.finish();
    });

    let start = std::time::Instant::now();
    let raster = render(&camera, &world, &sky, &settings, &progress);
    done.store(true, Ordering::Relaxed);
    bar_handle.join().expect("progress thread panicked");
    println!("Rendered in {:?}", start.elapsed());

    let filename = "output.png";
    raster
        .to_rgb_image()
        .save(filename)
        .with_context(|| format!("failed to save {filename}"))?;
    println!("Saved to {filename}");

    Ok(())
}

fn build_scene(settings: &RenderSettings) -> anyhow::Result<HittableList> {
    let mut world = HittableList::new();

    // Ground
    world.add(Box::new(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5))),
    )));

    // Three main spheres
    world.add(Box::new(Sphere::new(
        Vec3::new(0.0, 1.0, 0.0),
        1.0,
        Arc::new(Dielectric::new(1.5)),
    )));
    world.add(Box::new(Sphere::new(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        Arc::new(Lambertian::new(Color::new(0.4, 0.2, 0.1))),
    )));
    world.add(Box::new(Sphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0)),
    )));

    // A metal pyramid mesh between the spheres
    let vertices = vec![
        Vec3::new(1.5, 0.0, 2.0),
        Vec3::new(2.5, 0.0, 2.0),
        Vec3::new(2.5, 0.0, 3.0),
        Vec3::new(1.5, 0.0, 3.0),
        Vec3::new(2.0, 1.0, 2.5),
    ];
    let triangles = vec![[0, 1, 4], [1, 2, 4], [2, 3, 4], [3, 0, 4]];
    let pyramid = TriangleMesh::new(
        vertices,
        triangles,
        None,
        Arc::new(Metal::new(Color::new(0.8, 0.8, 0.9), 0.1)),
        settings,
    )?;
    world.add(Box::new(pyramid));

    // Small random spheres
    use rand::Rng;
    let mut rng = rand::thread_rng();

    for a in -5..5 {
        for b in -5..5 {
            let center = Vec3::new(
                a as f32 + 0.9 * rng.gen::<f32>(),
                0.2,
                b as f32 + 0.9 * rng.gen::<f32>(),
            );

            if (center - Vec3::new(4.0, 0.2, 0.0)).length() > 0.9 {
                let choose_mat: f32 = rng.gen();

                let material: Arc<dyn Material> = if choose_mat < 0.8 {
                    Arc::new(Lambertian::new(Color::new(
                        rng.gen::<f32>() * rng.gen::<f32>(),
                        rng.gen::<f32>() * rng.gen::<f32>(),
                        rng.gen::<f32>() * rng.gen::<f32>(),
                    )))
                } else if choose_mat < 0.95 {
                    Arc::new(Metal::new(
                        Color::new(
                            0.5 + 0.5 * rng.gen::<f32>(),
                            0.5 + 0.5 * rng.gen::<f32>(),
                            0.5 + 0.5 * rng.gen::<f32>(),
                        ),
                        0.5 * rng.gen::<f32>(),
                    ))
                } else {
                    Arc::new(Dielectric::new(1.5))
                };

                world.add(Box::new(Sphere::new(center, 0.2, material)));
            }
        }
    }

    println!("Created {} objects", world.len());
    Ok(world)
}
