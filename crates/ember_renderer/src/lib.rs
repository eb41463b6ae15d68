//! Ember Renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer: rays leave the camera, bounce around the
//! scene according to each surface's material, and the surviving energy is
//! averaged into the output raster. Per-pixel work is scheduled across a
//! worker pool; triangle meshes prune intersection work with an octree.

mod camera;
mod executor;
mod hittable;
mod integrator;
mod material;
mod octree;
mod sampling;
mod sphere;
mod triangle;
mod trimesh;

pub use camera::Camera;
pub use executor::{render, render_parallel, render_sequential, RenderProgress};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use integrator::{ray_color, sample_pixel, Environment, SkyGradient};
pub use material::{Dielectric, Lambertian, Material, Metal, ScatterResult};
pub use octree::Octree;
pub use sphere::Sphere;
pub use triangle::Triangle;
pub use trimesh::{FaceVertexMesh, TriangleMesh};

/// Re-export math and data-model types used throughout the API
pub use ember_core::{Color, MeshData, MeshError, Raster, RenderSettings};
pub use ember_math::{Aabb, Interval, Ray, Vec3};
