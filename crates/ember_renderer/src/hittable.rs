//! Hittable trait and HitRecord for ray-object intersection.

use crate::{Material, ScatterResult};
use ember_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

/// A dummy material used for HitRecord::default().
/// Always absorbs light (returns None from scatter).
struct DummyMaterial;

impl Material for DummyMaterial {
    fn scatter(
        &self,
        _ray_in: &Ray,
        _rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        None
    }
}

/// Static dummy material instance for Default impl.
static DUMMY_MATERIAL: DummyMaterial = DummyMaterial;

/// Record of a ray-object intersection.
#[derive(Clone)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Vec3,
    /// Surface normal at intersection (always points against ray)
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: &'a dyn Material,
    /// Barycentric coordinates of the hit (triangles; 0 for spheres)
    pub u: f32,
    pub v: f32,
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
}

impl<'a> Default for HitRecord<'a> {
    fn default() -> Self {
        Self {
            p: Vec3::ZERO,
            normal: Vec3::ZERO,
            material: &DUMMY_MATERIAL,
            u: 0.0,
            v: 0.0,
            t: 0.0,
            front_face: false,
        }
    }
}

impl<'a> HitRecord<'a> {
    /// Set the face normal based on ray direction and outward normal.
    ///
    /// The normal is always stored pointing against the ray direction,
    /// so we need to track whether we hit the front or back face.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        // If the ray and normal point in the same direction, we're inside
        self.front_face = ray.direction().dot(outward_normal) < 0.0;

        // Normal always points against the ray
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Test if a ray hits this object within the given interval.
    ///
    /// Returns true if hit, and fills in the hit record. Never reports a
    /// distance outside the requested interval, and never mutates the
    /// object's own geometry.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool;

    /// Get the axis-aligned bounding box of this object.
    fn bounding_box(&self) -> Aabb;
}

/// An ordered list of hittable objects.
///
/// Resolves the globally nearest hit across all members. Order does not
/// affect correctness; when two objects are hit at exactly the same
/// distance the earlier one in the list wins.
pub struct HittableList {
    objects: Vec<Box<dyn Hittable>>,
    bbox: Aabb,
}

impl HittableList {
    /// Create a new empty hittable list.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            bbox: Aabb::EMPTY,
        }
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: Box<dyn Hittable>) {
        self.bbox = Aabb::surrounding(&self.bbox, &object.bounding_box());
        self.objects.push(object);
    }

    /// Clear all objects from the list.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.bbox = Aabb::EMPTY;
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for HittableList {
    fn default() -> Self {
        Self::new()
    }
}

impl Hittable for HittableList {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let mut hit_anything = false;
        let mut closest_so_far = ray_t.max;

        for object in &self.objects {
            let interval = Interval::new(ray_t.min, closest_so_far);
            if object.hit(ray, interval, rec) {
                hit_anything = true;
                closest_so_far = rec.t;
            }
        }

        hit_anything
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Lambertian, Sphere};
    use std::sync::Arc;

    #[test]
    fn test_set_face_normal_orientation() {
        let mut rec = HitRecord::default();

        // Ray traveling +Z against a normal pointing -Z: front face
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        rec.set_face_normal(&ray, -Vec3::Z);
        assert!(rec.front_face);
        assert!(rec.normal.dot(ray.direction()) <= 0.0);

        // Same ray against a normal pointing +Z: back face, normal flipped
        rec.set_face_normal(&ray, Vec3::Z);
        assert!(!rec.front_face);
        assert_eq!(rec.normal, -Vec3::Z);
        assert!(rec.normal.dot(ray.direction()) <= 0.0);
    }

    #[test]
    fn test_list_returns_globally_nearest() {
        let material: Arc<dyn Material> = Arc::new(Lambertian::new(Color::splat(0.5)));

        let mut list = HittableList::new();
        list.add(Box::new(Sphere::new(
            Vec3::new(0.0, 0.0, -10.0),
            1.0,
            material.clone(),
        )));
        list.add(Box::new(Sphere::new(
            Vec3::new(0.0, 0.0, -3.0),
            1.0,
            material.clone(),
        )));
        list.add(Box::new(Sphere::new(
            Vec3::new(0.0, 0.0, -6.0),
            1.0,
            material,
        )));

        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        let mut rec = HitRecord::default();
        assert!(list.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));

        // Nearest sphere front surface sits at z = -2
        assert!((rec.t - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_nearest_hit_independent_of_order() {
        let material: Arc<dyn Material> = Arc::new(Lambertian::new(Color::splat(0.5)));
        let centers = [
            Vec3::new(0.0, 0.0, -4.0),
            Vec3::new(0.0, 0.0, -2.5),
            Vec3::new(0.0, 0.0, -7.0),
            Vec3::new(0.0, 3.0, -3.0),
        ];

        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        let interval = Interval::new(0.001, f32::INFINITY);

        // Forward, reversed, and rotated orderings all report the same hit
        let orderings: [Vec<usize>; 3] = [vec![0, 1, 2, 3], vec![3, 2, 1, 0], vec![2, 0, 3, 1]];
        for order in orderings {
            let mut list = HittableList::new();
            for i in order {
                list.add(Box::new(Sphere::new(centers[i], 1.0, material.clone())));
            }

            let mut rec = HitRecord::default();
            assert!(list.hit(&ray, interval, &mut rec));
            assert!((rec.t - 1.5).abs() < 1e-4);
        }
    }

    #[test]
    fn test_empty_list_never_hits() {
        let list = HittableList::new();
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let mut rec = HitRecord::default();
        assert!(!list.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
    }
}
