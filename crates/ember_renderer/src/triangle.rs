//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection. The
//! free function [`intersect_triangle`] is the single implementation used
//! by both standalone triangles and triangle meshes.

use crate::{
    hittable::{HitRecord, Hittable},
    Material,
};
use ember_math::{Aabb, Interval, Ray, Vec3};
use std::sync::Arc;

/// A successful ray-triangle intersection.
#[derive(Debug, Clone, Copy)]
pub struct TriangleHit {
    /// Ray parameter of the hit.
    pub t: f32,
    /// Barycentric coordinates; the hit satisfies u >= 0, v >= 0, u + v <= 1.
    pub u: f32,
    pub v: f32,
}

/// Möller-Trumbore ray-triangle intersection.
///
/// When `cull_back_faces` is set, a determinant below `ray_t.min` rejects
/// the triangle (back face or parallel); otherwise only a determinant of
/// magnitude below `ray_t.min` rejects (ray parallel to the plane).
pub fn intersect_triangle(
    ray: &Ray,
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    ray_t: Interval,
    cull_back_faces: bool,
) -> Option<TriangleHit> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = ray.direction().cross(edge2);
    let det = edge1.dot(h);

    if cull_back_faces {
        if det < ray_t.min {
            return None;
        }
    } else if det.abs() < ray_t.min {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ray.origin() - v0;
    let u = inv_det * s.dot(h);

    // Check if intersection is outside triangle (u parameter)
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = inv_det * ray.direction().dot(q);

    // Check if intersection is outside triangle (v parameter)
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = inv_det * edge2.dot(q);

    if !ray_t.contains(t) {
        return None;
    }

    Some(TriangleHit { t, u, v })
}

/// A triangle primitive.
pub struct Triangle {
    /// Vertices
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Geometric face normal (unnormalized; only its orientation is used)
    normal: Vec3,
    /// Material
    material: Arc<dyn Material>,
    /// Bounding box
    bbox: Aabb,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Arc<dyn Material>) -> Self {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let normal = edge1.cross(edge2);

        let min = v0.min(v1).min(v2);
        let max = v0.max(v1).max(v2);
        let bbox = Aabb::from_points(min, max);

        Self {
            v0,
            v1,
            v2,
            normal,
            material,
            bbox,
        }
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.v0, self.v1, self.v2]
    }
}

impl Hittable for Triangle {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let hit = match intersect_triangle(
            ray,
            self.v0,
            self.v1,
            self.v2,
            ray_t,
            self.material.cull_back_faces(),
        ) {
            Some(hit) => hit,
            None => return false,
        };

        rec.t = hit.t;
        rec.p = ray.at(hit.t);
        rec.set_face_normal(ray, self.normal);
        rec.u = hit.u;
        rec.v = hit.v;
        rec.material = &*self.material;

        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{Dielectric, Lambertian};
    use crate::Color;

    fn grey() -> Arc<dyn Material> {
        Arc::new(Lambertian::new(Color::splat(0.5)))
    }

    fn xy_triangle(material: Arc<dyn Material>) -> Triangle {
        // Triangle in the XY plane at z=-1, counter-clockwise seen from +Z
        Triangle::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(0.0, 1.0, -1.0),
            material,
        )
    }

    #[test]
    fn test_triangle_hit() {
        let tri = xy_triangle(grey());

        // Ray pointing at triangle center
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let interval = Interval::new(0.001, f32::INFINITY);

        let mut rec = HitRecord::default();
        assert!(tri.hit(&ray, interval, &mut rec));
        assert!((rec.t - 1.0).abs() < 0.001);

        // Barycentric coordinates of a valid hit
        assert!(rec.u >= 0.0);
        assert!(rec.v >= 0.0);
        assert!(rec.u + rec.v <= 1.0);
    }

    #[test]
    fn test_triangle_miss() {
        let tri = xy_triangle(grey());

        // Ray pointing away
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        let interval = Interval::new(0.001, f32::INFINITY);

        let mut rec = HitRecord::default();
        assert!(!tri.hit(&ray, interval, &mut rec));
    }

    #[test]
    fn test_triangle_edge_rejection() {
        let tri = xy_triangle(grey());
        let interval = Interval::new(0.001, f32::INFINITY);

        // Well outside the v0-v1 edge
        let ray = Ray::new(Vec3::new(0.0, -1.5, 0.0), -Vec3::Z);
        let mut rec = HitRecord::default();
        assert!(!tri.hit(&ray, interval, &mut rec));

        // Outside the apex
        let ray = Ray::new(Vec3::new(0.9, 0.9, 0.0), -Vec3::Z);
        assert!(!tri.hit(&ray, interval, &mut rec));
    }

    #[test]
    fn test_back_face_culling_follows_material() {
        // Approach from behind the triangle (from -Z toward +Z): the
        // winding is clockwise from this side, so the determinant is negative
        let ray = Ray::new(Vec3::new(0.0, 0.0, -2.0), Vec3::Z);
        let interval = Interval::new(0.001, f32::INFINITY);

        let culling = xy_triangle(grey());
        let mut rec = HitRecord::default();
        assert!(!culling.hit(&ray, interval, &mut rec));

        // A dielectric never culls: the same back-face hit is reported
        let glass = xy_triangle(Arc::new(Dielectric::new(1.5)));
        assert!(glass.hit(&ray, interval, &mut rec));
        assert!((rec.t - 1.0).abs() < 1e-4);
        assert!(rec.normal.dot(ray.direction()) <= 0.0);
    }

    #[test]
    fn test_parallel_ray_rejected() {
        let tri = xy_triangle(Arc::new(Dielectric::new(1.5)));

        // Ray sliding along the triangle plane: determinant magnitude ~ 0
        let ray = Ray::new(Vec3::new(-5.0, 0.0, -1.0), Vec3::X);
        let mut rec = HitRecord::default();
        assert!(!tri.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
    }

    #[test]
    fn test_intersect_triangle_interval_bounds() {
        let v0 = Vec3::new(-1.0, -1.0, -5.0);
        let v1 = Vec3::new(1.0, -1.0, -5.0);
        let v2 = Vec3::new(0.0, 1.0, -5.0);
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);

        // Hit at t=5 rejected when the interval ends earlier
        assert!(intersect_triangle(&ray, v0, v1, v2, Interval::new(0.001, 4.0), true).is_none());

        let hit = intersect_triangle(&ray, v0, v1, v2, Interval::new(0.001, 10.0), true).unwrap();
        assert!((hit.t - 5.0).abs() < 1e-4);
    }
}
