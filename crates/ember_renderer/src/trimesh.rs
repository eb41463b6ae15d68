//! Triangle mesh objects.
//!
//! [`TriangleMesh`] owns an immutable vertex buffer, per-triangle index
//! triples, and precomputed per-triangle normals, and optionally prunes
//! intersection work with an [`Octree`]. [`FaceVertexMesh`] is a thin
//! adapter from the face-vertex data handed over by mesh readers.

use crate::{
    hittable::{HitRecord, Hittable},
    octree::Octree,
    triangle::{intersect_triangle, TriangleHit},
    Material,
};
use ember_core::{MeshData, MeshError, RenderSettings};
use ember_math::{Aabb, Interval, Ray, Vec3};
use std::sync::Arc;

/// An indexed triangle mesh.
pub struct TriangleMesh {
    vertices: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
    /// One normal per triangle, used only to orient hit records.
    normals: Vec<Vec3>,
    material: Arc<dyn Material>,
    bounds: Aabb,
    check_bounds: bool,
    octree: Option<Octree>,
}

impl TriangleMesh {
    /// Create a mesh from a vertex buffer and triangle index triples.
    ///
    /// `triangle_normals`, when given, must hold one normal per triangle
    /// (smooth normals averaged by the caller); otherwise geometric face
    /// normals are computed from the winding. Fails if any index references
    /// outside the vertex buffer. Acceleration structures are built
    /// according to `settings`.
    pub fn new(
        vertices: Vec<Vec3>,
        triangles: Vec<[u32; 3]>,
        triangle_normals: Option<Vec<Vec3>>,
        material: Arc<dyn Material>,
        settings: &RenderSettings,
    ) -> Result<Self, MeshError> {
        for (face, triangle) in triangles.iter().enumerate() {
            for &index in triangle {
                if index as usize >= vertices.len() {
                    return Err(MeshError::VertexIndexOutOfBounds {
                        face,
                        index: index as usize,
                        count: vertices.len(),
                    });
                }
            }
        }

        let normals = match triangle_normals {
            Some(normals) => {
                debug_assert_eq!(normals.len(), triangles.len());
                normals
            }
            None => triangles
                .iter()
                .map(|&[a, b, c]| {
                    let v0 = vertices[a as usize];
                    let edge1 = vertices[b as usize] - v0;
                    let edge2 = vertices[c as usize] - v0;
                    edge1.cross(edge2)
                })
                .collect(),
        };

        let bounds = compute_bounds(&vertices);
        let use_octree = settings.use_bounding_volumes && settings.use_mesh_octree;
        let octree = if use_octree && !triangles.is_empty() {
            Some(Octree::build(bounds, &vertices, &triangles))
        } else {
            None
        };

        log::debug!(
            "triangle mesh: {} vertices, {} triangles, octree: {}",
            vertices.len(),
            triangles.len(),
            octree.is_some()
        );

        Ok(Self {
            vertices,
            triangles,
            normals,
            material,
            bounds,
            check_bounds: settings.use_bounding_volumes,
            octree,
        })
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    fn test_triangle(&self, index: u32, ray: &Ray, ray_t: Interval) -> Option<TriangleHit> {
        let [a, b, c] = self.triangles[index as usize];
        intersect_triangle(
            ray,
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
            ray_t,
            self.material.cull_back_faces(),
        )
    }

    /// Scan a candidate set, keeping the nearest valid hit.
    fn scan<I>(&self, candidates: I, ray: &Ray, ray_t: Interval) -> Option<(u32, TriangleHit)>
    where
        I: IntoIterator<Item = u32>,
    {
        let mut nearest: Option<(u32, TriangleHit)> = None;
        let mut closest = ray_t.max;

        for index in candidates {
            let interval = Interval::new(ray_t.min, closest);
            if let Some(hit) = self.test_triangle(index, ray, interval) {
                // An exact tie keeps the first candidate found
                if nearest.is_none() || hit.t < closest {
                    closest = hit.t;
                    nearest = Some((index, hit));
                }
            }
        }

        nearest
    }
}

impl Hittable for TriangleMesh {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        if self.check_bounds && !self.bounds.hit(ray, ray_t) {
            return false;
        }

        let nearest = match &self.octree {
            Some(octree) => {
                let buds = octree.intersecting_buds(ray, ray_t);
                // Duplicated candidates across buds re-test the same
                // triangle; the shrinking interval keeps only the minimum
                self.scan(
                    buds.iter()
                        .flat_map(|&bud| octree.triangles(bud).iter().copied()),
                    ray,
                    ray_t,
                )
            }
            None => self.scan(0..self.triangles.len() as u32, ray, ray_t),
        };

        let (index, hit) = match nearest {
            Some(found) => found,
            None => return false,
        };

        rec.t = hit.t;
        rec.p = ray.at(hit.t);
        rec.set_face_normal(ray, self.normals[index as usize]);
        rec.u = hit.u;
        rec.v = hit.v;
        rec.material = &*self.material;

        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bounds
    }
}

/// A face-vertex mesh: per-vertex texture/normal arrays plus a face list,
/// lowered to an internal [`TriangleMesh`] at construction.
pub struct FaceVertexMesh {
    mesh: TriangleMesh,
}

impl FaceVertexMesh {
    /// Fan-triangulate the faces of `data` and build the backing mesh.
    ///
    /// Each triangle's normal is the mean of its three corners' normals
    /// when the face supplies normal indices, otherwise the geometric face
    /// normal.
    pub fn new(
        data: &MeshData,
        material: Arc<dyn Material>,
        settings: &RenderSettings,
    ) -> Result<Self, MeshError> {
        let positions = data.positions();
        let supplied = data.normals();

        let mut triangles = Vec::with_capacity(data.triangle_count());
        let mut normals = Vec::with_capacity(data.triangle_count());

        for corners in data.triangulated() {
            let indices = [
                corners[0].position as u32,
                corners[1].position as u32,
                corners[2].position as u32,
            ];

            let normal = match (corners[0].normal, corners[1].normal, corners[2].normal) {
                (Some(a), Some(b), Some(c)) => {
                    ((supplied[a] + supplied[b] + supplied[c]) / 3.0).normalize_or_zero()
                }
                _ => {
                    let v0 = positions[corners[0].position];
                    let edge1 = positions[corners[1].position] - v0;
                    let edge2 = positions[corners[2].position] - v0;
                    edge1.cross(edge2)
                }
            };

            triangles.push(indices);
            normals.push(normal);
        }

        let mesh = TriangleMesh::new(
            positions.to_vec(),
            triangles,
            Some(normals),
            material,
            settings,
        )?;

        Ok(Self { mesh })
    }

    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }
}

impl Hittable for FaceVertexMesh {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        self.mesh.hit(ray, ray_t, rec)
    }

    fn bounding_box(&self) -> Aabb {
        self.mesh.bounding_box()
    }
}

fn compute_bounds(vertices: &[Vec3]) -> Aabb {
    if vertices.is_empty() {
        return Aabb::EMPTY;
    }

    let mut min = Vec3::splat(f32::INFINITY);
    let mut max = Vec3::splat(f32::NEG_INFINITY);
    for v in vertices {
        min = min.min(*v);
        max = max.max(*v);
    }
    Aabb::from_points(min, max)
}
