//! Face-vertex mesh data for the renderer.
//!
//! This module provides the renderer-agnostic mesh representation handed
//! over by external file readers (OBJ and friends). A mesh is a vertex
//! position buffer, optional texture-coordinate and normal buffers, and a
//! list of polygonal faces indexing into those buffers. Index validity is
//! the only precondition checked here; degenerate in-bounds geometry is
//! passed through untouched.

use ember_math::Vec3;
use thiserror::Error;

/// Errors raised while assembling mesh data.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MeshError {
    #[error("face {face} has only {count} vertices, at least 3 required")]
    FaceTooSmall { face: usize, count: usize },

    #[error("face {face} references vertex {index}, but only {count} vertices exist")]
    VertexIndexOutOfBounds {
        face: usize,
        index: usize,
        count: usize,
    },

    #[error("face {face} references texture coordinate {index}, but only {count} exist")]
    UvIndexOutOfBounds {
        face: usize,
        index: usize,
        count: usize,
    },

    #[error("face {face} references normal {index}, but only {count} normals exist")]
    NormalIndexOutOfBounds {
        face: usize,
        index: usize,
        count: usize,
    },
}

/// Result type for mesh construction.
pub type MeshResult<T> = Result<T, MeshError>;

/// One corner of a polygonal face: indices into the position buffer and,
/// optionally, the texture-coordinate and normal buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceVertex {
    pub position: usize,
    pub uv: Option<usize>,
    pub normal: Option<usize>,
}

impl FaceVertex {
    /// A face corner with only a position index.
    pub fn position_only(position: usize) -> Self {
        Self {
            position,
            uv: None,
            normal: None,
        }
    }

    /// A face corner with position, texture and normal indices.
    pub fn new(position: usize, uv: Option<usize>, normal: Option<usize>) -> Self {
        Self {
            position,
            uv,
            normal,
        }
    }
}

/// An ordered polygonal face. Faces with more than three corners are
/// fan-triangulated by consumers and must be convex and planar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
    pub vertices: Vec<FaceVertex>,
}

impl Face {
    pub fn new(vertices: Vec<FaceVertex>) -> Self {
        Self { vertices }
    }

    /// Build a triangle face from three position indices.
    pub fn triangle(a: usize, b: usize, c: usize) -> Self {
        Self {
            vertices: vec![
                FaceVertex::position_only(a),
                FaceVertex::position_only(b),
                FaceVertex::position_only(c),
            ],
        }
    }
}

/// Validated face-vertex mesh data.
///
/// Buffers are immutable after construction. Every face index is known to
/// be in bounds, so downstream triangulation can index without checks.
#[derive(Debug, Clone)]
pub struct MeshData {
    positions: Vec<Vec3>,
    uvs: Vec<[f32; 2]>,
    normals: Vec<Vec3>,
    faces: Vec<Face>,
}

impl MeshData {
    /// Create mesh data, validating every face index against the buffers.
    ///
    /// Fails fast on the first out-of-bounds position, texture or normal
    /// index, or on a face with fewer than three corners.
    pub fn new(
        positions: Vec<Vec3>,
        uvs: Vec<[f32; 2]>,
        normals: Vec<Vec3>,
        faces: Vec<Face>,
    ) -> MeshResult<Self> {
        for (face_index, face) in faces.iter().enumerate() {
            if face.vertices.len() < 3 {
                return Err(MeshError::FaceTooSmall {
                    face: face_index,
                    count: face.vertices.len(),
                });
            }

            for corner in &face.vertices {
                if corner.position >= positions.len() {
                    return Err(MeshError::VertexIndexOutOfBounds {
                        face: face_index,
                        index: corner.position,
                        count: positions.len(),
                    });
                }
                if let Some(uv) = corner.uv {
                    if uv >= uvs.len() {
                        return Err(MeshError::UvIndexOutOfBounds {
                            face: face_index,
                            index: uv,
                            count: uvs.len(),
                        });
                    }
                }
                if let Some(normal) = corner.normal {
                    if normal >= normals.len() {
                        return Err(MeshError::NormalIndexOutOfBounds {
                            face: face_index,
                            index: normal,
                            count: normals.len(),
                        });
                    }
                }
            }
        }

        log::debug!(
            "mesh data: {} vertices, {} faces, {} uvs, {} normals",
            positions.len(),
            faces.len(),
            uvs.len(),
            normals.len()
        );

        Ok(Self {
            positions,
            uvs,
            normals,
            faces,
        })
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn uvs(&self) -> &[[f32; 2]] {
        &self.uvs
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Number of triangles after fan triangulation.
    pub fn triangle_count(&self) -> usize {
        self.faces.iter().map(|f| f.vertices.len() - 2).sum()
    }

    /// Fan-triangulate every face from its first corner.
    ///
    /// Each yielded triple shares the face's first corner; callers must
    /// supply convex planar polygons for this to be correct.
    pub fn triangulated(&self) -> impl Iterator<Item = [FaceVertex; 3]> + '_ {
        self.faces.iter().flat_map(|face| {
            let pillar = face.vertices[0];
            face.vertices
                .windows(2)
                .skip(1)
                .map(move |pair| [pillar, pair[0], pair[1]])
        })
    }
}
