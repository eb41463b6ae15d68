//! Octree bounding volume over a triangle set.
//!
//! Nodes live in a flat arena addressed by index; each node stores its
//! extent, the triangle indices assigned to it, and up to eight child
//! indices. Traversal stops at "bud" nodes (nodes with at least one leaf
//! child): buds are the coarsest granularity at which per-triangle testing
//! begins, which bounds recursion depth and avoids testing a ray against
//! every descendant box of an already triangle-sparse region.

use ember_math::{Aabb, Interval, Ray, Vec3};

/// A node becomes a leaf once its candidate set is at or below this size.
const LEAF_TRIANGLES: usize = 16;

/// Depth cap: coincident vertices can keep a candidate set from ever
/// splitting, so subdivision stops here regardless of count.
const MAX_DEPTH: u32 = 16;

/// Sentinel for an absent child.
const NO_CHILD: u32 = u32::MAX;

/// Arena index of the root node.
const ROOT: u32 = 0;

struct Node {
    bounds: Aabb,
    /// Indices into the owning mesh's triangle buffer. A triangle spanning
    /// an octant boundary appears in every octant holding one of its
    /// vertices.
    triangles: Vec<u32>,
    children: [u32; 8],
    leaf: bool,
    bud: bool,
}

impl Node {
    fn childless(&self) -> bool {
        self.children.iter().all(|&c| c == NO_CHILD)
    }
}

/// Recursive spatial partition of a triangle mesh.
///
/// Answers "which bud regions does this ray plausibly pass through"; the
/// union of the returned buds' candidate sets over-approximates the set of
/// triangles the ray can hit.
pub struct Octree {
    nodes: Vec<Node>,
}

impl Octree {
    /// Build an octree over the given triangle set.
    ///
    /// `vertices` and `triangles` are borrowed from the owning mesh; the
    /// tree stores only indices into them. Every triangle is assigned to
    /// each octant containing at least one of its vertices.
    pub fn build(bounds: Aabb, vertices: &[Vec3], triangles: &[[u32; 3]]) -> Self {
        let mut nodes = Vec::new();
        let candidates: Vec<u32> = (0..triangles.len() as u32).collect();
        build_node(&mut nodes, bounds, candidates, vertices, triangles, 0);

        log::debug!(
            "octree: {} triangles, {} nodes",
            triangles.len(),
            nodes.len()
        );

        Self { nodes }
    }

    /// Candidate triangle indices stored at a node.
    pub fn triangles(&self, node: u32) -> &[u32] {
        &self.nodes[node as usize].triangles
    }

    /// Number of arena nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Collect the buds whose boxes the ray passes through.
    ///
    /// A miss at any node prunes its whole subtree. Descent stops at bud
    /// nodes; a root without children stands in as the sole bud.
    pub fn intersecting_buds(&self, ray: &Ray, ray_t: Interval) -> Vec<u32> {
        let mut buds = Vec::new();
        if !self.nodes.is_empty() {
            self.collect_buds(ROOT, ray, ray_t, &mut buds);
        }
        buds
    }

    fn collect_buds(&self, index: u32, ray: &Ray, ray_t: Interval, out: &mut Vec<u32>) {
        let node = &self.nodes[index as usize];
        if !node.bounds.hit(ray, ray_t) {
            return;
        }

        if node.bud || (index == ROOT && node.childless()) {
            out.push(index);
            return;
        }

        for &child in &node.children {
            if child != NO_CHILD {
                self.collect_buds(child, ray, ray_t, out);
            }
        }
    }

    #[cfg(test)]
    fn leaves(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.leaf)
    }
}

fn build_node(
    nodes: &mut Vec<Node>,
    bounds: Aabb,
    candidates: Vec<u32>,
    vertices: &[Vec3],
    triangles: &[[u32; 3]],
    depth: u32,
) -> u32 {
    let index = nodes.len() as u32;
    let leaf = candidates.len() <= LEAF_TRIANGLES || depth >= MAX_DEPTH;
    nodes.push(Node {
        bounds,
        triangles: candidates.clone(),
        children: [NO_CHILD; 8],
        leaf,
        bud: false,
    });

    if leaf {
        return index;
    }

    let mid = bounds.centroid();
    let mut bud = false;

    for octant in 0..8 {
        let extent = octant_bounds(&bounds, mid, octant);
        let subset: Vec<u32> = candidates
            .iter()
            .copied()
            .filter(|&t| {
                triangles[t as usize]
                    .iter()
                    .any(|&v| extent.contains_point(vertices[v as usize]))
            })
            .collect();

        if subset.is_empty() {
            continue;
        }

        let child = build_node(nodes, extent, subset, vertices, triangles, depth + 1);
        nodes[index as usize].children[octant] = child;
        if nodes[child as usize].leaf {
            bud = true;
        }
    }

    nodes[index as usize].bud = bud;
    index
}

/// Extent of one of the eight octants: each bit of `octant` selects the
/// lower or upper half along one axis.
fn octant_bounds(bounds: &Aabb, mid: Vec3, octant: usize) -> Aabb {
    let (x0, x1) = if octant & 1 == 0 {
        (bounds.x.min, mid.x)
    } else {
        (mid.x, bounds.x.max)
    };
    let (y0, y1) = if octant & 2 == 0 {
        (bounds.y.min, mid.y)
    } else {
        (mid.y, bounds.y.max)
    };
    let (z0, z1) = if octant & 4 == 0 {
        (bounds.z.min, mid.z)
    } else {
        (mid.z, bounds.z.max)
    };

    Aabb::from_points(Vec3::new(x0, y0, z0), Vec3::new(x1, y1, z1))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A flat grid of quads in the XZ plane at y=0, two triangles per cell.
    fn grid_mesh(cells: u32) -> (Vec<Vec3>, Vec<[u32; 3]>) {
        let mut vertices = Vec::new();
        let side = cells + 1;
        for z in 0..side {
            for x in 0..side {
                vertices.push(Vec3::new(x as f32, 0.0, z as f32));
            }
        }

        let mut triangles = Vec::new();
        for z in 0..cells {
            for x in 0..cells {
                let a = z * side + x;
                let b = a + 1;
                let c = a + side;
                let d = c + 1;
                triangles.push([a, b, c]);
                triangles.push([b, d, c]);
            }
        }

        (vertices, triangles)
    }

    fn mesh_bounds(vertices: &[Vec3]) -> Aabb {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for v in vertices {
            min = min.min(*v);
            max = max.max(*v);
        }
        Aabb::from_points(min, max)
    }

    #[test]
    fn test_small_mesh_root_is_sole_bud() {
        // 2x2 cells = 8 triangles, below the leaf threshold
        let (vertices, triangles) = grid_mesh(2);
        let octree = Octree::build(mesh_bounds(&vertices), &vertices, &triangles);

        assert_eq!(octree.node_count(), 1);

        let ray = Ray::new(Vec3::new(1.0, 5.0, 1.0), -Vec3::Y);
        let buds = octree.intersecting_buds(&ray, Interval::new(0.001, f32::INFINITY));
        assert_eq!(buds, vec![0]);
        assert_eq!(octree.triangles(0).len(), 8);
    }

    #[test]
    fn test_large_mesh_subdivides() {
        // 8x8 cells = 128 triangles forces subdivision
        let (vertices, triangles) = grid_mesh(8);
        let octree = Octree::build(mesh_bounds(&vertices), &vertices, &triangles);

        assert!(octree.node_count() > 1);

        // A ray straight down through one cell touches few buds, and their
        // candidate union is much smaller than the whole mesh
        let ray = Ray::new(Vec3::new(0.5, 5.0, 0.5), -Vec3::Y);
        let buds = octree.intersecting_buds(&ray, Interval::new(0.001, f32::INFINITY));
        assert!(!buds.is_empty());

        let candidates: usize = buds.iter().map(|&b| octree.triangles(b).len()).sum();
        assert!(candidates < triangles.len());
    }

    #[test]
    fn test_missing_ray_returns_no_buds() {
        let (vertices, triangles) = grid_mesh(8);
        let octree = Octree::build(mesh_bounds(&vertices), &vertices, &triangles);

        // Parallel to the grid, far above it
        let ray = Ray::new(Vec3::new(0.0, 50.0, 0.0), Vec3::X);
        let buds = octree.intersecting_buds(&ray, Interval::new(0.001, f32::INFINITY));
        assert!(buds.is_empty());
    }

    #[test]
    fn test_every_triangle_reaches_a_leaf() {
        let (vertices, triangles) = grid_mesh(8);
        let octree = Octree::build(mesh_bounds(&vertices), &vertices, &triangles);

        let mut seen = vec![false; triangles.len()];
        for leaf in octree.leaves() {
            for &t in &leaf.triangles {
                seen[t as usize] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_buds_over_approximate_hit_candidates() {
        let (vertices, triangles) = grid_mesh(8);
        let octree = Octree::build(mesh_bounds(&vertices), &vertices, &triangles);
        let interval = Interval::new(0.001, f32::INFINITY);

        // For rays that hit the grid, the triangle actually hit must be in
        // some returned bud's candidate set
        for x in 0..8 {
            for z in 0..8 {
                let target = Vec3::new(x as f32 + 0.3, 0.0, z as f32 + 0.3);
                let origin = Vec3::new(4.0, 6.0, 4.0);
                let ray = Ray::new(origin, target - origin);

                let buds = octree.intersecting_buds(&ray, interval);
                let mut candidates: Vec<u32> = buds
                    .iter()
                    .flat_map(|&b| octree.triangles(b).iter().copied())
                    .collect();
                candidates.sort_unstable();
                candidates.dedup();

                let hit_any = candidates.iter().any(|&t| {
                    let [a, b, c] = triangles[t as usize];
                    crate::triangle::intersect_triangle(
                        &ray,
                        vertices[a as usize],
                        vertices[b as usize],
                        vertices[c as usize],
                        interval,
                        false,
                    )
                    .is_some()
                });
                assert!(hit_any, "ray toward {target:?} lost its triangle");
            }
        }
    }

    #[test]
    fn test_coincident_vertices_terminate() {
        // 32 triangles all sharing the same vertices never separate; the
        // depth cap must still terminate construction
        let vertices = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        let triangles = vec![[0u32, 1, 2]; 32];
        let octree = Octree::build(mesh_bounds(&vertices), &vertices, &triangles);

        let ray = Ray::new(Vec3::new(0.25, 0.25, 5.0), -Vec3::Z);
        let buds = octree.intersecting_buds(&ray, Interval::new(0.001, f32::INFINITY));
        assert!(!buds.is_empty());
    }
}
