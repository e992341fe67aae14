//! Radical (power) tessellation of the seed set, clipped to the domain.
//!
//! Each seed's cell is the set of points whose power distance to that seed is
//! smallest, intersected with the domain. Cells are built independently by
//! half-plane clipping, then stitched into a shared point/facet soup where
//! every interior facet knows the two cells on either side.

use crate::geometry::{Circle, ARC_SEGMENTS};
use crate::seeding::Seed;
use std::collections::HashMap;

/// Neighbor index denoting "outside the domain".
pub const OUTSIDE_CELL: i32 = -1;

/// Vertex dedup grid resolution: coordinates are snapped to 1e-6 world units,
/// coarse enough to merge the same vertex computed from two adjacent cells.
const SNAP_GRID: f64 = 1e6;

/// Slack for the half-plane keep test, so points on a bisector survive the
/// clip from both sides.
const CLIP_EPS: f64 = 1e-12;

/// Polygonal mesh of the tessellated domain.
///
/// `facets[k]` indexes into `points`; `facet_neighbors[k]` holds the cell on
/// either side, `OUTSIDE_CELL` for the side facing out of the domain. At most
/// one entry of a neighbor pair is negative, exactly one for a boundary facet.
#[derive(Clone, Debug, Default)]
pub struct PolyMesh {
    pub points: Vec<[f64; 2]>,
    pub facets: Vec<[usize; 2]>,
    pub facet_neighbors: Vec<[i32; 2]>,
}

impl PolyMesh {
    /// Tessellate `seeds` inside `domain`.
    ///
    /// A cell clipped away entirely is skipped; for non-overlapping disks this
    /// cannot happen (a power cell always contains its own disk), but the
    /// guard keeps malformed seed sets from producing dangling indices.
    pub fn from_seeds(seeds: &[Seed], domain: &Circle) -> Self {
        let base = domain.boundary_polygon(ARC_SEGMENTS);
        let mut builder = MeshBuilder::default();
        for (cell, seed) in seeds.iter().enumerate() {
            let polygon = cell_polygon(seed, cell, seeds, &base);
            if polygon.len() < 3 {
                continue;
            }
            builder.add_cell(cell as i32, &polygon);
        }
        builder.finish()
    }

    /// Indices of facets with a cell on both sides.
    pub fn interior_facet_count(&self) -> usize {
        self.facet_neighbors
            .iter()
            .filter(|pair| pair[0] >= 0 && pair[1] >= 0)
            .count()
    }
}

/// Clip the domain polygon by the power bisector against every other seed.
fn cell_polygon(
    seed: &Seed,
    cell: usize,
    seeds: &[Seed],
    base: &[[f64; 2]],
) -> Vec<[f64; 2]> {
    let mut polygon = base.to_vec();
    for (other_index, other) in seeds.iter().enumerate() {
        if other_index == cell {
            continue;
        }
        // Keep |x - p|^2 - r^2 <= |x - q|^2 - s^2, i.e. n.x <= c with
        // n = q - p and c = (|q|^2 - |p|^2 + r^2 - s^2) / 2.
        let normal = [
            other.position[0] - seed.position[0],
            other.position[1] - seed.position[1],
        ];
        let offset = 0.5
            * (sq_norm(other.position) - sq_norm(seed.position) + seed.radius * seed.radius
                - other.radius * other.radius);
        polygon = clip_half_plane(&polygon, normal, offset);
        if polygon.is_empty() {
            break;
        }
    }
    polygon
}

fn sq_norm(p: [f64; 2]) -> f64 {
    p[0] * p[0] + p[1] * p[1]
}

/// Sutherland-Hodgman clip of a convex polygon against `n.x <= c`.
fn clip_half_plane(polygon: &[[f64; 2]], normal: [f64; 2], offset: f64) -> Vec<[f64; 2]> {
    let mut clipped = Vec::with_capacity(polygon.len() + 1);
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[(i + 1) % polygon.len()];
        let side_a = normal[0] * a[0] + normal[1] * a[1] - offset;
        let side_b = normal[0] * b[0] + normal[1] * b[1] - offset;
        let a_inside = side_a <= CLIP_EPS;
        let b_inside = side_b <= CLIP_EPS;
        if a_inside {
            clipped.push(a);
        }
        if a_inside != b_inside {
            let t = side_a / (side_a - side_b);
            clipped.push([a[0] + t * (b[0] - a[0]), a[1] + t * (b[1] - a[1])]);
        }
    }
    clipped
}

/// Accumulates cell polygons into deduplicated points and shared facets.
#[derive(Default)]
struct MeshBuilder {
    points: Vec<[f64; 2]>,
    point_ids: HashMap<(i64, i64), usize>,
    facets: Vec<[usize; 2]>,
    facet_neighbors: Vec<[i32; 2]>,
    facet_ids: HashMap<(usize, usize), usize>,
}

impl MeshBuilder {
    fn point_id(&mut self, point: [f64; 2]) -> usize {
        let key = (
            (point[0] * SNAP_GRID).round() as i64,
            (point[1] * SNAP_GRID).round() as i64,
        );
        if let Some(&id) = self.point_ids.get(&key) {
            return id;
        }
        let id = self.points.len();
        self.points.push(point);
        self.point_ids.insert(key, id);
        id
    }

    fn add_cell(&mut self, cell: i32, polygon: &[[f64; 2]]) {
        let ids: Vec<usize> = polygon.iter().map(|&p| self.point_id(p)).collect();
        for i in 0..ids.len() {
            let a = ids[i];
            let b = ids[(i + 1) % ids.len()];
            if a == b {
                // Vertices snapped together; drop the degenerate edge.
                continue;
            }
            let key = (a.min(b), a.max(b));
            match self.facet_ids.get(&key) {
                Some(&facet) => self.facet_neighbors[facet][1] = cell,
                None => {
                    self.facet_ids.insert(key, self.facets.len());
                    self.facets.push([a, b]);
                    self.facet_neighbors.push([cell, OUTSIDE_CELL]);
                }
            }
        }
    }

    fn finish(self) -> PolyMesh {
        PolyMesh {
            points: self.points,
            facets: self.facets,
            facet_neighbors: self.facet_neighbors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeding::{place_seeds, sample_radii};

    fn reference_mesh() -> (Vec<Seed>, PolyMesh) {
        let domain = Circle::unit();
        let radii = sample_radii(14, 4, 0.3);
        let seeds = place_seeds(&radii, &domain, 7).expect("reference layout must place");
        let mesh = PolyMesh::from_seeds(&seeds, &domain);
        (seeds, mesh)
    }

    #[test]
    fn facet_point_indices_are_in_bounds() {
        let (_, mesh) = reference_mesh();
        assert!(!mesh.facets.is_empty());
        assert!(mesh
            .facets
            .iter()
            .all(|f| f[0] < mesh.points.len() && f[1] < mesh.points.len()));
    }

    #[test]
    fn neighbor_pairs_have_at_most_one_outside_entry() {
        let (seeds, mesh) = reference_mesh();
        assert_eq!(mesh.facets.len(), mesh.facet_neighbors.len());
        for pair in &mesh.facet_neighbors {
            assert!(
                pair[0] >= 0 || pair[1] >= 0,
                "a facet cannot face outside on both sides"
            );
            for &n in pair {
                assert!(n >= OUTSIDE_CELL && (n as i64) < seeds.len() as i64);
            }
        }
    }

    #[test]
    fn reference_mesh_has_interior_facets() {
        let (_, mesh) = reference_mesh();
        assert!(
            mesh.interior_facet_count() > 0,
            "14 seeds must produce at least one shared cell wall"
        );
        assert!(mesh.interior_facet_count() < mesh.facets.len());
    }

    #[test]
    fn single_seed_cell_is_the_whole_domain() {
        let domain = Circle::unit();
        let seeds = [Seed {
            position: [0.0, 0.0],
            radius: 0.0,
        }];
        let mesh = PolyMesh::from_seeds(&seeds, &domain);
        assert_eq!(mesh.points.len(), ARC_SEGMENTS);
        assert_eq!(mesh.facets.len(), ARC_SEGMENTS);
        assert_eq!(mesh.interior_facet_count(), 0);
        assert!(mesh
            .facet_neighbors
            .iter()
            .all(|pair| pair[0] == 0 && pair[1] == OUTSIDE_CELL));
        assert!(mesh.points.iter().all(|&p| domain.on_boundary(p)));
    }

    #[test]
    fn two_seeds_share_one_wall() {
        let domain = Circle::unit();
        let seeds = [
            Seed {
                position: [-0.4, 0.0],
                radius: 0.1,
            },
            Seed {
                position: [0.4, 0.0],
                radius: 0.1,
            },
        ];
        let mesh = PolyMesh::from_seeds(&seeds, &domain);
        let interior: Vec<&[i32; 2]> = mesh
            .facet_neighbors
            .iter()
            .filter(|pair| pair[0] >= 0 && pair[1] >= 0)
            .collect();
        assert!(!interior.is_empty(), "equal seeds must share a bisector wall");
        assert!(interior.iter().all(|pair| {
            let mut cells = [pair[0], pair[1]];
            cells.sort_unstable();
            cells == [0, 1]
        }));
        // The equal-radius bisector is the y axis.
        for (facet, pair) in mesh.facets.iter().zip(&mesh.facet_neighbors) {
            if pair[0] >= 0 && pair[1] >= 0 {
                assert!(mesh.points[facet[0]][0].abs() < 1e-9);
                assert!(mesh.points[facet[1]][0].abs() < 1e-9);
            }
        }
    }

    #[test]
    fn half_plane_clip_keeps_the_inside() {
        let square = vec![[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]];
        // Keep x <= 1.
        let clipped = clip_half_plane(&square, [1.0, 0.0], 1.0);
        assert_eq!(clipped.len(), 4);
        assert!(clipped.iter().all(|p| p[0] <= 1.0 + 1e-12));
        assert!(clipped.iter().any(|p| (p[0] - 1.0).abs() < 1e-12));
        // Keep x <= -1 clips everything away.
        assert!(clip_half_plane(&square, [1.0, 0.0], -1.0).is_empty());
    }
}
