//! Walkable-cell navigation surface
//!
//! A flat grid on the XZ plane. Every cell is either walkable or blocked;
//! the border between the two (and the outer rim of the grid) forms the
//! surface edges that [`NavmeshWhiskers`](super::NavmeshWhiskers) steer
//! away from.

use glam::{Vec2, Vec3};

use super::navmesh::{NavigableSurface, SurfaceHit};

/// A flat navigation grid
#[derive(Debug, Clone)]
pub struct GridSurface {
    /// Width in cells (along X)
    pub width: usize,
    /// Depth in cells (along Z)
    pub depth: usize,
    /// Cell size in world units
    pub cell_size: f32,
    /// World origin offset on the XZ plane
    pub origin: Vec2,
    /// Height of the surface
    pub elevation: f32,
    /// Walkable cells (true = walkable)
    cells: Vec<bool>,
}

impl GridSurface {
    /// Create a new grid (all cells walkable by default)
    #[must_use]
    pub fn new(width: usize, depth: usize, cell_size: f32) -> Self {
        Self {
            width,
            depth,
            cell_size,
            origin: Vec2::ZERO,
            elevation: 0.0,
            cells: vec![true; width * depth],
        }
    }

    /// Move the grid's corner to `origin` (X, Z)
    #[must_use]
    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Set the surface height
    #[must_use]
    pub fn with_elevation(mut self, elevation: f32) -> Self {
        self.elevation = elevation;
        self
    }

    /// Set a cell's walkability
    pub fn set_walkable(&mut self, x: usize, z: usize, walkable: bool) {
        if x < self.width && z < self.depth {
            self.cells[z * self.width + x] = walkable;
        }
    }

    /// Block every cell in the half-open rectangle `[min, max)`
    pub fn block(&mut self, min: (usize, usize), max: (usize, usize)) {
        for z in min.1..max.1.min(self.depth) {
            for x in min.0..max.0.min(self.width) {
                self.set_walkable(x, z, false);
            }
        }
    }

    /// Check if a cell is walkable; cells outside the grid never are
    #[must_use]
    pub fn is_walkable(&self, x: i32, z: i32) -> bool {
        if x < 0 || z < 0 {
            return false;
        }
        let (x, z) = (x as usize, z as usize);
        x < self.width && z < self.depth && self.cells[z * self.width + x]
    }

    /// Check if a world position lies on a walkable cell
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        let (x, z) = self.world_to_grid(point);
        self.is_walkable(x, z)
    }

    /// Convert world position to grid coordinates
    #[must_use]
    pub fn world_to_grid(&self, point: Vec3) -> (i32, i32) {
        let local = Vec2::new(point.x, point.z) - self.origin;
        (
            (local.x / self.cell_size).floor() as i32,
            (local.y / self.cell_size).floor() as i32,
        )
    }

    /// Convert grid coordinates to world position (center of cell)
    #[must_use]
    pub fn grid_to_world(&self, x: usize, z: usize) -> Vec3 {
        Vec3::new(
            self.origin.x + (x as f32 + 0.5) * self.cell_size,
            self.elevation,
            self.origin.y + (z as f32 + 0.5) * self.cell_size,
        )
    }

    fn project(&self, point: Vec2) -> Vec3 {
        Vec3::new(point.x, self.elevation, point.y)
    }
}

/// Closest point to `point` on the segment `a`-`b`
fn closest_on_segment(point: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let t = ((point - a).dot(ab) / ab.length_squared()).clamp(0.0, 1.0);
    a + ab * t
}

impl NavigableSurface for GridSurface {
    /// Walk the cells crossed by the segment and stop at the first blocked one
    fn raycast(&self, from: Vec3, to: Vec3) -> SurfaceHit {
        let start = Vec2::new(from.x, from.z);
        let delta = Vec2::new(to.x - from.x, to.z - from.z);
        let (mut x, mut z) = self.world_to_grid(from);

        if !self.is_walkable(x, z) {
            let normal = -Vec3::new(delta.x, 0.0, delta.y).normalize_or_zero();
            return SurfaceHit::at(from, normal);
        }

        let local = start - self.origin;
        let axis = |cell: i32, local: f32, delta: f32| -> (i32, f32, f32) {
            if delta > 0.0 {
                let boundary = (cell + 1) as f32 * self.cell_size;
                (1, (boundary - local) / delta, self.cell_size / delta)
            } else if delta < 0.0 {
                let boundary = cell as f32 * self.cell_size;
                (-1, (boundary - local) / delta, -self.cell_size / delta)
            } else {
                (0, f32::INFINITY, f32::INFINITY)
            }
        };
        let (step_x, mut t_max_x, t_delta_x) = axis(x, local.x, delta.x);
        let (step_z, mut t_max_z, t_delta_z) = axis(z, local.y, delta.y);

        loop {
            let (t, normal) = if t_max_x < t_max_z {
                x += step_x;
                let t = t_max_x;
                t_max_x += t_delta_x;
                (t, Vec3::new(-step_x as f32, 0.0, 0.0))
            } else {
                z += step_z;
                let t = t_max_z;
                t_max_z += t_delta_z;
                (t, Vec3::new(0.0, 0.0, -step_z as f32))
            };

            if t > 1.0 {
                return SurfaceHit::miss();
            }
            if !self.is_walkable(x, z) {
                return SurfaceHit::at(from.lerp(to, t), normal);
            }
        }
    }

    /// Distances are measured on the XZ plane
    fn sample_position(&self, point: Vec3, tolerance: f32) -> SurfaceHit {
        if self.contains(point) {
            return SurfaceHit::at(Vec3::new(point.x, self.elevation, point.z), Vec3::Y);
        }

        let edge = self.find_closest_edge(point);
        let offset = Vec2::new(edge.position.x - point.x, edge.position.z - point.z);
        if edge.hit && offset.length_squared() <= tolerance * tolerance {
            SurfaceHit::at(edge.position, Vec3::Y)
        } else {
            SurfaceHit::miss()
        }
    }

    /// The normal of the returned edge points into the walkable side
    fn find_closest_edge(&self, point: Vec3) -> SurfaceHit {
        let target = Vec2::new(point.x, point.z);
        let size = self.cell_size;
        let mut best: Option<(f32, Vec2, Vec3)> = None;

        for z in 0..self.depth {
            for x in 0..self.width {
                let (cx, cz) = (x as i32, z as i32);
                if !self.is_walkable(cx, cz) {
                    continue;
                }

                let min = self.origin + Vec2::new(x as f32, z as f32) * size;
                let max = min + Vec2::splat(size);
                let sides = [
                    ((cx - 1, cz), min, Vec2::new(min.x, max.y), Vec3::X),
                    ((cx + 1, cz), Vec2::new(max.x, min.y), max, Vec3::NEG_X),
                    ((cx, cz - 1), min, Vec2::new(max.x, min.y), Vec3::Z),
                    ((cx, cz + 1), Vec2::new(min.x, max.y), max, Vec3::NEG_Z),
                ];

                for ((nx, nz), a, b, normal) in sides {
                    if self.is_walkable(nx, nz) {
                        continue;
                    }
                    let closest = closest_on_segment(target, a, b);
                    let distance = closest.distance_squared(target);
                    if best.is_none_or(|(d, _, _)| distance < d) {
                        best = Some((distance, closest, normal));
                    }
                }
            }
        }

        best.map_or_else(SurfaceHit::miss, |(_, closest, normal)| {
            SurfaceHit::at(self.project(closest), normal)
        })
    }
}
