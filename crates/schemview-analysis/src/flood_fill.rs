//! Connected groups of same-type blocks on one horizontal layer.

use schemview_format::{base_id, is_air, VoxelGrid};
use serde::Serialize;
use std::collections::VecDeque;

/// Inclusive axis-aligned bounds on the X/Z plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Bounds {
    pub min_x: u32,
    pub min_z: u32,
    pub max_x: u32,
    pub max_z: u32,
}

impl Bounds {
    fn point(x: u32, z: u32) -> Self {
        Bounds {
            min_x: x,
            min_z: z,
            max_x: x,
            max_z: z,
        }
    }

    fn include(&mut self, x: u32, z: u32) {
        self.min_x = self.min_x.min(x);
        self.min_z = self.min_z.min(z);
        self.max_x = self.max_x.max(x);
        self.max_z = self.max_z.max(z);
    }

    /// Extent along X.
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    /// Extent along Z.
    pub fn height(&self) -> u32 {
        self.max_z - self.min_z + 1
    }
}

/// A 4-connected set of cells on `layer` sharing one base identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectedRegion {
    pub base_id: String,
    pub layer: u32,
    /// `(x, z)` pairs in visit order. Callers should not depend on the order.
    pub cells: Vec<(u32, u32)>,
    pub bounds: Bounds,
}

impl ConnectedRegion {
    pub fn count(&self) -> usize {
        self.cells.len()
    }

    pub fn width(&self) -> u32 {
        self.bounds.width()
    }

    pub fn height(&self) -> u32 {
        self.bounds.height()
    }

    pub fn contains(&self, x: u32, z: u32) -> bool {
        self.cells.contains(&(x, z))
    }
}

/// Breadth-first fill from `(start_x, start_z)` on layer `layer`.
///
/// Neighbours join when their base identifier equals the start cell's, so
/// `oak_stairs[facing=north]` and `oak_stairs[facing=south]` group together.
/// Returns `None` when the start is outside the grid, air, unmapped, or has
/// an empty base identifier.
pub fn flood_fill(
    grid: &VoxelGrid,
    start_x: i32,
    start_z: i32,
    layer: i32,
) -> Option<ConnectedRegion> {
    // Air and out-of-range clicks return before the visited set is allocated
    if !grid.is_solid(start_x, layer, start_z) {
        return None;
    }
    let mut visited = vec![false; grid.width() as usize * grid.length() as usize];
    fill_from(grid, start_x, start_z, layer, &mut visited)
}

/// Partitions every non-air cell of `layer` into connected regions. Each
/// cell belongs to exactly one of them. Regions come out in the order their
/// first cell is met scanning Z, then X.
pub fn regions_in_layer(grid: &VoxelGrid, layer: i32) -> Vec<ConnectedRegion> {
    let mut visited = vec![false; grid.width() as usize * grid.length() as usize];
    let mut regions = Vec::new();
    if layer < 0 || layer as u32 >= grid.height() {
        return regions;
    }

    for z in 0..grid.length() as i32 {
        for x in 0..grid.width() as i32 {
            let key = z as usize * grid.width() as usize + x as usize;
            if visited[key] {
                continue;
            }
            if let Some(region) = fill_from(grid, x, z, layer, &mut visited) {
                regions.push(region);
            }
        }
    }
    regions
}

fn fill_from(
    grid: &VoxelGrid,
    start_x: i32,
    start_z: i32,
    layer: i32,
    visited: &mut [bool],
) -> Option<ConnectedRegion> {
    let start = grid.get_block(start_x, layer, start_z)?;
    let group = base_id(start);
    if group.is_empty() || is_air(start) {
        return None;
    }

    // Resolve membership per palette slot once instead of per cell.
    let member: Vec<bool> = grid
        .palette()
        .iter()
        .map(|entry| entry.as_deref().is_some_and(|d| base_id(d) == group))
        .collect();
    let admits = |x: i32, z: i32| {
        grid.palette_index(x, layer, z)
            .is_some_and(|slot| member[slot as usize])
    };

    let width = grid.width() as usize;
    let key = |x: i32, z: i32| z as usize * width + x as usize;

    let (sx, sz) = (start_x as u32, start_z as u32);
    let mut bounds = Bounds::point(sx, sz);
    let mut cells = Vec::new();
    let mut queue = VecDeque::from([(start_x, start_z)]);
    visited[key(start_x, start_z)] = true;

    while let Some((x, z)) = queue.pop_front() {
        cells.push((x as u32, z as u32));
        bounds.include(x as u32, z as u32);

        for (nx, nz) in [(x + 1, z), (x - 1, z), (x, z + 1), (x, z - 1)] {
            // `admits` bounds-checks before `key` is used
            if admits(nx, nz) && !visited[key(nx, nz)] {
                visited[key(nx, nz)] = true;
                queue.push_back((nx, nz));
            }
        }
    }

    Some(ConnectedRegion {
        base_id: group.to_owned(),
        layer: layer as u32,
        cells,
        bounds,
    })
}
