use crate::block_state::is_air;
use schemview_common::{Dimensions, Result, SchemError};

/// A decoded schematic: dimensions, palette and one palette index per cell.
///
/// Cells are stored X fastest, then Z, then Y:
/// `index = y * length * width + z * width + x`.
///
/// The grid is immutable once built, so it can be shared freely between
/// readers (e.g. behind an `Arc`).
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelGrid {
    name: String,
    dims: Dimensions,
    /// `None` marks a slot no descriptor maps to.
    palette: Vec<Option<String>>,
    /// Per palette slot: a real, non-air block.
    solid: Vec<bool>,
    cells: Vec<u32>,
    total_non_air: usize,
}

impl VoxelGrid {
    /// Builds a grid from cells already in storage order. Every cell must
    /// point inside `palette`, and there must be exactly one per position.
    pub fn new(
        name: String,
        dims: Dimensions,
        palette: Vec<Option<String>>,
        cells: Vec<u32>,
    ) -> Result<Self> {
        if cells.len() != dims.volume() {
            return Err(SchemError::truncated(format!(
                "{} cells for a {}x{}x{} grid",
                cells.len(),
                dims.width,
                dims.height,
                dims.length
            )));
        }

        let mut occurrences = vec![0usize; palette.len()];
        for &index in &cells {
            match occurrences.get_mut(index as usize) {
                Some(n) => *n += 1,
                None => {
                    return Err(SchemError::PaletteIndexOutOfRange {
                        index: i64::from(index),
                        palette_len: palette.len(),
                    })
                }
            }
        }

        let solid: Vec<bool> = palette
            .iter()
            .map(|entry| entry.as_deref().is_some_and(|d| !is_air(d)))
            .collect();
        let total_non_air = occurrences
            .iter()
            .zip(&solid)
            .filter_map(|(&n, &solid)| solid.then_some(n))
            .sum();

        Ok(VoxelGrid {
            name,
            dims,
            palette,
            solid,
            cells,
            total_non_air,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    pub fn width(&self) -> u32 {
        self.dims.width
    }

    pub fn height(&self) -> u32 {
        self.dims.height
    }

    pub fn length(&self) -> u32 {
        self.dims.length
    }

    pub fn palette(&self) -> &[Option<String>] {
        &self.palette
    }

    /// Cells that hold a real, non-air block. Computed once at construction.
    pub fn total_non_air(&self) -> usize {
        self.total_non_air
    }

    /// Raw palette indices in storage order.
    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        self.dims.contains(x, y, z)
    }

    /// Storage offset of `(x, y, z)`, or `None` outside the grid.
    pub fn cell_index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        if !self.contains(x, y, z) {
            return None;
        }
        let (w, l) = (self.dims.width as usize, self.dims.length as usize);
        Some(y as usize * l * w + z as usize * w + x as usize)
    }

    pub fn palette_index(&self, x: i32, y: i32, z: i32) -> Option<u32> {
        self.cell_index(x, y, z).map(|i| self.cells[i])
    }

    /// The descriptor at `(x, y, z)`. `None` outside the grid or for an
    /// unmapped palette slot.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Option<&str> {
        let index = self.palette_index(x, y, z)?;
        self.palette[index as usize].as_deref()
    }

    /// Whether a palette slot is a real, non-air block.
    pub fn is_solid_index(&self, palette_index: u32) -> bool {
        self.solid
            .get(palette_index as usize)
            .copied()
            .unwrap_or(false)
    }

    pub fn is_solid(&self, x: i32, y: i32, z: i32) -> bool {
        self.palette_index(x, y, z)
            .is_some_and(|i| self.is_solid_index(i))
    }

    /// Non-air cells on horizontal layer `y`. Zero for layers outside the grid.
    pub fn layer_non_air(&self, y: i32) -> usize {
        if y < 0 || y as u32 >= self.dims.height {
            return 0;
        }
        let layer_size = self.dims.width as usize * self.dims.length as usize;
        let start = y as usize * layer_size;
        self.cells[start..start + layer_size]
            .iter()
            .filter(|&&i| self.is_solid_index(i))
            .count()
    }
}
