//! Per-block-type totals, the "bill of materials" of a schematic.

use schemview_format::{base_id, VoxelGrid};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Items per inventory stack.
pub const STACK_SIZE: u64 = 64;

/// A count split into full stacks plus leftovers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StackCount {
    pub stacks: u64,
    pub remainder: u64,
}

impl StackCount {
    pub fn from_count(count: u64) -> Self {
        StackCount {
            stacks: count / STACK_SIZE,
            remainder: count % STACK_SIZE,
        }
    }
}

/// `70` renders as `1×64 + 6`, `10` as `10` and `128` as `2×64`.
impl fmt::Display for StackCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.stacks, self.remainder) {
            (0, remainder) => write!(f, "{}", remainder),
            (stacks, 0) => write!(f, "{}×{}", stacks, STACK_SIZE),
            (stacks, remainder) => write!(f, "{}×{} + {}", stacks, STACK_SIZE, remainder),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterialCount {
    /// Base identifier; properties are folded together.
    pub block: String,
    pub count: u64,
}

impl MaterialCount {
    pub fn stacks(&self) -> StackCount {
        StackCount::from_count(self.count)
    }
}

/// Incremental material counter. Cells can be fed in slices so a caller can
/// pause between them; feeding the whole grid in one go is
/// [`compute_materials`].
#[derive(Debug, Clone)]
pub struct MaterialTally {
    counts: Vec<u64>,
    /// Storage offset of the first cell seen for each palette slot.
    first_seen: Vec<usize>,
    scanned: usize,
}

impl MaterialTally {
    pub fn new(grid: &VoxelGrid) -> Self {
        let slots = grid.palette().len();
        MaterialTally {
            counts: vec![0; slots],
            first_seen: vec![usize::MAX; slots],
            scanned: 0,
        }
    }

    /// Counts the next run of cells in storage order.
    pub fn scan(&mut self, cells: &[u32]) {
        for (offset, &slot) in cells.iter().enumerate() {
            let slot = slot as usize;
            if self.counts[slot] == 0 {
                self.first_seen[slot] = self.scanned + offset;
            }
            self.counts[slot] += 1;
        }
        self.scanned += cells.len();
    }

    pub fn scanned(&self) -> usize {
        self.scanned
    }

    /// Folds palette slots into base identifiers, dropping air and unmapped
    /// slots, and sorts by count descending. Ties keep discovery order.
    pub fn finish(self, grid: &VoxelGrid) -> Vec<MaterialCount> {
        let mut seen: Vec<usize> = (0..self.counts.len())
            .filter(|&slot| self.counts[slot] > 0 && grid.is_solid_index(slot as u32))
            .collect();
        seen.sort_by_key(|&slot| self.first_seen[slot]);

        let mut materials: Vec<MaterialCount> = Vec::new();
        let mut position: HashMap<&str, usize> = HashMap::new();
        for slot in seen {
            let Some(descriptor) = grid.palette()[slot].as_deref() else {
                continue;
            };
            let block = base_id(descriptor);
            let at = *position.entry(block).or_insert_with(|| {
                materials.push(MaterialCount {
                    block: block.to_owned(),
                    count: 0,
                });
                materials.len() - 1
            });
            materials[at].count += self.counts[slot];
        }

        // Stable, so equal counts stay in discovery order
        materials.sort_by(|a, b| b.count.cmp(&a.count));
        materials
    }
}

/// Counts every non-air cell of `grid` by base identifier. Discovery order,
/// used to break ties, follows storage order: Y, then Z, then X.
pub fn compute_materials(grid: &VoxelGrid) -> Vec<MaterialCount> {
    let mut tally = MaterialTally::new(grid);
    tally.scan(grid.cells());
    tally.finish(grid)
}
