//! Spatial queries over a decoded [`VoxelGrid`](schemview_format::VoxelGrid).

pub mod flood_fill;
pub mod materials;

pub use flood_fill::{flood_fill, regions_in_layer, Bounds, ConnectedRegion};
pub use materials::{compute_materials, MaterialCount, MaterialTally, StackCount};
