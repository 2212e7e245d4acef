pub mod config;
pub mod loader;

// Re-export commonly used items
pub use config::ViewerConfig;
pub use loader::{compute_materials_yielding, decode_in_background, load_schematic, read_tree};
pub use schemview_analysis::{compute_materials, flood_fill, ConnectedRegion, MaterialCount};
pub use schemview_common::{Dimensions, Result, SchemError};
pub use schemview_format::{DecodeOptions, Format, VoxelGrid};
pub use schemview_logger::{log, LogSeverity};
