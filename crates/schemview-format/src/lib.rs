//! Decoders turning schematic compound trees into a [`VoxelGrid`].
//!
//! Two on-disk formats are understood: the Sponge `.schem` format, whose cell
//! indices are a varint byte stream, and the Litematica `.litematic` format,
//! whose indices are bit-packed into 64-bit words.

pub mod bitpack;
pub mod block_state;
pub mod format;
pub mod grid;
pub mod litematic;
pub mod options;
pub mod sponge;
pub mod varint;

pub use block_state::{base_id, is_air, BlockState};
pub use format::{decode_schematic, Format};
pub use grid::VoxelGrid;
pub use options::{DecodeOptions, LayoutPreference};
