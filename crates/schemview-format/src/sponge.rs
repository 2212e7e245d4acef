//! Sponge `.schem` files: a name-to-id palette plus a varint index stream.
//!
//! Version 2 keeps `Palette` and `BlockData` at the root. Version 3 nests the
//! whole thing under `Schematic` and moves the block fields into
//! `Blocks { Palette, Data }`. Both are accepted.

use crate::block_state::BlockState;
use crate::grid::VoxelGrid;
use crate::options::DecodeOptions;
use crate::varint::decode_varints;
use schemview_common::{Dimensions, Result, SchemError};
use schemview_logger::log;
use schemview_logger::LogSeverity::Debug;
use schemview_nbt::{Compound, Tag};

fn dimension(root: &Tag, key: &str) -> Result<i64> {
    root.get(key)
        .and_then(Tag::as_int)
        .ok_or_else(|| SchemError::missing(key))
}

/// Inverts the palette mapping into a slot list sized `max(id) + 1`. Ids no
/// descriptor maps to stay `None`.
fn build_palette(mapping: &Compound) -> Result<Vec<Option<String>>> {
    let mut entries = Vec::with_capacity(mapping.len());
    for (descriptor, id) in mapping {
        let id = id
            .as_int()
            .ok_or_else(|| SchemError::missing(format!("Palette/{}", descriptor)))?;
        let slot = usize::try_from(id).map_err(|_| SchemError::PaletteIndexOutOfRange {
            index: id,
            palette_len: mapping.len(),
        })?;
        entries.push((slot, descriptor));
    }

    let size = entries.iter().map(|(slot, _)| slot + 1).max().unwrap_or(0);
    let mut palette = vec![None; size];
    for (slot, descriptor) in entries {
        palette[slot] = Some(BlockState::parse(descriptor).to_string());
    }
    Ok(palette)
}

/// Decodes a Sponge schematic tree into a grid.
pub fn decode(tree: &Tag, options: &DecodeOptions) -> Result<VoxelGrid> {
    let root = match tree.get("Schematic") {
        Some(nested) if nested.as_compound().is_some() => nested,
        _ => tree,
    };

    let dims = Dimensions::new(
        dimension(root, "Width")?,
        dimension(root, "Height")?,
        dimension(root, "Length")?,
    )?;

    let (palette_tag, data_tag) = match root.get("Blocks") {
        Some(blocks) => (blocks.get("Palette"), blocks.get("Data")),
        None => (root.get("Palette"), root.get("BlockData")),
    };
    let mapping = palette_tag
        .and_then(Tag::as_compound)
        .ok_or_else(|| SchemError::missing("Palette"))?;
    let data = data_tag
        .and_then(Tag::as_byte_array)
        .ok_or_else(|| SchemError::missing("BlockData"))?;

    let palette = build_palette(mapping)?;

    // The stream is already X fastest, then Z, then Y, the grid's own order.
    let cells = decode_varints(data, dims.volume())?
        .into_iter()
        .map(|id| {
            u32::try_from(id).map_err(|_| SchemError::PaletteIndexOutOfRange {
                index: i64::from(id),
                palette_len: palette.len(),
            })
        })
        .collect::<Result<Vec<u32>>>()?;

    let name = root
        .get_path("Metadata/Name")
        .and_then(Tag::as_str)
        .unwrap_or(options.default_name.as_str())
        .to_owned();

    log(
        format!(
            "Decoded sponge schematic '{}' ({}x{}x{}, {} palette slots)",
            name,
            dims.width,
            dims.height,
            dims.length,
            palette.len()
        ),
        Debug,
    );

    VoxelGrid::new(name, dims, palette, cells)
}
