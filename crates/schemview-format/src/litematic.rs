//! Litematica `.litematic` files: named regions, each with a declared-order
//! block-state palette and bit-packed indices.

use crate::bitpack::unpack_indices;
use crate::block_state::BlockState;
use crate::grid::VoxelGrid;
use crate::options::DecodeOptions;
use schemview_common::{Dimensions, Result, SchemError};
use schemview_logger::log;
use schemview_logger::LogSeverity::Debug;
use schemview_nbt::Tag;

fn palette_entry(entry: &Tag) -> Result<String> {
    let name = entry
        .get("Name")
        .and_then(Tag::as_str)
        .ok_or_else(|| SchemError::missing("BlockStatePalette/Name"))?;

    let mut state = BlockState::new(name);
    if let Some(properties) = entry.get("Properties").and_then(Tag::as_compound) {
        for (key, value) in properties {
            if let Some(value) = value.as_str() {
                state.properties.insert(key.clone(), value.to_owned());
            }
        }
    }
    Ok(state.to_string())
}

/// Extents may be negative when a region was selected "backwards".
fn region_dimensions(region: &Tag) -> Result<Dimensions> {
    let size = region.get("Size").ok_or_else(|| SchemError::missing("Size"))?;
    let axis = |key: &str| {
        size.get(key)
            .and_then(Tag::as_int)
            .map(i64::abs)
            .ok_or_else(|| SchemError::missing(format!("Size/{}", key)))
    };
    Dimensions::new(axis("x")?, axis("y")?, axis("z")?)
}

/// Decodes one region of a Litematica tree into a grid.
pub fn decode(tree: &Tag, options: &DecodeOptions) -> Result<VoxelGrid> {
    let regions = tree
        .get("Regions")
        .and_then(Tag::as_compound)
        .ok_or_else(|| SchemError::missing("Regions"))?;

    let (region_name, region) = match &options.region {
        Some(wanted) => regions
            .get_key_value(wanted)
            .ok_or_else(|| SchemError::missing(format!("Regions/{}", wanted)))?,
        None => regions
            .iter()
            .min_by(|a, b| a.0.cmp(b.0))
            .ok_or_else(|| SchemError::missing("Regions (empty)"))?,
    };
    if regions.len() > 1 {
        log(
            format!(
                "Litematic has {} regions, decoding '{}'",
                regions.len(),
                region_name
            ),
            Debug,
        );
    }

    let dims = region_dimensions(region)?;

    let palette = region
        .get("BlockStatePalette")
        .and_then(Tag::as_list)
        .ok_or_else(|| SchemError::missing("BlockStatePalette"))?
        .iter()
        .map(|entry| palette_entry(entry).map(Some))
        .collect::<Result<Vec<Option<String>>>>()?;

    let words = region
        .get("BlockStates")
        .and_then(Tag::as_long_array)
        .ok_or_else(|| SchemError::missing("BlockStates"))?;

    // Entries run X fastest, then Z, then Y, matching the grid.
    let cells = unpack_indices(words, palette.len(), dims.volume(), options.bit_layout)?;

    let name = tree
        .get_path("Metadata/Name")
        .and_then(Tag::as_str)
        .filter(|n| !n.is_empty())
        .or_else(|| (!region_name.is_empty()).then_some(region_name.as_str()))
        .unwrap_or(options.default_name.as_str())
        .to_owned();

    log(
        format!(
            "Decoded litematic '{}' region '{}' ({}x{}x{}, {} palette entries)",
            name,
            region_name,
            dims.width,
            dims.height,
            dims.length,
            palette.len()
        ),
        Debug,
    );

    VoxelGrid::new(name, dims, palette, cells)
}
