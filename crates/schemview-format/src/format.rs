use crate::grid::VoxelGrid;
use crate::options::DecodeOptions;
use crate::{litematic, sponge};
use schemview_common::{Result, SchemError};
use schemview_nbt::Tag;
use std::fmt;
use std::path::Path;

/// The schematic formats understood by this crate. Chosen once, when a file
/// enters the program. Everything downstream only sees a [`VoxelGrid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Sponge `.schem`: varint-encoded indices.
    DenseVarint,
    /// Litematica `.litematic`: indices bit-packed into longs.
    BitPacked,
}

impl Format {
    pub fn from_extension(extension: &str) -> Option<Format> {
        match extension.to_ascii_lowercase().as_str() {
            "schem" => Some(Format::DenseVarint),
            "litematic" => Some(Format::BitPacked),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Format> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }

    /// Guesses the format from the keys present at the root of the tree.
    pub fn detect(tree: &Tag) -> Option<Format> {
        let root = tree.as_compound()?;
        if root.contains_key("Regions") {
            Some(Format::BitPacked)
        } else if ["BlockData", "Blocks", "Schematic"]
            .iter()
            .any(|key| root.contains_key(*key))
        {
            Some(Format::DenseVarint)
        } else {
            None
        }
    }

    pub fn decode(self, tree: &Tag, options: &DecodeOptions) -> Result<VoxelGrid> {
        match self {
            Format::DenseVarint => sponge::decode(tree, options),
            Format::BitPacked => litematic::decode(tree, options),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::DenseVarint => write!(f, "schem"),
            Format::BitPacked => write!(f, "litematic"),
        }
    }
}

/// Decodes `tree` as `hint`, or as whatever [`Format::detect`] finds.
pub fn decode_schematic(
    tree: &Tag,
    hint: Option<Format>,
    options: &DecodeOptions,
) -> Result<VoxelGrid> {
    let format = hint.or_else(|| Format::detect(tree)).ok_or_else(|| {
        SchemError::UnknownFormat("tree has neither Regions nor BlockData".to_owned())
    })?;
    format.decode(tree, options)
}
