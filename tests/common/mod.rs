#![allow(dead_code)]

use schemview_format::bitpack::{pack_indices, BitLayout};
use schemview_format::varint::write_varint;
use schemview_nbt::{NBTFile, Tag};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_FILE: AtomicUsize = AtomicUsize::new(0);

/// A path under the temp dir unique to this process and call.
pub fn temp_path(extension: &str) -> PathBuf {
    let n = NEXT_FILE.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!(
        "schemview-test-{}-{}.{}",
        std::process::id(),
        n,
        extension
    ))
}

pub async fn write_gzip(tree: Tag, extension: &str) -> PathBuf {
    let path = temp_path(extension);
    let mut bytes = Vec::new();
    NBTFile::new(String::new(), tree)
        .write_gzip(&mut bytes)
        .unwrap();
    tokio::fs::write(&path, bytes).await.unwrap();
    path
}

pub fn varints(values: &[u32]) -> Vec<u8> {
    let mut buf = Vec::new();
    for &value in values {
        write_varint(&mut buf, value as i32);
    }
    buf
}

/// Index at `(x, y, z)` for the fixture builders; depends on every axis.
pub fn fixture_index(x: u32, y: u32, z: u32, palette_size: u32) -> u32 {
    (x + 2 * y + 3 * z + x * y) % palette_size
}

/// Cells in storage order: X fastest, then Z, then Y.
pub fn fixture_cells(width: u32, height: u32, length: u32, palette_size: u32) -> Vec<u32> {
    let mut cells = Vec::with_capacity((width * height * length) as usize);
    for y in 0..height {
        for z in 0..length {
            for x in 0..width {
                cells.push(fixture_index(x, y, z, palette_size));
            }
        }
    }
    cells
}

/// Sponge v2 tree with palette ids in declaration order.
pub fn sponge_tree(dims: (i16, i16, i16), palette: &[&str], cells: &[u32]) -> Tag {
    Tag::compound([
        ("Version", Tag::Int(2)),
        ("Width", Tag::Short(dims.0)),
        ("Height", Tag::Short(dims.1)),
        ("Length", Tag::Short(dims.2)),
        (
            "Palette",
            Tag::compound(
                palette
                    .iter()
                    .enumerate()
                    .map(|(id, name)| (*name, Tag::Int(id as i32))),
            ),
        ),
        ("BlockData", Tag::ByteArray(varints(cells))),
    ])
}

pub fn litematic_tree(
    region_name: &str,
    dims: (i32, i32, i32),
    palette: &[&str],
    cells: &[u32],
    layout: BitLayout,
) -> Tag {
    let palette_tag = Tag::List(
        palette
            .iter()
            .map(|name| Tag::compound([("Name", Tag::String((*name).to_owned()))]))
            .collect(),
    );
    let region = Tag::compound([
        (
            "Size",
            Tag::compound([
                ("x", Tag::Int(dims.0)),
                ("y", Tag::Int(dims.1)),
                ("z", Tag::Int(dims.2)),
            ]),
        ),
        ("BlockStatePalette", palette_tag),
        (
            "BlockStates",
            Tag::LongArray(pack_indices(cells, palette.len(), layout)),
        ),
    ]);
    Tag::compound([
        ("MinecraftDataVersion", Tag::Int(3465)),
        ("Regions", Tag::compound([(region_name, region)])),
    ])
}
