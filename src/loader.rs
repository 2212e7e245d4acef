//! Async entry points that keep decoding and scanning off the caller's task.

use schemview_analysis::{MaterialCount, MaterialTally};
use schemview_common::{Result, SchemError};
use schemview_format::{decode_schematic, DecodeOptions, Format, VoxelGrid};
use schemview_logger::log;
use schemview_logger::LogSeverity::{Debug, Info};
use schemview_nbt::{NBTFile, Tag};
use std::io::{self, Cursor};
use std::path::Path;
use std::time::Instant;
use tokio::task::{self, JoinError};

fn join_error(err: JoinError) -> SchemError {
    SchemError::Io(io::Error::other(err))
}

/// Decodes `tree` on the blocking pool. With no `format`, the tree shape
/// decides.
pub async fn decode_in_background(
    tree: Tag,
    format: Option<Format>,
    options: DecodeOptions,
) -> Result<VoxelGrid> {
    task::spawn_blocking(move || decode_schematic(&tree, format, &options))
        .await
        .map_err(join_error)?
}

/// Reads and parses a (possibly gzip-compressed) tree from disk.
pub async fn read_tree(path: impl AsRef<Path>) -> Result<Tag> {
    let bytes = tokio::fs::read(path).await?;
    let file = task::spawn_blocking(move || NBTFile::read_auto(Cursor::new(bytes)))
        .await
        .map_err(join_error)??;
    Ok(file.root)
}

/// Loads a schematic file. The extension picks the format; unknown
/// extensions fall back to the tree shape.
pub async fn load_schematic(
    path: impl AsRef<Path>,
    options: &DecodeOptions,
) -> Result<VoxelGrid> {
    let path = path.as_ref();
    let started = Instant::now();
    let tree = read_tree(path).await?;
    let format = Format::from_path(path).or_else(|| Format::detect(&tree));
    if let Some(format) = format {
        log(format!("Reading {} as {}", path.display(), format), Debug);
    }

    let grid = decode_in_background(tree, format, options.clone()).await?;
    log(
        format!(
            "Loaded '{}' ({}x{}x{}, {} blocks) in {:?}",
            grid.name(),
            grid.width(),
            grid.height(),
            grid.length(),
            grid.total_non_air(),
            started.elapsed()
        ),
        Info,
    );
    Ok(grid)
}

/// Same result as `compute_materials`, but yields to the runtime every
/// `yield_interval` cells so one huge grid cannot starve other tasks.
pub async fn compute_materials_yielding(
    grid: &VoxelGrid,
    yield_interval: usize,
) -> Vec<MaterialCount> {
    let mut tally = MaterialTally::new(grid);
    for chunk in grid.cells().chunks(yield_interval.max(1)) {
        tally.scan(chunk);
        task::yield_now().await;
    }
    tally.finish(grid)
}
