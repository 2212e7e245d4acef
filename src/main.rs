//! # schemview
//!
//! Prints the dimensions, block count and bill of materials of a `.schem` or
//! `.litematic` file, and optionally the connected region under one cell.
//!
//! ```bash
//! schemview castle.litematic --layer 4 --at 10,7
//! ```

use schemview::config::ViewerConfig;
use schemview::loader::{compute_materials_yielding, load_schematic};
use schemview::{flood_fill, ConnectedRegion, MaterialCount, VoxelGrid};
use schemview_logger::log;
use schemview_logger::LogSeverity::{Debug, Error, Info};
use serde::Serialize;
use std::process::ExitCode;

const CONFIG_PATH: &str = "schemview.json";

const USAGE: &str = "\
Usage: schemview <FILE> [OPTIONS]

Options:
  --json               Print the report as JSON
  --layer <Y>          Layer for --at (default: 0)
  --at <X,Z>           Report the connected region containing (X, Z)
  --config <PATH>      Config file (default: schemview.json)
  -h, --help           Show this help";

#[derive(Debug, Default)]
struct Args {
    file: String,
    json: bool,
    layer: i32,
    at: Option<(i32, i32)>,
    config: Option<String>,
}

#[derive(Debug)]
enum Command {
    Run(Args),
    Help,
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let mut parsed = Args::default();
    let mut file = None;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--json" => parsed.json = true,
            "--layer" => {
                let value = args.get(i + 1).ok_or("--layer needs a value")?;
                parsed.layer = value
                    .parse()
                    .map_err(|_| format!("invalid layer '{}'", value))?;
                i += 1;
            }
            "--at" => {
                let value = args.get(i + 1).ok_or("--at needs X,Z")?;
                parsed.at = Some(parse_point(value)?);
                i += 1;
            }
            "--config" => {
                let value = args.get(i + 1).ok_or("--config needs a path")?;
                parsed.config = Some(value.clone());
                i += 1;
            }
            "--help" | "-h" => return Ok(Command::Help),
            other if other.starts_with('-') => return Err(format!("unknown option '{}'", other)),
            other => {
                if file.replace(other.to_owned()).is_some() {
                    return Err("only one file may be given".to_owned());
                }
            }
        }
        i += 1;
    }
    parsed.file = file.ok_or("missing schematic file")?;
    Ok(Command::Run(parsed))
}

fn parse_point(value: &str) -> Result<(i32, i32), String> {
    let invalid = || format!("invalid point '{}', expected X,Z", value);
    let (x, z) = value.split_once(',').ok_or_else(invalid)?;
    let x = x.trim().parse().map_err(|_| invalid())?;
    let z = z.trim().parse().map_err(|_| invalid())?;
    Ok((x, z))
}

#[derive(Serialize)]
struct Report<'a> {
    name: &'a str,
    width: u32,
    height: u32,
    length: u32,
    total_non_air: usize,
    materials: &'a [MaterialCount],
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<&'a ConnectedRegion>,
}

fn print_text(grid: &VoxelGrid, materials: &[MaterialCount], region: Option<&ConnectedRegion>) {
    println!("{}", grid.name());
    println!(
        "  size: {} x {} x {} (W x H x L)",
        grid.width(),
        grid.height(),
        grid.length()
    );
    println!("  blocks: {}", grid.total_non_air());
    println!();
    println!("Materials:");
    for material in materials {
        println!(
            "  {:>8}  {:<40} {}",
            material.count,
            material.block,
            material.stacks()
        );
    }
    if let Some(region) = region {
        println!();
        println!(
            "Region at layer {}: {} x {} of {}, {} blocks",
            region.layer,
            region.width(),
            region.height(),
            region.base_id,
            region.count()
        );
    }
}

async fn run(args: Args) -> schemview::Result<()> {
    let config = match &args.config {
        Some(path) => ViewerConfig::load(path).await?,
        None => ViewerConfig::load_or_default(CONFIG_PATH).await?,
    };
    config.apply()?;
    log(format!("Config: {:?}", config), Debug);

    let grid = load_schematic(&args.file, &config.decode).await?;
    let materials = compute_materials_yielding(&grid, config.yield_interval).await;

    let region = args
        .at
        .and_then(|(x, z)| flood_fill(&grid, x, z, args.layer));
    if let (Some((x, z)), None) = (args.at, &region) {
        log(
            format!("No region at ({}, {}) on layer {}", x, z, args.layer),
            Info,
        );
    }

    if args.json {
        let report = Report {
            name: grid.name(),
            width: grid.width(),
            height: grid.height(),
            length: grid.length(),
            total_non_air: grid.total_non_air(),
            materials: &materials,
            region: region.as_ref(),
        };
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| schemview::SchemError::Io(e.into()))?;
        println!("{}", json);
    } else {
        print_text(&grid, &materials, region.as_ref());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let args = match parse_args(&args) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help) => {
            println!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            return ExitCode::from(2);
        }
    };

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log(e.to_string(), Error);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("schemview")
            .chain(args.iter().copied())
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn test_parse_full_command_line() {
        let command = parse_args(&argv(&[
            "castle.litematic",
            "--json",
            "--layer",
            "4",
            "--at",
            "10, 7",
            "--config",
            "alt.json",
        ]));
        assert_matches!(command, Ok(Command::Run(args)) => {
            assert_eq!(args.file, "castle.litematic");
            assert!(args.json);
            assert_eq!(args.layer, 4);
            assert_eq!(args.at, Some((10, 7)));
            assert_eq!(args.config.as_deref(), Some("alt.json"));
        });
    }

    #[test]
    fn test_parse_errors() {
        assert_matches!(parse_args(&argv(&[])), Err(_));
        assert_matches!(parse_args(&argv(&["a.schem", "b.schem"])), Err(_));
        assert_matches!(parse_args(&argv(&["a.schem", "--at", "3"])), Err(_));
        assert_matches!(parse_args(&argv(&["a.schem", "--layer"])), Err(_));
        assert_matches!(parse_args(&argv(&["a.schem", "--verbose"])), Err(_));
        assert_matches!(parse_args(&argv(&["--help"])), Ok(Command::Help));
    }
}
