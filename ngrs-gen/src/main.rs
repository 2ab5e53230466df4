// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

mod config;
mod consolidate;
mod descriptor;
mod errors;
mod extract;
mod layout;
mod preprocessor;
mod rom_types;
mod tables;

use crate::config::Config;
use crate::extract::TitleSource;
use crate::layout::TitleLayout;
use anyhow::{Context, Result};
use clap::Parser;
use ngrs_db::SoftwareDb;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[clap(
    name = "ngrs-gen",
    about = "Neo Geo FPGA romset generator",
    version
)]
struct Args {
    /// Folder scanned for softlist zips and directories
    #[clap(short = 'i', long, default_value = ".")]
    input_folder: PathBuf,

    /// Folder receiving per-title rom directories and romsets.xml
    #[clap(short = 'o', long, default_value = ".")]
    output_folder: PathBuf,

    /// Software-list database file
    #[clap(long, default_value = "neogeo-all.db")]
    database: PathBuf,

    /// Overwrite an existing romsets.xml
    #[clap(long)]
    overwrite: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config {
        database: args.database,
        input_folder: args.input_folder,
        output_folder: args.output_folder,
        overwrite: args.overwrite,
    };
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    let db = SoftwareDb::load(&config.database)
        .with_context(|| format!("Failed to load database {}", config.database.display()))?;
    println!(
        "Loaded {} software record(s) from {}",
        db.len(),
        config.database.display()
    );

    let sources = discover_sources(&config.input_folder, &db)?;
    if sources.is_empty() {
        println!(
            "No known software found under {}",
            config.input_folder.display()
        );
        return Ok(());
    }

    let mut layouts = Vec::new();
    for (id, source) in &sources {
        match process_title(id, source, &db, &config.output_folder) {
            Ok(title_layout) => layouts.push(title_layout),
            Err(e) => eprintln!("Skipping '{}': {}", id, e),
        }
    }

    if layouts.is_empty() {
        println!("No titles processed successfully, descriptor not written");
        return Ok(());
    }

    let path = descriptor::write_romsets(&config.output_folder, &layouts)?;
    println!("Wrote {} romset(s) to {}", layouts.len(), path.display());

    Ok(())
}

/// Walks the input folder looking for zip archives and directories whose
/// names are database sets.  The walk is sorted at every level so the
/// descriptor comes out in the same order on every run.
fn discover_sources(root: &Path, db: &SoftwareDb) -> Result<Vec<(String, TitleSource)>> {
    let mut found = Vec::new();
    walk_folder(root, db, &mut found)?;
    Ok(found)
}

fn walk_folder(
    dir: &Path,
    db: &SoftwareDb,
    found: &mut Vec<(String, TitleSource)>,
) -> Result<()> {
    let mut entries: Vec<_> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read folder {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());

    // Zip archives at this level first, then matching directories, then
    // recursion into subfolders.
    let mut subdirs = Vec::new();
    for entry in &entries {
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
            continue;
        }
        if path.extension().is_some_and(|ext| ext == "zip")
            && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            && db.contains(stem)
        {
            found.push((stem.to_string(), TitleSource::Archive(path.clone())));
        }
    }

    for sub in &subdirs {
        if let Some(name) = sub.file_name().and_then(|s| s.to_str())
            && db.contains(name)
        {
            found.push((name.to_string(), TitleSource::Directory(sub.clone())));
        }
    }

    for sub in &subdirs {
        walk_folder(sub, db, found)?;
    }

    Ok(())
}

fn process_title(
    id: &str,
    source: &TitleSource,
    db: &SoftwareDb,
    output_folder: &Path,
) -> Result<TitleLayout> {
    let record = db
        .get(id)
        .with_context(|| format!("set '{}' vanished from the database", id))?;

    let normalized = preprocessor::normalize(record)?;
    let plan = consolidate::plan(normalized.rom_components());
    let title_layout = layout::generate(&normalized);

    // The layout generator and the copy planner decide "one merged
    // program blob" with different tests.  A disagreement is worth a
    // look, but neither side is overridden.
    if title_layout.program_concatenated != consolidate::merged_any(&plan) {
        eprintln!(
            "Warning: program merge heuristics disagree for '{}' (layout: {}, copy plan: {})",
            id,
            title_layout.program_concatenated,
            consolidate::merged_any(&plan)
        );
    }

    let title_dir = output_folder.join(id);
    extract::materialize(&plan, source, &title_dir)?;
    println!(
        "Processed '{}' from {} ({} file(s))",
        id,
        source.path().display(),
        plan.len()
    );

    Ok(title_layout)
}
