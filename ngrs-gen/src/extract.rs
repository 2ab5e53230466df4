// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Materializes a title's consolidation plan: reads the named source
//! blobs out of a zip archive or a plain directory and writes the
//! destination files.  Every required source is checked before anything
//! is written, so a failed title leaves no partial output.

use crate::consolidate::ConsolidationEntry;
use crate::errors::ExtractError;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use zip::ZipArchive;

/// Where a title's source bytes live.
#[derive(Debug, Clone)]
pub enum TitleSource {
    Archive(PathBuf),
    Directory(PathBuf),
}

impl TitleSource {
    pub fn path(&self) -> &Path {
        match self {
            TitleSource::Archive(path) => path,
            TitleSource::Directory(path) => path,
        }
    }
}

pub fn materialize(
    plan: &[ConsolidationEntry],
    source: &TitleSource,
    title_dir: &Path,
) -> Result<(), ExtractError> {
    match source {
        TitleSource::Archive(path) => materialize_zip(plan, path, title_dir),
        TitleSource::Directory(path) => materialize_dir(plan, path, title_dir),
    }
}

fn materialize_zip(
    plan: &[ConsolidationEntry],
    archive_path: &Path,
    title_dir: &Path,
) -> Result<(), ExtractError> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)?;

    let members: HashSet<String> = archive.file_names().map(str::to_owned).collect();
    check_sources(plan, |name| members.contains(name), archive_path)?;

    fs::create_dir_all(title_dir)?;
    for entry in plan {
        let mut bytes = read_member(&mut archive, &entry.primary)?;
        if let Some(secondary) = &entry.secondary {
            bytes.extend(read_member(&mut archive, secondary)?);
        }
        write_destination(title_dir, &entry.primary, &bytes)?;
    }
    Ok(())
}

fn materialize_dir(
    plan: &[ConsolidationEntry],
    source_dir: &Path,
    title_dir: &Path,
) -> Result<(), ExtractError> {
    check_sources(plan, |name| source_dir.join(name).is_file(), source_dir)?;

    fs::create_dir_all(title_dir)?;
    for entry in plan {
        let mut bytes = fs::read(source_dir.join(&entry.primary))?;
        if let Some(secondary) = &entry.secondary {
            bytes.extend(fs::read(source_dir.join(secondary))?);
        }
        write_destination(title_dir, &entry.primary, &bytes)?;
    }
    Ok(())
}

fn check_sources(
    plan: &[ConsolidationEntry],
    present: impl Fn(&str) -> bool,
    source_path: &Path,
) -> Result<(), ExtractError> {
    for entry in plan {
        for name in entry.sources() {
            if !present(name) {
                return Err(ExtractError::MissingSource {
                    name: name.to_string(),
                    source_path: source_path.to_path_buf(),
                });
            }
        }
    }
    Ok(())
}

fn read_member(archive: &mut ZipArchive<File>, name: &str) -> Result<Vec<u8>, ExtractError> {
    let mut member = archive.by_name(name)?;
    let mut bytes = Vec::with_capacity(member.size() as usize);
    member.read_to_end(&mut bytes)?;
    Ok(bytes)
}

// Destinations go through a temp file in the title directory, so an I/O
// failure mid-write cannot leave a truncated rom behind.
fn write_destination(title_dir: &Path, name: &str, bytes: &[u8]) -> Result<(), ExtractError> {
    let mut temp = NamedTempFile::new_in(title_dir)?;
    temp.write_all(bytes)?;
    temp.persist(title_dir.join(name))
        .map_err(|e| ExtractError::Io(e.error))?;
    Ok(())
}
