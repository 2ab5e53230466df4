// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Turns a raw database record into the normalized component list the
//! layout generator and the consolidation planner both consume.

use crate::errors::TitleError;
use crate::rom_types::{HexValue, NormalizedTitle, Region, RomComponent};
use crate::tables;
use ngrs_db::{RomEntry, SoftwareRecord};

pub fn normalize(record: &SoftwareRecord) -> Result<NormalizedTitle, TitleError> {
    // Encrypted variants are rejected before anything else runs.
    if let Some(replacement) = tables::decrypted_replacement(&record.name) {
        return Err(TitleError::BlockedTitle {
            set: record.name.clone(),
            replacement: replacement.to_string(),
        });
    }

    let mut components = vec![
        RomComponent::meta(Region::IdMeta, record.name.clone()),
        RomComponent::meta(Region::TitleMeta, record.description.clone()),
    ];

    for area in &record.areas {
        let region = Region::from_dataarea(&area.name).ok_or_else(|| {
            malformed(record, format!("unknown dataarea '{}'", area.name))
        })?;

        for rom in &area.roms {
            let flag = rom.load_flag.as_deref().unwrap_or("");
            if flag.contains("fill") || flag.contains("ignore") {
                continue;
            }

            if flag == "continue" {
                // A continuation extends the most recently accepted chip
                // and deliberately shares its name, so it is exempt from
                // the dedup below.
                let previous = components
                    .iter()
                    .rev()
                    .find(|c| !c.region.is_meta())
                    .ok_or_else(|| {
                        malformed(record, "continuation with no preceding rom".to_string())
                    })?;
                let name = previous.name.clone();
                components.push(RomComponent {
                    region,
                    name,
                    size: Some(required_size(record, rom)?),
                    offset: optional_offset(record, rom)?,
                    is_continuation: true,
                });
            } else {
                let name = rom.name.clone().ok_or_else(|| {
                    malformed(record, format!("rom entry in '{}' has no name", area.name))
                })?;
                // Dedup by name, first occurrence wins.
                if components.iter().any(|c| c.name == name) {
                    continue;
                }
                components.push(RomComponent {
                    region,
                    name,
                    size: Some(required_size(record, rom)?),
                    offset: optional_offset(record, rom)?,
                    is_continuation: false,
                });
            }
        }
    }

    Ok(NormalizedTitle { components })
}

fn required_size(record: &SoftwareRecord, rom: &RomEntry) -> Result<HexValue, TitleError> {
    let size = rom
        .size
        .as_deref()
        .ok_or_else(|| malformed(record, "rom entry has no size".to_string()))?;
    size.parse()
        .map_err(|_| malformed(record, format!("invalid size literal '{size}'")))
}

fn optional_offset(
    record: &SoftwareRecord,
    rom: &RomEntry,
) -> Result<Option<HexValue>, TitleError> {
    match rom.offset.as_deref() {
        None => Ok(None),
        Some(offset) => offset
            .parse()
            .map(Some)
            .map_err(|_| malformed(record, format!("invalid offset literal '{offset}'"))),
    }
}

fn malformed(record: &SoftwareRecord, reason: String) -> TitleError {
    TitleError::Malformed {
        set: record.name.clone(),
        reason,
    }
}
