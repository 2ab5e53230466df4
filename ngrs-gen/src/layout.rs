// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Computes the hardware placement of every ROM component: which loader
//! slot it occupies, at what offset, and how large the loader should
//! believe it is.  The index arithmetic here mirrors the board's physical
//! address decoding, quirks included.

use crate::rom_types::{NormalizedTitle, Region, RomComponent};
use crate::tables;

/// Program chips carrying this suffix are the SMA security module, which
/// sits outside the indexed program window.
pub const SECURITY_ROM_SUFFIX: &str = ".neo-sma";

/// One indexed megabyte of the program/fixed window.
const SLOT_WINDOW: u64 = 0x100000;

/// One `<file>` row of the descriptor.  `index` and `offset` are absent
/// only for security-module rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutEntry {
    pub name: String,
    pub code: char,
    pub index: Option<u32>,
    pub offset: Option<String>,
    pub size: String,
}

/// A title's full descriptor record, in emission order.
#[derive(Debug, Clone)]
pub struct TitleLayout {
    pub id: String,
    pub display: String,
    pub entries: Vec<LayoutEntry>,
    /// Whether the program bucket was treated as one concatenated block.
    /// Compared against the copy planner's independent merge decision by
    /// the driver.
    pub program_concatenated: bool,
}

/// Components partitioned by hardware bus, in emission order.  Sprite
/// continuations load after every independent sprite chip; audio crypt
/// chips share the audio program bus.
#[derive(Debug, Default)]
struct RegionBuckets<'a> {
    program: Vec<&'a RomComponent>,
    fixed: Vec<&'a RomComponent>,
    sprites: Vec<&'a RomComponent>,
    audio_program: Vec<&'a RomComponent>,
    audio_samples: Vec<&'a RomComponent>,
}

impl<'a> RegionBuckets<'a> {
    fn classify(components: &'a [RomComponent]) -> Self {
        let mut buckets = RegionBuckets::default();
        for c in components {
            match c.region {
                Region::Program => buckets.program.push(c),
                Region::FixedGraphics => buckets.fixed.push(c),
                Region::SpriteGraphics if !c.is_continuation => buckets.sprites.push(c),
                Region::AudioProgram | Region::AudioCrypt => buckets.audio_program.push(c),
                Region::AudioSamples => buckets.audio_samples.push(c),
                _ => {}
            }
        }
        for c in components {
            if c.region == Region::SpriteGraphics && c.is_continuation {
                buckets.sprites.push(c);
            }
        }
        buckets
    }
}

pub fn generate(title: &NormalizedTitle) -> TitleLayout {
    let buckets = RegionBuckets::classify(title.rom_components());
    let mut entries = Vec::new();

    // Program window.  A two-chip set fitting in one megabyte is loaded
    // as a single block, and every row reports the combined size.
    let total_size: u64 = buckets.program.iter().map(|c| c.size_value()).sum();
    let concatenate = buckets.program.len() == 2 && total_size <= SLOT_WINDOW;

    let mut index: u32 = 4;
    for rom in buckets
        .program
        .iter()
        .filter(|c| !c.name.ends_with(SECURITY_ROM_SUFFIX))
    {
        let offset = if index > 4 {
            "0".to_string()
        } else {
            rom.offset_literal().to_string()
        };
        let size = if concatenate {
            format!("{total_size:#x}")
        } else {
            rom.size_literal().to_string()
        };
        entries.push(LayoutEntry {
            name: rom.name.clone(),
            code: 'P',
            index: Some(index),
            offset: Some(offset),
            size: size.clone(),
        });

        // A first block declared at a nonzero offset also appears at the
        // next slot with offset zero.
        if index == 4 && rom.offset_value().unwrap_or(0) > 0 {
            index += 2;
            entries.push(LayoutEntry {
                name: rom.name.clone(),
                code: 'P',
                index: Some(index),
                offset: Some("0".to_string()),
                size,
            });
        }
        index += 2;
    }

    // Security modules are addressed outside the indexed window: no slot,
    // no offset, their own size.
    for rom in buckets
        .program
        .iter()
        .filter(|c| c.name.ends_with(SECURITY_ROM_SUFFIX))
    {
        entries.push(LayoutEntry {
            name: rom.name.clone(),
            code: 'P',
            index: None,
            offset: None,
            size: rom.size_literal().to_string(),
        });
    }

    // The fixed window starts at slot 8 even when the program window left
    // off lower.
    if index < 8 {
        index = 8;
    }
    for rom in &buckets.fixed {
        let offset = rom.offset_value().unwrap_or(0);
        if offset > 0 {
            index += (offset / SLOT_WINDOW) as u32;
        }
        entries.push(LayoutEntry {
            name: rom.name.clone(),
            code: 'S',
            index: Some(index),
            offset: Some(rom.offset_literal().to_string()),
            size: rom.size_literal().to_string(),
        });
    }

    // Sprite slots come from the decode table keyed on the declared
    // offset literal.  Continuations report their own size as the offset:
    // "append after this many bytes", not a byte address.
    for rom in &buckets.sprites {
        let slot = tables::sprite_slot(rom.offset.as_ref().map(|o| o.literal()));
        let offset = if rom.is_continuation {
            rom.size_literal().to_string()
        } else {
            "0".to_string()
        };
        entries.push(LayoutEntry {
            name: rom.name.clone(),
            code: 'C',
            index: Some(slot),
            offset: Some(offset),
            size: rom.size_literal().to_string(),
        });
    }

    // The whole audio program bus is one descriptor row's worth of space.
    for rom in &buckets.audio_program {
        entries.push(LayoutEntry {
            name: rom.name.clone(),
            code: 'M',
            index: Some(9),
            offset: Some("0".to_string()),
            size: rom.size_literal().to_string(),
        });
    }

    for rom in &buckets.audio_samples {
        let slot = tables::sample_slot(rom.offset.as_ref().map(|o| o.literal()));
        entries.push(LayoutEntry {
            name: rom.name.clone(),
            code: 'V',
            index: Some(slot),
            offset: Some("0".to_string()),
            size: rom.size_literal().to_string(),
        });
    }

    TitleLayout {
        id: title.id().to_string(),
        display: title.display().to_string(),
        entries,
        program_concatenated: concatenate,
    }
}
