// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Static hardware tables: the offset-to-slot maps that model the board's
//! address decoding, and the encrypted-set deny-list.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Slot index reported when a declared offset has no known hardware
/// mapping.  The row is still emitted so the gap is visible downstream.
pub const UNMAPPED_SLOT: u32 = 9999;

/// Sprite (C) offset to loader slot index.  Keys are the literal offset
/// strings used by the database; even/odd offsets are the two byte lanes
/// of an interleaved chip pair.
pub const SPRITE_SLOTS: &[(&str, u32)] = &[
    ("0x000000", 64),
    ("0x000001", 65),
    ("0x200000", 68),
    ("0x200001", 69),
    ("0x400000", 72),
    ("0x400001", 73),
    ("0x800000", 80),
    ("0x800001", 81),
    ("0xc00000", 88),
    ("0xc00001", 89),
    ("0x1000000", 96),
    ("0x1000001", 97),
    ("0x1800000", 112),
    ("0x1800001", 113),
    ("0x2000000", 128),
    ("0x2000001", 129),
    ("0x3000000", 160),
    ("0x3000001", 161),
];

/// ADPCM sample (V) offset to loader slot index, one slot pair per
/// megabyte.
pub const SAMPLE_SLOTS: &[(&str, u32)] = &[
    ("0x000000", 16),
    ("0x100000", 18),
    ("0x200000", 20),
    ("0x300000", 22),
    ("0x400000", 24),
    ("0x500000", 26),
    ("0x600000", 28),
    ("0x700000", 30),
    ("0x800000", 32),
    ("0x900000", 34),
    ("0xa00000", 36),
    ("0xb00000", 38),
    ("0xc00000", 40),
];

pub fn sprite_slot(offset: Option<&str>) -> u32 {
    lookup(SPRITE_SLOTS, offset)
}

pub fn sample_slot(offset: Option<&str>) -> u32 {
    lookup(SAMPLE_SLOTS, offset)
}

fn lookup(table: &[(&str, u32)], offset: Option<&str>) -> u32 {
    offset
        .and_then(|o| table.iter().find(|(key, _)| *key == o))
        .map(|(_, slot)| *slot)
        .unwrap_or(UNMAPPED_SLOT)
}

#[derive(Debug, Deserialize)]
struct EncryptedSet {
    set: String,
    replacement: String,
}

// CMC/SMA/bootleg sets the core cannot use, mapped to the decrypted set
// to ask the user for instead.  Loaded once; read-only for the life of
// the run.
static ENCRYPTED_SETS: LazyLock<HashMap<String, String>> = LazyLock::new(|| {
    let sets: Vec<EncryptedSet> = serde_json::from_str(include_str!("../data/encrypted-sets.json"))
        .expect("embedded encrypted-sets.json is well-formed");
    sets.into_iter()
        .map(|entry| (entry.set, entry.replacement))
        .collect()
});

/// Returns the decrypted replacement set name if `set` is on the
/// deny-list.
pub fn decrypted_replacement(set: &str) -> Option<&'static str> {
    ENCRYPTED_SETS.get(set).map(String::as_str)
}
