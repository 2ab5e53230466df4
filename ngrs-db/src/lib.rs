// Copyright (C) 2025 Piers Finlayson <piers@piers.rocks>
//
// MIT License

//! Loader for the MAME-style `neogeo` software-list database.
//!
//! This crate only reads the XML into raw per-title records.  It does no
//! interpretation of load flags, sizes or offsets - that is the job of the
//! generator, which owns the hardware rules.

use anyhow::{Context, Result, bail};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::BTreeMap;
use std::path::Path;

/// One `<rom>` element, attributes kept as the database spells them.
///
/// Everything is optional at this layer: `continue` entries carry no name,
/// and some entries carry no offset.  The generator decides what is
/// mandatory where.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RomEntry {
    pub name: Option<String>,
    pub size: Option<String>,
    pub offset: Option<String>,
    pub load_flag: Option<String>,
}

/// One `<dataarea>` element - an ordered group of ROM chips on one bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataArea {
    pub name: String,
    pub roms: Vec<RomEntry>,
}

/// One `<software>` record: set name, display title, and the dataareas of
/// the record's first `<part>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftwareRecord {
    pub name: String,
    pub description: String,
    pub areas: Vec<DataArea>,
}

/// The parsed database, keyed by set name.
///
/// A `BTreeMap` keeps iteration deterministic, which keeps any consumer
/// that walks the whole database reproducible run to run.
#[derive(Debug, Default)]
pub struct SoftwareDb {
    titles: BTreeMap<String, SoftwareRecord>,
}

impl SoftwareDb {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read database file: {}", path.display()))?;
        Self::parse_str(&content)
            .with_context(|| format!("Failed to parse database file: {}", path.display()))
    }

    pub fn parse_str(content: &str) -> Result<Self> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut titles = BTreeMap::new();

        // Parser state: the record under construction, how many <part>
        // elements we have seen for it, and whether we are inside the
        // <description> element.
        let mut current: Option<SoftwareRecord> = None;
        let mut part_depth = 0usize;
        let mut parts_seen = 0usize;
        let mut in_description = false;

        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"software" => {
                        let name = require_attr(&e, "name")?;
                        current = Some(SoftwareRecord {
                            name,
                            description: String::new(),
                            areas: Vec::new(),
                        });
                        parts_seen = 0;
                    }
                    b"description" => in_description = current.is_some(),
                    b"part" => {
                        parts_seen += 1;
                        part_depth += 1;
                    }
                    b"dataarea" => {
                        // Only the first part of a record carries the
                        // cartridge; later parts are ignored.
                        if part_depth > 0 && parts_seen == 1 {
                            if let Some(record) = current.as_mut() {
                                record.areas.push(DataArea {
                                    name: require_attr(&e, "name")?,
                                    roms: Vec::new(),
                                });
                            }
                        }
                    }
                    b"rom" => {
                        push_rom(current.as_mut(), part_depth > 0 && parts_seen == 1, &e)?;
                    }
                    _ => {}
                },
                Event::Empty(e) => {
                    if e.name().as_ref() == b"rom" {
                        push_rom(current.as_mut(), part_depth > 0 && parts_seen == 1, &e)?;
                    }
                }
                Event::Text(e) => {
                    if in_description {
                        if let Some(record) = current.as_mut() {
                            record.description.push_str(&e.unescape()?);
                        }
                    }
                }
                Event::End(e) => match e.name().as_ref() {
                    b"software" => {
                        if let Some(record) = current.take() {
                            titles.insert(record.name.clone(), record);
                        }
                    }
                    b"description" => in_description = false,
                    b"part" => part_depth = part_depth.saturating_sub(1),
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        if current.is_some() {
            bail!("unterminated <software> element");
        }

        Ok(Self { titles })
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.titles.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&SoftwareRecord> {
        self.titles.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SoftwareRecord)> {
        self.titles.iter()
    }
}

fn push_rom(
    current: Option<&mut SoftwareRecord>,
    in_first_part: bool,
    element: &BytesStart<'_>,
) -> Result<()> {
    let Some(record) = current else {
        return Ok(());
    };
    if !in_first_part {
        return Ok(());
    }
    let Some(area) = record.areas.last_mut() else {
        bail!("<rom> outside a <dataarea> in record '{}'", record.name);
    };

    let mut rom = RomEntry::default();
    for attr in element.attributes() {
        let attr = attr?;
        let value = attr.unescape_value()?.into_owned();
        match attr.key.as_ref() {
            b"name" => rom.name = Some(value),
            b"size" => rom.size = Some(value),
            b"offset" => rom.offset = Some(value),
            b"loadflag" => rom.load_flag = Some(value),
            _ => {}
        }
    }
    area.roms.push(rom);
    Ok(())
}

fn require_attr(element: &BytesStart<'_>, name: &str) -> Result<String> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == name.as_bytes() {
            return Ok(attr.unescape_value()?.into_owned());
        }
    }
    bail!(
        "missing '{}' attribute on <{}>",
        name,
        String::from_utf8_lossy(element.name().as_ref())
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0"?>
<softwarelist name="neogeo" description="SNK Neo-Geo cartridges">
    <software name="mslug">
        <description>Metal Slug - Super Vehicle-001</description>
        <year>1996</year>
        <publisher>Nazca</publisher>
        <part name="cart" interface="neo_cart">
            <dataarea name="maincpu" size="2097152">
                <rom loadflag="load16_word_swap" name="201-p1.p1" offset="0x000000" size="0x200000"/>
            </dataarea>
            <dataarea name="fixed" size="131072">
                <rom name="201-s1.s1" offset="0x000000" size="0x20000"/>
            </dataarea>
            <dataarea name="sprites" size="8388608">
                <rom loadflag="load16_byte" name="201-c1.c1" offset="0x000000" size="0x400000"/>
                <rom loadflag="load16_byte" name="201-c2.c2" offset="0x000001" size="0x400000"/>
            </dataarea>
        </part>
        <part name="extra" interface="neo_cart">
            <dataarea name="maincpu" size="16">
                <rom name="ignored.bin" offset="0x000000" size="0x10"/>
            </dataarea>
        </part>
    </software>
    <software name="nam1975">
        <description>NAM-1975</description>
        <part name="cart" interface="neo_cart">
            <dataarea name="ymsnd" size="1048576">
                <rom name="001-v11.v11" offset="0x000000" size="0x080000"/>
                <rom size="0x080000" offset="0x080000" loadflag="continue"/>
            </dataarea>
        </part>
    </software>
</softwarelist>
"#;

    #[test]
    fn test_parse_records() {
        let db = SoftwareDb::parse_str(SAMPLE).unwrap();
        assert_eq!(db.len(), 2);
        assert!(db.contains("mslug"));
        assert!(db.contains("nam1975"));
        assert!(!db.contains("mslug2"));

        let mslug = db.get("mslug").unwrap();
        assert_eq!(mslug.description, "Metal Slug - Super Vehicle-001");
        assert_eq!(mslug.areas.len(), 3);
        assert_eq!(mslug.areas[0].name, "maincpu");
        assert_eq!(
            mslug.areas[0].roms[0].load_flag.as_deref(),
            Some("load16_word_swap")
        );
        assert_eq!(mslug.areas[0].roms[0].offset.as_deref(), Some("0x000000"));
        assert_eq!(mslug.areas[2].roms.len(), 2);
    }

    #[test]
    fn test_first_part_only() {
        let db = SoftwareDb::parse_str(SAMPLE).unwrap();
        let mslug = db.get("mslug").unwrap();
        // The second <part> holds a maincpu area too; it must not show up.
        assert_eq!(
            mslug
                .areas
                .iter()
                .filter(|a| a.name == "maincpu")
                .count(),
            1
        );
        assert_eq!(mslug.areas[0].roms[0].name.as_deref(), Some("201-p1.p1"));
    }

    #[test]
    fn test_continue_entry_has_no_name() {
        let db = SoftwareDb::parse_str(SAMPLE).unwrap();
        let nam = db.get("nam1975").unwrap();
        let cont = &nam.areas[0].roms[1];
        assert_eq!(cont.name, None);
        assert_eq!(cont.load_flag.as_deref(), Some("continue"));
        assert_eq!(cont.size.as_deref(), Some("0x080000"));
    }

    #[test]
    fn test_missing_set_name_is_an_error() {
        assert!(
            SoftwareDb::parse_str("<softwarelist><software></software></softwarelist>").is_err()
        );
    }
}
