use std::str::FromStr;
use thiserror::Error;

/// Hardware bus a ROM component attaches to, plus the two metadata
/// pseudo-regions every normalized title starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Program,
    FixedGraphics,
    SpriteGraphics,
    AudioProgram,
    AudioCrypt,
    AudioSamples,
    /// Delta-T PCM samples (`ymsnd.deltat`).  Copied with the set, never
    /// given a descriptor row - the core has no separate delta-T bus.
    AudioSamplesAlt,
    /// Protection MCU dump.  Same treatment as delta-T samples.
    Mcu,
    TitleMeta,
    IdMeta,
}

impl Region {
    /// Maps a softlist `<dataarea>` name to a region.
    pub fn from_dataarea(name: &str) -> Option<Self> {
        match name {
            "maincpu" => Some(Region::Program),
            "fixed" => Some(Region::FixedGraphics),
            "sprites" => Some(Region::SpriteGraphics),
            "audiocpu" => Some(Region::AudioProgram),
            "audiocrypt" => Some(Region::AudioCrypt),
            "ymsnd" => Some(Region::AudioSamples),
            "ymsnd.deltat" => Some(Region::AudioSamplesAlt),
            "mcu" => Some(Region::Mcu),
            _ => None,
        }
    }

    pub fn is_meta(&self) -> bool {
        matches!(self, Region::TitleMeta | Region::IdMeta)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid hex literal '{0}'")]
pub struct HexParseError(String);

/// A hexadecimal literal from the database, parsed but keeping its source
/// spelling.  The descriptor reproduces the spelling wherever the value is
/// not recomputed, so both forms travel together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexValue {
    literal: String,
    value: u64,
}

impl HexValue {
    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn literal(&self) -> &str {
        &self.literal
    }
}

impl FromStr for HexValue {
    type Err = HexParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.is_empty() {
            return Err(HexParseError(s.to_string()));
        }
        let value =
            u64::from_str_radix(digits, 16).map_err(|_| HexParseError(s.to_string()))?;
        Ok(Self {
            literal: s.to_string(),
            value,
        })
    }
}

/// One ROM chip reference within a title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomComponent {
    pub region: Region,
    pub name: String,
    /// Always present for ROM components; absent for the two metadata
    /// entries.  The normalizer enforces this.
    pub size: Option<HexValue>,
    pub offset: Option<HexValue>,
    /// These bytes extend the previous chip rather than starting a new
    /// one.  Continuations share the predecessor's name.
    pub is_continuation: bool,
}

impl RomComponent {
    pub fn meta(region: Region, name: String) -> Self {
        Self {
            region,
            name,
            size: None,
            offset: None,
            is_continuation: false,
        }
    }

    pub fn size_value(&self) -> u64 {
        self.size.as_ref().map(HexValue::value).unwrap_or(0)
    }

    pub fn size_literal(&self) -> &str {
        self.size.as_ref().map(HexValue::literal).unwrap_or("0")
    }

    pub fn offset_value(&self) -> Option<u64> {
        self.offset.as_ref().map(HexValue::value)
    }

    pub fn offset_literal(&self) -> &str {
        self.offset.as_ref().map(HexValue::literal).unwrap_or("0")
    }
}

/// A title's normalized component list.  The first two entries are always
/// the set identifier and the display title, in that order; ROM components
/// follow in database order.
#[derive(Debug, Clone)]
pub struct NormalizedTitle {
    pub components: Vec<RomComponent>,
}

impl NormalizedTitle {
    pub fn id(&self) -> &str {
        &self.components[0].name
    }

    pub fn display(&self) -> &str {
        &self.components[1].name
    }

    pub fn rom_components(&self) -> &[RomComponent] {
        &self.components[2..]
    }
}
