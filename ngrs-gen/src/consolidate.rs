//! Plans which source blobs are written, merged, or renamed into each
//! destination file.  This drives the extraction backend and is computed
//! independently of the layout generator.

use crate::rom_types::{Region, RomComponent};

/// Program chips smaller than this are merge candidates.
const MERGE_LIMIT: u64 = 0x100000;

/// First-position program dumps with this suffix are rewritten rather
/// than extracted in place.
pub const RAW_BINARY_SUFFIX: &str = ".bin";

/// One destination file: a single source blob, optionally with a second
/// blob concatenated after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolidationEntry {
    pub primary: String,
    pub secondary: Option<String>,
    pub rename_only: bool,
}

impl ConsolidationEntry {
    fn single(name: &str, rename_only: bool) -> Self {
        Self {
            primary: name.to_string(),
            secondary: None,
            rename_only,
        }
    }

    /// Every source blob this destination needs.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.secondary.as_deref())
    }
}

/// Walks the ROM components (metadata records are never destinations)
/// with a 1-based position counter.  An even-positioned program chip
/// under the merge limit folds into the previous destination.
///
/// This even-position test is deliberately not the layout generator's
/// concatenation test (chip count and combined size); the two heuristics
/// evolved separately and the driver reports when they disagree on a
/// title.
pub fn plan(components: &[RomComponent]) -> Vec<ConsolidationEntry> {
    let mut entries: Vec<ConsolidationEntry> = Vec::new();

    for (position, rom) in components.iter().enumerate().map(|(i, c)| (i + 1, c)) {
        // Continuations hold their place in the count but their bytes
        // already live in the predecessor's source blob.
        if rom.is_continuation {
            continue;
        }

        if position % 2 == 0
            && rom.region == Region::Program
            && rom.size_value() < MERGE_LIMIT
        {
            // Position 1 is never a continuation, so something has always
            // been emitted by the time an even position merges.
            let previous = entries
                .last_mut()
                .expect("merge candidate with no prior destination");
            previous.secondary = Some(rom.name.clone());
            previous.rename_only = false;
        } else if position == 1
            && rom.region == Region::Program
            && rom.name.ends_with(RAW_BINARY_SUFFIX)
        {
            entries.push(ConsolidationEntry::single(&rom.name, true));
        } else {
            entries.push(ConsolidationEntry::single(&rom.name, false));
        }
    }

    entries
}

/// Whether the plan merged any pair of sources into one destination.
pub fn merged_any(plan: &[ConsolidationEntry]) -> bool {
    plan.iter().any(|e| e.secondary.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rom_types::HexValue;

    fn hex(value: u64) -> HexValue {
        format!("{value:#x}").parse().unwrap()
    }

    fn component(region: Region, name: &str, size: u64) -> RomComponent {
        RomComponent {
            region,
            name: name.to_string(),
            size: Some(hex(size)),
            offset: Some(hex(0)),
            is_continuation: false,
        }
    }

    #[test]
    fn test_small_program_pair_merges() {
        let entries = plan(&[
            component(Region::Program, "202-p1.p1", 0x80000),
            component(Region::Program, "202-p2.p2", 0x80000),
            component(Region::FixedGraphics, "202-s1.s1", 0x20000),
        ]);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].primary, "202-p1.p1");
        assert_eq!(entries[0].secondary.as_deref(), Some("202-p2.p2"));
        assert!(!entries[0].rename_only);
        assert_eq!(entries[1].primary, "202-s1.s1");
        assert!(merged_any(&entries));
    }

    #[test]
    fn test_large_second_program_does_not_merge() {
        let entries = plan(&[
            component(Region::Program, "p1", 0x100000),
            component(Region::Program, "p2", 0x100000),
        ]);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].secondary, None);
        assert!(!merged_any(&entries));
    }

    #[test]
    fn test_odd_position_program_does_not_merge() {
        // Program chip at position 3: region and size match the merge
        // rule but the parity does not.
        let entries = plan(&[
            component(Region::FixedGraphics, "s1", 0x20000),
            component(Region::AudioProgram, "m1", 0x20000),
            component(Region::Program, "p1", 0x80000),
        ]);
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.secondary.is_none()));
    }

    #[test]
    fn test_rename_only_first_bin() {
        let entries = plan(&[
            component(Region::Program, "098-p1.bin", 0x100000),
            component(Region::FixedGraphics, "098-s1.s1", 0x20000),
        ]);
        assert!(entries[0].rename_only);
        assert_eq!(entries[0].secondary, None);
        assert!(!entries[1].rename_only);
    }

    #[test]
    fn test_rename_only_first_position_only() {
        let entries = plan(&[
            component(Region::FixedGraphics, "s1", 0x20000),
            component(Region::AudioProgram, "m1.bin", 0x20000),
            component(Region::Program, "p2.bin", 0x200000),
        ]);
        assert!(entries.iter().all(|e| !e.rename_only));
    }

    #[test]
    fn test_continuations_counted_but_not_emitted() {
        let mut cont = component(Region::AudioSamples, "v1", 0x80000);
        cont.is_continuation = true;
        // v1's continuation occupies position 2, pushing the program chip
        // to (odd) position 3: no merge.
        let entries = plan(&[
            component(Region::AudioSamples, "v1", 0x80000),
            cont.clone(),
            component(Region::Program, "p2", 0x80000),
        ]);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].primary, "v1");
        assert_eq!(entries[1].primary, "p2");
        assert!(!merged_any(&entries));

        // Without the continuation the program chip lands on position 2
        // and merges.
        let entries = plan(&[
            component(Region::AudioSamples, "v1", 0x80000),
            component(Region::Program, "p2", 0x80000),
        ]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].secondary.as_deref(), Some("p2"));
    }

    #[test]
    fn test_heuristics_can_disagree() {
        // Three program chips where the second is small: the planner
        // merges a pair, but the layout generator's count-of-two test
        // fails.  Both behaviors are intentional; the driver only warns.
        let entries = plan(&[
            component(Region::Program, "p1", 0x100000),
            component(Region::Program, "p2", 0x80000),
            component(Region::Program, "p3", 0x100000),
        ]);
        assert!(merged_any(&entries));
    }
}
