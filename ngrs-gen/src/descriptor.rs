//! Serializes the per-title layouts as the `romsets.xml` descriptor the
//! core's loader consumes.

use crate::layout::TitleLayout;
use anyhow::{Context, Result};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

pub const DESCRIPTOR_FILE: &str = "romsets.xml";

/// Writes the descriptor under `output_dir` and returns its path.  Titles
/// and rows appear exactly in the order given; nothing is sorted here.
pub fn write_romsets(output_dir: &Path, titles: &[TitleLayout]) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output folder {}", output_dir.display()))?;
    let path = output_dir.join(DESCRIPTOR_FILE);
    let file = File::create(&path)
        .with_context(|| format!("Failed to create descriptor {}", path.display()))?;
    let mut writer = Writer::new_with_indent(BufWriter::new(file), b' ', 4);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("romsets")))?;

    for title in titles {
        let mut romset = BytesStart::new("romset");
        romset.push_attribute(("name", title.id.as_str()));
        romset.push_attribute(("altname", title.display.as_str()));
        writer.write_event(Event::Start(romset))?;

        for entry in &title.entries {
            let mut row = BytesStart::new("file");
            row.push_attribute(("name", entry.name.as_str()));
            let code = entry.code.to_string();
            row.push_attribute(("type", code.as_str()));
            // The security module has no slot; its index attribute is
            // present but empty.
            let index = entry.index.map(|i| i.to_string()).unwrap_or_default();
            row.push_attribute(("index", index.as_str()));
            if let Some(offset) = &entry.offset {
                row.push_attribute(("offset", offset.as_str()));
            }
            row.push_attribute(("size", entry.size.as_str()));
            writer.write_event(Event::Empty(row))?;
        }

        writer.write_event(Event::End(BytesEnd::new("romset")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("romsets")))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutEntry;

    fn sample_layout() -> TitleLayout {
        TitleLayout {
            id: "mslug".to_string(),
            display: "Metal Slug - Super Vehicle-001".to_string(),
            entries: vec![
                LayoutEntry {
                    name: "201-p1.p1".to_string(),
                    code: 'P',
                    index: Some(4),
                    offset: Some("0x000000".to_string()),
                    size: "0x200000".to_string(),
                },
                LayoutEntry {
                    name: "ka.neo-sma".to_string(),
                    code: 'P',
                    index: None,
                    offset: None,
                    size: "0x40000".to_string(),
                },
            ],
            program_concatenated: false,
        }
    }

    #[test]
    fn test_descriptor_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_romsets(dir.path(), &[sample_layout()]).unwrap();
        let text = fs::read_to_string(&path).unwrap();

        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"utf8\"?>"));
        assert!(
            text.contains("<romset name=\"mslug\" altname=\"Metal Slug - Super Vehicle-001\">")
        );
        assert!(text.contains(
            "<file name=\"201-p1.p1\" type=\"P\" index=\"4\" offset=\"0x000000\" size=\"0x200000\"/>"
        ));
        // Security rows: empty index, no offset attribute.
        assert!(text.contains("<file name=\"ka.neo-sma\" type=\"P\" index=\"\" size=\"0x40000\"/>"));
        assert!(text.ends_with("</romsets>"));
    }

    #[test]
    fn test_descriptor_is_deterministic() {
        let dir_a = tempfile::tempdir().unwrap();
        let dir_b = tempfile::tempdir().unwrap();
        let layouts = [sample_layout()];
        let a = write_romsets(dir_a.path(), &layouts).unwrap();
        let b = write_romsets(dir_b.path(), &layouts).unwrap();
        assert_eq!(fs::read(a).unwrap(), fs::read(b).unwrap());
    }
}
