//! Properties of the managed-region rewrite over varied documents

use pretty_assertions::assert_eq;
use sponsor_sync::models::RegionMarkers;
use sponsor_sync::output::{apply_region, RegionUpdate, RegionWriter};

fn markers() -> RegionMarkers {
    RegionMarkers {
        start: "<!-- S -->".to_string(),
        end: "<!-- E -->".to_string(),
    }
}

const SURROUNDINGS: &[(&str, &str)] = &[
    ("", ""),
    ("# Title\n", "\n"),
    ("\n\n\n", "   "),
    ("emoji ❤️ | pipes |\r\n", "\r\n tail with <!-- other comment -->"),
    ("<!-- E --> stray end before the region\n", "after\n"),
    ("line without newline", "trailing <!-- S --> start after region"),
];

#[test_log::test]
fn test_outside_bytes_preserved_for_varied_documents() {
    let markers = markers();

    for (before, after) in SURROUNDINGS {
        let original = format!("{before}{}\nold content\n{}{after}", markers.start, markers.end);
        let (updated, outcome) = apply_region(Some(&original), "fresh", &markers);

        assert_eq!(outcome, RegionUpdate::Replaced, "document: {original:?}");
        assert_eq!(
            updated,
            format!("{before}{}\nfresh\n{}{after}", markers.start, markers.end)
        );
    }
}

#[test_log::test]
fn test_second_update_is_a_no_op() {
    let markers = markers();
    let contents = ["", "one line", "multi\nline\n| a | b |"];

    for (before, after) in SURROUNDINGS {
        for content in contents {
            let original = format!("{before}{after}");
            let (first, _) = apply_region(Some(&original), content, &markers);
            let (second, _) = apply_region(Some(&first), content, &markers);
            assert_eq!(first, second);
        }
    }
}

#[test_log::test]
fn test_writer_idempotent_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("DOC.md");
    std::fs::write(&path, "intro\n<!-- S -->\n<!-- E -->\noutro\n").unwrap();

    let writer = RegionWriter::new(&path, markers());
    writer.update("rows").unwrap();
    let first = std::fs::read(&path).unwrap();
    writer.update("rows").unwrap();
    let second = std::fs::read(&path).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        String::from_utf8(second).unwrap(),
        "intro\n<!-- S -->\nrows\n<!-- E -->\noutro\n"
    );
}
