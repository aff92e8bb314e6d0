//src/assignments.rs

use ahash::AHashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{IoContext, PipelineError, Result};

/// read id -> component id
pub type ReadComponentMap = AHashMap<String, String>;
/// component id -> lca label
pub type ComponentLcaMap = AHashMap<String, String>;

/// Parses a read→component file, one whitespace-separated row per read:
/// ```text
/// <read_id> <metanode> <component_id> [...]
/// ```
/// Rows whose component is one of `unassigned_markers` are ignored, so those reads count as
/// having no assignment. A repeated read id keeps the last component it was given.
/// Blank lines are skipped; any other row with fewer than 3 columns is an error.
pub fn parse_read_components<P: AsRef<Path>>(
    filepath: P,
    unassigned_markers: &[impl AsRef<str>],
) -> Result<ReadComponentMap> {
    let path = filepath.as_ref();
    log::debug!("Reading read-->component from {}", path.display());
    let file = File::open(path).with_path(path)?;
    let reader = BufReader::new(file);

    let mut read_components = ReadComponentMap::new();
    for (lineno, line_result) in reader.lines().enumerate() {
        let line = line_result.with_path(path)?;
        let mut fields = line.split_whitespace();

        let Some(read_id) = fields.next() else {
            continue;
        };
        let Some(component_id) = fields.nth(1) else {
            return Err(PipelineError::MalformedAssignment {
                path: path.to_path_buf(),
                line: lineno + 1,
            });
        };

        if unassigned_markers.iter().any(|m| m.as_ref() == component_id) {
            continue;
        }
        read_components.insert(read_id.to_string(), component_id.to_string());
    }
    Ok(read_components)
}

/// Parses a component→lca file:
/// ```text
/// <component_id> <lca>
/// ```
/// Rows that do not have exactly two columns are skipped.
pub fn parse_component_lca<P: AsRef<Path>>(filepath: P) -> Result<ComponentLcaMap> {
    let path = filepath.as_ref();
    log::debug!("Reading components LCA assignment from {}", path.display());
    let file = File::open(path).with_path(path)?;
    let reader = BufReader::new(file);

    let mut component_lca = ComponentLcaMap::new();
    for line_result in reader.lines() {
        let line = line_result.with_path(path)?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        if let [component_id, lca] = parts[..] {
            component_lca.insert(component_id.to_string(), lca.to_string());
        }
    }
    Ok(component_lca)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UNASSIGNED_MARKERS;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let p = dir.path().join(name);
        fs::write(&p, content).unwrap();
        p
    }

    #[test]
    fn unassigned_reads_are_excluded() {
        let dir = TempDir::new().unwrap();
        let p = write(&dir, "rc.tsv", "r1\t10\tc1\nr2 11 c1\nr3\t12\tNULL\n\nr4\t13\tc2\textra\n");
        let map = parse_read_components(&p, UNASSIGNED_MARKERS).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map["r1"], "c1");
        assert_eq!(map["r2"], "c1");
        assert_eq!(map["r4"], "c2");
        assert!(!map.contains_key("r3"));
    }

    #[test]
    fn last_row_wins_for_repeated_reads() {
        let dir = TempDir::new().unwrap();
        let p = write(&dir, "rc.tsv", "r1 0 c1\nr1 0 c2\nr2 0 c1\nr2 0 NULL\n");
        let map = parse_read_components(&p, UNASSIGNED_MARKERS).unwrap();
        assert_eq!(map["r1"], "c2");
        // a marker row is not an assignment, so it does not override the earlier one
        assert_eq!(map["r2"], "c1");
    }

    #[test]
    fn both_default_markers_mean_unassigned() {
        let dir = TempDir::new().unwrap();
        let p = write(&dir, "rc.tsv", "r1 0 c1\nr2 0 unassigned\nr3 0 NULL\n");
        let map = parse_read_components(&p, UNASSIGNED_MARKERS).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["r1"], "c1");
    }

    #[test]
    fn custom_marker_is_honoured() {
        let dir = TempDir::new().unwrap();
        let p = write(&dir, "rc.tsv", "r1 0 c1\nr3 0 unassigned\nr4 0 NULL\nr5 0 skip\n");
        let map = parse_read_components(&p, &["skip"]).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map["r3"], "unassigned");
        assert!(!map.contains_key("r5"));
    }

    #[test]
    fn short_assignment_row_is_fatal() {
        let dir = TempDir::new().unwrap();
        let p = write(&dir, "rc.tsv", "r1 0 c1\nr2 0\n");
        match parse_read_components(&p, UNASSIGNED_MARKERS) {
            Err(PipelineError::MalformedAssignment { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected MalformedAssignment, got {other:?}"),
        }
    }

    #[test]
    fn missing_files_are_fatal() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.tsv");
        assert!(matches!(
            parse_read_components(&missing, UNASSIGNED_MARKERS),
            Err(PipelineError::Io { .. })
        ));
        assert!(matches!(
            parse_component_lca(&missing),
            Err(PipelineError::Io { .. })
        ));
    }

    #[test]
    fn lca_rows_need_exactly_two_columns() {
        let dir = TempDir::new().unwrap();
        let p = write(&dir, "lca.tsv", "c1\ttaxonX\nc2\nc3 a b\n\nc4 Bacteria;Firmicutes\n");
        let map = parse_component_lca(&p).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["c1"], "taxonX");
        assert_eq!(map["c4"], "Bacteria;Firmicutes");
    }
}
