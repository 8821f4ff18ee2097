//! Filesystem scans over a proposal tree.
//!
//! Everything here is read-only. Scans return fresh snapshots; callers
//! decide how a snapshot replaces their current state.

use crate::types::NodeId;
use dspw_common::{ProposalError, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Node name encoded by a descriptor filename.
///
/// Matches `*.<extension>` and returns the characters before the first
/// occurrence of `.<extension>`, so `node-1.foo.bar.sls` yields
/// `node-1.foo.bar`. Hidden files never match.
pub fn descriptor_stem<'a>(file_name: &'a str, extension: &str) -> Option<&'a str> {
    if file_name.starts_with('.') {
        return None;
    }

    let suffix = format!(".{}", extension);
    if !file_name.ends_with(&suffix) {
        return None;
    }

    let stem = &file_name[..file_name.find(&suffix)?];
    if stem.is_empty() {
        None
    } else {
        Some(stem)
    }
}

/// Scan `dir` for `<node>.<extension>` descriptor files.
///
/// A missing or unreadable directory is an error, not an empty result.
pub fn scan_descriptors(dir: &Path, extension: &str) -> Result<BTreeSet<NodeId>> {
    let entries = fs::read_dir(dir).map_err(|e| ProposalError::Io {
        message: format!("Failed to read descriptor directory {}: {}", dir.display(), e),
    })?;

    let mut nodes = BTreeSet::new();

    for entry in entries {
        let entry = entry.map_err(|e| ProposalError::Io {
            message: format!("Failed to read entry in {}: {}", dir.display(), e),
        })?;

        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            tracing::debug!("Skipping non UTF-8 descriptor name in {}", dir.display());
            continue;
        };

        if let Some(stem) = descriptor_stem(file_name, extension) {
            nodes.insert(NodeId::new(stem)?);
        }
    }

    tracing::debug!("Scanned {}: {} descriptor(s)", dir.display(), nodes.len());

    Ok(nodes)
}

/// Directories directly under `root` whose name starts with `prefix`,
/// sorted by name.
pub fn scan_role_dirs(root: &Path, prefix: &str) -> Result<Vec<(String, PathBuf)>> {
    let entries = fs::read_dir(root).map_err(|e| ProposalError::Io {
        message: format!("Failed to read proposal directory {}: {}", root.display(), e),
    })?;

    let mut dirs = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|e| ProposalError::Io {
            message: format!("Failed to read entry in {}: {}", root.display(), e),
        })?;

        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        if let Some(name) = entry.file_name().to_str() {
            if name.starts_with(prefix) {
                dirs.push((name.to_string(), path));
            }
        }
    }

    dirs.sort();

    Ok(dirs)
}

/// Whether `<dir>/<node>.<extension>` exists as a regular file
pub fn descriptor_exists(dir: &Path, node: &NodeId, extension: &str) -> bool {
    dir.join(format!("{}.{}", node, extension)).is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_descriptor_stem() {
        assert_eq!(descriptor_stem("node1.sls", "sls"), Some("node1"));
        assert_eq!(
            descriptor_stem("node-1.foo.bar.sls", "sls"),
            Some("node-1.foo.bar")
        );
        assert_eq!(descriptor_stem("a.sls.sls", "sls"), Some("a"));
        assert_eq!(descriptor_stem("node1.yml", "sls"), None);
        assert_eq!(descriptor_stem("node1.sls.bak", "sls"), None);
        assert_eq!(descriptor_stem(".hidden.sls", "sls"), None);
        assert_eq!(descriptor_stem(".sls", "sls"), None);
    }

    #[test]
    fn test_scan_descriptors_sorted_and_filtered() {
        let temp_dir = tempdir().unwrap();
        for name in ["node3.sls", "node1.sls", "node2.sls", "README", "node4.yml"] {
            fs::write(temp_dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(temp_dir.path().join("subdir.sls")).unwrap();

        let nodes = scan_descriptors(temp_dir.path(), "sls").unwrap();
        let names: Vec<&str> = nodes.iter().map(|n| n.as_str()).collect();

        assert_eq!(names, vec!["node1", "node2", "node3"]);
    }

    #[test]
    fn test_scan_descriptors_collapses_duplicate_stems() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("node1.sls"), b"").unwrap();
        fs::write(temp_dir.path().join("node1.sls.sls"), b"").unwrap();

        let nodes = scan_descriptors(temp_dir.path(), "sls").unwrap();
        assert_eq!(nodes.len(), 1);
        assert!(nodes.contains("node1"));
    }

    #[test]
    fn test_scan_missing_directory_is_an_error() {
        let temp_dir = tempdir().unwrap();
        let missing = temp_dir.path().join("nope");

        assert!(matches!(
            scan_descriptors(&missing, "sls"),
            Err(ProposalError::Io { .. })
        ));
        assert!(matches!(
            scan_role_dirs(&missing, "role-"),
            Err(ProposalError::Io { .. })
        ));
    }

    #[test]
    fn test_scan_role_dirs() {
        let temp_dir = tempdir().unwrap();
        fs::create_dir(temp_dir.path().join("role-mon")).unwrap();
        fs::create_dir(temp_dir.path().join("role-admin")).unwrap();
        fs::create_dir(temp_dir.path().join("cluster-ceph")).unwrap();
        fs::write(temp_dir.path().join("role-file"), b"").unwrap();

        let dirs = scan_role_dirs(temp_dir.path(), "role-").unwrap();
        let names: Vec<&str> = dirs.iter().map(|(name, _)| name.as_str()).collect();

        assert_eq!(names, vec!["role-admin", "role-mon"]);
        assert_eq!(dirs[0].1, temp_dir.path().join("role-admin"));
    }

    #[test]
    fn test_descriptor_exists() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("node1.yml"), b"").unwrap();
        fs::create_dir(temp_dir.path().join("nodeX.yml")).unwrap();

        let node1 = NodeId::new("node1").unwrap();
        let node2 = NodeId::new("node2").unwrap();
        let node_x = NodeId::new("nodeX").unwrap();

        assert!(descriptor_exists(temp_dir.path(), &node1, "yml"));
        assert!(!descriptor_exists(temp_dir.path(), &node2, "yml"));
        assert!(!descriptor_exists(temp_dir.path(), &node_x, "yml"));
        assert!(!descriptor_exists(&temp_dir.path().join("missing"), &node1, "yml"));
    }
}
