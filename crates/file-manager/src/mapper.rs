//! Selected files to nested asset tree.
//!
//! Flat selections become a flat list of file assets. When any file carries
//! a relative path, directory nodes are created for every path segment and
//! shared between files of the same directory.

use ledgerdrive_protocol::{AssetTreeNode, FileAsset, Permission};
use ledgerdrive_transfer::expected_chunk_count;
use tracing::debug;

use crate::selected::SelectedFile;
use crate::types::MappedSelection;

/// Converts selected files into the backend's nested asset schema.
pub fn map_selected_files(files: Vec<SelectedFile>) -> MappedSelection {
    let total_bytes = files.iter().map(|f| f.size).sum();

    if files.iter().all(|f| f.relative_path.is_empty()) {
        let assets = files.iter().map(|f| AssetTreeNode::file(file_asset(f))).collect();
        return MappedSelection {
            assets,
            files,
            total_bytes,
        };
    }

    let (assets, order) = {
        // Unique directory sequences in first-seen order, with their files.
        let mut groups: Vec<(Vec<&str>, Vec<usize>)> = Vec::new();
        for (index, file) in files.iter().enumerate() {
            let segments = directory_segments(&file.relative_path);
            match groups.iter_mut().find(|(s, _)| *s == segments) {
                Some((_, members)) => members.push(index),
                None => groups.push((segments, vec![index])),
            }
        }

        let mut assets = Vec::new();
        let mut order = Vec::with_capacity(files.len());
        for (segments, members) in &groups {
            let level = descend(&mut assets, segments);
            for &index in members {
                level.push(AssetTreeNode::file(file_asset(&files[index])));
                order.push(index);
            }
        }

        debug!(
            directory_paths = groups.len(),
            files = order.len(),
            total_bytes,
            "mapped selection to asset tree"
        );
        (assets, order)
    };

    let mut slots: Vec<Option<SelectedFile>> = files.into_iter().map(Some).collect();
    let files = order.iter().filter_map(|&i| slots[i].take()).collect();

    MappedSelection {
        assets,
        files,
        total_bytes,
    }
}

/// Directory names of a relative path, without the trailing file name.
fn directory_segments(relative_path: &str) -> Vec<&str> {
    if relative_path.is_empty() {
        return Vec::new();
    }
    let mut segments: Vec<&str> = relative_path.split('/').collect();
    segments.pop();
    segments
}

/// Walks `segments` down from `level`, creating missing directories, and
/// returns the children list of the last one.
fn descend<'t>(
    mut level: &'t mut Vec<AssetTreeNode>,
    segments: &[&str],
) -> &'t mut Vec<AssetTreeNode> {
    for segment in segments {
        let position = match level
            .iter()
            .position(|node| node.directory_name() == Some(*segment))
        {
            Some(position) => position,
            None => {
                level.push(AssetTreeNode::directory(*segment));
                level.len() - 1
            }
        };
        level = &mut level[position].children;
    }
    level
}

fn file_asset(file: &SelectedFile) -> FileAsset {
    FileAsset {
        name: file.name.clone(),
        extension: file.extension().to_string(),
        size: file.size,
        permission: Permission::Public,
        chunk_count: expected_chunk_count(file.size),
        mime_type: file.mime_type.clone(),
        origin_path: file.relative_path.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerdrive_protocol::AssetDescriptor;

    fn file(name: &str, path: &str, size: usize) -> SelectedFile {
        SelectedFile::from_bytes(name, path, "text/plain", vec![0u8; size])
    }

    /// Collects `(ancestor directories, file name)` for every leaf.
    fn leaves(
        nodes: &[AssetTreeNode],
        prefix: &mut Vec<String>,
        out: &mut Vec<(Vec<String>, String)>,
    ) {
        for node in nodes {
            match &node.asset {
                AssetDescriptor::File(f) => {
                    assert!(node.children.is_empty());
                    out.push((prefix.clone(), f.name.clone()));
                }
                AssetDescriptor::Directory(d) => {
                    prefix.push(d.name.clone());
                    leaves(&node.children, prefix, out);
                    prefix.pop();
                }
            }
        }
    }

    #[test]
    fn flat_selection_stays_flat() {
        let mapped = map_selected_files(vec![
            file("one.txt", "", 500_000),
            file("two.bin", "", 1_800_000),
            file("three.md", "", 100_000),
        ]);

        assert_eq!(mapped.assets.len(), 3);
        assert!(mapped.assets.iter().all(|n| n.directory_name().is_none()));
        let names: Vec<&str> = mapped.assets.iter().map(|n| n.asset.name()).collect();
        assert_eq!(names, vec!["one.txt", "two.bin", "three.md"]);
        let file_names: Vec<&str> = mapped.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(file_names, names);
        assert_eq!(mapped.total_bytes, 2_400_000);

        let two = mapped.assets[1].as_file().unwrap();
        assert_eq!(two.chunk_count, 2);
        assert_eq!(two.extension, "bin");
        assert_eq!(two.origin_path, "");
    }

    #[test]
    fn sibling_directories_share_parent() {
        let mapped = map_selected_files(vec![
            file("f1.txt", "a/b/f1.txt", 3),
            file("f2.txt", "a/c/f2.txt", 4),
        ]);

        assert_eq!(mapped.assets.len(), 1);
        let a = &mapped.assets[0];
        assert_eq!(a.directory_name(), Some("a"));
        assert_eq!(a.children.len(), 2);
        assert_eq!(a.children[0].directory_name(), Some("b"));
        assert_eq!(a.children[1].directory_name(), Some("c"));
        assert_eq!(a.children[0].children.len(), 1);
        assert_eq!(a.children[0].children[0].asset.name(), "f1.txt");
        assert_eq!(a.children[1].children[0].asset.name(), "f2.txt");
        assert_eq!(mapped.total_bytes, 7);
    }

    #[test]
    fn leaf_ancestry_reconstructs_paths() {
        let selection = vec![
            file("x.png", "root/img/x.png", 1),
            file("y.png", "root/img/y.png", 1),
            file("readme", "root/readme", 1),
            file("deep.txt", "root/img/raw/deep.txt", 1),
            file("other.txt", "second/other.txt", 1),
        ];
        let expected: Vec<String> = selection.iter().map(|f| f.relative_path.clone()).collect();

        let mapped = map_selected_files(selection);

        let mut out = Vec::new();
        leaves(&mapped.assets, &mut Vec::new(), &mut out);
        let mut rebuilt: Vec<String> = out
            .iter()
            .map(|(dirs, name)| format!("{}/{}", dirs.join("/"), name))
            .collect();
        rebuilt.sort();
        let mut expected_sorted = expected;
        expected_sorted.sort();
        assert_eq!(rebuilt, expected_sorted);

        // Files are listed in the order their leaves were attached.
        let order: Vec<&str> = mapped.files.iter().map(|f| f.relative_path.as_str()).collect();
        assert_eq!(
            order,
            vec![
                "root/img/x.png",
                "root/img/y.png",
                "root/readme",
                "root/img/raw/deep.txt",
                "second/other.txt",
            ]
        );
    }

    #[test]
    fn directory_match_is_case_sensitive() {
        let mapped = map_selected_files(vec![
            file("a.txt", "Docs/a.txt", 1),
            file("b.txt", "docs/b.txt", 1),
        ]);
        let names: Vec<Option<&str>> = mapped.assets.iter().map(|n| n.directory_name()).collect();
        assert_eq!(names, vec![Some("Docs"), Some("docs")]);
    }

    #[test]
    fn flat_file_in_mixed_selection_lands_at_root() {
        let mapped = map_selected_files(vec![
            file("loose.txt", "", 2),
            file("inner.txt", "dir/inner.txt", 3),
        ]);
        assert_eq!(mapped.assets.len(), 2);
        assert_eq!(mapped.assets[0].asset.name(), "loose.txt");
        assert_eq!(mapped.assets[1].directory_name(), Some("dir"));
        assert_eq!(mapped.files.len(), 2);
    }

    #[test]
    fn zero_byte_file_has_no_chunks() {
        let mapped = map_selected_files(vec![file("empty", "", 0)]);
        assert_eq!(mapped.assets[0].as_file().unwrap().chunk_count, 0);
        assert_eq!(mapped.total_bytes, 0);
    }

    #[test]
    fn empty_selection() {
        let mapped = map_selected_files(Vec::new());
        assert!(mapped.assets.is_empty());
        assert!(mapped.files.is_empty());
    }
}
