//! Carries name hashes forward from a previously packed archive.
//!
//! External consumers reference files by name hash, so repacking a tree
//! whose hashes came out differently (for instance across a hashing
//! revision) would break those references. This pass pins each colliding
//! file name to the hash the previous archive stored.

use crate::tree::VfsTree;
use std::collections::HashMap;
use tracing::info;

/// Overwrite each file's hash with the one a previous archive stored under
/// the same name, when they differ. Returns the number of files changed.
pub fn carry_forward_hashes(tree: &mut VfsTree, previous: &VfsTree) -> usize {
    let old_hashes: HashMap<&str, u32> = previous
        .files
        .iter()
        .map(|f| (f.name.as_str(), f.name_hash))
        .collect();

    let mut changed = 0;
    for file in &mut tree.files {
        if let Some(&old) = old_hashes.get(file.name.as_str()) {
            if old != file.name_hash {
                info!(name = %file.name, old_hash = old, "carrying forward previous name hash");
                file.name_hash = old;
                changed += 1;
            }
        }
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash_name;
    use crate::tree::NO_PARENT;

    fn tree_with_file(name: &str, name_hash: u32) -> VfsTree {
        let mut tree = VfsTree::default();
        let root = tree.add_folder("", NO_PARENT, hash_name(""));
        let id = tree.add_file(name, root, 0) as usize;
        tree.files[id].name_hash = name_hash;
        tree.resolve_relations().unwrap();
        tree
    }

    #[test]
    fn test_colliding_name_takes_old_hash() {
        let old = tree_with_file("a.txt", 0x4000_0001);
        let mut fresh = tree_with_file("a.txt", 0x4000_0002);

        assert_eq!(carry_forward_hashes(&mut fresh, &old), 1);
        assert_eq!(fresh.files[0].name_hash, 0x4000_0001);
    }

    #[test]
    fn test_absent_name_keeps_fresh_hash() {
        let old = tree_with_file("a.txt", 0x4000_0001);
        let mut fresh = tree_with_file("b.txt", 0x4000_0002);

        assert_eq!(carry_forward_hashes(&mut fresh, &old), 0);
        assert_eq!(fresh.files[0].name_hash, 0x4000_0002);
    }

    #[test]
    fn test_equal_hash_counts_as_unchanged() {
        let old = tree_with_file("a.txt", 0x4000_0001);
        let mut fresh = tree_with_file("a.txt", 0x4000_0001);

        assert_eq!(carry_forward_hashes(&mut fresh, &old), 0);
    }
}
