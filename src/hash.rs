//! Name-hash computation for archive paths.
//!
//! Every entry in a VFS2 archive is identified by a 30-bit hash of its full
//! lower-cased path, with bit 30 always set. External consumers reference
//! files by this hash rather than through the name table, so the exact bit
//! pattern (including 32-bit wrap-around during the multiply-add loop) is
//! part of the format.

use std::borrow::Cow;

/// Hash a path into its stable archive identity.
///
/// Paths hash case-insensitively and are rooted: a missing leading `/` is
/// prepended before hashing. The result always has bit 30 set and no bits
/// above it.
pub fn hash_name(path: &str) -> u32 {
    let rooted = if path.starts_with('/') {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(format!("/{path}"))
    };

    let mut hashed: u32 = 5381;
    for c in rooted.to_lowercase().chars() {
        hashed = hashed.wrapping_mul(33).wrapping_add(c as u32);
    }

    (hashed & 0x3FFF_FFFF) | 0x4000_0000
}
