use crate::error::{Result, VfsError};
use std::io::{Read, Write};

/// Magic literal at the start of every archive
pub const MAGIC: [u8; 4] = *b"VFS2";

/// Folder record size in bytes: hash, id, parent_id, unk1, file_id_start
pub const FOLDER_RECORD_SIZE: usize = 20;

/// File record size in bytes: hash, id, compress_type, parent_id, offset, size
pub const FILE_RECORD_SIZE: usize = 24;

/// Per-file payload encoding selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum CompressType {
    /// Payload stored verbatim
    Stored = 0,
    /// DEFLATE (zlib) payload, preceded by an i32 decompressed-size prefix
    Deflate = 2,
}

impl CompressType {
    pub fn from_i32(value: i32) -> Result<Self> {
        match value {
            0 => Ok(Self::Stored),
            2 => Ok(Self::Deflate),
            _ => Err(VfsError::UnknownCompression(value)),
        }
    }

    /// Encoding used when packing a file of this name.
    ///
    /// `.at9` audio is already compressed and is stored as-is.
    pub fn for_file_name(name: &str) -> Self {
        if name.ends_with(".at9") {
            Self::Stored
        } else {
            Self::Deflate
        }
    }
}

/// Read a 4-byte little-endian signed integer
pub fn read_i32<R: Read>(mut reader: R) -> Result<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

/// Write a 4-byte little-endian signed integer
pub fn write_i32<W: Write>(mut writer: W, value: i32) -> Result<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

/// Read a length-prefixed UTF-8 string (i32 byte count, then the bytes)
pub fn read_string<R: Read>(mut reader: R) -> Result<String> {
    let len = read_i32(&mut reader)?;
    if len < 0 {
        return Err(VfsError::InvalidFormat(format!(
            "negative string length {len}"
        )));
    }

    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf)?;
    String::from_utf8(buf)
        .map_err(|e| VfsError::InvalidFormat(format!("invalid UTF-8 in name: {e}")))
}

/// Write a length-prefixed UTF-8 string
pub fn write_string<W: Write>(mut writer: W, value: &str) -> Result<()> {
    write_i32(&mut writer, value.len() as i32)?;
    writer.write_all(value.as_bytes())?;
    Ok(())
}
