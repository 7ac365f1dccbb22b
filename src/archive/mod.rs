pub mod format;
mod reader;
mod writer;

pub use format::{
    read_i32, read_string, write_i32, write_string, CompressType, FILE_RECORD_SIZE,
    FOLDER_RECORD_SIZE, MAGIC,
};
pub use reader::ArchiveReader;
pub use writer::ArchiveWriter;
