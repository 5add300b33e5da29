#![forbid(unsafe_code)]

use std::io::{Read, Write};

use crate::yuf::error::{YufError, YufResult};
use crate::yuf::io::{
    read_exact, read_f32, read_u16, read_u32, read_u64, write_f32, write_u16, write_u32, write_u64,
};

/// Yuffin header magic.
pub const MAGIC: [u8; 6] = *b"Yuffin";

/// Magic preceding every data block.
pub const BLOCK_MAGIC: [u8; 4] = *b"ZBIR";

/// Format version written by this codec.
pub const VERSION: f32 = 3.1;

/// Oldest major version read without a compatibility warning.
pub const SUPPORTED_MAJOR: i32 = 3;

/// The file index and every data block start on this boundary. The directory
/// table does not; it begins immediately after the header.
pub const ALIGNMENT: u64 = 16;

/// Data-block start offsets must stay strictly below this (the index stores
/// them in 32 bits).
pub const MAX_BLOCK_OFFSET: u64 = (1 << 32) - 1;

pub const HEADER_LEN: u64 = 38;
pub const INDEX_ENTRY_LEN: u64 = 8;

/// Fixed-size archive header, reserved as zeros at pack start and finalized
/// last once both table offsets are known.
#[derive(Debug, Clone, Copy)]
pub struct Header {
    pub version: f32,
    pub file_count: u64,
    pub dir_count: u32,
    pub dir_table_offset: u64,
    pub file_index_offset: u64,
}

impl Header {
    pub fn read_from(r: &mut dyn Read) -> YufResult<Header> {
        let magic = read_exact::<6>(r)?;
        if magic != MAGIC {
            return Err(YufError::Format("not a valid Yuffin archive".into()));
        }
        let version = read_f32(r)?;
        let file_count = read_u64(r)?;
        let dir_count = read_u32(r)?;
        let dir_table_offset = read_u64(r)?;
        let file_index_offset = read_u64(r)?;
        Ok(Header { version, file_count, dir_count, dir_table_offset, file_index_offset })
    }

    pub fn write_to(&self, w: &mut dyn Write) -> YufResult<()> {
        w.write_all(&MAGIC)?;
        write_f32(w, self.version)?;
        write_u64(w, self.file_count)?;
        write_u32(w, self.dir_count)?;
        write_u64(w, self.dir_table_offset)?;
        write_u64(w, self.file_index_offset)?;
        Ok(())
    }

    /// Major version component, for the compatibility warning on unpack.
    pub fn major(&self) -> i32 {
        self.version.trunc() as i32
    }

    /// Bounds checks on the table offsets against the archive's length.
    pub fn validate_layout(&self, archive_len: u64) -> YufResult<()> {
        if self.dir_table_offset < HEADER_LEN || self.file_index_offset < self.dir_table_offset {
            return Err(YufError::Format("table offsets are inconsistent".into()));
        }
        let index_end = self
            .file_count
            .checked_mul(INDEX_ENTRY_LEN)
            .and_then(|len| self.file_index_offset.checked_add(len));
        match index_end {
            Some(end) if end <= archive_len => Ok(()),
            _ => Err(YufError::Format("file index extends past end of archive".into())),
        }
    }
}

/// One file-index entry. The on-disk form carries two reserved bytes after
/// the directory id; they are written as zero and ignored on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub block_offset: u32,
    pub dir_id: u16,
}

impl IndexEntry {
    pub fn read_from(r: &mut dyn Read) -> YufResult<IndexEntry> {
        let block_offset = read_u32(r)?;
        let dir_id = read_u16(r)?;
        let _reserved = read_exact::<2>(r)?;
        Ok(IndexEntry { block_offset, dir_id })
    }

    pub fn write_to(&self, w: &mut dyn Write) -> YufResult<()> {
        write_u32(w, self.block_offset)?;
        write_u16(w, self.dir_id)?;
        w.write_all(&[0u8; 2])?;
        Ok(())
    }
}

/// Checks a prospective data-block start offset against the 32-bit ceiling.
pub fn check_block_offset(offset: u64) -> YufResult<u32> {
    if offset >= MAX_BLOCK_OFFSET {
        return Err(YufError::SizeLimit(offset));
    }
    Ok(offset as u32)
}

/// Checks that a payload's length fits the block prefix's 32-bit field.
pub fn check_payload_len(len: usize) -> YufResult<u32> {
    u32::try_from(len).map_err(|_| YufError::SizeLimit(len as u64))
}

/// Checks that every directory id will fit the index entry's 16-bit field.
pub fn check_dir_count(count: usize) -> YufResult<u32> {
    if count > u16::MAX as usize {
        return Err(YufError::TooManyDirectories(count));
    }
    Ok(count as u32)
}
