#![forbid(unsafe_code)]

use std::fs::{self, File};
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

use crate::yuf::error::YufResult;
use crate::yuf::format::{
    check_block_offset, check_payload_len, Header, IndexEntry, BLOCK_MAGIC, HEADER_LEN,
    INDEX_ENTRY_LEN, VERSION,
};
use crate::yuf::io::{pad_to_alignment, write_u32, write_zeros};
use crate::yuf::path::classify;
use crate::yuf::progress::ProgressSink;

/// Counts returned by a successful pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackSummary {
    pub files: u64,
    pub dirs: u32,
}

/// Yuffin v3.1 layout:
/// - header [38]:
///   - [magic 6] "Yuffin"
///   - [f32 version]
///   - [u64 file_count]
///   - [u32 dir_count]
///   - [u64 dir_table_offset]
///   - [u64 file_index_offset]
/// - directory table: NUL-terminated relative dir names in id order, root = ""
/// - zero padding to 16
/// - file index, one entry per file in natural-sort order:
///   - [u32 block_offset]
///   - [u16 dir_id]
///   - [2 reserved]
/// - data blocks, each padded to 16:
///   - [magic 4] "ZBIR"
///   - [u32 len]
///   - payload bytes
///
/// The header is reserved first and finalized last, once both table offsets
/// are known; the index is reserved before the blocks and rewritten after.
pub fn pack(source: &Path, dest: &Path, sink: &mut dyn ProgressSink) -> YufResult<PackSummary> {
    sink.report("Scanning for files and directories...");
    let classified = classify(source)?;

    if classified.files.is_empty() {
        // Not an error: report the no-op and leave no archive behind.
        sink.report(&format!("No files found in '{}'.", source.display()));
        return Ok(PackSummary { files: 0, dirs: 0 });
    }

    let file_count = classified.files.len() as u64;
    let dir_count = classified.dir_names.len() as u32;
    sink.report(&format!("Found {file_count} files in {dir_count} unique directories."));

    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut out = File::create(dest)?;
    write_zeros(&mut out, HEADER_LEN)?;

    let dir_table_offset = out.stream_position()?;
    for name in &classified.dir_names {
        out.write_all(name.as_bytes())?;
        out.write_all(&[0])?;
    }

    let pos = out.stream_position()?;
    let file_index_offset = pad_to_alignment(&mut out, pos)?;
    write_zeros(&mut out, file_count * INDEX_ENTRY_LEN)?;

    let mut entries: Vec<IndexEntry> = Vec::with_capacity(classified.files.len());
    for (i, file) in classified.files.iter().enumerate() {
        sink.report(&format!("  ({}/{file_count}) Packing: {}", i + 1, file.rel));

        let pos = out.stream_position()?;
        let aligned = pad_to_alignment(&mut out, pos)?;
        let block_offset = check_block_offset(aligned)?;

        let data = fs::read(&file.path)?;
        let len = check_payload_len(data.len())?;
        out.write_all(&BLOCK_MAGIC)?;
        write_u32(&mut out, len)?;
        out.write_all(&data)?;

        entries.push(IndexEntry { block_offset, dir_id: classified.dir_of_file[i] });
    }

    out.seek(SeekFrom::Start(file_index_offset))?;
    for entry in &entries {
        entry.write_to(&mut out)?;
    }

    out.seek(SeekFrom::Start(0))?;
    Header {
        version: VERSION,
        file_count,
        dir_count,
        dir_table_offset,
        file_index_offset,
    }
    .write_to(&mut out)?;
    out.flush()?;

    sink.report(&format!("Done! Packed {file_count} files to '{}'.", dest.display()));
    Ok(PackSummary { files: file_count, dirs: dir_count })
}
