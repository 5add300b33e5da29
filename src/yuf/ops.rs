#![forbid(unsafe_code)]

use std::fs::File;
use std::path::Path;

use crate::yuf::error::{YufError, YufResult};
use crate::yuf::format::Header;
use crate::yuf::pack::{pack as pack_impl, PackSummary};
use crate::yuf::progress::ProgressSink;
use crate::yuf::unpack::{read_dir_table, unpack as unpack_impl};

/// Packs the tree under `source` into a single archive at `dest`. A source
/// with no files is a no-op: nothing is written and a zero summary returns.
pub fn pack(source: &Path, dest: &Path) -> YufResult<PackSummary> {
    pack_impl(source, dest, &mut |_: &str| {})
}

pub fn pack_with_progress(
    source: &Path,
    dest: &Path,
    sink: &mut dyn ProgressSink,
) -> YufResult<PackSummary> {
    pack_impl(source, dest, sink)
}

/// Extracts `archive` under `dest`, returning the number of files written.
pub fn unpack(archive: &Path, dest: &Path) -> YufResult<u64> {
    unpack_impl(archive, dest, &mut |_: &str| {})
}

pub fn unpack_with_progress(
    archive: &Path,
    dest: &Path,
    sink: &mut dyn ProgressSink,
) -> YufResult<u64> {
    unpack_impl(archive, dest, sink)
}

/// Header summary plus the directory table, read without touching payloads.
#[derive(Debug, Clone)]
pub struct ArchiveInfo {
    pub version: f32,
    pub file_count: u64,
    pub directories: Vec<String>,
}

pub fn inspect(archive: &Path) -> YufResult<ArchiveInfo> {
    if !archive.is_file() {
        return Err(YufError::NotFound(format!(
            "archive '{}' does not exist",
            archive.display()
        )));
    }

    let mut f = File::open(archive)?;
    let header = Header::read_from(&mut f)?;
    header.validate_layout(f.metadata()?.len())?;
    let directories = read_dir_table(&mut f, &header)?;

    Ok(ArchiveInfo { version: header.version, file_count: header.file_count, directories })
}
