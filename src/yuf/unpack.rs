#![forbid(unsafe_code)]

use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::yuf::error::{YufError, YufResult};
use crate::yuf::format::{Header, IndexEntry, BLOCK_MAGIC, SUPPORTED_MAJOR};
use crate::yuf::io::{read_exact, read_u32};
use crate::yuf::progress::ProgressSink;

/// Content-sniffing rules, matched in order against the payload's first
/// bytes. The format stores no filenames, so the extension is re-derived.
const SNIFF_RULES: &[(&[u8], &str)] = &[
    (&[0xFF, 0xD8], ".jpg"),
    (b"\x89PNG\r\n\x1a\n", ".png"),
    (b"GIF", ".gif"),
];

const DEFAULT_EXT: &str = ".dat";

fn sniff_extension(payload: &[u8]) -> &'static str {
    SNIFF_RULES
        .iter()
        .find(|(sig, _)| payload.starts_with(sig))
        .map(|&(_, ext)| ext)
        .unwrap_or(DEFAULT_EXT)
}

/// Extracts every entry of `archive` under `dest`, recreating the original
/// relative directories. Returns the number of files written; entries whose
/// block magic does not match are reported and skipped.
pub fn unpack(archive: &Path, dest: &Path, sink: &mut dyn ProgressSink) -> YufResult<u64> {
    if !archive.is_file() {
        return Err(YufError::NotFound(format!(
            "archive '{}' does not exist",
            archive.display()
        )));
    }

    let mut f = File::open(archive)?;
    let header = Header::read_from(&mut f)?;
    header.validate_layout(f.metadata()?.len())?;

    if header.major() < SUPPORTED_MAJOR {
        sink.report(&format!("Warning: unpacking an older format v{:.1}.", header.version));
    }
    sink.report(&format!(
        "Yuffin format v{:.1}, files: {}, dirs: {}",
        header.version, header.file_count, header.dir_count
    ));

    let directories = read_dir_table(&mut f, &header)?;

    f.seek(SeekFrom::Start(header.file_index_offset))?;
    let mut entries: Vec<IndexEntry> = Vec::with_capacity(header.file_count as usize);
    for _ in 0..header.file_count {
        entries.push(IndexEntry::read_from(&mut f)?);
    }

    let mut extracted: u64 = 0;
    for (i, entry) in entries.iter().enumerate() {
        let seq = i + 1;

        f.seek(SeekFrom::Start(entry.block_offset as u64))?;
        let magic = read_exact::<4>(&mut f)?;
        if magic != BLOCK_MAGIC {
            sink.report(&format!("Warning: invalid block marker for entry {seq}, skipping."));
            continue;
        }
        let len = read_u32(&mut f)? as usize;
        let mut payload = vec![0u8; len];
        f.read_exact(&mut payload)?;

        let extension = sniff_extension(&payload);
        // An id past the table resolves to the archive root.
        let dir_name =
            directories.get(entry.dir_id as usize).map(String::as_str).unwrap_or("");
        let out_dir = if dir_name.is_empty() {
            dest.to_path_buf()
        } else {
            dest.join(dir_name.replace('/', std::path::MAIN_SEPARATOR_STR))
        };
        fs::create_dir_all(&out_dir)?;

        let file_name = format!("image_{seq:06}{extension}");
        let shown = if dir_name.is_empty() {
            file_name.clone()
        } else {
            format!("{dir_name}/{file_name}")
        };
        sink.report(&format!("  ({seq}/{}) Unpacked: {shown}", header.file_count));
        fs::write(out_dir.join(&file_name), &payload)?;
        extracted += 1;
    }

    sink.report(&format!("Done! Unpacked {extracted} files to '{}'.", dest.display()));
    Ok(extracted)
}

/// Reads the directory-name table: the span between the two table offsets,
/// split on NUL. The table's own trailing terminator yields one empty split
/// element, and anything after it is alignment padding; both are dropped.
pub(crate) fn read_dir_table(f: &mut File, header: &Header) -> YufResult<Vec<String>> {
    f.seek(SeekFrom::Start(header.dir_table_offset))?;
    let span = (header.file_index_offset - header.dir_table_offset) as usize;
    let mut raw = vec![0u8; span];
    f.read_exact(&mut raw)?;

    let mut names: Vec<String> = Vec::new();
    for chunk in raw.split(|&b| b == 0) {
        let name = String::from_utf8(chunk.to_vec())
            .map_err(|_| YufError::Format("directory name is not utf-8".into()))?;
        names.push(name);
    }
    names.pop();
    names.truncate(header.dir_count as usize);
    Ok(names)
}
