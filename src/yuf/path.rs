#![forbid(unsafe_code)]

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::yuf::error::{YufError, YufResult};
use crate::yuf::format::check_dir_count;

/// Extension of archives produced by this tool; such files are skipped when
/// they sit inside the source tree.
const ARCHIVE_EXT: &str = "yuf";

/// One file selected for packing.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// On-disk path, as walked.
    pub path: PathBuf,
    /// Forward-slash path relative to the scan root.
    pub rel: String,
}

/// Result of classifying a source tree: the naturally-sorted file list and
/// the dense directory-id assignment derived from it.
#[derive(Debug, Clone)]
pub struct Classified {
    pub files: Vec<SourceFile>,
    /// Relative parent directory names, indexed by id. The scan root is the
    /// empty string.
    pub dir_names: Vec<String>,
    /// Parent directory id of `files[i]`.
    pub dir_of_file: Vec<u16>,
}

/// Sort key that compares embedded digit runs numerically (`img2` before
/// `img10`) and everything else as lowercased text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct NaturalKey(Vec<KeyPart>);

#[derive(Debug, Clone, PartialEq, Eq)]
enum KeyPart {
    /// Digit run with leading zeros stripped; empty means zero.
    Number(String),
    Text(String),
}

impl Ord for KeyPart {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (KeyPart::Number(a), KeyPart::Number(b)) => {
                a.len().cmp(&b.len()).then_with(|| a.cmp(b))
            }
            (KeyPart::Text(a), KeyPart::Text(b)) => a.cmp(b),
            // A digit run sorts before text starting at the same position.
            (KeyPart::Number(_), KeyPart::Text(_)) => Ordering::Less,
            (KeyPart::Text(_), KeyPart::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for KeyPart {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub fn natural_key(s: &str) -> NaturalKey {
    let mut parts = Vec::new();
    let mut text = String::new();
    let mut digits = String::new();

    for c in s.chars() {
        if c.is_ascii_digit() {
            if !text.is_empty() {
                parts.push(KeyPart::Text(std::mem::take(&mut text)));
            }
            digits.push(c);
        } else {
            if !digits.is_empty() {
                parts.push(KeyPart::Number(trim_leading_zeros(std::mem::take(&mut digits))));
            }
            text.extend(c.to_lowercase());
        }
    }
    if !text.is_empty() {
        parts.push(KeyPart::Text(text));
    }
    if !digits.is_empty() {
        parts.push(KeyPart::Number(trim_leading_zeros(digits)));
    }

    NaturalKey(parts)
}

fn trim_leading_zeros(digits: String) -> String {
    digits.trim_start_matches('0').to_string()
}

/// Relative parent of a forward-slash path; the scan root is the empty string.
pub fn parent_of(rel: &str) -> &str {
    match rel.rfind('/') {
        Some(i) => &rel[..i],
        None => "",
    }
}

fn normalize_rel(root: &Path, file: &Path) -> YufResult<String> {
    let rel = file
        .strip_prefix(root)
        .map_err(|_| YufError::Format(format!("path escapes source root: {}", file.display())))?;

    let mut out = String::new();
    for (i, comp) in rel.components().enumerate() {
        if i != 0 {
            out.push('/');
        }
        out.push_str(&comp.as_os_str().to_string_lossy());
    }
    Ok(out.replace('\\', "/"))
}

/// Walks `root` and returns its files in natural-sort order, with dense
/// directory ids assigned in first-encounter order over that sorted list.
pub fn classify(root: &Path) -> YufResult<Classified> {
    if !root.exists() {
        return Err(YufError::NotFound(format!(
            "source directory '{}' does not exist",
            root.display()
        )));
    }
    if !root.is_dir() {
        return Err(YufError::NotFound(format!("'{}' is not a directory", root.display())));
    }

    let mut files: Vec<SourceFile> = Vec::new();
    for ent in WalkDir::new(root).follow_links(false) {
        let ent = ent.map_err(|e| {
            let msg = e.to_string();
            let io = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, msg));
            YufError::Io(io)
        })?;

        if !ent.file_type().is_file() {
            continue;
        }
        if ent.path().extension().and_then(|e| e.to_str()) == Some(ARCHIVE_EXT) {
            continue;
        }

        let rel = normalize_rel(root, ent.path())?;
        files.push(SourceFile { path: ent.path().to_path_buf(), rel });
    }

    // Keys can collide across case variants; the raw path breaks the tie so
    // the same tree always classifies identically.
    files.sort_by_cached_key(|f| (natural_key(&f.rel), f.rel.clone()));

    let (dir_names, dir_of_file) = assign_dir_ids(&files)?;
    Ok(Classified { files, dir_names, dir_of_file })
}

fn assign_dir_ids(files: &[SourceFile]) -> YufResult<(Vec<String>, Vec<u16>)> {
    let mut ids: HashMap<String, usize> = HashMap::new();
    let mut names: Vec<String> = Vec::new();
    let mut of_file: Vec<usize> = Vec::with_capacity(files.len());

    for file in files {
        let parent = parent_of(&file.rel);
        let id = match ids.get(parent) {
            Some(&id) => id,
            None => {
                let id = names.len();
                names.push(parent.to_string());
                ids.insert(parent.to_string(), id);
                id
            }
        };
        of_file.push(id);
    }

    check_dir_count(names.len())?;
    Ok((names, of_file.into_iter().map(|id| id as u16).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut paths: Vec<&str>) -> Vec<&str> {
        paths.sort_by_cached_key(|p| (natural_key(p), p.to_string()));
        paths
    }

    #[test]
    fn digit_runs_compare_numerically() {
        assert_eq!(
            sorted(vec!["img2.png", "img10.png", "img1.png"]),
            vec!["img1.png", "img2.png", "img10.png"]
        );
    }

    #[test]
    fn text_compares_case_insensitively() {
        assert_eq!(sorted(vec!["B.png", "a.png"]), vec!["a.png", "B.png"]);
    }

    #[test]
    fn leading_zeros_do_not_change_the_number() {
        assert_eq!(natural_key("img007"), natural_key("img7"));
        // ...but the tie-break on the raw path still keeps sorting stable.
        assert_eq!(sorted(vec!["img7", "img007"]), vec!["img007", "img7"]);
    }

    #[test]
    fn numbers_sort_before_text() {
        assert_eq!(sorted(vec!["abc", "1abc"]), vec!["1abc", "abc"]);
    }

    #[test]
    fn huge_digit_runs_do_not_overflow() {
        let a = "f99999999999999999999999999999999999999998";
        let b = "f99999999999999999999999999999999999999999";
        assert_eq!(sorted(vec![b, a]), vec![a, b]);
    }

    #[test]
    fn nested_paths_sort_by_component_numbers() {
        assert_eq!(
            sorted(vec!["ch10/p1.png", "ch2/p1.png", "ch2/p10.png", "ch2/p9.png"]),
            vec!["ch2/p1.png", "ch2/p9.png", "ch2/p10.png", "ch10/p1.png"]
        );
    }

    #[test]
    fn parent_of_root_file_is_empty() {
        assert_eq!(parent_of("a.png"), "");
        assert_eq!(parent_of("x/a.png"), "x");
        assert_eq!(parent_of("x/y/a.png"), "x/y");
    }

    fn source(rel: &str) -> SourceFile {
        SourceFile { path: PathBuf::from(rel), rel: rel.to_string() }
    }

    #[test]
    fn dir_ids_follow_first_encounter_order() {
        // Already naturally sorted: a9 is met before a10, z last.
        let files =
            vec![source("a9/x.png"), source("a10/x.png"), source("top.png"), source("z/x.png")];
        let mut ordered = files.clone();
        ordered.sort_by_cached_key(|f| (natural_key(&f.rel), f.rel.clone()));
        let (names, of_file) = assign_dir_ids(&ordered).unwrap();

        assert_eq!(names, vec!["a9", "a10", "", "z"]);
        assert_eq!(of_file, vec![0, 1, 2, 3]);
    }

    #[test]
    fn repeated_parents_keep_their_first_id() {
        let files = vec![source("a/1.png"), source("a/2.png"), source("b/1.png"), source("a/3.png")];
        let (names, of_file) = assign_dir_ids(&files).unwrap();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(of_file, vec![0, 0, 1, 0]);
    }
}
