#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use yufpak::{natural_key, ProgressSink, YufError, YufResult};

#[derive(Debug, Parser)]
#[command(name = "yufpak", version, about = "Yuffin image archive packer (v3.1 format)")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Pack a directory tree into a .yuf archive.
    Pack {
        /// Source directory.
        #[arg(long)]
        input: PathBuf,
        /// Output .yuf file.
        #[arg(long)]
        output: PathBuf,
    },

    /// Unpack a .yuf archive into a directory.
    Unpack {
        /// Archive file.
        #[arg(long)]
        archive: PathBuf,
        /// Output directory.
        #[arg(long)]
        output: PathBuf,
    },

    /// Pack every immediate subdirectory of a root into its own .yuf,
    /// written next to it.
    PackAll {
        /// Directory whose subdirectories become archives.
        #[arg(long)]
        root: PathBuf,
    },

    /// Print an archive's header fields and directory table.
    Inspect {
        #[arg(long)]
        archive: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let mut sink = |msg: &str| println!("{msg}");
    let res = match cli.cmd {
        Command::Pack { input, output } => {
            yufpak::pack_with_progress(&input, &output, &mut sink).map(|_| ())
        }
        Command::Unpack { archive, output } => {
            yufpak::unpack_with_progress(&archive, &output, &mut sink).map(|_| ())
        }
        Command::PackAll { root } => pack_all(&root, &mut sink),
        Command::Inspect { archive } => inspect(&archive),
    };

    if let Err(e) = res {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Multi-pack driver: one archive per subdirectory, in natural-sort order.
/// A subdirectory that fails to pack is reported and the rest still run.
fn pack_all(root: &Path, sink: &mut dyn ProgressSink) -> YufResult<()> {
    if !root.is_dir() {
        return Err(YufError::NotFound(format!("'{}' is not a directory", root.display())));
    }

    let mut subdirs: Vec<(String, PathBuf)> = std::fs::read_dir(root)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .filter_map(|p| {
            let name = p.file_name()?.to_string_lossy().into_owned();
            Some((name, p))
        })
        .collect();
    subdirs.sort_by_cached_key(|(name, _)| (natural_key(name), name.clone()));

    if subdirs.is_empty() {
        sink.report("No subdirectories found to pack.");
        return Ok(());
    }

    let total = subdirs.len();
    for (i, (name, dir)) in subdirs.iter().enumerate() {
        sink.report(&format!("--- ({}/{total}) Packing folder: {name} ---", i + 1));
        let output = root.join(format!("{name}.yuf"));
        match yufpak::pack_with_progress(dir, &output, sink) {
            Ok(summary) => {
                sink.report(&format!("-> Created: {name}.yuf ({} files)", summary.files));
            }
            Err(e) => sink.report(&format!("ERROR in {name}: {e}")),
        }
    }
    Ok(())
}

fn inspect(archive: &Path) -> YufResult<()> {
    let info = yufpak::inspect(archive)?;
    println!("Yuffin format v{:.1}", info.version);
    println!("files: {}", info.file_count);
    println!("directories: {}", info.directories.len());
    for (id, name) in info.directories.iter().enumerate() {
        println!("  [{id}] {}", if name.is_empty() { "<root>" } else { name });
    }
    Ok(())
}
