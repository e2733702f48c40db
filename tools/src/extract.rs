//! The `extract` subcommand

use crate::utils::confirm_overwrite;
use anyhow::{bail, Context, Result};
use clap::Args;
use pcsde::{
    bank::{ExtractedSong, Extraction, SongBank},
    song::SongEntry,
};
use std::{
    collections::HashSet,
    env::current_dir,
    fs::{self, create_dir_all},
    path::{Path, PathBuf},
};
use tracing::info;

/// Extract all songs from a song bank
#[derive(Args)]
#[clap(author, version)]
pub struct ExtractArgs {
    /// The path to the song bank to extract from
    path: PathBuf,

    /// The destination folder to place the songs
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing files without asking
    #[clap(short, long)]
    force: bool,
}

/// What to do when a song is about to be written over an existing file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overwrite {
    /// Prompt on the terminal
    Ask,

    /// Just replace the file
    Always,
}

/// Extract all songs from a song bank
pub fn extract(args: ExtractArgs) -> Result<()> {
    if !args.path.exists() {
        bail!("File not found at {}", args.path.display());
    }

    let bank = SongBank::from_path(&args.path).context("Reading the song bank from file failed")?;
    let extraction = bank
        .extract()
        .context("Could not decode the directory table")?;

    let folder = match args.output {
        Some(folder) => folder,
        None => current_dir().context("Could not fetch current working directory")?,
    };

    let overwrite = if args.force {
        Overwrite::Always
    } else {
        Overwrite::Ask
    };

    let written = write_extraction(&extraction, &folder, overwrite)?;

    for warning in &extraction.warnings {
        println!("Warning: {warning}");
    }

    println!(
        "Wrote {}/{} songs to {}",
        written.len(),
        extraction.song_count(),
        folder.to_string_lossy()
    );

    Ok(())
}

/// Write every extracted song to `<folder>/<directory>/<song>.mid`
///
/// Songs that would end up at the same path (equal names in one directory, or a placeholder
/// matching a real name) get a numbered suffix, `<song>_2.mid` and onward, so no song
/// replaces another from the same bank.
///
/// Returns the paths of the files that were written.
pub fn write_extraction(
    extraction: &Extraction,
    folder: &Path,
    overwrite: Overwrite,
) -> Result<Vec<PathBuf>> {
    create_dir_all(folder).context("Could not create output directory")?;

    let mut written = Vec::new();
    let mut claimed = HashSet::new();
    for directory in &extraction.directories {
        let directory_path = folder.join(&directory.name);
        create_dir_all(&directory_path).context(format!(
            "Could not create folder at {}",
            directory_path.display()
        ))?;

        for song in &directory.songs {
            let path = unclaimed_path(&directory_path, song, &mut claimed);

            if overwrite == Overwrite::Ask && !confirm_overwrite(&path)? {
                info!(path = %path.display(), "not overwriting existing file");
                continue;
            }

            fs::write(&path, song.bytes)
                .context(format!("Could not write song to {}", path.display()))?;

            println!(
                "{} -> {}",
                directory.name,
                path.file_name().unwrap_or_default().to_string_lossy()
            );
            written.push(path);
        }
    }

    Ok(written)
}

/// Pick the first path for `song` that no earlier song of this extraction has taken
fn unclaimed_path(
    folder: &Path,
    song: &ExtractedSong,
    claimed: &mut HashSet<PathBuf>,
) -> PathBuf {
    let mut path = folder.join(song.file_name());
    let mut suffix = 2;
    while claimed.contains(&path) {
        path = folder.join(format!("{}_{suffix}.{}", song.name, SongEntry::EXTENSION));
        suffix += 1;
    }

    claimed.insert(path.clone());
    path
}
