//! The `inspect` subcommand

use crate::utils::find_banks;
use anyhow::{Context, Result};
use clap::Args;
use pcsde::bank::SongBank;
use std::path::{Path, PathBuf};

/// Inspect song banks, or entire folders of them, for their contents
#[derive(Args)]
#[clap(author, version)]
pub struct InspectArgs {
    /// The path(s) to inspect
    paths: Vec<PathBuf>,

    /// Search folders recursively
    #[clap(short, long)]
    recursive: bool,

    /// The file extension song banks are recognized by
    #[clap(short, long, default_value = "bin")]
    extension: String,
}

pub fn inspect(args: &InspectArgs) -> Result<()> {
    let paths: Vec<_> = find_banks(&args.paths, args.recursive, &args.extension).collect();

    if let Some((last, rest)) = paths.split_last() {
        for path in rest {
            print(path)?;
            println!();
        }

        print(last)?;
    }

    Ok(())
}

fn print(path: &Path) -> Result<()> {
    let bank = SongBank::from_path(path).context(format!("Could not read {}", path.display()))?;
    let directories = bank
        .directories()
        .context("Could not decode the directory table")?;

    println!(
        "{:<32}Key {}",
        path.file_name().unwrap_or_default().to_string_lossy(),
        bank.key()
    );

    for (index, directory) in directories.iter().enumerate() {
        let name = directory
            .name()
            .map(|name| name.to_string())
            .unwrap_or_else(|_| String::from("<invalid name>"));

        println!(
            "{index:>3} | {name:<24} | {:>3} songs | @{:08X}",
            directory.song_count(),
            directory.payload_offset
        );

        let songs = match bank.songs(directory) {
            Ok(songs) => songs,
            Err(error) => {
                println!("    | {error}");
                continue;
            }
        };

        for (index, song) in songs.iter().enumerate() {
            let name = song
                .name()
                .map(|name| name.to_string())
                .unwrap_or_else(|_| String::from("<invalid name>"));

            let status = match bank.payload(song) {
                Ok(_) => "",
                Err(_) => " (truncated)",
            };

            println!(
                "    {index:>3} | {name:<24} | @{:08X} | {:>7} bytes{status}",
                song.song_offset, song.song_length
            );
        }
    }

    Ok(())
}
