use anyhow::{Context, Result};
use std::{
    ffi::OsStr,
    io::stdin,
    path::{Path, PathBuf},
};
use walkdir::{DirEntry, WalkDir};

/// Find the song banks among `paths`
///
/// Files are picked up by their extension. Folders are searched one level deep, or entirely
/// when `recursive` is set. Hidden files and folders are skipped, unless they were asked for
/// by name.
pub fn find_banks<'a, P>(
    paths: &'a [P],
    recursive: bool,
    extension: &'a str,
) -> impl Iterator<Item = PathBuf> + 'a
where
    P: AsRef<Path>,
{
    let max_depth = if recursive { usize::MAX } else { 1 };

    paths.iter().flat_map(move |path| {
        WalkDir::new(path)
            .max_depth(max_depth)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry))
            .filter_map(Result::ok)
            .filter(move |entry| {
                entry.file_type().is_file()
                    && entry.path().extension() == Some(OsStr::new(extension))
            })
            .map(DirEntry::into_path)
    })
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

/// Ask the user whether an existing file may be overwritten
///
/// Returns `true` if the path is free, or the user agreed.
pub fn confirm_overwrite(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }

    loop {
        println!(
            "{} already exists. Do you want to overwrite it? Y/n",
            path.to_string_lossy()
        );

        let mut line = String::new();
        stdin()
            .read_line(&mut line)
            .context("Could not read terminal input")?;

        match line.trim_end() {
            "Y" => return Ok(true),
            "n" => return Ok(false),
            _ => (),
        }
    }
}
