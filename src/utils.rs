use crate::Result;
use anyhow::{bail, Context};
use chrono::Local;
use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Create a directory and its parents if it does not exist.
pub(crate) fn make_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    std::fs::create_dir_all(path)
        .with_context(|| format!("Unable to create directory at {}", path.display()))
}

/// Canonicalize a path that is expected to exist.
pub(crate) fn canonicalize(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    std::fs::canonicalize(path)
        .with_context(|| format!("Unable to canonicalize the path {}", path.display()))
}

/// Read a file to a `String`.
pub(crate) fn read(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    debug!("Reading {}", path.display());
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file at {}", path.display()))
}

/// Write a file, replacing its contents.
pub(crate) fn write(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Result<()> {
    let path = path.as_ref();
    debug!("Writing {}", path.display());
    std::fs::write(path, contents).with_context(|| format!("Unable to write to {}", path.display()))
}

/// Replace the file at `path` with `contents` by writing a sibling temporary file and renaming it
/// over the target. A reader never sees a half-written file.
pub(crate) fn replace(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Result<()> {
    let path = path.as_ref();
    let tmp = sibling_tmp(path);
    write(&tmp, contents)?;
    rename(&tmp, path).inspect_err(|_| {
        let _ = std::fs::remove_file(&tmp);
    })
}

/// Basically move a file. Renames `from` -> `to`.
pub(crate) fn rename(from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<()> {
    std::fs::rename(from.as_ref(), to.as_ref()).with_context(|| {
        format!(
            "Unable to move file from '{}' to '{}'",
            from.as_ref().display(),
            to.as_ref().display()
        )
    })
}

/// Copies `from` to `to`, replacing `to` if it exists.
pub(crate) fn copy(from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<()> {
    std::fs::copy(from.as_ref(), to.as_ref())
        .map(|_| ())
        .with_context(|| {
            format!(
                "Unable to copy file from '{}' to '{}'",
                from.as_ref().display(),
                to.as_ref().display()
            )
        })
}

/// Copies the file at `path` to an unused sibling named `{file}.unreadable.YYYY-MM-DD-NNN` and
/// returns the new path. The original is left in place.
pub(crate) fn set_aside(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let date = Local::now().format("%Y-%m-%d");
    for seq in 1..1000 {
        let mut name = file_name(path);
        name.push(format!(".unreadable.{date}-{seq:03}"));
        let aside = path.with_file_name(name);
        if !aside.exists() {
            copy(path, &aside)?;
            return Ok(aside);
        }
    }
    bail!("Too many unreadable copies of {} today", path.display())
}

/// Serialize `value` as pretty JSON and write it to `path` atomically.
pub(crate) fn write_json<T>(path: impl AsRef<Path>, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let path = path.as_ref();
    let data = serde_json::to_string_pretty(value)
        .with_context(|| format!("Unable to serialize data for {}", path.display()))?;
    replace(path, data)
}

fn sibling_tmp(path: &Path) -> PathBuf {
    let mut name = file_name(path);
    name.push(".tmp");
    path.with_file_name(name)
}

fn file_name(path: &Path) -> OsString {
    path.file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("ledger"))
}
