//! Zip archive shell: unpack the uploaded bundle, pack the results.
//!
//! The bundle layout is loose on purpose: the spreadsheet and the
//! `img/` tree may sit at the root or one level down (most archive
//! tools wrap everything in a single folder). Lookup walks the
//! extracted tree instead of assuming a shape.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::EtiketkaError;

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xls"];

/// Extract an archive into `dest`. Entries whose names escape the
/// destination are skipped.
pub fn unpack(archive_path: &Path, dest: &Path) -> Result<(), EtiketkaError> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| EtiketkaError::Archive(format!("open {}: {e}", archive_path.display())))?;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| EtiketkaError::Archive(format!("entry {index}: {e}")))?;
        let Some(relative) = entry.enclosed_name() else {
            continue;
        };
        let target = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&target)?;
            io::copy(&mut entry, &mut out)?;
        }
    }

    Ok(())
}

/// Pack the contents of `dir` (recursively, relative paths) into a
/// new zip at `zip_path`.
pub fn pack(dir: &Path, zip_path: &Path) -> Result<(), EtiketkaError> {
    let file = File::create(zip_path)?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    let mut files = Vec::new();
    collect_files(dir, &mut files)?;
    files.sort();

    for path in files {
        let relative = path
            .strip_prefix(dir)
            .map_err(|e| EtiketkaError::Archive(format!("relative path: {e}")))?;
        let name = relative.to_string_lossy().replace('\\', "/");
        writer
            .start_file(name.as_str(), options)
            .map_err(|e| EtiketkaError::Archive(format!("start {name}: {e}")))?;
        let mut source = File::open(&path)?;
        io::copy(&mut source, &mut writer)?;
    }

    writer
        .finish()
        .map_err(|e| EtiketkaError::Archive(format!("finish {}: {e}", zip_path.display())))?;
    Ok(())
}

/// First spreadsheet file anywhere under `dir`.
pub fn find_spreadsheet(dir: &Path) -> Option<PathBuf> {
    let mut files = Vec::new();
    collect_files(dir, &mut files).ok()?;
    files.sort();
    files.into_iter().find(|path| {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| SPREADSHEET_EXTENSIONS.contains(&e.to_lowercase().as_str()))
    })
}

/// The directory that holds the `img/` tree, when the bundle has one.
/// This becomes the engine's base directory.
pub fn find_image_base(dir: &Path) -> Option<PathBuf> {
    let mut dirs = vec![dir.to_path_buf()];
    let mut index = 0;
    while index < dirs.len() {
        let current = dirs[index].clone();
        index += 1;
        if current.join("img").is_dir() {
            return Some(current);
        }
        if let Ok(entries) = fs::read_dir(&current) {
            let mut children: Vec<_> = entries
                .flatten()
                .map(|e| e.path())
                .filter(|p| p.is_dir())
                .collect();
            children.sort();
            dirs.extend(children);
        }
    }
    None
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}
