// File: ./src/files.rs
// Filesystem browser: recursive listing, reading, saving and entry management.
use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use fs2::FileExt;

pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] =
    &[".md", ".txt", ".svg", ".png", ".jpg", ".jpeg", ".gif", ".pdf"];
pub const DEFAULT_MAX_DEPTH: usize = 5;

const SKIPPED_NAMES: &[&str] = &[".git", "node_modules"];

/// Extensions served as base64 with a known mime type.
const BINARY_MIME_TYPES: &[(&str, &str)] = &[
    (".png", "image/png"),
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".gif", "image/gif"),
    (".pdf", "application/pdf"),
    (".svg", "image/svg+xml"),
];

/// Other extensions that are never decoded as UTF-8.
const OTHER_BINARY_EXTENSIONS: &[&str] = &[
    ".zip", ".gz", ".tar", ".7z", ".rar", ".exe", ".dll", ".so", ".dylib", ".bin", ".webp",
    ".bmp", ".ico", ".tif", ".tiff", ".mp3", ".mp4", ".wav", ".ogg", ".mov", ".avi", ".woff",
    ".woff2", ".ttf", ".otf", ".sqlite", ".db", ".docx", ".xlsx", ".pptx",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_directory: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub children: Option<Vec<FileEntry>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderListing {
    pub folder_name: String,
    pub files: Vec<FileEntry>,
    pub root_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadFileResult {
    pub content: String,
    pub is_binary: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEntry {
    pub new_path: PathBuf,
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Clone)]
pub struct BrowseOptions {
    /// Lowercase, dot-prefixed.
    pub allowed_extensions: Vec<String>,
    pub max_depth: usize,
}

impl Default for BrowseOptions {
    fn default() -> Self {
        Self {
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Lowercase extension with its leading dot, or empty.
fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

fn is_skipped(name: &str) -> bool {
    name.starts_with('.') || SKIPPED_NAMES.contains(&name)
}

fn compare_entries(a: &FileEntry, b: &FileEntry) -> Ordering {
    b.is_directory
        .cmp(&a.is_directory)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.name.cmp(&b.name))
}

fn read_directory_at(dir: &Path, depth: usize, opts: &BrowseOptions) -> Result<Vec<FileEntry>> {
    if depth >= opts.max_depth {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read directory {:?}", dir))?;

    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if is_skipped(&name) {
            continue;
        }
        let path = entry.path();

        if entry.file_type()?.is_dir() {
            files.push(FileEntry {
                name,
                children: Some(read_directory_at(&path, depth + 1, opts)?),
                path,
                is_directory: true,
            });
        } else if opts.allowed_extensions.contains(&extension_of(&path)) {
            files.push(FileEntry {
                name,
                path,
                is_directory: false,
                children: None,
            });
        }
    }

    files.sort_by(compare_entries);
    Ok(files)
}

/// Lists `dir` recursively, directories first.
pub fn read_directory(dir: &Path, opts: &BrowseOptions) -> Result<Vec<FileEntry>> {
    read_directory_at(dir, 0, opts)
}

pub fn open_folder(dir: &Path, opts: &BrowseOptions) -> Result<FolderListing> {
    let folder_name = dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| dir.to_string_lossy().to_string());
    let files = read_directory(dir, opts)?;
    log::debug!("Listed {} top-level entries in {:?}", files.len(), dir);
    Ok(FolderListing {
        folder_name,
        files,
        root_path: dir.to_path_buf(),
    })
}

pub fn read_file(path: &Path) -> Result<ReadFileResult> {
    let ext = extension_of(path);
    let mime = BINARY_MIME_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, m)| m.to_string());

    if mime.is_some() || OTHER_BINARY_EXTENSIONS.contains(&ext.as_str()) {
        let bytes = fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
        return Ok(ReadFileResult {
            content: BASE64.encode(bytes),
            is_binary: true,
            mime_type: Some(mime.unwrap_or_else(|| "application/octet-stream".to_string())),
        });
    }

    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    Ok(ReadFileResult {
        content,
        is_binary: false,
        mime_type: None,
    })
}

pub fn save_file(path: &Path, content: &str) -> Result<()> {
    atomic_write(path, content)
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() || name.contains('/') || name.contains('\\') {
        bail!("Invalid entry name: {:?}", name);
    }
    Ok(())
}

/// Creates an empty file; fails if something already exists there.
pub fn create_file(
    parent: &Path,
    name: &str,
    root: &Path,
    opts: &BrowseOptions,
) -> Result<CreatedEntry> {
    validate_name(name)?;
    let new_path = parent.join(name);
    fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&new_path)
        .with_context(|| format!("Failed to create file {:?}", new_path))?;
    Ok(CreatedEntry {
        new_path,
        files: read_directory(root, opts)?,
    })
}

pub fn create_folder(
    parent: &Path,
    name: &str,
    root: &Path,
    opts: &BrowseOptions,
) -> Result<CreatedEntry> {
    validate_name(name)?;
    let new_path = parent.join(name);
    fs::create_dir(&new_path).with_context(|| format!("Failed to create folder {:?}", new_path))?;
    Ok(CreatedEntry {
        new_path,
        files: read_directory(root, opts)?,
    })
}

/// Removes a file or a whole directory tree. A missing path is not an error.
pub fn delete_entry(path: &Path) -> Result<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e).with_context(|| format!("Failed to stat {:?}", path)),
    };
    if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
    .with_context(|| format!("Failed to delete {:?}", path))
}

/// Renames in place (same parent directory) and returns the new path.
pub fn rename_entry(old_path: &Path, new_name: &str) -> Result<PathBuf> {
    validate_name(new_name)?;
    let parent = old_path.parent().unwrap_or_else(|| Path::new(""));
    let new_path = parent.join(new_name);
    fs::rename(old_path, &new_path)
        .with_context(|| format!("Failed to rename {:?} to {:?}", old_path, new_path))?;
    Ok(new_path)
}

// --- Locking and atomic writes ---

fn sidecar_path(file_path: &Path, suffix: &str) -> PathBuf {
    let mut name = file_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(suffix);
    file_path.with_file_name(name)
}

/// Runs `f` while holding an exclusive lock on a sidecar `.lock` file.
pub fn with_lock<F, T>(file_path: &Path, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let lock_path = sidecar_path(file_path, ".lock");
    let file = fs::OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)?;

    file.lock_exclusive()?;
    let result = f();
    file.unlock()?;
    result
}

pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
    let path = path.as_ref();
    let tmp_path = sidecar_path(path, ".tmp");
    fs::write(&tmp_path, contents)?;
    fs::rename(tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(Path::new("a/B.MD")), ".md");
        assert_eq!(extension_of(Path::new("Makefile")), "");
    }

    #[test]
    fn test_sidecar_keeps_extension() {
        assert_eq!(
            sidecar_path(Path::new("/x/notes.md"), ".tmp"),
            PathBuf::from("/x/notes.md.tmp")
        );
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("notes.md").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("a\\b").is_err());
    }
}
