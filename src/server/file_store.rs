//! File store: path resolution plus single-file filesystem primitives.
//!
//! The resolver is the only gatekeeper between client-supplied paths and the
//! real filesystem: every operation takes a root-relative path, normalizes
//! it, and rejects anything that would escape the project root. Listing
//! paths are reported back with forward-slash separators on every platform.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::server::context::CommandError;

/// Directory entry, one level deep.
#[derive(Debug, Clone)]
pub struct DirEntryInfo {
    pub name: String,
    pub is_dir: bool,
}

/// File metadata for listings.
#[derive(Debug, Clone)]
pub struct FileStat {
    pub size: u64,
    /// RFC 3339 UTC timestamp with millisecond precision.
    pub modified: String,
}

/// Single-file operations rooted at a fixed project directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        FileStore { root }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Resolve a client-supplied relative path onto the project root.
    ///
    /// Normalizes `.`/`..` and both separator styles; an absolute path is
    /// treated as root-relative. Any path that would climb above the root
    /// is rejected before I/O.
    pub fn resolve(&self, relative_path: &str) -> Result<PathBuf, CommandError> {
        let mut components: Vec<&str> = Vec::new();
        for component in relative_path.split(['/', '\\']) {
            match component {
                "" | "." => continue,
                ".." => {
                    if components.pop().is_none() {
                        return Err(CommandError::Validation(format!(
                            "Path escapes project root: {}",
                            relative_path
                        )));
                    }
                }
                c => components.push(c),
            }
        }

        let mut full_path = self.root.clone();
        for component in components {
            full_path.push(component);
        }
        Ok(full_path)
    }

    /// Read a file's raw bytes.
    pub async fn read(&self, path: &str) -> Result<Vec<u8>, CommandError> {
        let full = self.resolve(path)?;
        debug!("Reading file: {:?}", full);
        fs::read(&full).await.map_err(|e| io_err(path, e))
    }

    /// Create a new file, failing if the target already exists. Parent
    /// directories are created as needed; an existing file is never touched.
    pub async fn write_create(&self, path: &str, bytes: &[u8]) -> Result<(), CommandError> {
        let full = self.resolve(path)?;
        if fs::metadata(&full).await.is_ok() {
            return Err(CommandError::AlreadyExists(path.to_string()));
        }

        debug!("Creating file: {:?}", full);
        self.ensure_parent(&full, path).await?;
        fs::write(&full, bytes).await.map_err(|e| io_err(path, e))
    }

    /// Create-or-overwrite. Parent directories are created as needed.
    pub async fn write_upsert(&self, path: &str, bytes: &[u8]) -> Result<(), CommandError> {
        let full = self.resolve(path)?;
        debug!("Writing file: {:?}", full);
        self.ensure_parent(&full, path).await?;
        fs::write(&full, bytes).await.map_err(|e| io_err(path, e))
    }

    /// Remove a file permanently. No trash or recovery semantics.
    pub async fn delete(&self, path: &str) -> Result<(), CommandError> {
        let full = self.resolve(path)?;
        debug!("Deleting file: {:?}", full);
        fs::remove_file(&full).await.map_err(|e| io_err(path, e))
    }

    /// Rename a file. Never overwrites: an occupied target is an error.
    pub async fn rename(&self, old_path: &str, new_path: &str) -> Result<(), CommandError> {
        let old_full = self.resolve(old_path)?;
        let new_full = self.resolve(new_path)?;

        if fs::metadata(&new_full).await.is_ok() {
            return Err(CommandError::AlreadyExists(new_path.to_string()));
        }

        debug!("Renaming {:?} to {:?}", old_full, new_full);
        fs::rename(&old_full, &new_full)
            .await
            .map_err(|e| io_err(old_path, e))
    }

    /// List a directory one level deep, sorted by name for deterministic
    /// client-side comparison. Not recursive.
    pub async fn list_dir(&self, dir_path: &str) -> Result<Vec<DirEntryInfo>, CommandError> {
        let full = self.resolve(dir_path)?;
        debug!("Listing directory: {:?}", full);

        let mut reader = fs::read_dir(&full).await.map_err(|e| io_err(dir_path, e))?;
        let mut entries = Vec::new();
        while let Some(entry) = reader.next_entry().await.map_err(|e| io_err(dir_path, e))? {
            let file_type = entry.file_type().await.map_err(|e| io_err(dir_path, e))?;
            entries.push(DirEntryInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: file_type.is_dir(),
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// Size and last-modified timestamp of a single path.
    pub async fn stat(&self, path: &str) -> Result<FileStat, CommandError> {
        let full = self.resolve(path)?;
        let metadata = fs::metadata(&full).await.map_err(|e| io_err(path, e))?;

        let modified = metadata
            .modified()
            .map(|t| {
                chrono::DateTime::<chrono::Utc>::from(t)
                    .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
            })
            .unwrap_or_default();

        Ok(FileStat {
            size: metadata.len(),
            modified,
        })
    }

    /// Create a directory (and any missing parents) under the root.
    pub async fn ensure_dir(&self, dir_path: &str) -> Result<(), CommandError> {
        let full = self.resolve(dir_path)?;
        fs::create_dir_all(&full)
            .await
            .map_err(|e| io_err(dir_path, e))
    }

    async fn ensure_parent(&self, full: &Path, path: &str) -> Result<(), CommandError> {
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| io_err(path, e))?;
        }
        Ok(())
    }
}

fn io_err(path: &str, e: std::io::Error) -> CommandError {
    if e.kind() == std::io::ErrorKind::NotFound {
        CommandError::NotFound(path.to_string())
    } else {
        CommandError::Io(format!("{}: {}", path, e))
    }
}

/// Join a directory path and entry name into a root-relative wire path with
/// forward-slash separators.
pub fn wire_join(dir_path: &str, name: &str) -> String {
    let dir = dir_path.trim_matches(['/', '\\']).replace('\\', "/");
    if dir.is_empty() || dir == "." {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Normalize an extension filter: lowercase, leading dot guaranteed.
/// An empty filter matches all files.
pub fn normalize_extensions(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|ext| {
            let lower = ext.to_lowercase();
            if lower.starts_with('.') {
                lower
            } else {
                format!(".{}", lower)
            }
        })
        .collect()
}

/// The lowercase extension of a file name, dot included. Empty when the
/// name has none (`Makefile`, `.gitignore`).
pub fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Whether a file name passes a normalized extension filter.
pub fn matches_filter(name: &str, normalized: &[String]) -> bool {
    normalized.is_empty() || normalized.contains(&extension_of(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(temp: &TempDir) -> FileStore {
        FileStore::new(temp.path().to_path_buf())
    }

    #[test]
    fn test_path_escape_prevention() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        // Valid paths
        assert!(store.resolve("file.txt").is_ok());
        assert!(store.resolve("dir/file.txt").is_ok());
        assert!(store.resolve("./file.txt").is_ok());
        assert!(store.resolve("dir/../file.txt").is_ok());

        // Absolute injection is treated as root-relative
        assert_eq!(
            store.resolve("/etc/passwd").unwrap(),
            temp.path().join("etc").join("passwd")
        );

        // Escape attempts
        assert!(matches!(
            store.resolve("../file.txt"),
            Err(CommandError::Validation(_))
        ));
        assert!(matches!(
            store.resolve("dir/../../file.txt"),
            Err(CommandError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_write_create_and_read() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        store
            .write_create("nested/dir/test.txt", b"Hello, World!")
            .await
            .unwrap();
        let content = store.read("nested/dir/test.txt").await.unwrap();
        assert_eq!(content, b"Hello, World!");

        // Second create must fail and leave the original intact
        let err = store
            .write_create("nested/dir/test.txt", b"other")
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::AlreadyExists(_)));
        assert_eq!(store.read("nested/dir/test.txt").await.unwrap(), b"Hello, World!");
    }

    #[tokio::test]
    async fn test_upsert_overwrites() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        store.write_upsert("a.txt", b"one").await.unwrap();
        store.write_upsert("a.txt", b"two").await.unwrap();
        assert_eq!(store.read("a.txt").await.unwrap(), b"two");
    }

    #[tokio::test]
    async fn test_delete_and_not_found() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        store.write_upsert("a.txt", b"x").await.unwrap();
        store.delete("a.txt").await.unwrap();
        assert!(matches!(
            store.delete("a.txt").await,
            Err(CommandError::NotFound(_))
        ));
        assert!(matches!(
            store.read("a.txt").await,
            Err(CommandError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_rename_never_overwrites() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        store.write_upsert("a.txt", b"a").await.unwrap();
        store.write_upsert("b.txt", b"b").await.unwrap();

        let err = store.rename("a.txt", "b.txt").await.unwrap_err();
        assert!(matches!(err, CommandError::AlreadyExists(_)));
        assert_eq!(store.read("b.txt").await.unwrap(), b"b");

        store.rename("a.txt", "c.txt").await.unwrap();
        assert_eq!(store.read("c.txt").await.unwrap(), b"a");
        assert!(store.read("a.txt").await.is_err());
    }

    #[tokio::test]
    async fn test_list_dir_sorted_one_level() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        store.write_upsert("d/z.txt", b"z").await.unwrap();
        store.write_upsert("d/a.txt", b"a").await.unwrap();
        store.write_upsert("d/sub/inner.txt", b"i").await.unwrap();

        let entries = store.list_dir("d").await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "sub", "z.txt"]);
        assert!(entries[1].is_dir);

        assert!(matches!(
            store.list_dir("missing").await,
            Err(CommandError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_stat() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        store.write_upsert("a.txt", b"12345").await.unwrap();
        let stat = store.stat("a.txt").await.unwrap();
        assert_eq!(stat.size, 5);
        // RFC 3339 UTC, e.g. 2026-08-30T12:00:00.000Z
        assert!(stat.modified.ends_with('Z'), "got {}", stat.modified);
    }

    #[test]
    fn test_extension_helpers() {
        assert_eq!(extension_of("a.TXT"), ".txt");
        assert_eq!(extension_of("archive.tar.gz"), ".gz");
        assert_eq!(extension_of("Makefile"), "");
        assert_eq!(extension_of(".gitignore"), "");

        let filter = normalize_extensions(&["TXT".to_string(), ".Md".to_string()]);
        assert_eq!(filter, vec![".txt", ".md"]);
        assert!(matches_filter("a.txt", &filter));
        assert!(matches_filter("b.MD", &filter));
        assert!(!matches_filter("c.rs", &filter));
        assert!(matches_filter("anything.rs", &[]));
    }

    #[test]
    fn test_wire_join() {
        assert_eq!(wire_join("", "a.txt"), "a.txt");
        assert_eq!(wire_join(".", "a.txt"), "a.txt");
        assert_eq!(wire_join("src", "a.txt"), "src/a.txt");
        assert_eq!(wire_join("src/", "a.txt"), "src/a.txt");
        assert_eq!(wire_join("src\\nested", "a.txt"), "src/nested/a.txt");
    }
}
