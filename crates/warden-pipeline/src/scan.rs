//! Directory scan targets
//!
//! Turns a directory into a single threat record: a bounded,
//! non-recursive listing of its regular files, each with its SHA-256,
//! becomes the record's context.
//!
//! Scanning is blocking file I/O; async callers run it on the blocking
//! pool (`tokio::task::spawn_blocking`).

use crate::InputError;
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};
use warden_domain::ThreatRecord;

/// Default cap on files listed per scan
pub const DEFAULT_MAX_FILES: usize = 256;

/// Default cap on bytes hashed per file (64 MiB)
pub const DEFAULT_MAX_HASH_BYTES: u64 = 64 * 1024 * 1024;

/// Build a threat record describing a directory
///
/// Only regular files directly inside `dir` are listed (symlinks and
/// subdirectories are skipped), sorted by name, at most `max_files` of
/// them. The record id is `scan:<dir>`, its path is the directory and its
/// fingerprint is the SHA-256 of the listing. Files that cannot be read
/// are listed as `unreadable` rather than failing the scan. At most
/// [`DEFAULT_MAX_HASH_BYTES`] of each file are hashed.
///
/// # Errors
///
/// - `InputError::NotADirectory` if `dir` is not a directory
/// - `InputError::Io` if the directory cannot be listed
pub fn scan_directory(dir: impl AsRef<Path>, max_files: usize) -> Result<ThreatRecord, InputError> {
    scan_directory_capped(dir, max_files, DEFAULT_MAX_HASH_BYTES)
}

/// [`scan_directory`] with an explicit cap on bytes hashed per file
///
/// A file longer than `max_hash_bytes` gets the digest of its first
/// `max_hash_bytes` bytes, and its listing line is marked `(partial)`.
pub fn scan_directory_capped(
    dir: impl AsRef<Path>,
    max_files: usize,
    max_hash_bytes: u64,
) -> Result<ThreatRecord, InputError> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(InputError::NotADirectory(dir.display().to_string()));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();

    let found = files.len();
    let truncated = found > max_files;
    files.truncate(max_files);

    let mut listing = String::new();
    for path in &files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let line = match (hash_file(path, max_hash_bytes), std::fs::metadata(path)) {
            (Ok(hash), Ok(meta)) if meta.len() > max_hash_bytes => {
                format!("{}  {:>10}  {} (partial)", hash, meta.len(), name)
            }
            (Ok(hash), Ok(meta)) => format!("{}  {:>10}  {}", hash, meta.len(), name),
            (Err(e), _) | (_, Err(e)) => {
                debug!(file = %path.display(), error = %e, "Unreadable file in scan");
                format!("{:<64}  {:>10}  {}", "unreadable", "-", name)
            }
        };
        listing.push_str(&line);
        listing.push('\n');
    }

    let fingerprint = hex::encode(Sha256::digest(listing.as_bytes()));

    let mut context = format!(
        "Directory scan of {}: {} regular file(s)\n{}",
        dir.display(),
        files.len(),
        listing
    );
    if truncated {
        context.push_str(&format!(
            "(listing truncated: {} of {} files shown)\n",
            files.len(),
            found
        ));
    }

    info!(dir = %dir.display(), files = files.len(), truncated, "Directory scanned");

    let record = ThreatRecord::new(format!("scan:{}", dir.display()))
        .map_err(|e| InputError::NotADirectory(e.to_string()))?;
    Ok(record
        .with_path(Some(dir.display().to_string()))
        .with_fingerprint(Some(fingerprint))
        .with_context(Some(context)))
}

/// Streaming SHA-256 of at most `limit` leading bytes of a file, hex encoded
fn hash_file(path: &Path, limit: u64) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?.take(limit);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // sha256("hello")
    const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    #[test]
    fn test_scan_lists_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.locked"), "hello").unwrap();
        std::fs::write(dir.path().join("a.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/hidden.txt"), "x").unwrap();

        let record = scan_directory(dir.path(), DEFAULT_MAX_FILES).unwrap();
        assert!(record.id().starts_with("scan:"));
        assert_eq!(record.path(), Some(dir.path().display().to_string().as_str()));
        assert_eq!(record.fingerprint().map(str::len), Some(64));

        let context = record.context().unwrap();
        assert!(context.contains("2 regular file(s)"));
        assert!(context.contains(HELLO_SHA256));
        assert!(!context.contains("hidden.txt"));
        let a = context.find("a.txt").unwrap();
        let b = context.find("b.locked").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_scan_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a"), "1").unwrap();

        let first = scan_directory(dir.path(), 10).unwrap();
        let second = scan_directory(dir.path(), 10).unwrap();
        assert_eq!(first, second);

        std::fs::write(dir.path().join("a"), "2").unwrap();
        let changed = scan_directory(dir.path(), 10).unwrap();
        assert_ne!(first.fingerprint(), changed.fingerprint());
    }

    #[test]
    fn test_scan_truncates() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..5 {
            std::fs::write(dir.path().join(format!("f{}", i)), "x").unwrap();
        }

        let record = scan_directory(dir.path(), 2).unwrap();
        let context = record.context().unwrap();
        assert!(context.contains("2 of 5 files shown"));
        assert!(context.lines().any(|l| l.ends_with("  f1")));
        assert!(!context.lines().any(|l| l.ends_with("  f2")));
    }

    #[test]
    fn test_scan_hashes_only_leading_bytes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("big.bin"), "hello world").unwrap();
        std::fs::write(dir.path().join("small.txt"), "hello").unwrap();

        let record = scan_directory_capped(dir.path(), 10, 5).unwrap();
        let context = record.context().unwrap();
        let big = context.lines().find(|l| l.contains("big.bin")).unwrap();
        assert!(big.starts_with(HELLO_SHA256));
        assert!(big.ends_with("big.bin (partial)"));
        let small = context.lines().find(|l| l.contains("small.txt")).unwrap();
        assert!(small.ends_with("  small.txt"));
    }

    #[test]
    fn test_scan_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let record = scan_directory(dir.path(), 10).unwrap();
        assert!(record.context().unwrap().contains("0 regular file(s)"));
    }

    #[test]
    fn test_scan_rejects_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let result = scan_directory(file.path(), 10);
        assert!(matches!(result, Err(InputError::NotADirectory(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_skips_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("real"), "x").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link")).unwrap();

        let record = scan_directory(dir.path(), 10).unwrap();
        let context = record.context().unwrap();
        assert!(context.contains("1 regular file(s)"));
        assert!(!context.lines().any(|l| l.ends_with("  link")));
    }
}
