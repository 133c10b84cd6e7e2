//! Repository checksums
//!
//! Two kinds of hashing coexist: SHA-256 content hashes identify artifacts
//! in the content-addressed store, while `.sha1`/`.md5` side-files next to
//! every repository file follow the Maven/Ivy layout contract.

use std::path::{Path, PathBuf};

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::config::defaults::CHECKSUM_SUFFIXES;
use crate::error::RepoError;
use crate::infra::filesystem;

/// SHA-256 hex digest of a byte slice
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// SHA-256 hex digest of a file
pub fn file_sha256(path: &Path) -> Result<String, RepoError> {
    Ok(sha256_hex(&filesystem::read_file(path)?))
}

/// Whether a path is a checksum side-file
pub fn is_side_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| CHECKSUM_SUFFIXES.contains(&ext))
}

/// Path of the side-file for an algorithm suffix
pub fn side_file_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// Write fresh `.sha1` and `.md5` side-files next to a repository file
pub fn write_side_files(path: &Path) -> Result<(), RepoError> {
    let bytes = filesystem::read_file(path)?;
    let sha1 = hex::encode(Sha1::digest(&bytes));
    let md5 = hex::encode(Md5::digest(&bytes));

    filesystem::write_file(&side_file_path(path, "sha1"), sha1.as_bytes())?;
    filesystem::write_file(&side_file_path(path, "md5"), md5.as_bytes())?;
    Ok(())
}

/// Remove any checksum side-files belonging to a repository file
pub fn remove_side_files(path: &Path) -> Result<(), RepoError> {
    for suffix in CHECKSUM_SUFFIXES {
        filesystem::remove_file_if_exists(&side_file_path(path, suffix))?;
    }
    Ok(())
}

/// Verify that a file's content matches an expected SHA-256 digest
pub fn verify_sha256(path: &Path, expected: &str) -> Result<(), RepoError> {
    let actual = file_sha256(path)?;
    if actual == expected {
        Ok(())
    } else {
        Err(RepoError::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: expected.to_string(),
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn side_files_carry_known_digests() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("lib-1.0.jar");
        filesystem::write_file(&file, b"abc").unwrap();

        write_side_files(&file).unwrap();
        let sha1 = filesystem::read_file_string(&dir.path().join("lib-1.0.jar.sha1")).unwrap();
        let md5 = filesystem::read_file_string(&dir.path().join("lib-1.0.jar.md5")).unwrap();
        assert_eq!(sha1, "a9993e364706816aba3e25717850c26c9cd0d89d");
        assert_eq!(md5, "900150983cd24fb0d6963f7d28e17f72");

        remove_side_files(&file).unwrap();
        assert!(!dir.path().join("lib-1.0.jar.sha1").exists());
    }

    #[test]
    fn verify_reports_both_digests_on_mismatch() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.jar");
        filesystem::write_file(&file, b"abc").unwrap();

        assert!(verify_sha256(&file, &sha256_hex(b"abc")).is_ok());
        match verify_sha256(&file, "deadbeef") {
            Err(RepoError::ChecksumMismatch { expected, .. }) => {
                assert_eq!(expected, "deadbeef");
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn side_file_detection() {
        assert!(is_side_file(Path::new("a/b/lib-1.0.jar.sha1")));
        assert!(is_side_file(Path::new("a/b/lib-1.0.jar.md5")));
        assert!(!is_side_file(Path::new("a/b/lib-1.0.jar")));
    }
}
