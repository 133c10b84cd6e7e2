//! Repository rehydration
//!
//! Materializes a content-addressed artifact set from one repository root
//! into another without re-running any build: each sha entry names a
//! repository-relative path and the SHA-256 the file must hash to.
//! Checksum side-files travel along with their base file.

use std::path::Path;

use crate::config::defaults::CHECKSUM_SUFFIXES;
use crate::core::model::ArtifactSha;
use crate::error::RepoError;
use crate::infra::filesystem;
use crate::repo::checksums;

/// Copy an artifact set from `source` into `target`, verifying every hash
pub fn rehydrate(
    shas: &[ArtifactSha],
    source: &Path,
    target: &Path,
) -> Result<(), RepoError> {
    for sha in shas {
        let from = source.join(&sha.rel_path);
        if !from.is_file() {
            return Err(RepoError::MissingArtifact {
                repo: source.to_path_buf(),
                rel_path: sha.rel_path.clone(),
            });
        }
        checksums::verify_sha256(&from, &sha.sha256)?;

        let to = target.join(&sha.rel_path);
        filesystem::copy_file(&from, &to)?;

        for suffix in CHECKSUM_SUFFIXES {
            let side_from = checksums::side_file_path(&from, suffix);
            if side_from.is_file() {
                filesystem::copy_file(&side_from, &checksums::side_file_path(&to, suffix))?;
            }
        }
    }
    Ok(())
}
