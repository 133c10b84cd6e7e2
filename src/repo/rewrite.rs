//! Repository rename and rewrite pass
//!
//! Applied to the merged local repository after all assemble parts have
//! built: every recognized artifact whose module appears in the rename map
//! is moved to its renamed path, descriptors are rewritten to final
//! coordinates, checksum side-files are regenerated, and the
//! content-addressed sha set is recomputed for the final tree (the
//! previous shas are invalid once contents or paths changed).

use std::collections::HashMap;
use std::path::Path;

use crate::core::model::ArtifactSha;
use crate::error::RepoError;
use crate::infra::filesystem;
use crate::repo::checksums;
use crate::repo::ivy::rewrite_ivy;
use crate::repo::layout::RepoPath;
use crate::repo::pom::rewrite_pom;
use crate::repo::rename::RenameMap;

/// Result of one rewrite pass
#[derive(Debug, Default)]
pub struct RewriteOutcome {
    /// Fresh content hashes for every file in the final tree
    pub shas: Vec<ArtifactSha>,

    /// Old repository-relative path to new, for every moved file
    pub moves: HashMap<String, String>,
}

/// Rename artifacts and rewrite descriptors under a repository root
pub fn rewrite_repository(
    repo: &Path,
    renames: &RenameMap,
) -> Result<RewriteOutcome, RepoError> {
    let mut outcome = RewriteOutcome::default();

    for rel in collect_files(repo)? {
        let Some(repo_path) = RepoPath::classify(&rel) else {
            // Foreign files may coexist in the repository root.
            tracing::warn!(path = %rel, "unrecognized repository path, left untouched");
            continue;
        };

        let Some(target) = renames.lookup(repo_path.organization(), repo_path.module()) else {
            // Not produced by this group; leave it at its original coordinates.
            continue;
        };

        let new_rel = repo_path.with_module(&target.name).rel_path();
        let old_abs = repo.join(&rel);
        let new_abs = repo.join(&new_rel);

        if repo_path.is_descriptor() {
            let text = filesystem::read_file_string(&old_abs)?;
            let rewritten = rewrite_descriptor(&repo_path, &text, renames).map_err(|error| {
                RepoError::DescriptorParse {
                    path: old_abs.clone(),
                    error,
                }
            })?;
            checksums::remove_side_files(&old_abs)?;
            if let Some(content) = rewritten {
                filesystem::write_file(&new_abs, content.as_bytes())?;
                if new_rel != rel {
                    filesystem::remove_file_if_exists(&old_abs)?;
                }
            } else {
                filesystem::move_file(&old_abs, &new_abs)?;
            }
        } else {
            checksums::remove_side_files(&old_abs)?;
            filesystem::move_file(&old_abs, &new_abs)?;
        }
        checksums::write_side_files(&new_abs)?;

        if new_rel != rel {
            outcome.moves.insert(rel, new_rel);
        }
    }

    for rel in collect_files(repo)? {
        let sha256 = checksums::file_sha256(&repo.join(&rel))?;
        outcome.shas.push(ArtifactSha { sha256, rel_path: rel });
    }

    Ok(outcome)
}

fn rewrite_descriptor(
    repo_path: &RepoPath,
    text: &str,
    renames: &RenameMap,
) -> Result<Option<String>, String> {
    match repo_path {
        RepoPath::IvyDescriptor { .. } => rewrite_ivy(text, renames),
        RepoPath::Maven { .. } => rewrite_pom(text, renames),
        RepoPath::IvyArtifact { .. } => Ok(None),
    }
}

/// Repository-relative paths of every regular file, side-files excluded,
/// in sorted order
fn collect_files(repo: &Path) -> Result<Vec<String>, RepoError> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(repo) {
        let entry = entry.map_err(|e| RepoError::Io {
            path: repo.to_path_buf(),
            error: e.to_string(),
        })?;
        if !entry.file_type().is_file() || checksums::is_side_file(entry.path()) {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(repo)
            .expect("walked paths stay under the root")
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push(rel);
    }
    files.sort();
    Ok(files)
}
