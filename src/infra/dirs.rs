//! Working-directory layout
//!
//! Every extraction and build gets a directory namespaced by its
//! fingerprint, so concurrently processed projects never collide on disk.
//! No two fingerprints ever share a working directory.

use std::path::{Path, PathBuf};

use crate::config::defaults::{LOCAL_REPO_DIR, PARTS_DIR};
use crate::core::hashing::{fingerprint_of_str, Fingerprint};

/// Subdirectory names under the work root
const EXTRACTION_SUBDIR: &str = "extraction";
const BUILD_SUBDIR: &str = "build";

/// Per-run working-directory provider
#[derive(Debug, Clone)]
pub struct WorkDirs {
    root: PathBuf,
}

impl WorkDirs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for one extraction, keyed by the extraction fingerprint
    pub fn extraction_dir(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.root.join(EXTRACTION_SUBDIR).join(fingerprint.short())
    }

    /// Directory for one build, keyed by the build identity
    pub fn build_dir(&self, uuid: &Fingerprint) -> PathBuf {
        self.root.join(BUILD_SUBDIR).join(uuid.short())
    }

    /// Local artifact repository inside a build directory
    pub fn local_repo(&self, uuid: &Fingerprint) -> PathBuf {
        self.build_dir(uuid).join(LOCAL_REPO_DIR)
    }

    /// Workspace for one assemble part beneath its parent directory
    ///
    /// Keyed by the hash of the part's name rather than its content: the
    /// content changes when the part is re-resolved, the name does not.
    pub fn part_dir(parent: &Path, part_name: &str) -> PathBuf {
        parent
            .join(PARTS_DIR)
            .join(fingerprint_of_str(part_name).short())
    }
}
