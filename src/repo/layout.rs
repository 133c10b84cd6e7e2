//! Repository path layout
//!
//! Two conventions coexist in one repository tree:
//!
//! - Maven: `org/.../module/version/module-version[-classifier].ext`
//! - Ivy: `organization/module/revision/<confDir>/[ivy.xml | module-revision[-classifier].ext]`
//!
//! Checksum side-files (`.sha1`, `.md5`) travel with their base file and
//! are never classified on their own. A path matching neither convention is
//! foreign and left untouched by rewriting.

/// A recognized repository-relative path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoPath {
    /// Maven artifact or pom
    Maven {
        /// Dotted organization (path segments joined with `.`)
        organization: String,
        module: String,
        version: String,
        /// File name remainder after `module-version`, e.g. `.jar`,
        /// `-sources.jar`, `.pom`
        remainder: String,
    },

    /// Ivy module descriptor (`ivys/ivy.xml`)
    IvyDescriptor {
        organization: String,
        module: String,
        revision: String,
    },

    /// Ivy artifact under a configuration directory
    IvyArtifact {
        organization: String,
        module: String,
        revision: String,
        conf_dir: String,
        /// File name remainder after `module-revision`
        remainder: String,
    },
}

impl RepoPath {
    /// Classify a repository-relative path, `None` when foreign
    pub fn classify(rel_path: &str) -> Option<RepoPath> {
        let segments: Vec<&str> = rel_path.split('/').filter(|s| !s.is_empty()).collect();
        let n = segments.len();
        if n < 4 {
            return None;
        }
        let file = segments[n - 1];

        // Ivy paths use a single directory segment for the organization.
        if n == 5 {
            let (organization, module, revision, conf_dir) =
                (segments[0], segments[1], segments[2], segments[3]);
            if conf_dir == "ivys" && file == "ivy.xml" {
                return Some(RepoPath::IvyDescriptor {
                    organization: organization.to_string(),
                    module: module.to_string(),
                    revision: revision.to_string(),
                });
            }
            let prefix = format!("{module}-{revision}");
            if conf_dir != "ivys" && file.starts_with(&prefix) {
                return Some(RepoPath::IvyArtifact {
                    organization: organization.to_string(),
                    module: module.to_string(),
                    revision: revision.to_string(),
                    conf_dir: conf_dir.to_string(),
                    remainder: file[prefix.len()..].to_string(),
                });
            }
        }

        let (module, version) = (segments[n - 3], segments[n - 2]);
        let prefix = format!("{module}-{version}");
        if file.starts_with(&prefix) {
            return Some(RepoPath::Maven {
                organization: segments[..n - 3].join("."),
                module: module.to_string(),
                version: version.to_string(),
                remainder: file[prefix.len()..].to_string(),
            });
        }

        None
    }

    pub fn organization(&self) -> &str {
        match self {
            RepoPath::Maven { organization, .. }
            | RepoPath::IvyDescriptor { organization, .. }
            | RepoPath::IvyArtifact { organization, .. } => organization,
        }
    }

    /// Module name as it appears in the path (including any built-in suffix)
    pub fn module(&self) -> &str {
        match self {
            RepoPath::Maven { module, .. }
            | RepoPath::IvyDescriptor { module, .. }
            | RepoPath::IvyArtifact { module, .. } => module,
        }
    }

    /// Same location with the module renamed
    pub fn with_module(&self, new_module: &str) -> RepoPath {
        let mut renamed = self.clone();
        match &mut renamed {
            RepoPath::Maven { module, .. }
            | RepoPath::IvyDescriptor { module, .. }
            | RepoPath::IvyArtifact { module, .. } => *module = new_module.to_string(),
        }
        renamed
    }

    /// Repository-relative path for this location
    pub fn rel_path(&self) -> String {
        match self {
            RepoPath::Maven {
                organization,
                module,
                version,
                remainder,
            } => {
                let mut segments: Vec<&str> = organization.split('.').collect();
                let file = format!("{module}-{version}{remainder}");
                segments.push(module);
                segments.push(version);
                let mut path = segments.join("/");
                path.push('/');
                path.push_str(&file);
                path
            }
            RepoPath::IvyDescriptor {
                organization,
                module,
                revision,
            } => format!("{organization}/{module}/{revision}/ivys/ivy.xml"),
            RepoPath::IvyArtifact {
                organization,
                module,
                revision,
                conf_dir,
                remainder,
            } => format!(
                "{organization}/{module}/{revision}/{conf_dir}/{module}-{revision}{remainder}"
            ),
        }
    }

    /// Whether this file is a rewritable descriptor (pom or ivy.xml)
    pub fn is_descriptor(&self) -> bool {
        match self {
            RepoPath::IvyDescriptor { .. } => true,
            RepoPath::Maven { remainder, .. } => remainder == ".pom",
            RepoPath::IvyArtifact { .. } => false,
        }
    }
}
