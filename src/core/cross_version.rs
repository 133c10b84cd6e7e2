//! Cross-version suffix computation
//!
//! Published module names carry a suffix encoding the toolchain version
//! they were built against (for example `addon_2.11`). The suffix is
//! derived from the version of the distinguished core library found among
//! the assembled artifacts; core toolchain modules themselves are never
//! suffixed.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::config::defaults::{CORE_LIBRARY_NAME, CORE_NAME_PREFIX, CORE_ORGANIZATION};
use crate::core::model::ModuleRef;
use crate::error::VersionError;

/// Cross-version suffix policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossVersionMode {
    /// No suffix, regardless of core version
    #[default]
    Disabled,
    /// Suffix with the full version string
    Full,
    /// Suffix with the MAJOR.MINOR binary version
    Binary,
    /// Full version for pre-releases, binary version otherwise
    Standard,
}

impl CrossVersionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            CrossVersionMode::Disabled => "disabled",
            CrossVersionMode::Full => "full",
            CrossVersionMode::Binary => "binary",
            CrossVersionMode::Standard => "standard",
        }
    }
}

impl std::fmt::Display for CrossVersionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn binary_version_re() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"^(\d+\.\d+)").expect("valid regex"))
}

/// Derive the MAJOR.MINOR binary version from a full version string
///
/// `"2.11.0-M5"` becomes `"2.11"`. A string with no leading numeric
/// MAJOR.MINOR component is a hard error.
pub fn binary_version(version: &str) -> Result<String, VersionError> {
    binary_version_re()
        .captures(version)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| VersionError::NoBinaryVersion {
            version: version.to_string(),
        })
}

/// Compute the suffix (including the leading underscore) for a core version
///
/// The `standard` pre-release check is intentionally naive: a hyphen
/// anywhere in the version string counts as a pre-release marker. Tightening
/// it would silently change published artifact names for existing
/// configurations.
pub fn suffix_for(mode: CrossVersionMode, core_version: &str) -> Result<String, VersionError> {
    match mode {
        CrossVersionMode::Disabled => Ok(String::new()),
        CrossVersionMode::Full => Ok(format!("_{core_version}")),
        CrossVersionMode::Binary => Ok(format!("_{}", binary_version(core_version)?)),
        CrossVersionMode::Standard => {
            if core_version.contains('-') {
                Ok(format!("_{core_version}"))
            } else {
                Ok(format!("_{}", binary_version(core_version)?))
            }
        }
    }
}

/// Whether a module belongs to the core toolchain namespace
///
/// Core modules keep their plain names through renaming.
pub fn is_core_module(organization: &str, name: &str) -> bool {
    organization == CORE_ORGANIZATION && name.starts_with(CORE_NAME_PREFIX)
}

/// Whether a module is the distinguished core library itself
pub fn is_core_library(module: &ModuleRef) -> bool {
    module.organization == CORE_ORGANIZATION && module.name == CORE_LIBRARY_NAME
}
