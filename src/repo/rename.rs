//! Module rename map
//!
//! Built from the renamed artifact set, the map answers one question during
//! descriptor rewriting: given a module reference as it appears in a
//! descriptor, what are its final published name and version? References
//! are matched by base name, by the as-built name (old suffix), and by the
//! final name itself, so rewriting an already-rewritten descriptor changes
//! nothing. A reference matching no entry belongs to an external module and
//! is left alone.

use std::collections::HashMap;

use crate::core::model::ModuleRef;

/// Final identity of a renamed module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalModule {
    /// Final published name, including the new cross-version suffix
    pub name: String,
    pub version: String,
}

/// One module's rename: base coordinates plus old and new suffixes
#[derive(Debug, Clone)]
pub struct ModuleRename {
    /// Base module coordinates, without any cross-version suffix
    pub module: ModuleRef,
    pub version: String,
    pub old_suffix: String,
    pub new_suffix: String,
}

impl ModuleRename {
    /// Name the module was built under
    pub fn old_name(&self) -> String {
        format!("{}{}", self.module.name, self.old_suffix)
    }

    /// Final published name
    pub fn final_name(&self) -> String {
        format!("{}{}", self.module.name, self.new_suffix)
    }
}

/// Lookup table from (organization, referenced name) to final identity
#[derive(Debug, Default)]
pub struct RenameMap {
    entries: HashMap<(String, String), FinalModule>,
}

impl RenameMap {
    pub fn new(renames: &[ModuleRename]) -> Self {
        let mut entries = HashMap::new();
        for rename in renames {
            let target = FinalModule {
                name: rename.final_name(),
                version: rename.version.clone(),
            };
            for referenced in [
                rename.module.name.clone(),
                rename.old_name(),
                rename.final_name(),
            ] {
                entries.insert(
                    (rename.module.organization.clone(), referenced),
                    target.clone(),
                );
            }
        }
        Self { entries }
    }

    pub fn lookup(&self, organization: &str, name: &str) -> Option<&FinalModule> {
        self.entries
            .get(&(organization.to_string(), name.to_string()))
    }
}
