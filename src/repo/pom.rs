//! Maven pom rewriting
//!
//! Rewrites a pom's own artifact id to its renamed form, and every
//! dependency edge pointing at a module produced within the same assemble
//! group to that module's final name and version. Edges to external modules
//! are left untouched.

use crate::repo::rename::RenameMap;
use crate::repo::xml::Element;

/// Rewrite a pom document against a rename map
///
/// Returns `Ok(None)` when nothing needed to change, which makes the
/// rewrite idempotent: a pom already pointing at final coordinates passes
/// through unmodified.
pub fn rewrite_pom(text: &str, renames: &RenameMap) -> Result<Option<String>, String> {
    let mut root = Element::parse(text)?;
    if root.name != "project" {
        return Err(format!("expected <project> root, found <{}>", root.name));
    }

    let mut changed = false;

    // The group id may be inherited from the parent declaration.
    let own_group = root
        .child("groupId")
        .map(|e| e.text())
        .or_else(|| {
            root.child("parent")
                .and_then(|p| p.child("groupId"))
                .map(|e| e.text())
        })
        .unwrap_or_default();

    if let Some(artifact_id) = root.child_mut("artifactId") {
        if let Some(target) = renames.lookup(&own_group, &artifact_id.text()) {
            if artifact_id.text() != target.name {
                artifact_id.set_text(target.name.clone());
                changed = true;
            }
        }
    }

    if let Some(dependencies) = root.child_mut("dependencies") {
        changed |= rewrite_dependency_list(dependencies, renames);
    }
    if let Some(management) = root.child_mut("dependencyManagement") {
        if let Some(dependencies) = management.child_mut("dependencies") {
            changed |= rewrite_dependency_list(dependencies, renames);
        }
    }

    Ok(changed.then(|| root.to_document()))
}

fn rewrite_dependency_list(dependencies: &mut Element, renames: &RenameMap) -> bool {
    let mut changed = false;
    for dependency in dependencies.children_named_mut("dependency") {
        let group = dependency
            .child("groupId")
            .map(|e| e.text())
            .unwrap_or_default();
        let artifact = dependency
            .child("artifactId")
            .map(|e| e.text())
            .unwrap_or_default();

        let Some(target) = renames.lookup(&group, &artifact) else {
            continue;
        };

        if artifact != target.name {
            if let Some(element) = dependency.child_mut("artifactId") {
                element.set_text(target.name.clone());
                changed = true;
            }
        }
        // A managed dependency may carry no version element; leave it managed.
        if let Some(version) = dependency.child_mut("version") {
            if version.text() != target.version {
                version.set_text(target.version.clone());
                changed = true;
            }
        }
    }
    changed
}
