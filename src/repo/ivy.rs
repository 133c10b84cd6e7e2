//! Ivy module descriptor rewriting
//!
//! Same contract as pom rewriting: the module's own name in `<info>` and
//! its published artifact names are renamed, dependency edges onto modules
//! of the same assemble group are re-pointed at their final name and
//! revision, and everything else passes through untouched.

use crate::repo::rename::RenameMap;
use crate::repo::xml::Element;

/// Rewrite an ivy.xml document against a rename map
///
/// Returns `Ok(None)` when nothing needed to change.
pub fn rewrite_ivy(text: &str, renames: &RenameMap) -> Result<Option<String>, String> {
    let mut root = Element::parse(text)?;
    if root.name != "ivy-module" {
        return Err(format!("expected <ivy-module> root, found <{}>", root.name));
    }

    let mut changed = false;

    let own_organization = root
        .child("info")
        .and_then(|info| info.attr("organisation"))
        .unwrap_or_default()
        .to_string();

    if let Some(info) = root.child_mut("info") {
        let module = info.attr("module").unwrap_or_default().to_string();
        if let Some(target) = renames.lookup(&own_organization, &module) {
            if module != target.name {
                info.set_attr("module", target.name.clone());
                changed = true;
            }
        }
    }

    if let Some(publications) = root.child_mut("publications") {
        for artifact in publications.children_named_mut("artifact") {
            let name = artifact.attr("name").unwrap_or_default().to_string();
            if let Some(target) = renames.lookup(&own_organization, &name) {
                if name != target.name {
                    artifact.set_attr("name", target.name.clone());
                    changed = true;
                }
            }
        }
    }

    if let Some(dependencies) = root.child_mut("dependencies") {
        for dependency in dependencies.children_named_mut("dependency") {
            let organization = dependency.attr("org").unwrap_or_default().to_string();
            let name = dependency.attr("name").unwrap_or_default().to_string();
            let Some(target) = renames.lookup(&organization, &name) else {
                continue;
            };
            if name != target.name {
                dependency.set_attr("name", target.name.clone());
                changed = true;
            }
            if dependency.attr("rev") != Some(target.version.as_str()) {
                dependency.set_attr("rev", target.version.clone());
                changed = true;
            }
        }
    }

    Ok(changed.then(|| root.to_document()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::ModuleRef;
    use crate::repo::rename::ModuleRename;

    fn map() -> RenameMap {
        RenameMap::new(&[
            ModuleRename {
                module: ModuleRef {
                    organization: "org.x".to_string(),
                    name: "addon".to_string(),
                },
                version: "1.0".to_string(),
                old_suffix: "_2.10".to_string(),
                new_suffix: "_2.11".to_string(),
            },
            ModuleRename {
                module: ModuleRef {
                    organization: "org.x".to_string(),
                    name: "core".to_string(),
                },
                version: "2.11.4".to_string(),
                old_suffix: String::new(),
                new_suffix: String::new(),
            },
        ])
    }

    const ADDON_IVY: &str = r#"<ivy-module version="2.0">
  <info organisation="org.x" module="addon_2.10" revision="1.0"/>
  <publications>
    <artifact name="addon_2.10" type="jar" ext="jar"/>
  </publications>
  <dependencies>
    <dependency org="org.x" name="core" rev="1.0"/>
    <dependency org="junit" name="junit" rev="4.11"/>
  </dependencies>
</ivy-module>"#;

    #[test]
    fn rewrites_info_publications_and_internal_edges() {
        let out = rewrite_ivy(ADDON_IVY, &map()).unwrap().expect("changed");
        assert!(out.contains("module=\"addon_2.11\""));
        assert!(out.contains("name=\"addon_2.11\""));
        assert!(out.contains("name=\"core\" rev=\"2.11.4\""));
        assert!(out.contains("name=\"junit\" rev=\"4.11\""));
    }

    #[test]
    fn rewriting_twice_changes_nothing() {
        let renames = map();
        let once = rewrite_ivy(ADDON_IVY, &renames).unwrap().expect("changed");
        assert!(rewrite_ivy(&once, &renames).unwrap().is_none());
    }

    #[test]
    fn non_ivy_root_is_an_error() {
        assert!(rewrite_ivy("<project/>", &map()).is_err());
    }
}
