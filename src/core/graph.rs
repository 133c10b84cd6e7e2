//! Project dependency graph
//!
//! Derives project-level edges from extracted module references and
//! computes the build order. A project depends on another when it consumes
//! a module the other produces.

use std::collections::{HashMap, HashSet};

use crate::core::model::{ExtractedMeta, ModuleRef};
use crate::error::GraphError;

/// Dependency graph over project names
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Adjacency list: project -> dependencies
    edges: HashMap<String, Vec<String>>,
    /// All known projects
    nodes: HashSet<String>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a project with its direct dependencies
    pub fn add_project(&mut self, name: &str, dependencies: Vec<String>) {
        self.nodes.insert(name.to_string());
        for dep in &dependencies {
            self.nodes.insert(dep.clone());
        }
        self.edges.insert(name.to_string(), dependencies);
    }

    /// Derive the graph from extraction results
    ///
    /// Module references that no configured project produces are external
    /// dependencies and create no edge.
    pub fn from_extractions(extractions: &[(String, ExtractedMeta)]) -> Self {
        let mut producers: HashMap<ModuleRef, &str> = HashMap::new();
        for (project, meta) in extractions {
            for module in &meta.modules {
                producers.insert(module.module_ref(), project.as_str());
            }
        }

        let mut graph = Self::new();
        for (project, meta) in extractions {
            let mut deps: Vec<String> = meta
                .modules
                .iter()
                .flat_map(|m| m.dependencies.iter())
                .filter_map(|dep| producers.get(dep).copied())
                .filter(|producer| *producer != project)
                .map(String::from)
                .collect();
            deps.sort();
            deps.dedup();
            graph.add_project(project, deps);
        }
        graph
    }

    /// Direct dependencies of one project
    pub fn dependencies_of(&self, name: &str) -> &[String] {
        self.edges.get(name).map_or(&[], Vec::as_slice)
    }

    /// Compute topological sort (build order)
    ///
    /// Returns projects in order such that dependencies come before
    /// dependents. Iteration over nodes is sorted so the order is stable
    /// across runs.
    pub fn topological_sort(&self) -> Result<Vec<String>, GraphError> {
        let mut visited = HashSet::new();
        let mut temp_visited = HashSet::new();
        let mut result = Vec::new();
        let mut cycle_path = Vec::new();

        let mut nodes: Vec<&String> = self.nodes.iter().collect();
        nodes.sort();

        for node in nodes {
            if !visited.contains(node.as_str()) {
                self.visit(
                    node,
                    &mut visited,
                    &mut temp_visited,
                    &mut result,
                    &mut cycle_path,
                )?;
            }
        }

        Ok(result)
    }

    fn visit(
        &self,
        node: &str,
        visited: &mut HashSet<String>,
        temp_visited: &mut HashSet<String>,
        result: &mut Vec<String>,
        cycle_path: &mut Vec<String>,
    ) -> Result<(), GraphError> {
        if temp_visited.contains(node) {
            // Found a cycle. The path may carry non-cycle nodes from the
            // traversal root; report only the segment from the first
            // occurrence of the repeated node.
            let start = cycle_path.iter().position(|n| n == node).unwrap_or(0);
            let mut cycle = cycle_path.split_off(start);
            cycle.push(node.to_string());
            return Err(GraphError::CircularDependency { cycle });
        }

        if visited.contains(node) {
            return Ok(());
        }

        temp_visited.insert(node.to_string());
        cycle_path.push(node.to_string());

        if let Some(deps) = self.edges.get(node) {
            for dep in deps {
                self.visit(dep, visited, temp_visited, result, cycle_path)?;
            }
        }

        cycle_path.pop();
        temp_visited.remove(node);
        visited.insert(node.to_string());
        result.push(node.to_string());

        Ok(())
    }
}
