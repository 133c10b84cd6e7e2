//! Core orchestration logic
//!
//! Everything that decides what to build and in what order. Filesystem side
//! effects happen in [`crate::infra`] and [`crate::repo`]; this module works
//! with values and the two memoization caches.
//!
//! # Submodules
//!
//! - [`model`] - Configuration and artifact data model
//! - [`hashing`] - Canonical serialization and content fingerprints
//! - [`manifest`] - Build manifest parsing and validation
//! - [`contract`] - The pluggable build-system trait and registry
//! - [`extraction_cache`] - Memoized dependency extraction
//! - [`build_cache`] - Memoized builds keyed by build identity
//! - [`graph`] - Project dependency graph and build order
//! - [`cross_version`] - Cross-version suffix computation
//! - [`assemble`] - The composite assemble build system
//! - [`orchestrator`] - The top-level run driver
//! - [`outcome`] - Build outcomes and the run report

pub mod assemble;
pub mod build_cache;
pub mod contract;
pub mod cross_version;
pub mod extraction_cache;
pub mod graph;
pub mod hashing;
pub mod manifest;
pub mod model;
pub mod orchestrator;
pub mod outcome;
