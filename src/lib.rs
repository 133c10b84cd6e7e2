//! Multibuild - multi-project build orchestrator
//!
//! This library builds a group of source projects from a single declarative
//! manifest, verifying that they all work together: each project is built
//! against the exact artifacts its dependencies produced within the same
//! run, never against published releases.
//!
//! Builds are identified by content: the fingerprint of a project's pinned
//! configuration, options, and the identities of its dependency builds. The
//! same identity is never built twice, within a run or across recursion into
//! composite projects.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`core`] - Orchestration logic, caches, and the build-system contract
//! - [`repo`] - Local artifact repository handling (Maven/Ivy layouts)
//! - [`infra`] - Infrastructure layer (working directories, filesystem)
//! - [`notify`] - Notification boundary for finished runs
//! - [`config`] - Configuration constants
//! - [`error`] - Error types and handling

pub mod config;
pub mod core;
pub mod error;
pub mod infra;
pub mod notify;
pub mod repo;
