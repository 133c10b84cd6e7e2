//! Local artifact repository
//!
//! Reading, renaming, and rewriting of the filesystem tree that holds
//! published artifacts in the coexisting Maven and Ivy layouts.
//!
//! # Submodules
//!
//! - [`layout`] - Path recognition for both repository conventions
//! - [`rename`] - Rename map from as-built to final module identities
//! - [`pom`] - Maven pom descriptor rewriting
//! - [`ivy`] - Ivy module descriptor rewriting
//! - [`rewrite`] - The rename/rewrite pass over a merged repository
//! - [`checksums`] - Content hashes and `.sha1`/`.md5` side-files
//! - [`rehydrate`] - Materializing content-addressed artifact sets
//! - [`xml`] - Minimal XML tree used by the descriptor rewriters

pub mod checksums;
pub mod ivy;
pub mod layout;
pub mod pom;
pub mod rehydrate;
pub mod rename;
pub mod rewrite;
pub mod xml;
