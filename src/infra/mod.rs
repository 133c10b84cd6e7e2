//! Infrastructure layer
//!
//! Working-directory layout and filesystem operations. This module is the
//! only place where raw file IO side effects occur.

pub mod dirs;
pub mod filesystem;
