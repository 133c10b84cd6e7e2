//! Fixed constants shared across the orchestrator

/// Organization of the distinguished core toolchain modules
pub const CORE_ORGANIZATION: &str = "org.scala-lang";

/// Name prefix identifying core toolchain modules within [`CORE_ORGANIZATION`]
pub const CORE_NAME_PREFIX: &str = "scala-";

/// The distinguished core library whose version drives the cross-version suffix
pub const CORE_LIBRARY_NAME: &str = "scala-library";

/// Checksum side-file suffixes written next to every repository file
pub const CHECKSUM_SUFFIXES: [&str; 2] = ["sha1", "md5"];

/// Directory name of the per-build local artifact repository
pub const LOCAL_REPO_DIR: &str = "repo";

/// Directory name holding assemble part workspaces
pub const PARTS_DIR: &str = "parts";

/// Minimum proptest iterations
pub const MIN_PROPTEST_ITERATIONS: u32 = 100;
