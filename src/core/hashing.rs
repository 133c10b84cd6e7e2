//! Content-addressed identity hashing
//!
//! Every configuration and descriptor value gets a stable [`Fingerprint`]:
//! the SHA-256 of its canonical JSON rendering. Fingerprints key the
//! extraction and build caches, identify repeatable builds, and namespace
//! per-project working directories.
//!
//! Canonicalization makes the hash independent of incidental formatting in
//! human-edited input: map keys are emitted in sorted order (serde_json maps
//! are BTreeMap-backed) and absent optional fields are stripped, so `None`
//! hashes identically to an omitted field. Sequence order is preserved; it
//! is meaningful content.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Stable content hash of a configuration or descriptor value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Full lowercase hex digest
    pub fn as_hex(&self) -> &str {
        &self.0
    }

    /// Abbreviated digest for log lines and directory names
    pub fn short(&self) -> &str {
        &self.0[..16]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash any serializable value into a [`Fingerprint`]
///
/// Deterministic across processes and machines for structurally equal
/// values. A non-serializable input is a programming error, hence the
/// panic rather than a `Result`.
pub fn fingerprint_of<T: Serialize>(value: &T) -> Fingerprint {
    let tree = serde_json::to_value(value).expect("fingerprinted values must serialize");
    let canonical = canonicalize(tree);
    let rendered =
        serde_json::to_string(&canonical).expect("canonical JSON value must render");

    let mut hasher = Sha256::new();
    hasher.update(rendered.as_bytes());
    Fingerprint(hex::encode(hasher.finalize()))
}

/// Hash a bare string, used to key assemble part directories by part name
pub fn fingerprint_of_str(value: &str) -> Fingerprint {
    fingerprint_of(&value)
}

/// Strip nulls from objects recursively so elided optionals hash the same
/// as explicit `None`
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, canonicalize(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
