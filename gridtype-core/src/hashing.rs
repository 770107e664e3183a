//! Content fingerprints.
//!
//! Every hash is SHA-256. Structured values are hashed as compact JSON whose
//! object keys are written in byte order, whatever order the source kept.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// SHA-256 of bytes as lowercase hex.
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Borrowed JSON value that serializes with key-sorted objects.
struct Sorted<'a>(&'a Value);

impl Serialize for Sorted<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::Object(map) => {
                let mut entries: Vec<(&String, &Value)> = map.iter().collect();
                entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
                let mut out = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    out.serialize_entry(key, &Sorted(value))?;
                }
                out.end()
            }
            Value::Array(items) => serializer.collect_seq(items.iter().map(Sorted)),
            scalar => scalar.serialize(serializer),
        }
    }
}

/// Compact JSON with sorted keys.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(&Sorted(&serde_json::to_value(value)?))
}

/// Stream the canonical form of `value` into `hasher`.
fn hash_canonical<T: Serialize>(hasher: &mut Sha256, value: &T) -> Result<(), serde_json::Error> {
    let value = serde_json::to_value(value)?;
    serde_json::to_writer(hasher, &Sorted(&value))
}

pub fn compute_manifest_hash<T: Serialize>(manifest: &T) -> Result<String, serde_json::Error> {
    let mut hasher = Sha256::new();
    hash_canonical(&mut hasher, manifest)?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Hash of `kind:canonical_payload:engine_version`.
pub fn compute_job_hash(
    kind: &str,
    payload: &impl Serialize,
    engine_version: &str,
) -> Result<String, serde_json::Error> {
    let mut hasher = Sha256::new();
    hasher.update(kind.as_bytes());
    hasher.update(b":");
    hash_canonical(&mut hasher, payload)?;
    hasher.update(b":");
    hasher.update(engine_version.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
