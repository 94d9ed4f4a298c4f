use core::fmt;

use serde::{Deserialize, Serialize};

/// A 16-hex-character content-hash identity (spec §3). Computed by
/// `bridge_consumer::diff::element_hash`; this type is just the carrier so
/// it can appear in wire responses without pulling `sha2` into this crate's
/// public surface.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContentHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
