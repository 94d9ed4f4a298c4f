//! Diff and observe-stream payload types (spec §3, §4.3, §4.6 `observe`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::element::FlatElement;

/// One changed field on an id-matched or hash-matched element: `(old, new)`
/// string representations, keyed by the single-letter field code from
/// spec §3 (`v` value, `b` bounds, `f` focused, `s` selected, …).
pub type FieldDiff = BTreeMap<String, (String, String)>;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HashChange {
    pub id: i32,
    pub role: String,
    pub title: Option<String>,
    pub changes: FieldDiff,
}

/// Result of `DiffElementsByHash` (spec §4.3).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TreeDiff {
    pub added: Vec<FlatElement>,
    pub removed: Vec<FlatElement>,
    pub changed: Vec<HashChange>,
    pub unchanged_count: usize,
}

/// Result of `DiffElements` (id-based), used by the `observe` handler.
#[derive(Clone, Debug, Default)]
pub struct IdDiff {
    pub added: Vec<FlatElement>,
    pub removed: Vec<(i32, String, Option<String>)>,
    pub changed: Vec<HashChange>,
}

/// A single observe-stream event (spec §4.6 `observe`, §3 `UIChange`).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ObserveEvent {
    Snapshot {
        count: usize,
    },
    Added {
        element: FlatElement,
    },
    Removed {
        id: i32,
        role: String,
        title: Option<String>,
    },
    Changed {
        id: i32,
        role: String,
        title: Option<String>,
        changes: FieldDiff,
    },
    Done {
        added: usize,
        removed: usize,
        changed: usize,
    },
}
