//! Target specifications for write handlers (spec §4.5).

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetSpec {
    Id {
        id: i32,
    },
    Ref {
        #[serde(rename = "ref")]
        ref_: String,
    },
    Text {
        text: String,
        #[serde(default)]
        roles: Option<Vec<String>>,
        #[serde(default)]
        scope_id: Option<i32>,
        #[serde(default)]
        exact: bool,
    },
    Point {
        x: i32,
        y: i32,
    },
}

/// Compass direction for the `--near` option (spec §4.5).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Above,
    Below,
    Any,
}
