use serde::{Deserialize, Serialize};

use crate::bounds::Bounds;

/// A platform top-level window. `id` is a platform-assigned integer, distinct
/// from any [`crate::Element::id`] (spec §3).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Window {
    pub app: String,
    pub pid: i32,
    pub title: String,
    pub id: i64,
    pub bounds: Bounds,
    #[serde(default)]
    pub focused: bool,
}
