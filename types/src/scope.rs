use serde::{Deserialize, Serialize};

/// The read-scope tuple used both as the backend's read arguments and as
/// the tree cache key (spec §4.4): `(app, window_title_substring, window_id, pid)`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReadScope {
    pub app: Option<String>,
    pub window: Option<String>,
    pub window_id: Option<i64>,
    pub pid: Option<i32>,
    #[serde(default)]
    pub depth: Option<u32>,
}

impl ReadScope {
    pub fn for_app(app: impl Into<String>) -> Self {
        Self {
            app: Some(app.into()),
            ..Default::default()
        }
    }

    /// The cache key ignores `depth`: two reads of the same app/window/pid
    /// at different depths still address "the same scope" for invalidation
    /// purposes, even though they may be cached under distinct keys.
    pub fn cache_key(&self) -> (Option<String>, Option<String>, Option<i64>, Option<i32>) {
        (self.app.clone(), self.window.clone(), self.window_id, self.pid)
    }

    /// Whether a write scoped to `self` should invalidate a cache entry
    /// scoped to `other` (spec §4.4: "invalidate all entries matching that
    /// app"; a write with no app scope invalidates everything).
    pub fn matches_for_invalidation(write_app: Option<&str>, entry_app: Option<&str>) -> bool {
        match write_app {
            None => true,
            Some(app) => entry_app == Some(app),
        }
    }
}
