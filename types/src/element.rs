//! The element model: tree form and flat form (spec §3).

use serde::{Deserialize, Serialize};

use crate::bounds::Bounds;
use crate::role::Role;

/// `unset`/`true` both mean "interactive"; `false` means disabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Enabled {
    Unset,
    True,
    False,
}

impl Enabled {
    pub const fn is_disabled(&self) -> bool {
        matches!(self, Enabled::False)
    }
}

impl Default for Enabled {
    fn default() -> Self {
        Enabled::Unset
    }
}

/// A node in the accessibility tree, in tree form.
///
/// `id` is assigned during traversal and is unique only within the read that
/// produced it; it is never stable across reads (spec §3 invariants).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Element {
    pub id: i32,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subrole: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub bounds: Bounds,
    #[serde(default)]
    pub focused: bool,
    #[serde(default)]
    pub enabled: Enabled,
    #[serde(default)]
    pub selected: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(id: i32, role: Role) -> Self {
        Self {
            id,
            role,
            ..Default::default()
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.title
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.description.as_deref().filter(|s| !s.is_empty()))
    }

    pub fn has_action(&self, action: &str) -> bool {
        self.actions.iter().any(|a| a == action)
    }

    /// `title | value | description`, case-insensitively, substring match.
    pub fn text_matches(&self, needle_lower: &str) -> bool {
        [self.title.as_deref(), self.value.as_deref(), self.description.as_deref()]
            .into_iter()
            .flatten()
            .any(|s| s.to_ascii_lowercase().contains(needle_lower))
    }

    pub fn text_equals(&self, needle_lower: &str) -> bool {
        [self.title.as_deref(), self.value.as_deref(), self.description.as_deref()]
            .into_iter()
            .flatten()
            .any(|s| s.to_ascii_lowercase() == needle_lower)
    }

    pub fn is_empty_group(&self) -> bool {
        matches!(self.role, Role::Group | Role::Other)
            && self.title.as_deref().unwrap_or("").is_empty()
            && self.value.as_deref().unwrap_or("").is_empty()
            && self.description.as_deref().unwrap_or("").is_empty()
    }
}

/// Same field set as [`Element`], with `children` replaced by a breadcrumb
/// `path` of role codes showing ancestry (spec §3).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FlatElement {
    pub id: i32,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subrole: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub bounds: Bounds,
    #[serde(default)]
    pub focused: bool,
    #[serde(default)]
    pub enabled: Enabled,
    #[serde(default)]
    pub selected: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_: Option<String>,
    pub path: String,
}

impl FlatElement {
    pub fn label(&self) -> Option<&str> {
        self.title
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.description.as_deref().filter(|s| !s.is_empty()))
    }

    pub fn is_empty_group(&self) -> bool {
        matches!(self.role, Role::Group | Role::Other)
            && self.title.as_deref().unwrap_or("").is_empty()
            && self.value.as_deref().unwrap_or("").is_empty()
            && self.description.as_deref().unwrap_or("").is_empty()
    }
}

impl From<&Element> for FlatElement {
    /// Converts a node's own fields, leaving `path` empty — callers that
    /// need ancestry should use `bridge_consumer::ops::flatten` instead.
    fn from(el: &Element) -> Self {
        FlatElement {
            id: el.id,
            role: el.role,
            subrole: el.subrole.clone(),
            title: el.title.clone(),
            value: el.value.clone(),
            description: el.description.clone(),
            bounds: el.bounds,
            focused: el.focused,
            enabled: el.enabled,
            selected: el.selected,
            actions: el.actions.clone(),
            ref_: el.ref_.clone(),
            path: el.role.code().to_string(),
        }
    }
}
