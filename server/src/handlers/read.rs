//! `read` handler (spec §4.6).

use std::collections::HashSet;

use bridge_consumer::{diff as diff_engine, ops, refs, snapshot};
use bridge_types::{Bounds, Element, FlatElement, ReadScope, TreeDiff};
use serde::{Deserialize, Serialize};

use crate::error::BridgeError;
use crate::render::{render_agent_format, SmartDefault};
use crate::server::Server;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ReadRequest {
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub window: Option<String>,
    #[serde(default)]
    pub window_id: Option<i64>,
    #[serde(default)]
    pub pid: Option<i32>,
    #[serde(default)]
    pub depth: Option<u32>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub bbox: Option<Bounds>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub focused: bool,
    #[serde(default)]
    pub scope_id: Option<i32>,
    #[serde(default)]
    pub children: bool,
    #[serde(default)]
    pub flat: bool,
    #[serde(default)]
    pub prune: Option<bool>,
    /// `"tree" | "flat" | "agent"`; chosen by the caller (the CLI resolves
    /// terminal-vs-piped before calling in; see spec §4.8).
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub used_default_format: bool,
    #[serde(default)]
    pub with_refs: bool,
    #[serde(default)]
    pub since: Option<i64>,
    #[serde(default)]
    pub raw: bool,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ReadResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree: Option<Element>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<FlatElement>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<TreeDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub smart_defaults: Vec<SmartDefault>,
}

pub fn read(server: &Server, req: &ReadRequest) -> Result<ReadResponse, BridgeError> {
    let scope = ReadScope {
        app: req.app.clone(),
        window: req.window.clone(),
        window_id: req.window_id,
        pid: req.pid,
        depth: req.depth,
    };

    let now = server.now_ms();
    let tree = server
        .with_backend(|b| server.cache.read_elements(b, &scope, now))
        .map_err(BridgeError::from)?;

    let mut smart_defaults = Vec::new();
    let has_web = ops::has_web_content(&tree);

    let effective_prune = if req.raw {
        false
    } else {
        match req.prune {
            Some(forced) => forced,
            None if has_web => {
                smart_defaults.push(SmartDefault::Prune);
                true
            }
            None => false,
        }
    };

    let mut forest: Vec<Element> = vec![tree];
    let text_query = req.text.as_deref().filter(|t| !t.is_empty());

    if let Some(scope_id) = req.scope_id {
        forest = forest
            .iter()
            .filter_map(|r| ops::find_by_id(r, scope_id).cloned())
            .collect();
    } else if req.children {
        if let Some(text) = text_query {
            let needle = text.to_ascii_lowercase();
            forest = forest
                .iter()
                .filter_map(|r| first_text_match(r, &needle).cloned())
                .collect();
        }
    }

    if req.children {
        forest = forest.into_iter().flat_map(|r| r.children).collect();
    } else if let Some(text) = text_query {
        let needle = text.to_ascii_lowercase();
        forest = forest.into_iter().filter_map(|r| ops::filter_by_text(&r, &needle)).collect();
    }

    if req.focused {
        forest = forest.into_iter().filter_map(|r| ops::filter_by_focused(&r)).collect();
    }

    let has_web_any = forest.iter().any(ops::has_web_content) || has_web;
    let roles_before_expansion_has_input = req.roles.iter().any(|r| r == "input");
    let roles_before_expansion_has_other = req.roles.iter().any(|r| r == "other");
    let expanded_roles = ops::expand_roles(&req.roles, has_web_any);
    if !req.raw
        && has_web_any
        && roles_before_expansion_has_input
        && !roles_before_expansion_has_other
    {
        smart_defaults.push(SmartDefault::RoleExpansion);
    }
    if !expanded_roles.is_empty() || req.bbox.is_some() {
        forest = ops::filter_elements(&forest, &expanded_roles, req.bbox.as_ref());
    }

    if effective_prune {
        forest = ops::prune_empty_groups(&forest);
    }

    let want_refs = req.with_refs || req.format.as_deref() == Some("agent");
    if want_refs {
        forest = forest.iter().map(refs::generate_refs).collect();
    }

    let flat: Vec<FlatElement> = forest.iter().flat_map(ops::flatten).collect();
    let flat = if effective_prune && req.flat {
        ops::prune_empty_groups_flat(&flat)
    } else {
        flat
    };

    if req.used_default_format {
        smart_defaults.push(SmartDefault::Format);
    }

    if let Some(app) = req.app.as_deref() {
        if let Err(err) = snapshot::save_snapshot(
            &server.config.snapshot_dir,
            app,
            now,
            &flat,
            server.config.snapshot_max_age_ms,
        ) {
            tracing::debug!(?err, "failed to persist read snapshot");
        }
    }

    if let Some(since) = req.since {
        let app = req.app.as_deref().ok_or_else(|| {
            BridgeError::ValidationError("`since` requires an `app` scope".to_string())
        })?;
        let prev = snapshot::load_snapshot(&server.config.snapshot_dir, app, since)
            .map_err(|e| BridgeError::Backend(e.to_string()))?;
        let tree_diff = diff_engine::diff_elements_by_hash(&prev, &flat);
        return Ok(ReadResponse {
            diff: Some(tree_diff),
            smart_defaults,
            ..Default::default()
        });
    }

    match req.format.as_deref() {
        Some("agent") => {
            let window_title = req.window.clone().unwrap_or_default();
            let app = req.app.clone().unwrap_or_default();
            let pid = req.pid.unwrap_or(0);
            let text = render_agent_format(&app, &window_title, pid, &flat, &HashSet::new());
            Ok(ReadResponse {
                text: Some(text),
                smart_defaults,
                ..Default::default()
            })
        }
        _ if req.flat => Ok(ReadResponse {
            elements: Some(flat),
            smart_defaults,
            ..Default::default()
        }),
        _ if forest.len() == 1 => Ok(ReadResponse {
            tree: forest.into_iter().next(),
            smart_defaults,
            ..Default::default()
        }),
        _ => Ok(ReadResponse {
            elements: Some(flat),
            smart_defaults,
            ..Default::default()
        }),
    }
}

fn first_text_match<'a>(node: &'a Element, needle_lower: &str) -> Option<&'a Element> {
    if node.text_matches(needle_lower) {
        return Some(node);
    }
    node.children.iter().find_map(|c| first_text_match(c, needle_lower))
}
