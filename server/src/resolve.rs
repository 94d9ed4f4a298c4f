//! Target resolution pipeline (spec §4.5).

use bridge_backend::Backend;
use bridge_consumer::ops;
use bridge_types::{Bounds, Direction, Element, ReadScope, Role, TargetSpec};

use crate::cache::TreeCache;
use crate::error::{BridgeError, Candidate};

/// The outcome of resolving a [`TargetSpec`]: either a concrete element plus
/// its action point, or a bare coordinate pair when the spec was already a
/// point.
pub enum ResolvedTarget {
    Element { element: Element, point: (i32, i32) },
    Point { point: (i32, i32) },
}

impl ResolvedTarget {
    pub fn point(&self) -> (i32, i32) {
        match self {
            ResolvedTarget::Element { point, .. } => *point,
            ResolvedTarget::Point { point } => *point,
        }
    }

    pub fn element(&self) -> Option<&Element> {
        match self {
            ResolvedTarget::Element { element, .. } => Some(element),
            ResolvedTarget::Point { .. } => None,
        }
    }
}

fn subtree_scoped_to(tree: &Element, scope_id: Option<i32>) -> Result<Element, BridgeError> {
    match scope_id {
        None => Ok(tree.clone()),
        Some(id) => ops::find_by_id(tree, id).cloned().ok_or(BridgeError::TargetNotFound),
    }
}

pub(crate) fn collect_text_matches<'a>(
    node: &'a Element,
    needle_lower: &str,
    exact: bool,
    roles: &[Role],
    out: &mut Vec<&'a Element>,
) {
    let role_ok = roles.is_empty() || roles.contains(&node.role);
    let text_ok = if exact {
        node.text_equals(needle_lower)
    } else {
        node.text_matches(needle_lower)
    };
    if role_ok && text_ok {
        out.push(node);
    }
    for child in &node.children {
        collect_text_matches(child, needle_lower, exact, roles, out);
    }
}

fn candidates(matches: &[&Element]) -> Vec<Candidate> {
    matches
        .iter()
        .map(|e| Candidate {
            id: e.id,
            role: e.role.code().to_string(),
            title: e.title.clone(),
        })
        .collect()
}

/// `--near` resolution (spec §4.5): from the resolved element, find the
/// closest element exposing a `press` action in the given compass direction.
pub fn find_nearest_interactive<'a>(
    root: &'a Element,
    from: &Bounds,
    direction: Direction,
) -> Option<&'a Element> {
    let (fx, fy) = from.center();
    let mut best: Option<(&Element, i64)> = None;
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        stack.extend(node.children.iter());
        if !node.has_action("press") || node.bounds == *from {
            continue;
        }
        let (cx, cy) = node.bounds.center();
        let directional_match = match direction {
            Direction::Left => cx < fx,
            Direction::Right => cx > fx,
            Direction::Above => cy < fy,
            Direction::Below => cy > fy,
            Direction::Any => true,
        };
        if !directional_match {
            continue;
        }
        let dx = (cx - fx) as i64;
        let dy = (cy - fy) as i64;
        let dist_sq = dx * dx + dy * dy;
        if best.map(|(_, d)| dist_sq < d).unwrap_or(true) {
            best = Some((node, dist_sq));
        }
    }
    best.map(|(e, _)| e)
}

/// Runs the full resolution pipeline of spec §4.5 for one [`TargetSpec`].
pub fn resolve_target(
    cache: &TreeCache,
    backend: &dyn Backend,
    now_ms: i64,
    scope: &ReadScope,
    spec: &TargetSpec,
    near: Option<Direction>,
) -> Result<ResolvedTarget, BridgeError> {
    let resolved = match spec {
        TargetSpec::Point { x, y } => return Ok(ResolvedTarget::Point { point: (*x, *y) }),
        TargetSpec::Id { id } => {
            let tree = cache.read_elements(backend, scope, now_ms)?;
            ops::find_by_id(&tree, *id).cloned().ok_or(BridgeError::TargetNotFound)?
        }
        TargetSpec::Ref { ref_ } => {
            let tree = cache.read_elements(backend, scope, now_ms)?;
            match ops::find_by_ref(&bridge_consumer::refs::generate_refs(&tree), ref_) {
                ops::RefLookup::Found(e) => e.clone(),
                ops::RefLookup::NoMatch => return Err(BridgeError::TargetNotFound),
                ops::RefLookup::Ambiguous(matches) => {
                    return Err(BridgeError::AmbiguousTarget(candidates(&matches)))
                }
            }
        }
        TargetSpec::Text {
            text,
            roles,
            scope_id,
            exact,
        } => {
            if text.is_empty() {
                return Err(BridgeError::ValidationError(
                    "text target must not be empty".to_string(),
                ));
            }
            let tree = cache.read_elements(backend, scope, now_ms)?;
            let scoped = subtree_scoped_to(&tree, *scope_id)?;
            let role_list: Vec<Role> = roles
                .as_ref()
                .map(|rs| rs.iter().filter_map(|r| Role::from_code(r)).collect())
                .unwrap_or_default();
            let needle = text.to_ascii_lowercase();
            let mut matches = Vec::new();
            collect_text_matches(&scoped, &needle, *exact, &role_list, &mut matches);
            match matches.len() {
                0 => return Err(BridgeError::TargetNotFound),
                1 => matches[0].clone(),
                _ => return Err(BridgeError::AmbiguousTarget(candidates(&matches))),
            }
        }
    };

    let mut point = resolved.bounds.center();
    let mut element = resolved;
    if let Some(direction) = near {
        let tree = cache.read_elements(backend, scope, now_ms)?;
        if let Some(near_el) = find_nearest_interactive(&tree, &element.bounds, direction) {
            element = near_el.clone();
            point = element.bounds.center();
        }
    }

    Ok(ResolvedTarget::Element { element, point })
}
