//! Two-pass landmark ref generation (spec §4.2).

use std::collections::HashMap;

use bridge_types::{Element, Role};

const LANDMARK_ROLES: &[Role] = &[Role::Toolbar, Role::Menu, Role::List, Role::Tab];
const DIALOG_SUBROLES: &[&str] = &["AXDialog", "AXSheet", "AXSystemDialog"];
const STRUCTURAL_ROLES: &[Role] = &[Role::Group, Role::Other, Role::Row, Role::Cell];

fn is_landmark(el: &Element) -> bool {
    LANDMARK_ROLES.contains(&el.role)
        || el
            .subrole
            .as_deref()
            .is_some_and(|s| DIALOG_SUBROLES.contains(&s))
        || (STRUCTURAL_ROLES.contains(&el.role) && el.label().is_some())
}

fn is_interesting(el: &Element) -> bool {
    el.has_action("press")
        || (el.role == Role::Txt && el.value.as_deref().is_some_and(|v| !v.is_empty()))
        || matches!(el.role, Role::Input | Role::Chk | Role::Toggle | Role::Radio)
}

/// `slug(s)` (spec §4.2): lowercase, collapse non-`[a-z0-9-]` to `-`, trim
/// outer `-`, collapse `--+` to `-`, truncate to 40 chars trimming a
/// trailing `-`.
pub fn slug(s: &str) -> String {
    let lower = s.to_ascii_lowercase();
    let mut collapsed = String::with_capacity(lower.len());
    let mut prev_dash = false;
    for ch in lower.chars() {
        let is_allowed = ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-';
        let normalized = if is_allowed { ch } else { '-' };
        if normalized == '-' {
            if prev_dash {
                continue;
            }
            prev_dash = true;
        } else {
            prev_dash = false;
        }
        collapsed.push(normalized);
    }
    let trimmed = collapsed.trim_matches('-');
    let mut truncated: String = trimmed.chars().take(40).collect();
    while truncated.ends_with('-') {
        truncated.pop();
    }
    truncated
}

fn segment_for(el: &Element) -> String {
    let slugged = el.label().map(slug).unwrap_or_default();
    if !slugged.is_empty() {
        return slugged;
    }
    if el
        .subrole
        .as_deref()
        .is_some_and(|s| DIALOG_SUBROLES.contains(&s))
    {
        "dialog".to_string()
    } else {
        el.role.code().to_string()
    }
}

fn assign_raw_refs(node: &mut Element, parent_path: Option<&str>) {
    // `own_path` is the ancestor path plus this node's own segment — used
    // both for this node's own ref and, when it's a landmark, as the path
    // its children inherit. Computing it once keeps a node that is both a
    // landmark and individually interesting from contributing its segment
    // twice (`parent/seg/seg`).
    let own_segment = segment_for(node);
    let own_path = match parent_path {
        Some(p) => format!("{p}/{own_segment}"),
        None => own_segment,
    };

    if is_interesting(node) {
        node.ref_ = Some(own_path.clone());
    }

    let child_parent_path = if is_landmark(node) {
        Some(own_path)
    } else {
        // Skipped structural roles and ordinary pass-through elements both
        // leave the ancestry path untouched; only landmarks add a segment.
        parent_path.map(str::to_string)
    };

    for child in &mut node.children {
        assign_raw_refs(child, child_parent_path.as_deref());
    }
}

fn collect_ref_order<'a>(node: &'a Element, out: &mut Vec<&'a str>) {
    if let Some(r) = &node.ref_ {
        out.push(r.as_str());
    }
    for c in &node.children {
        collect_ref_order(c, out);
    }
}

fn dedupe_refs(node: &mut Element, counts: &HashMap<String, usize>, seen: &mut HashMap<String, usize>) {
    if let Some(r) = node.ref_.clone() {
        let total = *counts.get(&r).unwrap_or(&1);
        if total > 1 {
            let next = seen.entry(r.clone()).or_insert(0);
            *next += 1;
            node.ref_ = Some(format!("{r}.{next}"));
        }
    }
    for c in &mut node.children {
        dedupe_refs(c, counts, seen);
    }
}

/// Runs the two-pass ref generator over a cloned tree, returning the tree
/// with `ref` populated on every interesting element (spec §4.2).
///
/// Ground rule from spec §9's Open Questions: refs are only computed when
/// requested, never eagerly on every read.
pub fn generate_refs(root: &Element) -> Element {
    let mut tree = root.clone();
    assign_raw_refs(&mut tree, None);

    let mut order = Vec::new();
    collect_ref_order(&tree, &mut order);
    let mut counts: HashMap<String, usize> = HashMap::new();
    for r in order {
        *counts.entry(r.to_string()).or_insert(0) += 1;
    }

    let mut seen = HashMap::new();
    dedupe_refs(&mut tree, &counts, &mut seen);
    tree
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_types::Element;

    fn btn(id: i32, title: &str) -> Element {
        let mut e = Element::new(id, Role::Btn);
        e.title = Some(title.to_string());
        e.actions = vec!["press".to_string()];
        e
    }

    #[test]
    fn slug_collapses_and_truncates() {
        assert_eq!(slug("  Hello, World!! "), "hello-world");
        assert_eq!(slug("a___b"), "a-b");
        let long = "x".repeat(60);
        assert_eq!(slug(&long).len(), 40);
    }

    #[test]
    fn s3_ref_generation_scenario() {
        let back = btn(2, "Back");
        let search = {
            let mut e = Element::new(3, Role::Input);
            e.title = Some("Search".to_string());
            e
        };
        let toolbar = Element {
            role: Role::Toolbar,
            children: vec![back, search],
            ..Element::new(1, Role::Toolbar)
        };
        let submit = btn(5, "Submit");
        let group = Element {
            role: Role::Group,
            children: vec![submit],
            ..Element::new(4, Role::Group)
        };
        let window = Element {
            role: Role::Window,
            children: vec![toolbar, group],
            ..Element::new(0, Role::Window)
        };

        let refd = generate_refs(&window);
        let toolbar = &refd.children[0];
        assert_eq!(toolbar.children[0].ref_.as_deref(), Some("toolbar/back"));
        assert_eq!(toolbar.children[1].ref_.as_deref(), Some("toolbar/search"));
        let group = &refd.children[1];
        assert_eq!(group.children[0].ref_.as_deref(), Some("submit"));
    }

    #[test]
    fn s4_ref_deduplication_scenario() {
        let ok1 = btn(1, "OK");
        let ok2 = btn(2, "OK");
        let dialog = Element {
            role: Role::Group,
            subrole: Some("AXDialog".to_string()),
            children: vec![ok1, ok2],
            ..Element::new(0, Role::Group)
        };

        let refd = generate_refs(&dialog);
        assert_eq!(refd.children[0].ref_.as_deref(), Some("dialog/ok.1"));
        assert_eq!(refd.children[1].ref_.as_deref(), Some("dialog/ok.2"));
    }

    #[test]
    fn landmark_that_is_also_interesting_does_not_double_its_own_segment() {
        let back = btn(2, "Back");
        let mut toolbar = Element {
            role: Role::Toolbar,
            title: Some("Nav".to_string()),
            children: vec![back],
            ..Element::new(1, Role::Toolbar)
        };
        toolbar.actions = vec!["press".to_string()];

        let refd = generate_refs(&toolbar);
        assert_eq!(refd.ref_.as_deref(), Some("nav"));
        assert_eq!(refd.children[0].ref_.as_deref(), Some("nav/back"));
    }

    #[test]
    fn determinism_across_runs() {
        let toolbar = Element {
            role: Role::Toolbar,
            children: vec![btn(1, "Back")],
            ..Element::new(0, Role::Toolbar)
        };
        let a = generate_refs(&toolbar);
        let b = generate_refs(&toolbar);
        assert_eq!(a.children[0].ref_, b.children[0].ref_);
    }
}
