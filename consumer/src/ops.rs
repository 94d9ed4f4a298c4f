//! Tree traversal, filtering, and pruning (spec §4.2).

use bridge_types::{Bounds, Element, FlatElement, Role, INTERACTIVE_ROLES};

/// Recursive first-match walk. `id`s are only unique within a single read,
/// so this is a plain linear search, not an index lookup.
pub fn find_by_id(node: &Element, id: i32) -> Option<&Element> {
    if node.id == id {
        return Some(node);
    }
    node.children.iter().find_map(|c| find_by_id(c, id))
}

pub enum RefLookup<'a> {
    Found(&'a Element),
    NoMatch,
    Ambiguous(Vec<&'a Element>),
}

fn collect_refs<'a>(node: &'a Element, out: &mut Vec<&'a Element>) {
    if node.ref_.is_some() {
        out.push(node);
    }
    for c in &node.children {
        collect_refs(c, out);
    }
}

/// Exact match on `.ref`, else suffix match on `"/" + ref` (spec §4.1).
pub fn find_by_ref<'a>(root: &'a Element, ref_query: &str) -> RefLookup<'a> {
    let mut all = Vec::new();
    collect_refs(root, &mut all);

    if let Some(exact) = all.iter().find(|e| e.ref_.as_deref() == Some(ref_query)) {
        return RefLookup::Found(exact);
    }

    let suffix = format!("/{ref_query}");
    let matches: Vec<&Element> = all
        .into_iter()
        .filter(|e| e.ref_.as_deref().is_some_and(|r| r.ends_with(&suffix)))
        .collect();

    match matches.len() {
        0 => RefLookup::NoMatch,
        1 => RefLookup::Found(matches[0]),
        _ => RefLookup::Ambiguous(matches),
    }
}

/// Depth-first pre-order flatten. Preserves original ids and field values;
/// `path` is `parentPath + " > " + role`, or just `role` at the root.
pub fn flatten(root: &Element) -> Vec<FlatElement> {
    let mut out = Vec::new();
    flatten_into(root, None, &mut out);
    out
}

fn flatten_into(node: &Element, parent_path: Option<&str>, out: &mut Vec<FlatElement>) {
    let path = match parent_path {
        Some(p) => format!("{p} > {}", node.role.code()),
        None => node.role.code().to_string(),
    };
    let mut flat = FlatElement::from(node);
    flat.path = path.clone();
    out.push(flat);
    for child in &node.children {
        flatten_into(child, Some(&path), out);
    }
}

fn role_matches(role: Role, roles: &[Role]) -> bool {
    roles.is_empty() || roles.contains(&role)
}

fn bbox_matches(bounds: &Bounds, bbox: Option<&Bounds>) -> bool {
    match bbox {
        Some(b) => bounds.intersects(b),
        None => true,
    }
}

/// `FilterElements` (spec §4.2). Operates on a forest of roots so that a
/// non-matching root can be promoted away into multiple surviving siblings.
pub fn filter_elements(roots: &[Element], roles: &[Role], bbox: Option<&Bounds>) -> Vec<Element> {
    roots.iter().flat_map(|n| filter_node(n, roles, bbox)).collect()
}

fn filter_node(node: &Element, roles: &[Role], bbox: Option<&Bounds>) -> Vec<Element> {
    let filtered_children: Vec<Element> = node
        .children
        .iter()
        .flat_map(|c| filter_node(c, roles, bbox))
        .collect();

    if role_matches(node.role, roles) && bbox_matches(&node.bounds, bbox) {
        let mut n = node.clone();
        n.children = filtered_children;
        vec![n]
    } else {
        filtered_children
    }
}

/// `FilterByText` (spec §4.2). Empty text is an identity transform.
pub fn filter_by_text(root: &Element, text: &str) -> Option<Element> {
    if text.is_empty() {
        return Some(root.clone());
    }
    let needle = text.to_ascii_lowercase();
    filter_by_text_node(root, &needle)
}

fn filter_by_text_node(node: &Element, needle_lower: &str) -> Option<Element> {
    let filtered_children: Vec<Element> = node
        .children
        .iter()
        .filter_map(|c| filter_by_text_node(c, needle_lower))
        .collect();

    if node.text_matches(needle_lower) || !filtered_children.is_empty() {
        let mut n = node.clone();
        n.children = filtered_children;
        Some(n)
    } else {
        None
    }
}

/// `FilterByFocused` (spec §4.2).
pub fn filter_by_focused(node: &Element) -> Option<Element> {
    let filtered_children: Vec<Element> = node
        .children
        .iter()
        .filter_map(filter_by_focused)
        .collect();

    if node.focused {
        Some(node.clone())
    } else if !filtered_children.is_empty() {
        let mut n = node.clone();
        n.children = filtered_children;
        Some(n)
    } else {
        None
    }
}

/// `PruneEmptyGroups` (spec §4.2): bottom-up removal of empty `group`/`other`
/// nodes, promoting their children in place.
pub fn prune_empty_groups(roots: &[Element]) -> Vec<Element> {
    roots.iter().flat_map(prune_node).collect()
}

fn prune_node(node: &Element) -> Vec<Element> {
    let children: Vec<Element> = node.children.iter().flat_map(prune_node).collect();
    if node.is_empty_group() {
        children
    } else {
        let mut n = node.clone();
        n.children = children;
        vec![n]
    }
}

/// `PruneEmptyGroupsFlat` (spec §4.2): same predicate over the flat form.
/// Path strings are left untouched even when an ancestor group is stripped.
pub fn prune_empty_groups_flat(flat: &[FlatElement]) -> Vec<FlatElement> {
    flat.iter().filter(|e| !e.is_empty_group()).cloned().collect()
}

/// `HasWebContent` (spec §4.2): any node with role `web` anywhere.
pub fn has_web_content(root: &Element) -> bool {
    root.role == Role::Web || root.children.iter().any(has_web_content)
}

/// Expands a user-supplied role-filter argument list (which may include the
/// `interactive` meta-role) into concrete [`Role`]s, applying the read
/// handler's web-content `other`-inclusion rule (spec §4.6 step 6, §4.8).
pub fn expand_roles(requested: &[String], has_web_content: bool) -> Vec<Role> {
    let mut set: Vec<Role> = Vec::new();
    let mut push = |r: Role, set: &mut Vec<Role>| {
        if !set.contains(&r) {
            set.push(r);
        }
    };
    for code in requested {
        if code == "interactive" {
            for r in INTERACTIVE_ROLES {
                push(*r, &mut set);
            }
        } else if let Some(r) = Role::from_code(code) {
            push(r, &mut set);
        }
    }
    if has_web_content && set.contains(&Role::Input) && !set.contains(&Role::Other) {
        set.push(Role::Other);
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_types::Bounds;

    fn leaf(id: i32, role: Role, title: &str) -> Element {
        let mut e = Element::new(id, role);
        e.title = Some(title.to_string());
        e
    }

    fn with_children(mut parent: Element, children: Vec<Element>) -> Element {
        parent.children = children;
        parent
    }

    #[test]
    fn filter_identity_law() {
        let tree = with_children(
            Element::new(0, Role::Window),
            vec![leaf(1, Role::Btn, "Back")],
        );
        let result = filter_elements(std::slice::from_ref(&tree), &[], None);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, tree.id);
        assert_eq!(result[0].children.len(), 1);
    }

    #[test]
    fn filter_promotes_unmatched_parent() {
        let toolbar = with_children(
            Element::new(1, Role::Toolbar),
            vec![leaf(2, Role::Btn, "Back"), leaf(3, Role::Input, "Address")],
        );
        let window = with_children(Element::new(0, Role::Window), vec![toolbar]);
        let result = filter_elements(&[window], &[Role::Btn], None);
        // toolbar doesn't match "btn", window doesn't either: both promote,
        // leaving just the button surfaced at top level.
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].role, Role::Btn);
    }

    #[test]
    fn text_filter_identity_on_empty_string() {
        let tree = with_children(Element::new(0, Role::Window), vec![leaf(1, Role::Btn, "X")]);
        let filtered = filter_by_text(&tree, "").unwrap();
        assert_eq!(filtered.children.len(), 1);
    }

    #[test]
    fn text_filter_keeps_ancestor_as_passthrough() {
        let group = with_children(Element::new(1, Role::Group), vec![leaf(2, Role::Btn, "Submit")]);
        let window = with_children(Element::new(0, Role::Window), vec![group]);
        let filtered = filter_by_text(&window, "submit").unwrap();
        assert_eq!(filtered.id, 0);
        assert_eq!(filtered.children.len(), 1);
        assert_eq!(filtered.children[0].children.len(), 1);
        assert_eq!(filtered.children[0].children[0].id, 2);
    }

    #[test]
    fn flatten_preserves_ids_and_is_pre_order() {
        let child = leaf(2, Role::Btn, "B");
        let root = with_children(Element::new(1, Role::Window), vec![child]);
        let flat = flatten(&root);
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0].id, 1);
        assert_eq!(flat[1].id, 2);
        assert_eq!(flat[0].path, "window");
        assert_eq!(flat[1].path, "window > btn");
    }

    #[test]
    fn prune_promotes_empty_groups() {
        let inner = leaf(2, Role::Btn, "Submit");
        let empty_group = with_children(Element::new(1, Role::Group), vec![inner]);
        let root = with_children(Element::new(0, Role::Window), vec![empty_group]);
        let pruned = prune_empty_groups(&[root]);
        assert_eq!(pruned.len(), 1);
        assert_eq!(pruned[0].children.len(), 1);
        assert_eq!(pruned[0].children[0].id, 2);
    }

    #[test]
    fn has_web_content_detects_nested_web_node() {
        let web = Element::new(3, Role::Web);
        let root = with_children(Element::new(0, Role::Window), vec![with_children(Element::new(1, Role::Group), vec![web])]);
        assert!(has_web_content(&root));
        let no_web = with_children(Element::new(0, Role::Window), vec![leaf(1, Role::Btn, "x")]);
        assert!(!has_web_content(&no_web));
    }

    #[test]
    fn expand_roles_adds_other_for_web_content() {
        let requested = vec!["input".to_string()];
        assert_eq!(expand_roles(&requested, false), vec![Role::Input]);
        assert_eq!(expand_roles(&requested, true), vec![Role::Input, Role::Other]);
    }

    #[test]
    fn expand_roles_interactive_meta_role() {
        let requested = vec!["interactive".to_string()];
        let expanded = expand_roles(&requested, false);
        for r in INTERACTIVE_ROLES {
            assert!(expanded.contains(r));
        }
    }

    #[test]
    fn bbox_filter_uses_intersection() {
        let a = leaf(1, Role::Btn, "A");
        let mut a = a.clone();
        a.bounds = Bounds::new(0, 0, 10, 10);
        let root = with_children(Element::new(0, Role::Window), vec![a]);
        let bbox = Bounds::new(100, 100, 10, 10);
        let result = filter_elements(&[root], &[], Some(&bbox));
        assert!(result.is_empty());
    }
}
