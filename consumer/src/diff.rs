//! Content-hash identity and tree diffing (spec §4.3).

use std::collections::HashMap;

use bridge_types::{ContentHash, FieldDiff, FlatElement, HashChange, IdDiff, TreeDiff};
use sha2::{Digest, Sha256};

/// `ElementHash` (spec §4.3): 16-hex prefix of SHA-256 over
/// `role | title | description | subrole | path`. Deliberately excludes
/// `value`, `bounds`, `focused`, `selected`, `enabled`, and `id`.
pub fn element_hash(el: &FlatElement) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(el.role.code().as_bytes());
    hasher.update(b"|");
    hasher.update(el.title.as_deref().unwrap_or("").as_bytes());
    hasher.update(b"|");
    hasher.update(el.description.as_deref().unwrap_or("").as_bytes());
    hasher.update(b"|");
    hasher.update(el.subrole.as_deref().unwrap_or("").as_bytes());
    hasher.update(b"|");
    hasher.update(el.path.as_bytes());
    let digest = hasher.finalize();
    let hex = digest.iter().map(|b| format!("{b:02x}")).collect::<String>();
    ContentHash(hex[..16].to_string())
}

fn field_diff(prev: &FlatElement, curr: &FlatElement) -> FieldDiff {
    let mut diff = FieldDiff::new();
    let mut note = |code: &str, old: String, new: String| {
        if old != new {
            diff.insert(code.to_string(), (old, new));
        }
    };
    note("t", prev.title.clone().unwrap_or_default(), curr.title.clone().unwrap_or_default());
    note("v", prev.value.clone().unwrap_or_default(), curr.value.clone().unwrap_or_default());
    note("r", prev.role.code().to_string(), curr.role.code().to_string());
    note(
        "d",
        prev.description.clone().unwrap_or_default(),
        curr.description.clone().unwrap_or_default(),
    );
    note("b", format!("{:?}", prev.bounds), format!("{:?}", curr.bounds));
    note("f", prev.focused.to_string(), curr.focused.to_string());
    note("s", prev.selected.to_string(), curr.selected.to_string());
    diff
}

/// Only the fields considered mutable for identity purposes: value, bounds,
/// focused, selected (spec §4.3's `DiffElementsByHash` note).
fn mutable_field_diff(prev: &FlatElement, curr: &FlatElement) -> FieldDiff {
    let mut diff = FieldDiff::new();
    let mut note = |code: &str, old: String, new: String| {
        if old != new {
            diff.insert(code.to_string(), (old, new));
        }
    };
    note("v", prev.value.clone().unwrap_or_default(), curr.value.clone().unwrap_or_default());
    note("b", format!("{:?}", prev.bounds), format!("{:?}", curr.bounds));
    note("f", prev.focused.to_string(), curr.focused.to_string());
    note("s", prev.selected.to_string(), curr.selected.to_string());
    diff
}

/// `DiffElements` (spec §4.3): matches by sequential traversal id.
pub fn diff_elements(prev: &[FlatElement], curr: &[FlatElement]) -> IdDiff {
    let prev_by_id: HashMap<i32, &FlatElement> = prev.iter().map(|e| (e.id, e)).collect();
    let curr_by_id: HashMap<i32, &FlatElement> = curr.iter().map(|e| (e.id, e)).collect();

    let mut out = IdDiff::default();
    for el in curr {
        match prev_by_id.get(&el.id) {
            None => out.added.push(el.clone()),
            Some(old) => {
                let changes = field_diff(old, el);
                if !changes.is_empty() {
                    out.changed.push(HashChange {
                        id: el.id,
                        role: el.role.code().to_string(),
                        title: el.title.clone(),
                        changes,
                    });
                }
            }
        }
    }
    for el in prev {
        if !curr_by_id.contains_key(&el.id) {
            out.removed.push((el.id, el.role.code().to_string(), el.title.clone()));
        }
    }
    out
}

/// `DiffElementsByHash` (spec §4.3): matches by content hash, so it survives
/// id renumbering caused by insertions/deletions elsewhere in the tree.
pub fn diff_elements_by_hash(prev: &[FlatElement], curr: &[FlatElement]) -> TreeDiff {
    let prev_by_hash: HashMap<ContentHash, &FlatElement> =
        prev.iter().map(|e| (element_hash(e), e)).collect();
    let curr_by_hash: HashMap<ContentHash, &FlatElement> =
        curr.iter().map(|e| (element_hash(e), e)).collect();

    let mut diff = TreeDiff::default();
    for el in curr {
        let hash = element_hash(el);
        match prev_by_hash.get(&hash) {
            None => diff.added.push(el.clone()),
            Some(old) => {
                let changes = mutable_field_diff(old, el);
                if changes.is_empty() {
                    diff.unchanged_count += 1;
                } else {
                    diff.changed.push(HashChange {
                        id: el.id,
                        role: el.role.code().to_string(),
                        title: el.title.clone(),
                        changes,
                    });
                }
            }
        }
    }
    for el in prev {
        let hash = element_hash(el);
        if !curr_by_hash.contains_key(&hash) {
            diff.removed.push(el.clone());
        }
    }
    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_types::Role;

    fn flat(id: i32, role: Role, title: &str, path: &str) -> FlatElement {
        let mut e = FlatElement {
            role,
            path: path.to_string(),
            ..FlatElement::default()
        };
        e.id = id;
        e.title = Some(title.to_string());
        e
    }

    #[test]
    fn hash_stability_ignores_volatile_fields() {
        let mut a = flat(1, Role::Btn, "Save", "window > btn");
        a.value = Some("x".to_string());
        a.focused = true;
        let mut b = flat(99, Role::Btn, "Save", "window > btn");
        b.value = Some("y".to_string());
        b.focused = false;
        assert_eq!(element_hash(&a), element_hash(&b));
    }

    #[test]
    fn hash_discriminates_on_identity_fields() {
        let a = flat(1, Role::Btn, "Save", "window > btn");
        let b = flat(1, Role::Btn, "Cancel", "window > btn");
        assert_ne!(element_hash(&a), element_hash(&b));
    }

    #[test]
    fn s2_hash_diff_resilient_to_id_shift() {
        let prev = vec![
            flat(1, Role::Btn, "A", "window > btn"),
            flat(2, Role::Btn, "B", "window > btn"),
        ];
        let curr = vec![
            flat(1, Role::Btn, "New", "window > btn"),
            flat(2, Role::Btn, "A", "window > btn"),
            flat(3, Role::Btn, "B", "window > btn"),
        ];
        let diff = diff_elements_by_hash(&prev, &curr);
        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.added[0].title.as_deref(), Some("New"));
        assert!(diff.removed.is_empty());
        assert!(diff.changed.is_empty());
        assert_eq!(diff.unchanged_count, 2);
    }

    #[test]
    fn diff_roundtrip_is_empty() {
        let tree = vec![
            flat(1, Role::Window, "", "window"),
            flat(2, Role::Btn, "OK", "window > btn"),
        ];
        let diff = diff_elements_by_hash(&tree, &tree);
        assert!(diff.added.is_empty());
        assert!(diff.removed.is_empty());
        assert!(diff.changed.is_empty());
        assert_eq!(diff.unchanged_count, tree.len());
    }

    #[test]
    fn diff_soundness_counts_cover_curr() {
        let prev = vec![flat(1, Role::Btn, "A", "window > btn")];
        let mut changed = flat(1, Role::Btn, "A", "window > btn");
        changed.value = Some("now set".to_string());
        let curr = vec![changed, flat(2, Role::Btn, "B", "window > btn")];
        let diff = diff_elements_by_hash(&prev, &curr);
        let total = diff.added.len() + diff.unchanged_count + diff.changed.len();
        assert_eq!(total, curr.len());
    }

    #[test]
    fn value_change_is_changed_not_removed_plus_added() {
        let prev = vec![flat(1, Role::Input, "Search", "window > input")];
        let mut curr_el = flat(1, Role::Input, "Search", "window > input");
        curr_el.value = Some("hello".to_string());
        let diff = diff_elements_by_hash(&prev, &[curr_el]);
        assert!(diff.added.is_empty());
        assert!(diff.removed.is_empty());
        assert_eq!(diff.changed.len(), 1);
    }

    #[test]
    fn id_based_diff_tracks_shifted_identity() {
        let prev = vec![flat(1, Role::Btn, "A", "window > btn")];
        let curr = vec![flat(1, Role::Btn, "Renamed", "window > btn")];
        let diff = diff_elements(&prev, &curr);
        assert_eq!(diff.changed.len(), 1);
        assert!(diff.changed[0].changes.contains_key("t"));
    }
}
