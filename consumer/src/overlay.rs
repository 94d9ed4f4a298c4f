//! `DetectFrontmostOverlay` (spec §4.2).

use bridge_types::Element;

const DIALOG_SUBROLES: &[&str] = &[
    "AXDialog",
    "AXSheet",
    "AXSystemDialog",
    "AXSystemFloating",
    "AXFloatingWindow",
];

const OVERLAY_SIZE_RATIO: f64 = 0.8;
const CENTER_TOLERANCE: f64 = 0.25;

fn has_dialog_subrole(el: &Element) -> bool {
    el.subrole.as_deref().is_some_and(|s| DIALOG_SUBROLES.contains(&s))
}

/// Any direct child or grandchild carrying a dialog subrole (spec §4.2
/// `DetectFrontmostOverlay` step 1) — returns the element that actually
/// carries the subrole, not necessarily the direct child itself.
fn has_subrole_landmark(window: &Element) -> Option<&Element> {
    window.children.iter().find_map(|child| {
        if has_dialog_subrole(child) {
            Some(child)
        } else {
            child.children.iter().find(|grandchild| has_dialog_subrole(grandchild))
        }
    })
}

fn contains_focused(el: &Element) -> bool {
    el.focused || el.children.iter().any(contains_focused)
}

fn focus_heuristic(window: &Element) -> Option<&Element> {
    if window.children.len() < 2 {
        return None;
    }
    let focused_idx = window.children.iter().position(contains_focused)?;
    if focused_idx == 0 {
        return None;
    }
    let candidate = &window.children[focused_idx];
    if candidate.bounds.is_smaller_than(&window.bounds, OVERLAY_SIZE_RATIO) {
        Some(candidate)
    } else {
        None
    }
}

fn bounds_heuristic(window: &Element) -> Option<&Element> {
    window.children.iter().skip(1).find(|child| {
        child.bounds.is_smaller_than(&window.bounds, OVERLAY_SIZE_RATIO)
            && child.bounds.is_centered_in(&window.bounds, CENTER_TOLERANCE)
    })
}

/// Detects the frontmost modal overlay of a single top-level window by
/// trying, in order: subrole landmark, focus heuristic, bounds heuristic.
pub fn detect_overlay(window: &Element) -> Option<&Element> {
    has_subrole_landmark(window)
        .or_else(|| focus_heuristic(window))
        .or_else(|| bounds_heuristic(window))
}

/// Runs [`detect_overlay`] over every top-level window, returning the first
/// hit (spec says "for each top-level window, try in order").
pub fn detect_frontmost_overlay<'a>(windows: &'a [Element]) -> Option<&'a Element> {
    windows.iter().find_map(detect_overlay)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_types::{Bounds, Element, Role};

    #[test]
    fn s5_overlay_by_subrole() {
        let plain = Element::new(1, Role::Group);
        let mut dialog = Element::new(2, Role::Group);
        dialog.subrole = Some("AXDialog".to_string());
        let window = Element {
            role: Role::Window,
            children: vec![plain, dialog.clone()],
            ..Element::new(0, Role::Window)
        };
        let found = detect_overlay(&window).unwrap();
        assert_eq!(found.id, 2);
    }

    #[test]
    fn s6_overlay_by_focus_heuristic() {
        let mut full = Element::new(1, Role::Group);
        full.bounds = Bounds::new(0, 0, 1000, 800);
        let mut input = Element::new(3, Role::Input);
        input.focused = true;
        let mut popup = Element::new(2, Role::Group);
        popup.bounds = Bounds::new(250, 200, 500, 400);
        popup.children = vec![input];
        let mut window = Element::new(0, Role::Window);
        window.bounds = Bounds::new(0, 0, 1000, 800);
        window.children = vec![full, popup];

        let found = detect_overlay(&window).unwrap();
        assert_eq!(found.id, 2);
    }

    #[test]
    fn subrole_takes_precedence_over_focus_and_bounds() {
        let mut dialog = Element::new(1, Role::Group);
        dialog.subrole = Some("AXSheet".to_string());
        dialog.bounds = Bounds::new(0, 0, 1000, 800);
        let mut popup = Element::new(2, Role::Group);
        popup.bounds = Bounds::new(250, 200, 500, 400);
        let mut input = Element::new(3, Role::Input);
        input.focused = true;
        popup.children = vec![input];
        let mut window = Element::new(0, Role::Window);
        window.bounds = Bounds::new(0, 0, 1000, 800);
        window.children = vec![dialog, popup];

        let found = detect_overlay(&window).unwrap();
        assert_eq!(found.id, 1, "subrole landmark wins regardless of focus/bounds");
    }

    #[test]
    fn subrole_on_grandchild_returns_the_grandchild_not_its_parent() {
        let plain = Element::new(1, Role::Group);
        let mut dialog_grandchild = Element::new(3, Role::Group);
        dialog_grandchild.subrole = Some("AXSheet".to_string());
        let mut wrapper = Element::new(2, Role::Group);
        wrapper.children = vec![dialog_grandchild];
        let window = Element {
            role: Role::Window,
            children: vec![plain, wrapper],
            ..Element::new(0, Role::Window)
        };
        let found = detect_overlay(&window).unwrap();
        assert_eq!(found.id, 3, "should identify the grandchild that actually carries the subrole");
    }

    #[test]
    fn no_overlay_when_nothing_matches() {
        let mut a = Element::new(1, Role::Group);
        a.bounds = Bounds::new(0, 0, 1000, 800);
        let mut b = Element::new(2, Role::Group);
        b.bounds = Bounds::new(0, 0, 1000, 800);
        let mut window = Element::new(0, Role::Window);
        window.bounds = Bounds::new(0, 0, 1000, 800);
        window.children = vec![a, b];
        assert!(detect_overlay(&window).is_none());
    }
}
