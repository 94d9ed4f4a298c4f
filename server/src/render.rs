//! Output rendering: agent format, structured format, adaptive defaults
//! (spec §4.7, §4.8).

use std::collections::HashSet;

use bridge_types::{Enabled, FlatElement, Role};
use serde::Serialize;

/// One of the three inferences the read/write handlers can apply
/// automatically (spec §4.8). Reported back in a response's
/// `smart_defaults` list so callers can learn why their output shape
/// changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SmartDefault {
    Format,
    Prune,
    RoleExpansion,
}

const VALUE_TRUNCATE_LEN: usize = 40;

fn truncate(s: &str) -> String {
    if s.chars().count() <= VALUE_TRUNCATE_LEN {
        s.to_string()
    } else {
        let head: String = s.chars().take(VALUE_TRUNCATE_LEN).collect();
        format!("{head}…")
    }
}

fn flags_for(el: &FlatElement, is_primary: bool) -> Vec<String> {
    let mut flags = Vec::new();
    if el.enabled.is_disabled() {
        flags.push("disabled".to_string());
    }
    if el.selected {
        flags.push("selected".to_string());
    }
    if el.focused {
        flags.push("focused".to_string());
    }
    if matches!(el.role, Role::Chk | Role::Toggle | Role::Radio) {
        flags.push(if el.selected { "checked" } else { "unchecked" }.to_string());
    }
    let has_value = el.value.as_deref().is_some_and(|v| !v.is_empty());
    if has_value && matches!(el.role, Role::Input | Role::Txt) {
        flags.push(format!("val=\"{}\"", truncate(el.value.as_deref().unwrap_or(""))));
    }
    if el.role == Role::Txt && has_value {
        flags.push("display".to_string());
    }
    if is_primary {
        flags.push("primary".to_string());
    }
    flags
}

/// Renders one element as `[<id>] <role> "<label>" (<x>,<y>,<w>,<h>) [flags]`.
/// Returns `None` for zero-width/zero-height elements, which are omitted
/// entirely (spec §4.7).
pub fn render_element_line(el: &FlatElement, is_primary: bool) -> Option<String> {
    if el.bounds.is_empty() {
        return None;
    }
    let label = el.label().unwrap_or("");
    let flags = flags_for(el, is_primary);
    let flag_suffix = if flags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", flags.join(", "))
    };
    Some(format!(
        "[{}] {} \"{}\" ({},{},{},{}){flag_suffix}",
        el.id, el.role, label, el.bounds.x, el.bounds.y, el.bounds.w, el.bounds.h
    ))
}

/// Renders the full agent-format document for a window's elements (spec
/// §4.7). `primary_ids` marks elements to annotate with the `primary` flag
/// (the largest-area display element among a write handler's collected
/// display elements).
pub fn render_agent_format(
    app: &str,
    window_title: &str,
    pid: i32,
    elements: &[FlatElement],
    primary_ids: &HashSet<i32>,
) -> String {
    let mut out = format!("# {app} — {window_title} (pid: {pid})\n\n");
    for el in elements {
        if let Some(line) = render_element_line(el, primary_ids.contains(&el.id)) {
            out.push_str(&line);
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_types::Bounds;

    fn sample(role: Role, label: &str) -> FlatElement {
        FlatElement {
            id: 1,
            role,
            title: Some(label.to_string()),
            bounds: Bounds::new(10, 20, 30, 40),
            path: role.code().to_string(),
            ..FlatElement::default()
        }
    }

    #[test]
    fn omits_zero_area_elements() {
        let mut el = sample(Role::Btn, "X");
        el.bounds = Bounds::new(0, 0, 0, 0);
        assert!(render_element_line(&el, false).is_none());
    }

    #[test]
    fn disabled_flag_present_only_when_explicitly_false() {
        let mut el = sample(Role::Btn, "Back");
        el.enabled = Enabled::False;
        let line = render_element_line(&el, false).unwrap();
        assert!(line.contains("disabled"));
    }

    #[test]
    fn checked_flag_reflects_selected_state() {
        let mut el = sample(Role::Chk, "Agree");
        el.selected = true;
        let line = render_element_line(&el, false).unwrap();
        assert!(line.contains("checked"));
        assert!(!line.contains("unchecked"));
    }

    #[test]
    fn display_text_with_value_gets_display_and_val_flags() {
        let mut el = sample(Role::Txt, "Result");
        el.value = Some("42".to_string());
        let line = render_element_line(&el, true).unwrap();
        assert!(line.contains("display"));
        assert!(line.contains("val=\"42\""));
        assert!(line.contains("primary"));
    }

    #[test]
    fn s1_basic_read_scenario() {
        let mut back = sample(Role::Btn, "Back");
        back.id = 1;
        let mut forward = sample(Role::Btn, "Forward");
        forward.id = 2;
        let mut address = sample(Role::Input, "Address");
        address.id = 3;
        address.value = Some("https://x".to_string());
        let elements = vec![back, forward, address];
        let doc = render_agent_format("A", "Main", 100, &elements, &HashSet::new());
        assert!(doc.contains("[1] btn \"Back\""));
        assert!(doc.contains("[2] btn \"Forward\""));
        assert!(doc.contains("val=\"https://x\""));
    }
}
