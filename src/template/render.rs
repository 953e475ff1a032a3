use std::collections::HashMap;

use super::scan::is_identifier;

/// Renders template content against a variable-name-to-value map. Referenced
/// variables without a binding render as the empty string; text that merely
/// looks like a placeholder but is not a valid variable reference is kept
/// verbatim.
#[must_use]
pub fn render(content: &str, values: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            break;
        };

        out.push_str(&rest[..start]);

        let raw = after[..end].trim();
        if is_identifier(raw) {
            if let Some(value) = values.get(&raw.to_ascii_lowercase()) {
                out.push_str(value);
            }
        } else {
            out.push_str(&rest[start..start + 2 + end + 2]);
        }

        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}
