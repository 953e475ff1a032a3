/// Extracts the variable names referenced by `{{ name }}` placeholders in
/// template content, de-duplicated in first-appearance order. Names are
/// normalized to lowercase; malformed placeholders are skipped.
#[must_use]
pub fn referenced_variables(content: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut rest = content;

    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            break;
        };

        let raw = after[..end].trim();
        if is_identifier(raw) {
            let name = raw.to_ascii_lowercase();
            if !names.contains(&name) {
                names.push(name);
            }
        }

        rest = &after[end + 2..];
    }

    names
}

pub(crate) fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
