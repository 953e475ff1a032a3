use crate::error::{Error, Result};

/// The variable that always exists on a template. Its value in a value set is
/// the value set's hostname and cannot be assigned by users.
pub const RESERVED_VARIABLE_NAME: &str = "hostname";

const MAX_VARIABLE_NAME_LEN: usize = 128;

/// Normalizes a free-form variable name into a template-safe slug: lowercase,
/// with every run of non-alphanumeric characters collapsed to a single
/// underscore. Converting an already-converted slug returns it unchanged.
#[must_use]
pub fn convert_variable_name(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());

    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }

    if slug.ends_with('_') {
        slug.pop();
    }

    slug
}

#[must_use]
pub fn is_reserved(name: &str) -> bool {
    name == RESERVED_VARIABLE_NAME
}

/// Checks a slug produced by [`convert_variable_name`] before it is persisted.
pub fn validate_variable_name(slug: &str) -> Result<()> {
    if slug.is_empty() {
        return Err(Error::BadRequest(
            "variable name must contain at least one alphanumeric character".to_string(),
        ));
    }
    if slug.len() > MAX_VARIABLE_NAME_LEN {
        return Err(Error::BadRequest(format!(
            "variable name cannot exceed {MAX_VARIABLE_NAME_LEN} characters"
        )));
    }
    if is_reserved(slug) {
        return Err(Error::ReservedVariableName);
    }
    Ok(())
}
