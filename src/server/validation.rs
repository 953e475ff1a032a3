use crate::server::response::ApiError;

const MAX_PROJECT_NAME_LEN: usize = 128;
const MAX_TEMPLATE_NAME_LEN: usize = 128;
const MAX_HOSTNAME_LEN: usize = 128;

// Names are free-form display strings, but they end up as path components of
// exported configuration files.
fn validate_display_name(name: &str, entity: &str, max_len: usize) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err(format!("{entity} name cannot be empty"));
    }
    if name.len() > max_len {
        return Err(format!("{entity} name cannot exceed {max_len} characters"));
    }
    if name
        .chars()
        .any(|c| c.is_control() || c == '/' || c == '\\')
    {
        return Err(format!(
            "{entity} name cannot contain slashes or control characters"
        ));
    }
    Ok(())
}

pub fn validate_project_name(name: &str) -> Result<(), ApiError> {
    validate_display_name(name, "Project", MAX_PROJECT_NAME_LEN).map_err(ApiError::bad_request)
}

pub fn validate_template_name(name: &str) -> Result<(), ApiError> {
    validate_display_name(name, "Config Template", MAX_TEMPLATE_NAME_LEN)
        .map_err(ApiError::bad_request)
}

pub fn validate_hostname(name: &str) -> Result<(), ApiError> {
    validate_display_name(name, "Template Value Set", MAX_HOSTNAME_LEN)
        .map_err(ApiError::bad_request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_may_contain_spaces() {
        assert!(validate_project_name("My first Project").is_ok());
        assert!(validate_hostname("edge router 1").is_ok());
    }

    #[test]
    fn test_empty_names_rejected() {
        assert!(validate_project_name("").is_err());
        assert!(validate_template_name("   ").is_err());
        assert!(validate_hostname("").is_err());
    }

    #[test]
    fn test_path_separators_rejected() {
        assert!(validate_project_name("a/b").is_err());
        assert!(validate_template_name("a\\b").is_err());
        assert!(validate_hostname("sw/01").is_err());
    }

    #[test]
    fn test_overlong_names_rejected() {
        let long = "x".repeat(MAX_PROJECT_NAME_LEN + 1);
        assert!(validate_project_name(&long).is_err());
    }
}
