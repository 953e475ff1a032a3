use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level grouping of config templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A text template owned by a project. Variables are declared through
/// `{{ name }}` references in `template_content` and tracked as
/// [`TemplateVariable`] rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigTemplate {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub template_content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named placeholder within a config template. Names are normalized slugs,
/// unique within their template. Every template carries the reserved
/// `hostname` variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateVariable {
    pub id: String,
    pub config_template_id: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A per-host binding of values to a template's variables, named by hostname.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateValueSet {
    pub id: String,
    pub config_template_id: String,
    pub hostname: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One bound value inside a value set. Exactly one row exists per variable of
/// the owning template; `variable_name` is joined in on reads for display and
/// rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateValue {
    pub id: String,
    pub value_set_id: String,
    pub variable_id: String,
    pub variable_name: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of syncing a template's variables against its content.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VariableReconciliation {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}
