use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{ConfigTemplate, VariableReconciliation};

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateConfigTemplateRequest {
    pub name: String,
    #[serde(default)]
    pub template_content: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateConfigTemplateRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub template_content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTemplateVariableRequest {
    /// Free-form; converted to a slug before persisting.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTemplateValueSetRequest {
    pub hostname: String,
    #[serde(default)]
    pub values: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTemplateValueSetRequest {
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub values: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
pub struct SetTemplateValuesRequest {
    pub values: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    #[serde(default)]
    pub cursor: Option<String>,
}

/// Template create/update response carrying the variable sync outcome.
#[derive(Debug, Serialize)]
pub struct TemplateSyncResponse {
    #[serde(flatten)]
    pub template: ConfigTemplate,
    pub reconciliation: VariableReconciliation,
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub exported: Vec<String>,
    pub export_dir: String,
}
