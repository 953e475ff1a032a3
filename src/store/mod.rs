mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // Project operations
    fn create_project(&self, project: &Project) -> Result<()>;
    fn get_project(&self, id: &str) -> Result<Option<Project>>;
    fn get_project_by_name(&self, name: &str) -> Result<Option<Project>>;
    fn list_projects(&self, cursor: &str, limit: i32) -> Result<Vec<Project>>;
    fn update_project(&self, project: &Project) -> Result<()>;
    fn delete_project(&self, id: &str) -> Result<bool>;

    // Config template operations. Creation also inserts the reserved
    // 'hostname' variable row.
    fn create_config_template(&self, template: &ConfigTemplate) -> Result<()>;
    fn get_config_template(&self, project_id: &str, name: &str) -> Result<Option<ConfigTemplate>>;
    fn get_config_template_by_id(&self, id: &str) -> Result<Option<ConfigTemplate>>;
    fn list_config_templates(
        &self,
        project_id: &str,
        cursor: &str,
        limit: i32,
    ) -> Result<Vec<ConfigTemplate>>;
    fn update_config_template(&self, template: &ConfigTemplate) -> Result<()>;
    fn delete_config_template(&self, id: &str) -> Result<bool>;

    // Template variable operations
    fn get_template_variable(
        &self,
        config_template_id: &str,
        name: &str,
    ) -> Result<Option<TemplateVariable>>;
    fn get_template_variable_by_id(&self, id: &str) -> Result<Option<TemplateVariable>>;
    fn list_template_variables(&self, config_template_id: &str) -> Result<Vec<TemplateVariable>>;
    fn update_template_variable(&self, variable: &TemplateVariable) -> Result<()>;

    /// Syncs a template's variable rows against the names referenced by its
    /// content: unreferenced variables are removed (cascading their values),
    /// newly referenced ones are created with an empty description and an
    /// empty value row in every existing value set. The reserved 'hostname'
    /// variable is never touched.
    fn reconcile_template_variables(
        &self,
        config_template_id: &str,
        referenced: &[String],
    ) -> Result<VariableReconciliation>;

    // Template value set operations. Creation fans out one value row per
    // variable of the template; renaming rewrites the stored hostname value.
    fn create_template_value_set(&self, value_set: &TemplateValueSet) -> Result<()>;
    fn get_template_value_set(
        &self,
        config_template_id: &str,
        hostname: &str,
    ) -> Result<Option<TemplateValueSet>>;
    fn get_template_value_set_by_id(&self, id: &str) -> Result<Option<TemplateValueSet>>;
    fn list_template_value_sets(
        &self,
        config_template_id: &str,
        cursor: &str,
        limit: i32,
    ) -> Result<Vec<TemplateValueSet>>;
    fn update_template_value_set(&self, value_set: &TemplateValueSet) -> Result<()>;
    fn delete_template_value_set(&self, id: &str) -> Result<bool>;

    // Template value operations
    fn list_template_values(&self, value_set_id: &str) -> Result<Vec<TemplateValue>>;
    fn get_template_value(
        &self,
        value_set_id: &str,
        variable_name: &str,
    ) -> Result<Option<TemplateValue>>;
    fn set_template_value(
        &self,
        value_set_id: &str,
        variable_name: &str,
        value: &str,
    ) -> Result<()>;

    fn close(&self) -> Result<()>;
}
