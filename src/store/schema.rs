pub const SCHEMA: &str = r#"
-- Projects group config templates
CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Config templates: free-text content with {{ variable }} references
CREATE TABLE IF NOT EXISTS config_templates (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    template_content TEXT NOT NULL DEFAULT '',
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now')),

    UNIQUE(project_id, name)
);

-- Template variables: normalized slugs, kept in sync with template content.
-- Every template carries the reserved 'hostname' variable.
CREATE TABLE IF NOT EXISTS template_variables (
    id TEXT PRIMARY KEY,
    config_template_id TEXT NOT NULL REFERENCES config_templates(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now')),

    UNIQUE(config_template_id, name)
);

-- Template value sets: per-host bindings, named by hostname
CREATE TABLE IF NOT EXISTS template_value_sets (
    id TEXT PRIMARY KEY,
    config_template_id TEXT NOT NULL REFERENCES config_templates(id) ON DELETE CASCADE,
    hostname TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now')),

    UNIQUE(config_template_id, hostname)
);

-- Template values: exactly one row per (value set, variable)
CREATE TABLE IF NOT EXISTS template_values (
    id TEXT PRIMARY KEY,
    value_set_id TEXT NOT NULL REFERENCES template_value_sets(id) ON DELETE CASCADE,
    variable_id TEXT NOT NULL REFERENCES template_variables(id) ON DELETE CASCADE,
    value TEXT NOT NULL DEFAULT '',
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now')),

    UNIQUE(value_set_id, variable_id)
);

-- Create indexes
CREATE INDEX IF NOT EXISTS idx_config_templates_project ON config_templates(project_id);
CREATE INDEX IF NOT EXISTS idx_template_variables_template ON template_variables(config_template_id);
CREATE INDEX IF NOT EXISTS idx_template_value_sets_template ON template_value_sets(config_template_id);
CREATE INDEX IF NOT EXISTS idx_template_values_value_set ON template_values(value_set_id);
CREATE INDEX IF NOT EXISTS idx_template_values_variable ON template_values(variable_id);
"#;
