use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::template::RESERVED_VARIABLE_NAME;
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// This allows consuming applications to execute custom SQL.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn map_constraint(e: rusqlite::Error) -> Error {
    match e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Error::AlreadyExists
        }
        e => Error::from(e),
    }
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // Project operations

    fn create_project(&self, project: &Project) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO projects (id, name, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    project.id,
                    project.name,
                    format_datetime(&project.created_at),
                    format_datetime(&project.updated_at),
                ],
            )
            .map_err(map_constraint)?;
        Ok(())
    }

    fn get_project(&self, id: &str) -> Result<Option<Project>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, created_at, updated_at FROM projects WHERE id = ?1",
            params![id],
            |row| {
                Ok(Project {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    created_at: parse_datetime(&row.get::<_, String>(2)?),
                    updated_at: parse_datetime(&row.get::<_, String>(3)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_project_by_name(&self, name: &str) -> Result<Option<Project>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, created_at, updated_at FROM projects WHERE name = ?1",
            params![name],
            |row| {
                Ok(Project {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    created_at: parse_datetime(&row.get::<_, String>(2)?),
                    updated_at: parse_datetime(&row.get::<_, String>(3)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_projects(&self, cursor: &str, limit: i32) -> Result<Vec<Project>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, name, created_at, updated_at
             FROM projects WHERE name > ?1 ORDER BY name LIMIT ?2",
        )?;

        let rows = stmt.query_map(params![cursor, limit], |row| {
            Ok(Project {
                id: row.get(0)?,
                name: row.get(1)?,
                created_at: parse_datetime(&row.get::<_, String>(2)?),
                updated_at: parse_datetime(&row.get::<_, String>(3)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_project(&self, project: &Project) -> Result<()> {
        let rows = self
            .conn()
            .execute(
                "UPDATE projects SET name = ?1, updated_at = ?2 WHERE id = ?3",
                params![
                    project.name,
                    format_datetime(&project.updated_at),
                    project.id
                ],
            )
            .map_err(map_constraint)?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_project(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM projects WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Config template operations

    fn create_config_template(&self, template: &ConfigTemplate) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO config_templates (id, project_id, name, template_content, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                template.id,
                template.project_id,
                template.name,
                template.template_content,
                format_datetime(&template.created_at),
                format_datetime(&template.updated_at),
            ],
        )
        .map_err(map_constraint)?;

        // Every template carries the reserved hostname variable.
        tx.execute(
            "INSERT INTO template_variables (id, config_template_id, name, description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![
                Uuid::new_v4().to_string(),
                template.id,
                RESERVED_VARIABLE_NAME,
                "hostname of the device (read only)",
                format_datetime(&template.created_at),
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn get_config_template(&self, project_id: &str, name: &str) -> Result<Option<ConfigTemplate>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, project_id, name, template_content, created_at, updated_at
             FROM config_templates WHERE project_id = ?1 AND name = ?2",
            params![project_id, name],
            |row| {
                Ok(ConfigTemplate {
                    id: row.get(0)?,
                    project_id: row.get(1)?,
                    name: row.get(2)?,
                    template_content: row.get(3)?,
                    created_at: parse_datetime(&row.get::<_, String>(4)?),
                    updated_at: parse_datetime(&row.get::<_, String>(5)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_config_template_by_id(&self, id: &str) -> Result<Option<ConfigTemplate>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, project_id, name, template_content, created_at, updated_at
             FROM config_templates WHERE id = ?1",
            params![id],
            |row| {
                Ok(ConfigTemplate {
                    id: row.get(0)?,
                    project_id: row.get(1)?,
                    name: row.get(2)?,
                    template_content: row.get(3)?,
                    created_at: parse_datetime(&row.get::<_, String>(4)?),
                    updated_at: parse_datetime(&row.get::<_, String>(5)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_config_templates(
        &self,
        project_id: &str,
        cursor: &str,
        limit: i32,
    ) -> Result<Vec<ConfigTemplate>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, project_id, name, template_content, created_at, updated_at
             FROM config_templates WHERE project_id = ?1 AND name > ?2 ORDER BY name LIMIT ?3",
        )?;

        let rows = stmt.query_map(params![project_id, cursor, limit], |row| {
            Ok(ConfigTemplate {
                id: row.get(0)?,
                project_id: row.get(1)?,
                name: row.get(2)?,
                template_content: row.get(3)?,
                created_at: parse_datetime(&row.get::<_, String>(4)?),
                updated_at: parse_datetime(&row.get::<_, String>(5)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_config_template(&self, template: &ConfigTemplate) -> Result<()> {
        let rows = self
            .conn()
            .execute(
                "UPDATE config_templates SET name = ?1, template_content = ?2, updated_at = ?3
                 WHERE id = ?4",
                params![
                    template.name,
                    template.template_content,
                    format_datetime(&template.updated_at),
                    template.id
                ],
            )
            .map_err(map_constraint)?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_config_template(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM config_templates WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Template variable operations

    fn get_template_variable(
        &self,
        config_template_id: &str,
        name: &str,
    ) -> Result<Option<TemplateVariable>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, config_template_id, name, description, created_at, updated_at
             FROM template_variables WHERE config_template_id = ?1 AND name = ?2",
            params![config_template_id, name],
            |row| {
                Ok(TemplateVariable {
                    id: row.get(0)?,
                    config_template_id: row.get(1)?,
                    name: row.get(2)?,
                    description: row.get(3)?,
                    created_at: parse_datetime(&row.get::<_, String>(4)?),
                    updated_at: parse_datetime(&row.get::<_, String>(5)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_template_variable_by_id(&self, id: &str) -> Result<Option<TemplateVariable>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, config_template_id, name, description, created_at, updated_at
             FROM template_variables WHERE id = ?1",
            params![id],
            |row| {
                Ok(TemplateVariable {
                    id: row.get(0)?,
                    config_template_id: row.get(1)?,
                    name: row.get(2)?,
                    description: row.get(3)?,
                    created_at: parse_datetime(&row.get::<_, String>(4)?),
                    updated_at: parse_datetime(&row.get::<_, String>(5)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_template_variables(&self, config_template_id: &str) -> Result<Vec<TemplateVariable>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, config_template_id, name, description, created_at, updated_at
             FROM template_variables WHERE config_template_id = ?1 ORDER BY name",
        )?;

        let rows = stmt.query_map(params![config_template_id], |row| {
            Ok(TemplateVariable {
                id: row.get(0)?,
                config_template_id: row.get(1)?,
                name: row.get(2)?,
                description: row.get(3)?,
                created_at: parse_datetime(&row.get::<_, String>(4)?),
                updated_at: parse_datetime(&row.get::<_, String>(5)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_template_variable(&self, variable: &TemplateVariable) -> Result<()> {
        let rows = self
            .conn()
            .execute(
                "UPDATE template_variables SET name = ?1, description = ?2, updated_at = ?3
                 WHERE id = ?4",
                params![
                    variable.name,
                    variable.description,
                    format_datetime(&variable.updated_at),
                    variable.id
                ],
            )
            .map_err(map_constraint)?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn reconcile_template_variables(
        &self,
        config_template_id: &str,
        referenced: &[String],
    ) -> Result<VariableReconciliation> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let now = format_datetime(&Utc::now());

        let existing: Vec<(String, String)> = {
            let mut stmt = tx.prepare(
                "SELECT id, name FROM template_variables WHERE config_template_id = ?1",
            )?;
            let rows = stmt.query_map(params![config_template_id], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        };

        let value_set_ids: Vec<String> = {
            let mut stmt = tx
                .prepare("SELECT id FROM template_value_sets WHERE config_template_id = ?1")?;
            let rows = stmt.query_map(params![config_template_id], |row| row.get(0))?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        };

        let mut outcome = VariableReconciliation::default();

        for (id, name) in &existing {
            if name == RESERVED_VARIABLE_NAME || referenced.contains(name) {
                continue;
            }
            // Cascades to the variable's value rows in every value set.
            tx.execute("DELETE FROM template_variables WHERE id = ?1", params![id])?;
            outcome.removed.push(name.clone());
        }

        for name in referenced {
            if name == RESERVED_VARIABLE_NAME || existing.iter().any(|(_, n)| n == name) {
                continue;
            }

            let variable_id = Uuid::new_v4().to_string();
            tx.execute(
                "INSERT INTO template_variables (id, config_template_id, name, description, created_at, updated_at)
                 VALUES (?1, ?2, ?3, '', ?4, ?4)",
                params![variable_id, config_template_id, name, now],
            )?;

            for value_set_id in &value_set_ids {
                tx.execute(
                    "INSERT INTO template_values (id, value_set_id, variable_id, value, created_at, updated_at)
                     VALUES (?1, ?2, ?3, '', ?4, ?4)",
                    params![Uuid::new_v4().to_string(), value_set_id, variable_id, now],
                )?;
            }

            outcome.added.push(name.clone());
        }

        tx.commit()?;
        Ok(outcome)
    }

    // Template value set operations

    fn create_template_value_set(&self, value_set: &TemplateValueSet) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let now = format_datetime(&value_set.created_at);

        tx.execute(
            "INSERT INTO template_value_sets (id, config_template_id, hostname, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                value_set.id,
                value_set.config_template_id,
                value_set.hostname,
                now,
                format_datetime(&value_set.updated_at),
            ],
        )
        .map_err(map_constraint)?;

        let variables: Vec<(String, String)> = {
            let mut stmt = tx.prepare(
                "SELECT id, name FROM template_variables WHERE config_template_id = ?1",
            )?;
            let rows = stmt.query_map(params![value_set.config_template_id], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        };

        for (variable_id, name) in &variables {
            let value = if name == RESERVED_VARIABLE_NAME {
                value_set.hostname.as_str()
            } else {
                ""
            };
            tx.execute(
                "INSERT INTO template_values (id, value_set_id, variable_id, value, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                params![Uuid::new_v4().to_string(), value_set.id, variable_id, value, now],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn get_template_value_set(
        &self,
        config_template_id: &str,
        hostname: &str,
    ) -> Result<Option<TemplateValueSet>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, config_template_id, hostname, created_at, updated_at
             FROM template_value_sets WHERE config_template_id = ?1 AND hostname = ?2",
            params![config_template_id, hostname],
            |row| {
                Ok(TemplateValueSet {
                    id: row.get(0)?,
                    config_template_id: row.get(1)?,
                    hostname: row.get(2)?,
                    created_at: parse_datetime(&row.get::<_, String>(3)?),
                    updated_at: parse_datetime(&row.get::<_, String>(4)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_template_value_set_by_id(&self, id: &str) -> Result<Option<TemplateValueSet>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, config_template_id, hostname, created_at, updated_at
             FROM template_value_sets WHERE id = ?1",
            params![id],
            |row| {
                Ok(TemplateValueSet {
                    id: row.get(0)?,
                    config_template_id: row.get(1)?,
                    hostname: row.get(2)?,
                    created_at: parse_datetime(&row.get::<_, String>(3)?),
                    updated_at: parse_datetime(&row.get::<_, String>(4)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_template_value_sets(
        &self,
        config_template_id: &str,
        cursor: &str,
        limit: i32,
    ) -> Result<Vec<TemplateValueSet>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, config_template_id, hostname, created_at, updated_at
             FROM template_value_sets
             WHERE config_template_id = ?1 AND hostname > ?2 ORDER BY hostname LIMIT ?3",
        )?;

        let rows = stmt.query_map(params![config_template_id, cursor, limit], |row| {
            Ok(TemplateValueSet {
                id: row.get(0)?,
                config_template_id: row.get(1)?,
                hostname: row.get(2)?,
                created_at: parse_datetime(&row.get::<_, String>(3)?),
                updated_at: parse_datetime(&row.get::<_, String>(4)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_template_value_set(&self, value_set: &TemplateValueSet) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let now = format_datetime(&value_set.updated_at);

        let rows = tx
            .execute(
                "UPDATE template_value_sets SET hostname = ?1, updated_at = ?2 WHERE id = ?3",
                params![value_set.hostname, now, value_set.id],
            )
            .map_err(map_constraint)?;

        if rows == 0 {
            return Err(Error::NotFound);
        }

        // The hostname value always mirrors the value set's hostname.
        tx.execute(
            "UPDATE template_values SET value = ?1, updated_at = ?2
             WHERE value_set_id = ?3 AND variable_id = (
                 SELECT id FROM template_variables
                 WHERE config_template_id = ?4 AND name = ?5
             )",
            params![
                value_set.hostname,
                now,
                value_set.id,
                value_set.config_template_id,
                RESERVED_VARIABLE_NAME
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn delete_template_value_set(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM template_value_sets WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Template value operations

    fn list_template_values(&self, value_set_id: &str) -> Result<Vec<TemplateValue>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT tv.id, tv.value_set_id, tv.variable_id, v.name, tv.value, tv.created_at, tv.updated_at
             FROM template_values tv
             JOIN template_variables v ON v.id = tv.variable_id
             WHERE tv.value_set_id = ?1
             ORDER BY v.name",
        )?;

        let rows = stmt.query_map(params![value_set_id], |row| {
            Ok(TemplateValue {
                id: row.get(0)?,
                value_set_id: row.get(1)?,
                variable_id: row.get(2)?,
                variable_name: row.get(3)?,
                value: row.get(4)?,
                created_at: parse_datetime(&row.get::<_, String>(5)?),
                updated_at: parse_datetime(&row.get::<_, String>(6)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn get_template_value(
        &self,
        value_set_id: &str,
        variable_name: &str,
    ) -> Result<Option<TemplateValue>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT tv.id, tv.value_set_id, tv.variable_id, v.name, tv.value, tv.created_at, tv.updated_at
             FROM template_values tv
             JOIN template_variables v ON v.id = tv.variable_id
             WHERE tv.value_set_id = ?1 AND v.name = ?2",
            params![value_set_id, variable_name],
            |row| {
                Ok(TemplateValue {
                    id: row.get(0)?,
                    value_set_id: row.get(1)?,
                    variable_id: row.get(2)?,
                    variable_name: row.get(3)?,
                    value: row.get(4)?,
                    created_at: parse_datetime(&row.get::<_, String>(5)?),
                    updated_at: parse_datetime(&row.get::<_, String>(6)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn set_template_value(
        &self,
        value_set_id: &str,
        variable_name: &str,
        value: &str,
    ) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE template_values SET value = ?1, updated_at = ?2
             WHERE value_set_id = ?3 AND variable_id = (
                 SELECT v.id FROM template_variables v
                 JOIN template_value_sets s ON s.config_template_id = v.config_template_id
                 WHERE s.id = ?3 AND v.name = ?4
             )",
            params![
                value,
                format_datetime(&Utc::now()),
                value_set_id,
                variable_name
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}
