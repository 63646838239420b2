use serde::{Deserialize, Serialize};

use super::errors::CatalogError;
use crate::sql_generator::to_snake_case;

/// One DAX column and its warehouse mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub dax_name: String,
    pub sql_name: String,
    pub data_type: String,
}

/// One DAX table and its warehouse mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMapping {
    pub dax_name: String,
    pub sql_name: String,
    #[serde(default)]
    pub columns: Vec<ColumnMapping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,
}

impl TableMapping {
    fn find_column(&self, dax_name: &str) -> Option<&ColumnMapping> {
        self.columns
            .iter()
            .find(|c| c.dax_name.eq_ignore_ascii_case(dax_name))
    }
}

/// Relationship cardinality, in model-definition terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cardinality {
    OneToMany,
    ManyToOne,
    OneToOne,
}

/// A relationship edge between two tables.
///
/// Edges are undirected for traversal; `from`/`to` only fix how the ON
/// clause reads. Inactive edges are kept for fidelity with the source model
/// but never used for JOIN planning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRelationship {
    pub from_table: String,
    #[serde(rename = "from_col")]
    pub from_column: String,
    pub to_table: String,
    #[serde(rename = "to_col")]
    pub to_column: String,
    pub cardinality: Cardinality,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl TableRelationship {
    /// The opposite endpoint, if `table` is one of the two. Comparison is
    /// case-insensitive like all catalog lookups.
    fn other_endpoint(&self, table: &str) -> Option<&str> {
        if self.from_table.eq_ignore_ascii_case(table) {
            Some(&self.to_table)
        } else if self.to_table.eq_ignore_ascii_case(table) {
            Some(&self.from_table)
        } else {
            None
        }
    }

    fn connects(&self, a: &str, b: &str) -> bool {
        (self.from_table.eq_ignore_ascii_case(a) && self.to_table.eq_ignore_ascii_case(b))
            || (self.from_table.eq_ignore_ascii_case(b) && self.to_table.eq_ignore_ascii_case(a))
    }
}

/// Schema context: DAX-to-Snowflake name mappings plus the relationship
/// graph. Names are matched case-insensitively but preserved as declared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaContext {
    #[serde(default)]
    pub tables: Vec<TableMapping>,
    #[serde(default)]
    pub relationships: Vec<TableRelationship>,
}

impl SchemaContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table mapping. Table DAX names are unique in the catalog.
    pub fn add_table(&mut self, table: TableMapping) -> Result<(), CatalogError> {
        if self.find_table(&table.dax_name).is_some() {
            return Err(CatalogError::DuplicateTable(table.dax_name));
        }
        self.tables.push(table);
        Ok(())
    }

    /// Register a relationship. Both endpoints must already exist, and at
    /// most one active relationship may connect any pair of tables.
    pub fn add_relationship(
        &mut self,
        relationship: TableRelationship,
    ) -> Result<(), CatalogError> {
        self.validate_relationship(&relationship)?;
        self.relationships.push(relationship);
        Ok(())
    }

    fn validate_relationship(&self, relationship: &TableRelationship) -> Result<(), CatalogError> {
        for (table, column) in [
            (&relationship.from_table, &relationship.from_column),
            (&relationship.to_table, &relationship.to_column),
        ] {
            let mapping = self
                .find_table(table)
                .ok_or_else(|| CatalogError::UnknownTable {
                    table: table.clone(),
                })?;
            if mapping.find_column(column).is_none() {
                return Err(CatalogError::UnknownColumn {
                    table: table.clone(),
                    column: column.clone(),
                });
            }
        }

        if relationship.active {
            let duplicate = self.relationships.iter().any(|existing| {
                existing.active
                    && existing.connects(&relationship.from_table, &relationship.to_table)
            });
            if duplicate {
                return Err(CatalogError::DuplicateActiveRelationship {
                    a: relationship.from_table.clone(),
                    b: relationship.to_table.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn find_table(&self, dax_name: &str) -> Option<&TableMapping> {
        self.tables
            .iter()
            .find(|t| t.dax_name.eq_ignore_ascii_case(dax_name))
    }

    /// Warehouse name for a DAX table, if mapped.
    pub fn get_sql_table_name(&self, dax_name: &str) -> Option<String> {
        self.find_table(dax_name).map(|t| t.sql_name.clone())
    }

    /// Warehouse name for a DAX column, if mapped.
    pub fn get_sql_column_name(&self, dax_table: &str, dax_column: &str) -> Option<String> {
        self.find_table(dax_table)
            .and_then(|t| t.find_column(dax_column))
            .map(|c| c.sql_name.clone())
    }

    /// Warehouse-side rendering of one relationship endpoint, falling back
    /// to snake_case when the catalog has no mapping.
    fn render_endpoint(&self, table: &str, column: &str) -> String {
        let sql_table = self
            .get_sql_table_name(table)
            .unwrap_or_else(|| to_snake_case(table));
        let sql_column = self
            .get_sql_column_name(table, column)
            .unwrap_or_else(|| to_snake_case(column));
        format!("{}.{}", sql_table, sql_column)
    }

    /// Plan the JOIN clauses connecting the given tables.
    ///
    /// Spanning walk (BFS) from the first-listed table across active edges
    /// restricted to the given vertices; each edge is emitted at most once.
    /// Disconnected remainders are joined best-effort component by component,
    /// each prefixed with a warning comment the caller may surface.
    pub fn generate_joins(&self, tables: &[String]) -> String {
        if tables.len() < 2 {
            return String::new();
        }

        let mut lines: Vec<String> = Vec::new();
        let mut visited: Vec<&str> = Vec::new();
        let mut used_edges: Vec<usize> = Vec::new();

        let in_scope =
            |name: &str| tables.iter().any(|t| t.eq_ignore_ascii_case(name));
        let seen =
            |visited: &[&str], name: &str| visited.iter().any(|v| v.eq_ignore_ascii_case(name));

        for (component, start) in tables.iter().enumerate() {
            if seen(&visited, start) {
                continue;
            }
            if component > 0 {
                lines.push(format!(
                    "/* WARNING: no active relationship path to {} */",
                    start
                ));
            }

            visited.push(start);
            let mut queue: std::collections::VecDeque<&str> = std::collections::VecDeque::new();
            queue.push_back(start);
            while let Some(current) = queue.pop_front() {
                for (idx, rel) in self.relationships.iter().enumerate() {
                    if !rel.active || used_edges.contains(&idx) {
                        continue;
                    }
                    let Some(other) = rel.other_endpoint(current) else {
                        continue;
                    };
                    if !in_scope(other) || seen(&visited, other) {
                        continue;
                    }

                    used_edges.push(idx);
                    // Orient the ON clause so the already-visited table reads
                    // first.
                    let (near, near_col, far, far_col) =
                        if rel.from_table.eq_ignore_ascii_case(current) {
                            (
                                &rel.from_table,
                                &rel.from_column,
                                &rel.to_table,
                                &rel.to_column,
                            )
                        } else {
                            (
                                &rel.to_table,
                                &rel.to_column,
                                &rel.from_table,
                                &rel.from_column,
                            )
                        };
                    let far_sql = self
                        .get_sql_table_name(far)
                        .unwrap_or_else(|| to_snake_case(far));
                    lines.push(format!(
                        "INNER JOIN {} ON {} = {}",
                        far_sql,
                        self.render_endpoint(near, near_col),
                        self.render_endpoint(far, far_col),
                    ));

                    visited.push(other);
                    queue.push_back(other);
                }
            }
        }

        lines.join("\n")
    }

    /// Parse and validate a schema context from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let context: SchemaContext = serde_json::from_str(json)?;

        // Re-run the add-time invariants over the deserialized whole.
        let mut validated = SchemaContext::new();
        for table in context.tables {
            validated.add_table(table)?;
        }
        for relationship in context.relationships {
            validated.add_relationship(relationship)?;
        }
        Ok(validated)
    }

    /// Serialize to the JSON representation accepted by [`from_json`].
    pub fn to_json(&self) -> Result<String, CatalogError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Plain-text rendering for LLM prompts.
    pub fn to_prompt_context(&self) -> String {
        let mut lines = vec!["Schema context (DAX name -> Snowflake name):".to_string()];
        for table in &self.tables {
            lines.push(format!("Table {} -> {}", table.dax_name, table.sql_name));
            for column in &table.columns {
                lines.push(format!(
                    "  {} -> {} ({})",
                    column.dax_name, column.sql_name, column.data_type
                ));
            }
        }
        if !self.relationships.is_empty() {
            lines.push("Relationships:".to_string());
            for rel in &self.relationships {
                lines.push(format!(
                    "  {}.{} -> {}.{} ({:?}{})",
                    rel.from_table,
                    rel.from_column,
                    rel.to_table,
                    rel.to_column,
                    rel.cardinality,
                    if rel.active { "" } else { ", inactive" },
                ));
            }
        }
        lines.join("\n")
    }
}
