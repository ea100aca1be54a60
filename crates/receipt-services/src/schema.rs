//! Field schema providers
//!
//! The accepted fields are data: either read from the `inputs` section of
//! the configuration store on every request, or taken from the built-in
//! receipt schema.

use crate::resolver::{read_config_section, INPUTS_SECTION};
use async_trait::async_trait;
use receipt_core::{AppError, FieldRule, SchemaSource};
use receipt_storage::{cells, TableStore};
use std::sync::Arc;

/// Source of the ordered field schema for a configuration store.
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    async fn field_schema(&self, store_ref: &str) -> Result<Vec<FieldRule>, AppError>;
}

/// Compiled-in schema.
#[derive(Debug, Clone)]
pub struct StaticSchema {
    rules: Vec<FieldRule>,
}

impl StaticSchema {
    pub fn new(rules: Vec<FieldRule>) -> Self {
        Self { rules }
    }
}

impl Default for StaticSchema {
    /// The standard receipt form.
    fn default() -> Self {
        Self::new(vec![
            FieldRule::new("date", 10, true),
            FieldRule::new("name", 50, true),
            FieldRule::new("amount", 10, true),
            FieldRule::new("detail", 200, true),
            FieldRule::new("note", 500, false),
            FieldRule::new("noImageReason", 200, false),
        ])
    }
}

#[async_trait]
impl SchemaProvider for StaticSchema {
    async fn field_schema(&self, _store_ref: &str) -> Result<Vec<FieldRule>, AppError> {
        Ok(self.rules.clone())
    }
}

/// Schema read from the `inputs` section: `[name, maxLength, requiredFlag]`.
pub struct TableSchema {
    tables: Arc<dyn TableStore>,
}

impl TableSchema {
    pub fn new(tables: Arc<dyn TableStore>) -> Self {
        Self { tables }
    }
}

#[async_trait]
impl SchemaProvider for TableSchema {
    async fn field_schema(&self, store_ref: &str) -> Result<Vec<FieldRule>, AppError> {
        let rows = read_config_section(self.tables.as_ref(), store_ref, INPUTS_SECTION).await?;

        let rules: Vec<FieldRule> = rows
            .iter()
            .skip(1)
            .filter_map(|row| {
                let name = cells::text(row, 0);
                if name.is_empty() {
                    return None;
                }
                Some(FieldRule::new(
                    name,
                    cells::leading_integer(row, 1),
                    cells::is_truthy(row, 2),
                ))
            })
            .collect();

        tracing::debug!(store_ref = %store_ref, rules = rules.len(), "Field schema loaded");
        Ok(rules)
    }
}

/// Build the provider selected by settings.
pub fn schema_provider(source: SchemaSource, tables: Arc<dyn TableStore>) -> Arc<dyn SchemaProvider> {
    match source {
        SchemaSource::Table => Arc::new(TableSchema::new(tables)),
        SchemaSource::Static => Arc::new(StaticSchema::default()),
    }
}
