//! Configuration resolver
//!
//! Reads the destination table (and, through a [`SchemaProvider`], the field
//! schema) from the configuration store. Nothing is cached: every request
//! sees the store as it is at that moment.

use crate::schema::SchemaProvider;
use receipt_core::{AppError, Configuration, DestinationOption, DestinationRecord};
use receipt_storage::{cells, Row, StorageError, TableStore};
use std::sync::Arc;

pub const DESTINATIONS_SECTION: &str = "destinations";
pub const INPUTS_SECTION: &str = "inputs";

const CONFIG_NOT_FOUND: &str = "Config not found.";

/// Read a required section of the configuration store.
///
/// Both an unreachable store and a missing section are configuration errors.
pub(crate) async fn read_config_section(
    tables: &dyn TableStore,
    store_ref: &str,
    section: &str,
) -> Result<Vec<Row>, AppError> {
    match tables.read_section(store_ref, section).await {
        Ok(Some(rows)) => Ok(rows),
        Ok(None) => {
            tracing::error!(store_ref = %store_ref, section = %section, "Configuration section missing");
            Err(AppError::Configuration(CONFIG_NOT_FOUND.to_string()))
        }
        Err(StorageError::BookNotFound(msg)) => Err(AppError::Configuration(msg)),
        Err(e) => Err(e.into()),
    }
}

fn destination_from_row(row: &Row) -> DestinationRecord {
    DestinationRecord {
        key: cells::text(row, 1),
        label: cells::text(row, 2),
        store_id: cells::text(row, 3),
        sheet_name: cells::text(row, 4),
        folder_id: cells::text(row, 5),
    }
}

pub struct ConfigurationResolver {
    tables: Arc<dyn TableStore>,
    schema: Arc<dyn SchemaProvider>,
}

impl ConfigurationResolver {
    pub fn new(tables: Arc<dyn TableStore>, schema: Arc<dyn SchemaProvider>) -> Self {
        Self { tables, schema }
    }

    /// Load the active destinations and the field schema.
    pub async fn load_configuration(&self, store_ref: &str) -> Result<Configuration, AppError> {
        let destinations = self.load_destinations(store_ref).await?;
        let field_schema = self.schema.field_schema(store_ref).await?;

        tracing::debug!(
            destinations = destinations.len(),
            fields = field_schema.len(),
            "Configuration loaded"
        );

        Ok(Configuration {
            destinations,
            field_schema,
        })
    }

    /// Active destinations in table order.
    ///
    /// The header row is skipped, as is every row whose first column holds a
    /// value (the disable flag). Rows without a key cannot be looked up and
    /// are dropped.
    pub async fn load_destinations(&self, store_ref: &str) -> Result<Vec<DestinationRecord>, AppError> {
        let rows =
            read_config_section(self.tables.as_ref(), store_ref, DESTINATIONS_SECTION).await?;

        let destinations = rows
            .iter()
            .skip(1)
            .filter(|row| !cells::is_truthy(row, 0))
            .map(destination_from_row)
            .filter(|record| {
                if record.key.is_empty() {
                    tracing::debug!(label = %record.label, "Skipping destination without key");
                }
                !record.key.is_empty()
            })
            .collect();

        Ok(destinations)
    }

    /// Destinations as `{value, label}` options for client forms.
    pub async fn list_destinations(&self, store_ref: &str) -> Result<Vec<DestinationOption>, AppError> {
        let destinations = self.load_destinations(store_ref).await?;
        Ok(destinations.iter().map(DestinationOption::from).collect())
    }
}

/// Exact, case-sensitive lookup of a destination by key.
pub fn find_destination<'a>(
    config: &'a Configuration,
    key: &str,
) -> Result<&'a DestinationRecord, AppError> {
    config
        .destinations
        .iter()
        .find(|record| record.key == key)
        .ok_or_else(|| AppError::NotFound("Invalid destination specified.".to_string()))
}
