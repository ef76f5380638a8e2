use std::collections::HashSet;

use super::Store;
use crate::error::{Result, ServiceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub definition: &'static str,
}

impl ColumnDef {
    pub const fn new(name: &'static str, definition: &'static str) -> Self {
        Self { name, definition }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexDef {
    pub name: &'static str,
    pub columns: &'static [&'static str],
    pub unique: bool,
}

impl IndexDef {
    pub const fn new(name: &'static str, columns: &'static [&'static str], unique: bool) -> Self {
        Self {
            name,
            columns,
            unique,
        }
    }

    fn definition(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| quote(c))
            .collect::<Vec<_>>()
            .join(", ");
        let kind = if self.unique { "UNIQUE INDEX" } else { "INDEX" };
        format!("{} {} ({})", kind, quote(self.name), columns)
    }
}

/// Structural definition of a table an entity is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDescriptor {
    pub table: &'static str,
    pub columns: &'static [ColumnDef],
    pub primary_key: &'static str,
    pub indexes: &'static [IndexDef],
}

/// What is already present for a table. Names are compared case-insensitively,
/// as MySQL does for column and index names.
#[derive(Debug, Clone, Default)]
pub struct ExistingTable {
    columns: HashSet<String>,
    indexes: HashSet<String>,
}

impl ExistingTable {
    pub fn new<C, I>(columns: C, indexes: I) -> Self
    where
        C: IntoIterator,
        C::Item: AsRef<str>,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self {
            columns: columns
                .into_iter()
                .map(|c| c.as_ref().to_ascii_lowercase())
                .collect(),
            indexes: indexes
                .into_iter()
                .map(|i| i.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    fn has_column(&self, name: &str) -> bool {
        self.columns.contains(&name.to_ascii_lowercase())
    }

    fn has_index(&self, name: &str) -> bool {
        self.indexes.contains(&name.to_ascii_lowercase())
    }
}

/// A single additive change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaStep {
    CreateTable,
    AddColumn(ColumnDef),
    AddIndex(IndexDef),
}

impl SchemaStep {
    pub fn sql(&self, entity: &EntityDescriptor) -> String {
        match self {
            SchemaStep::CreateTable => {
                let mut parts: Vec<String> = entity
                    .columns
                    .iter()
                    .map(|c| format!("{} {}", quote(c.name), c.definition))
                    .collect();
                parts.push(format!("PRIMARY KEY ({})", quote(entity.primary_key)));
                parts.extend(entity.indexes.iter().map(IndexDef::definition));

                format!(
                    "CREATE TABLE IF NOT EXISTS {} ({}) DEFAULT CHARSET=utf8mb4",
                    quote(entity.table),
                    parts.join(", ")
                )
            }
            SchemaStep::AddColumn(column) => format!(
                "ALTER TABLE {} ADD COLUMN {} {}",
                quote(entity.table),
                quote(column.name),
                column.definition
            ),
            SchemaStep::AddIndex(index) => format!(
                "ALTER TABLE {} ADD {}",
                quote(entity.table),
                index.definition()
            ),
        }
    }
}

/// Steps needed to bring `existing` up to `entity`. `None` means the table is
/// absent.
pub fn plan(entity: &EntityDescriptor, existing: Option<&ExistingTable>) -> Vec<SchemaStep> {
    let Some(existing) = existing else {
        return vec![SchemaStep::CreateTable];
    };

    let columns = entity
        .columns
        .iter()
        .filter(|c| !existing.has_column(c.name))
        .map(|c| SchemaStep::AddColumn(*c));

    let indexes = entity
        .indexes
        .iter()
        .filter(|i| !existing.has_index(i.name))
        .map(|i| SchemaStep::AddIndex(*i));

    columns.chain(indexes).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaReport {
    pub created_tables: Vec<&'static str>,
    pub added_columns: Vec<String>,
    pub added_indexes: Vec<String>,
}

impl SchemaReport {
    pub fn is_unchanged(&self) -> bool {
        self.created_tables.is_empty()
            && self.added_columns.is_empty()
            && self.added_indexes.is_empty()
    }

    fn record(&mut self, entity: &EntityDescriptor, step: &SchemaStep) {
        match step {
            SchemaStep::CreateTable => self.created_tables.push(entity.table),
            SchemaStep::AddColumn(column) => self
                .added_columns
                .push(format!("{}.{}", entity.table, column.name)),
            SchemaStep::AddIndex(index) => self
                .added_indexes
                .push(format!("{}.{}", entity.table, index.name)),
        }
    }
}

/// Creates missing tables, columns and indexes for every entity. Running it
/// against an up-to-date schema changes nothing.
pub async fn ensure_schema(
    store: &Store,
    entities: &[&EntityDescriptor],
) -> Result<SchemaReport> {
    let mut report = SchemaReport::default();

    for entity in entities {
        let existing = inspect(store, entity).await?;
        let steps = plan(entity, existing.as_ref());

        for step in &steps {
            let sql = step.sql(entity);
            log::debug!("Schema: {}", sql);
            sqlx::query(&sql)
                .execute(store.pool())
                .await
                .map_err(|source| ServiceError::Schema {
                    table: entity.table,
                    source,
                })?;
            report.record(entity, step);
        }

        if steps.is_empty() {
            log::info!("Table `{}` is up to date", entity.table);
        } else {
            log::info!(
                "Applied {} schema change(s) to `{}`",
                steps.len(),
                entity.table
            );
        }
    }

    Ok(report)
}

async fn inspect(store: &Store, entity: &EntityDescriptor) -> Result<Option<ExistingTable>> {
    let schema_error = |source| ServiceError::Schema {
        table: entity.table,
        source,
    };

    // CAST keeps the driver from seeing information_schema's binary collation.
    let columns: Vec<String> = sqlx::query_scalar(
        "SELECT CAST(COLUMN_NAME AS CHAR) FROM information_schema.COLUMNS \
         WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?",
    )
    .bind(entity.table)
    .fetch_all(store.pool())
    .await
    .map_err(schema_error)?;

    if columns.is_empty() {
        return Ok(None);
    }

    let indexes: Vec<String> = sqlx::query_scalar(
        "SELECT DISTINCT CAST(INDEX_NAME AS CHAR) FROM information_schema.STATISTICS \
         WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?",
    )
    .bind(entity.table)
    .fetch_all(store.pool())
    .await
    .map_err(schema_error)?;

    Ok(Some(ExistingTable::new(columns, indexes)))
}

fn quote(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}
