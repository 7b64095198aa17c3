//! Live schema introspection through the database catalog.
//!
//! Every call goes to `information_schema`; nothing is cached, so a column
//! added a moment ago shows up in the next generation run.

use diesel::prelude::*;
use diesel::sql_types::{BigInt, Nullable, Text};

use crate::diesel_runtime::Database;
use crate::error::{GeneratorError, Result};
use crate::schema::{ColumnDescriptor, SchemaSource, TableDescriptor, TableSummary};

#[cfg(feature = "postgres")]
const COLUMNS_SQL: &str = r#"
SELECT c.column_name::text AS column_name,
       c.data_type::text AS column_type,
       c.character_maximum_length::bigint AS max_length,
       c.is_nullable::text AS is_nullable,
       c.column_default::text AS column_default,
       COALESCE(d.description, '') AS column_comment,
       CASE WHEN pk.column_name IS NULL THEN '' ELSE 'PRI' END AS column_key,
       CASE WHEN c.is_identity = 'YES' OR COALESCE(c.column_default, '') LIKE 'nextval(%'
            THEN 'auto_increment' ELSE '' END AS extra
FROM information_schema.columns c
LEFT JOIN pg_catalog.pg_statio_all_tables st
       ON st.schemaname = c.table_schema AND st.relname = c.table_name
LEFT JOIN pg_catalog.pg_description d
       ON d.objoid = st.relid AND d.objsubid = c.ordinal_position
LEFT JOIN (
    SELECT kcu.table_schema, kcu.table_name, kcu.column_name
    FROM information_schema.table_constraints tc
    JOIN information_schema.key_column_usage kcu
      ON tc.constraint_name = kcu.constraint_name AND tc.table_schema = kcu.table_schema
    WHERE tc.constraint_type = 'PRIMARY KEY'
) pk ON pk.table_schema = c.table_schema
    AND pk.table_name = c.table_name
    AND pk.column_name = c.column_name
WHERE c.table_schema = current_schema() AND c.table_name = $1
ORDER BY c.ordinal_position
"#;

#[cfg(feature = "postgres")]
const TABLES_SQL: &str = r#"
SELECT t.table_name::text AS table_name,
       COALESCE(obj_description(
           (quote_ident(t.table_schema) || '.' || quote_ident(t.table_name))::regclass,
           'pg_class'), '') AS table_comment
FROM information_schema.tables t
WHERE t.table_schema = current_schema() AND t.table_type = 'BASE TABLE'
ORDER BY t.table_name
"#;

#[cfg(feature = "postgres")]
const TABLE_COMMENT_SQL: &str = r#"
SELECT COALESCE(obj_description(
           (quote_ident(t.table_schema) || '.' || quote_ident(t.table_name))::regclass,
           'pg_class'), '') AS table_comment
FROM information_schema.tables t
WHERE t.table_schema = current_schema() AND t.table_name = $1
"#;

#[cfg(all(feature = "mysql", not(feature = "postgres")))]
const COLUMNS_SQL: &str = r#"
SELECT COLUMN_NAME AS column_name,
       COLUMN_TYPE AS column_type,
       CAST(CHARACTER_MAXIMUM_LENGTH AS SIGNED) AS max_length,
       IS_NULLABLE AS is_nullable,
       COLUMN_DEFAULT AS column_default,
       COLUMN_COMMENT AS column_comment,
       COLUMN_KEY AS column_key,
       EXTRA AS extra
FROM information_schema.COLUMNS
WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?
ORDER BY ORDINAL_POSITION
"#;

#[cfg(all(feature = "mysql", not(feature = "postgres")))]
const TABLES_SQL: &str = r#"
SELECT TABLE_NAME AS table_name,
       TABLE_COMMENT AS table_comment
FROM information_schema.TABLES
WHERE TABLE_SCHEMA = DATABASE() AND TABLE_TYPE = 'BASE TABLE'
ORDER BY TABLE_NAME
"#;

#[cfg(all(feature = "mysql", not(feature = "postgres")))]
const TABLE_COMMENT_SQL: &str = r#"
SELECT TABLE_COMMENT AS table_comment
FROM information_schema.TABLES
WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?
"#;

/// One row of the column catalog query, normalized across backends
#[derive(Debug, QueryableByName)]
struct ColumnRow {
    #[diesel(sql_type = Text)]
    column_name: String,
    #[diesel(sql_type = Text)]
    column_type: String,
    #[diesel(sql_type = Nullable<BigInt>)]
    max_length: Option<i64>,
    #[diesel(sql_type = Text)]
    is_nullable: String,
    #[diesel(sql_type = Nullable<Text>)]
    column_default: Option<String>,
    #[diesel(sql_type = Text)]
    column_comment: String,
    #[diesel(sql_type = Text)]
    column_key: String,
    #[diesel(sql_type = Text)]
    extra: String,
}

impl From<ColumnRow> for ColumnDescriptor {
    fn from(row: ColumnRow) -> Self {
        let mut column = ColumnDescriptor::new(row.column_name, row.column_type);
        column.length = row
            .max_length
            .and_then(|len| u32::try_from(len).ok())
            .filter(|len| *len > 0);
        column.nullable = row.is_nullable.eq_ignore_ascii_case("YES");
        column.is_primary = row.column_key == "PRI";
        column.is_auto_generated = row.extra.to_lowercase().contains("auto_increment");
        column.default_value = row.column_default;
        column.comment = row.column_comment;
        column
    }
}

#[derive(Debug, QueryableByName)]
struct TableRow {
    #[diesel(sql_type = Text)]
    table_name: String,
    #[diesel(sql_type = Text)]
    table_comment: String,
}

#[derive(Debug, QueryableByName)]
struct CommentRow {
    #[diesel(sql_type = Text)]
    table_comment: String,
}

/// Schema source that reads the live catalog of the connected database
#[derive(Clone)]
pub struct DieselSchemaSource {
    db: Database,
}

impl DieselSchemaSource {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl SchemaSource for DieselSchemaSource {
    fn get_table(&self, table_name: &str) -> Result<TableDescriptor> {
        let mut conn = self.db.get_connection()?;

        let rows: Vec<ColumnRow> = diesel::sql_query(COLUMNS_SQL)
            .bind::<Text, _>(table_name)
            .load(&mut conn)?;

        if rows.is_empty() {
            return Err(GeneratorError::SchemaNotFound {
                table: table_name.to_string(),
            });
        }

        // Reuse `conn`; a second checkout would starve a one-connection pool.
        let table_comment = diesel::sql_query(TABLE_COMMENT_SQL)
            .bind::<Text, _>(table_name)
            .get_result::<CommentRow>(&mut conn)
            .optional()?
            .map(|row| row.table_comment)
            .unwrap_or_default();

        let table = TableDescriptor {
            table_name: table_name.to_string(),
            columns: rows.into_iter().map(ColumnDescriptor::from).collect(),
            table_comment,
        };

        tracing::debug!(
            "Introspected table '{}' with {} columns",
            table.table_name,
            table.columns.len()
        );

        Ok(table)
    }

    fn list_tables(&self) -> Result<Vec<TableSummary>> {
        let mut conn = self.db.get_connection()?;

        let rows: Vec<TableRow> = diesel::sql_query(TABLES_SQL).load(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|row| TableSummary {
                table_name: row.table_name,
                table_comment: row.table_comment,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diesel_runtime::DatabaseConfig;
    use crate::schema::SemanticType;

    fn row(name: &str, column_type: &str, key: &str, extra: &str) -> ColumnRow {
        ColumnRow {
            column_name: name.to_string(),
            column_type: column_type.to_string(),
            max_length: None,
            is_nullable: "NO".to_string(),
            column_default: None,
            column_comment: String::new(),
            column_key: key.to_string(),
            extra: extra.to_string(),
        }
    }

    #[test]
    fn test_row_conversion_primary_and_identity() {
        let column = ColumnDescriptor::from(row("id", "int(11)", "PRI", "auto_increment"));
        assert!(column.is_primary);
        assert!(column.is_auto_generated);
        assert_eq!(column.semantic_type, SemanticType::Number);
    }

    #[test]
    fn test_row_conversion_length_and_nullability() {
        let mut raw = row("title", "varchar(120)", "", "");
        raw.max_length = Some(120);
        raw.is_nullable = "YES".to_string();
        raw.column_comment = "Title".to_string();

        let column = ColumnDescriptor::from(raw);
        assert_eq!(column.length, Some(120));
        assert!(column.nullable);
        assert!(!column.is_primary);
        assert_eq!(column.comment, "Title");
    }

    #[test]
    fn test_row_conversion_ignores_non_positive_length() {
        let mut raw = row("body", "text", "", "");
        raw.max_length = Some(0);
        assert_eq!(ColumnDescriptor::from(raw).length, None);
    }

    #[test]
    fn test_single_connection_pool_introspects_existing_table() {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            return;
        };
        let config = DatabaseConfig {
            max_connections: 1,
            min_idle: 0,
            connection_timeout_secs: 5,
            ..DatabaseConfig::default()
        };
        let db = Database::new_with_config(&url, &config).expect("Failed to connect");
        let source = DieselSchemaSource::new(db);

        let tables = source.list_tables().unwrap();
        let Some(first) = tables.first() else {
            return;
        };
        let table = source.get_table(&first.table_name).unwrap();
        assert_eq!(table.table_name, first.table_name);
        assert_eq!(table.table_comment, first.table_comment);
    }

    #[test]
    fn test_live_introspection_when_database_available() {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            return;
        };
        let db = Database::new(&url).expect("Failed to connect");
        let source = DieselSchemaSource::new(db);
        assert!(matches!(
            source.get_table("tablegen_definitely_missing_table"),
            Err(GeneratorError::SchemaNotFound { .. })
        ));
    }
}
