//! Named pure functions available to templates.
//!
//! Templates never reach for global state; the pipeline hands them a
//! [`HelperTable`] alongside the context, and tests can swap single entries.

use regex::Regex;
use std::sync::LazyLock;

use crate::codegen::context::ColumnContext;
use crate::codegen::utils::{escape_single_quoted, to_camel_case};
use crate::schema::SemanticType;

/// Which parameter object a validation decorator list is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtoRole {
    Query,
    Create,
    Update,
}

#[derive(Clone, Copy)]
pub struct HelperTable {
    /// Options object of an entity column decorator
    pub column_options: fn(&ColumnContext) -> String,
    /// Decorator lines placed above a DTO property
    pub validation_decorators: fn(&ColumnContext, DtoRole) -> Vec<String>,
    /// Identifier casing for generated variables
    pub identifier: fn(&str) -> String,
}

impl Default for HelperTable {
    fn default() -> Self {
        Self {
            column_options,
            validation_decorators,
            identifier: to_camel_case,
        }
    }
}

impl std::fmt::Debug for HelperTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HelperTable").finish_non_exhaustive()
    }
}

/// `{ type: 'varchar', length: 255, nullable: true, comment: '...' }`
pub fn column_options(column: &ColumnContext) -> String {
    let mut options = Vec::new();
    if column.column_name != column.property_name {
        options.push(format!("name: '{}'", column.column_name));
    }
    options.push(format!("type: '{}'", column_type_name(&column.db_type)));
    if let Some(length) = column.length {
        options.push(format!("length: {}", length));
    }
    if column.nullable {
        options.push("nullable: true".to_string());
    }
    // Generated keys take their value from the database, never from `default`.
    if !column.is_primary && !column.is_auto_generated {
        match column.default_value.as_deref().and_then(ColumnDefault::parse) {
            Some(ColumnDefault::Literal(value)) => {
                options.push(format!("default: '{}'", escape_single_quoted(&value)))
            }
            Some(ColumnDefault::Expression(sql)) => {
                options.push(format!("default: () => '{}'", escape_single_quoted(&sql)))
            }
            None => {}
        }
    }
    options.push(format!("comment: '{}'", escape_single_quoted(&column.comment)));
    format!("{{ {} }}", options.join(", "))
}

/// Trailing Postgres cast, e.g. `::character varying` or `::numeric(10,2)[]`
static CAST_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"::[A-Za-z_][A-Za-z0-9_ ]*(\(\d+(,\s*\d+)?\))?(\[\])?$").expect("cast pattern is valid")
});

/// Function call such as `now()` or `nextval('seq'::regclass)`
static FUNCTION_CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.]*\(.*\)$").expect("call pattern is valid"));

const SQL_KEYWORD_DEFAULTS: &[&str] = &[
    "current_timestamp",
    "current_date",
    "current_time",
    "localtimestamp",
    "localtime",
];

/// Column default as reported by the catalog, cleaned for TypeORM
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnDefault {
    /// Plain value, emitted as `default: '...'`
    Literal(String),
    /// SQL evaluated by the database, emitted as `default: () => '...'`
    Expression(String),
}

impl ColumnDefault {
    /// `None` for a missing or `NULL` default
    pub fn parse(raw: &str) -> Option<Self> {
        let mut value = raw.trim();
        while let Some(cast) = CAST_SUFFIX_RE.find(value) {
            value = value[..cast.start()].trim_end();
        }
        // Postgres wraps cast literals in parentheses, e.g. `('draft'::text)`
        if value.starts_with('(') && value.ends_with(')') {
            return Self::parse(&value[1..value.len() - 1]);
        }

        if value.is_empty() || value.eq_ignore_ascii_case("null") {
            return None;
        }
        if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
            let inner = &value[1..value.len() - 1];
            return Some(ColumnDefault::Literal(inner.replace("''", "'")));
        }
        if FUNCTION_CALL_RE.is_match(value)
            || SQL_KEYWORD_DEFAULTS.contains(&value.to_lowercase().as_str())
        {
            return Some(ColumnDefault::Expression(value.to_string()));
        }
        Some(ColumnDefault::Literal(value.to_string()))
    }
}

/// Strip the length/precision suffix, e.g. `varchar(255)` -> `varchar`
fn column_type_name(db_type: &str) -> String {
    let base = db_type.split('(').next().unwrap_or(db_type);
    base.trim().to_lowercase()
}

pub fn validation_decorators(column: &ColumnContext, role: DtoRole) -> Vec<String> {
    let label = escape_single_quoted(column.label());
    let mut decorators = Vec::new();

    match role {
        DtoRole::Create if column.nullable => {
            decorators.push(format!(
                "@ApiProperty({{ description: '{}', required: false, nullable: true }})",
                label
            ));
            decorators.push("@IsOptional()".to_string());
        }
        DtoRole::Create => {
            decorators.push(format!("@ApiProperty({{ description: '{}' }})", label));
            decorators.push(format!(
                "@IsNotEmpty({{ message: '{} must not be empty' }})",
                label
            ));
        }
        DtoRole::Query | DtoRole::Update => {
            decorators.push(format!("@ApiPropertyOptional({{ description: '{}' }})", label));
            decorators.push("@IsOptional()".to_string());
        }
    }

    match column.semantic_type {
        SemanticType::Boolean => {
            if role == DtoRole::Query {
                decorators.push("@Transform(({ value }) => value === 'true')".to_string());
            }
            decorators.push("@IsBoolean()".to_string());
        }
        SemanticType::Number => {
            if role == DtoRole::Query {
                decorators.push("@Type(() => Number)".to_string());
            }
            decorators.push("@IsNumber()".to_string());
        }
        SemanticType::Date => {
            decorators.push("@Type(() => Date)".to_string());
            decorators.push("@IsDate()".to_string());
        }
        SemanticType::Json => decorators.push("@IsObject()".to_string()),
        SemanticType::String | SemanticType::Text => decorators.push("@IsString()".to_string()),
    }

    decorators
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, property: &str, ty: SemanticType, nullable: bool) -> ColumnContext {
        ColumnContext {
            column_name: name.to_string(),
            property_name: property.to_string(),
            semantic_type: ty,
            property_type: ty.property_type(),
            db_type: "varchar(255)".to_string(),
            length: Some(255),
            nullable,
            is_primary: false,
            is_auto_generated: false,
            default_value: None,
            comment: "Page title".to_string(),
            audit: None,
        }
    }

    #[test]
    fn test_column_options() {
        let options = column_options(&column("title", "title", SemanticType::String, true));
        assert_eq!(
            options,
            "{ type: 'varchar', length: 255, nullable: true, comment: 'Page title' }"
        );

        let renamed = column_options(&column("cover_image", "coverImage", SemanticType::String, false));
        assert!(renamed.starts_with("{ name: 'cover_image', type: 'varchar'"));
    }

    #[test]
    fn test_column_default_parsing() {
        assert_eq!(
            ColumnDefault::parse("'draft'::character varying"),
            Some(ColumnDefault::Literal("draft".to_string()))
        );
        assert_eq!(
            ColumnDefault::parse("'it''s'::text"),
            Some(ColumnDefault::Literal("it's".to_string()))
        );
        assert_eq!(
            ColumnDefault::parse("0::numeric(10,2)"),
            Some(ColumnDefault::Literal("0".to_string()))
        );
        assert_eq!(
            ColumnDefault::parse("'{}'::jsonb"),
            Some(ColumnDefault::Literal("{}".to_string()))
        );
        assert_eq!(
            ColumnDefault::parse("now()"),
            Some(ColumnDefault::Expression("now()".to_string()))
        );
        assert_eq!(
            ColumnDefault::parse("CURRENT_TIMESTAMP"),
            Some(ColumnDefault::Expression("CURRENT_TIMESTAMP".to_string()))
        );
        assert_eq!(
            ColumnDefault::parse("nextval('plugin_note_id_seq'::regclass)"),
            Some(ColumnDefault::Expression(
                "nextval('plugin_note_id_seq'::regclass)".to_string()
            ))
        );
        assert_eq!(ColumnDefault::parse("draft"), Some(ColumnDefault::Literal("draft".to_string())));
        assert_eq!(ColumnDefault::parse("NULL::character varying"), None);
        assert_eq!(ColumnDefault::parse("  "), None);
    }

    #[test]
    fn test_column_options_defaults() {
        let mut status = column("status", "status", SemanticType::String, false);
        status.default_value = Some("'draft'::character varying".to_string());
        assert!(column_options(&status).contains("default: 'draft', "));

        let mut stamp = column("published_at", "publishedAt", SemanticType::Date, true);
        stamp.default_value = Some("now()".to_string());
        assert!(column_options(&stamp).contains("default: () => 'now()', "));

        let mut key = column("id", "id", SemanticType::Number, false);
        key.is_primary = true;
        key.is_auto_generated = true;
        key.default_value = Some("nextval('plugin_note_id_seq'::regclass)".to_string());
        assert!(!column_options(&key).contains("default"));
    }

    #[test]
    fn test_create_decorators_for_required_field() {
        let decorators =
            validation_decorators(&column("title", "title", SemanticType::String, false), DtoRole::Create);
        assert_eq!(
            decorators,
            vec![
                "@ApiProperty({ description: 'Page title' })",
                "@IsNotEmpty({ message: 'Page title must not be empty' })",
                "@IsString()",
            ]
        );
    }

    #[test]
    fn test_query_decorators_coerce_strings() {
        let decorators =
            validation_decorators(&column("status", "status", SemanticType::Number, false), DtoRole::Query);
        assert!(decorators.contains(&"@Type(() => Number)".to_string()));

        let flags =
            validation_decorators(&column("enabled", "enabled", SemanticType::Boolean, false), DtoRole::Query);
        assert!(flags[2].starts_with("@Transform"));

        let update =
            validation_decorators(&column("enabled", "enabled", SemanticType::Boolean, false), DtoRole::Update);
        assert!(!update.iter().any(|d| d.starts_with("@Transform")));
    }

    #[test]
    fn test_helpers_can_be_replaced() {
        fn upper(s: &str) -> String {
            s.to_uppercase()
        }
        let helpers = HelperTable {
            identifier: upper,
            ..HelperTable::default()
        };
        assert_eq!((helpers.identifier)("page"), "PAGE");
    }
}
