//! PostgreSQL upsert statement templating.
//!
//! Only identifiers are interpolated; values are always bound through `$n`
//! placeholders.

use std::sync::OnceLock;

use regex::Regex;

static IDENTIFIER_RE: OnceLock<Regex> = OnceLock::new();

fn identifier_regex() -> &'static Regex {
    IDENTIFIER_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
            .unwrap_or_else(|error| panic!("identifier regex failed to compile: {error}"))
    })
}

/// Errors raised while building an upsert statement.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SqlTemplateError {
    /// No columns were supplied.
    #[error("upsert requires at least one column")]
    NoColumns,
    /// No conflict target was supplied.
    #[error("upsert requires at least one conflict column")]
    NoConflictColumns,
    /// A conflict column is not part of the inserted columns.
    #[error("conflict column '{0}' is not an inserted column")]
    UnknownConflictColumn(String),
    /// A name is not a plain SQL identifier.
    #[error("'{0}' is not a valid SQL identifier")]
    InvalidIdentifier(String),
}

fn check_identifier(name: &str) -> Result<(), SqlTemplateError> {
    if identifier_regex().is_match(name) {
        Ok(())
    } else {
        Err(SqlTemplateError::InvalidIdentifier(name.to_owned()))
    }
}

/// Build an `INSERT ... ON CONFLICT` statement for `table`.
///
/// Non-conflict columns are overwritten from `EXCLUDED`; when every column is
/// part of the conflict target the statement does nothing on conflict.
///
/// # Examples
/// ```
/// use service_utils::domain::upsert_sql;
///
/// let sql = upsert_sql("users", &["id", "email", "name"], &["id"]).expect("valid template");
/// assert_eq!(
///     sql,
///     "INSERT INTO users (id, email, name) VALUES ($1, $2, $3) \
///      ON CONFLICT (id) DO UPDATE SET email = EXCLUDED.email, name = EXCLUDED.name"
/// );
/// ```
pub fn upsert_sql(
    table: &str,
    columns: &[&str],
    conflict_columns: &[&str],
) -> Result<String, SqlTemplateError> {
    if columns.is_empty() {
        return Err(SqlTemplateError::NoColumns);
    }
    if conflict_columns.is_empty() {
        return Err(SqlTemplateError::NoConflictColumns);
    }
    check_identifier(table)?;
    for column in columns {
        check_identifier(column)?;
    }
    for conflict in conflict_columns {
        if !columns.contains(conflict) {
            return Err(SqlTemplateError::UnknownConflictColumn((*conflict).to_owned()));
        }
    }

    let placeholders = (1..=columns.len())
        .map(|n| format!("${n}"))
        .collect::<Vec<_>>()
        .join(", ");
    let updates = columns
        .iter()
        .filter(|column| !conflict_columns.contains(column))
        .map(|column| format!("{column} = EXCLUDED.{column}"))
        .collect::<Vec<_>>();
    let action = if updates.is_empty() {
        "DO NOTHING".to_owned()
    } else {
        format!("DO UPDATE SET {}", updates.join(", "))
    };

    Ok(format!(
        "INSERT INTO {table} ({}) VALUES ({placeholders}) ON CONFLICT ({}) {action}",
        columns.join(", "),
        conflict_columns.join(", "),
    ))
}
