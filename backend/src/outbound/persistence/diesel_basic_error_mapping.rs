//! Shared Diesel error mapping for the repositories.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map common Diesel error variants into query/connection constructors.
///
/// Repositories that care about constraint violations inspect the error
/// with [`constraint_violation`] first and fall back to this mapping.
pub fn map_basic_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => query("database error"),
        _ => query("database error"),
    }
}

/// Integrity constraint rejected by the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintViolation<'a> {
    /// Unique or primary key clash, with the constraint name when reported.
    Unique(Option<&'a str>),
    /// Foreign key target missing, with the constraint name when reported.
    ForeignKey(Option<&'a str>),
}

/// Classify `error` as a unique or foreign key violation.
pub fn constraint_violation(error: &DieselError) -> Option<ConstraintViolation<'_>> {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            Some(ConstraintViolation::Unique(info.constraint_name()))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            Some(ConstraintViolation::ForeignKey(info.constraint_name()))
        }
        _ => None,
    }
}

/// Escape the `ILIKE` wildcards in `value` so it matches literally.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// `ILIKE` pattern matching values that contain `needle`.
///
/// # Examples
///
/// ```rust,ignore
/// assert_eq!(contains_pattern("WS_1%"), "%WS\\_1\\%%");
/// ```
pub fn contains_pattern(needle: &str) -> String {
    format!("%{}%", escape_like(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, PartialEq, Eq)]
    enum ProbeError {
        Query(&'static str),
        Connection(String),
    }

    struct Info(Option<&'static str>);

    impl diesel::result::DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            "violation"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            self.0
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn database_error(kind: DatabaseErrorKind, constraint: Option<&'static str>) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(Info(constraint)))
    }

    #[rstest]
    fn closed_connections_map_to_connection_errors() {
        let mapped = map_basic_diesel_error(
            database_error(DatabaseErrorKind::ClosedConnection, None),
            ProbeError::Query,
            |message| ProbeError::Connection(message.to_owned()),
        );
        assert_eq!(mapped, ProbeError::Connection("database connection error".into()));
    }

    #[rstest]
    fn not_found_maps_to_query_errors() {
        let mapped = map_basic_diesel_error(
            DieselError::NotFound,
            ProbeError::Query,
            |message| ProbeError::Connection(message.to_owned()),
        );
        assert_eq!(mapped, ProbeError::Query("record not found"));
    }

    #[rstest]
    fn pool_errors_keep_their_message() {
        let mapped = map_basic_pool_error(PoolError::checkout("timed out"), ProbeError::Connection);
        assert_eq!(mapped, ProbeError::Connection("timed out".into()));
    }

    #[rstest]
    #[case(
        DatabaseErrorKind::UniqueViolation,
        Some(ConstraintViolation::Unique(Some("users_email_key")))
    )]
    #[case(
        DatabaseErrorKind::ForeignKeyViolation,
        Some(ConstraintViolation::ForeignKey(Some("users_email_key")))
    )]
    #[case(DatabaseErrorKind::CheckViolation, None)]
    fn constraint_violations_are_classified(
        #[case] kind: DatabaseErrorKind,
        #[case] expected: Option<ConstraintViolation<'static>>,
    ) {
        let error = database_error(kind, Some("users_email_key"));
        assert_eq!(constraint_violation(&error), expected);
    }

    #[rstest]
    #[case("WS-2024", "%WS-2024%")]
    #[case("50%_off", "%50\\%\\_off%")]
    #[case("a\\b", "%a\\\\b%")]
    fn contains_patterns_escape_wildcards(#[case] needle: &str, #[case] expected: &str) {
        assert_eq!(contains_pattern(needle), expected);
    }
}
