//! Row-to-object field binding.

use rusqlite::types::{FromSql, Value, ValueRef};

/// Types that can be populated field-by-field from a database row.
///
/// Construction goes through `Default`, so a row never has to match a
/// constructor signature; columns are late-bound onto fields by exact name
/// after the instance exists. `bind_column` returns `true` when the column
/// matched a field.
///
/// `Database::fetch` drops unmatched columns silently and leaves fields with
/// no matching column at their default value; `Database::fetch_strict`
/// rejects unmatched columns instead.
///
/// ```rust,ignore
/// #[derive(Debug, Default)]
/// struct User {
///     id: i64,
///     name: String,
/// }
///
/// impl FromRow for User {
///     fn bind_column(&mut self, column: &str, value: &Value) -> bool {
///         match column {
///             "id" => bind_field(&mut self.id, value),
///             "name" => bind_field(&mut self.name, value),
///             _ => false,
///         }
///     }
/// }
/// ```
pub trait FromRow: Default {
    fn bind_column(&mut self, column: &str, value: &Value) -> bool;
}

/// Assign a driver value onto a field slot, converting through the driver's
/// own `FromSql` rules.
///
/// A value the field type cannot represent leaves the default in place; the
/// column still counts as matched. Always returns `true` so implementations
/// can use it directly as a match arm.
pub fn bind<T: FromSql>(slot: &mut T, value: &Value) -> bool {
    if let Ok(converted) = T::column_result(ValueRef::from(value)) {
        *slot = converted;
    }
    true
}
