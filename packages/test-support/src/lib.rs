//! Test support utilities shared by the workspace test suites.
//!
//! Unique names come from ULIDs so parallel tests never collide on table
//! prefixes or database file names.

pub mod logging;

use ulid::Ulid;

/// Generate a unique string in the format `{prefix}-{ulid}`.
///
/// ```
/// use test_support::unique_str;
///
/// let id1 = unique_str("user");
/// let id2 = unique_str("user");
/// assert_ne!(id1, id2);
/// assert!(id1.starts_with("user-"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}

/// Generate a unique, SQL-identifier-safe table prefix such as `t01hx..._`.
///
/// ```
/// use test_support::unique_table_prefix;
///
/// let p = unique_table_prefix();
/// assert!(p.ends_with('_'));
/// assert!(p.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
/// ```
pub fn unique_table_prefix() -> String {
    format!("t{}_", Ulid::new().to_string().to_ascii_lowercase())
}

/// Generate a unique SQLite file name (`{prefix}-{ulid}.db`).
pub fn unique_db_file(prefix: &str) -> String {
    format!("{}.db", unique_str(prefix))
}
