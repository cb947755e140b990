//! # Database Port (Synchronous)
//!
//! Defines an abstract database interface (`Db`) and supporting types
//! used by adapters such as the MySQL implementation.
//!
//! - [`Param`]: Represents SQL parameters.
//! - [`Value`] / [`Row`]: Generic owned data representations.
//! - [`Db`]: Defines minimal operations (`fetch_one`, `fetch_all`, `exec`).
//!
//! # Example
//! ```rust,ignore
//! use wzs_mailer::db::port::{Db, Param};
//! use wzs_mailer::params;
//!
//! let ps = params![&id, "Welcome", true, None::<&str>]; // last is NULL
//! db.exec("UPDATE emails SET subject = ?, use_template = ?, body = ? WHERE id = ?", &ps)?;
//! ```
use std::collections::HashMap;

use anyhow::{Result, bail};
use chrono::NaiveDateTime;
use uuid::Uuid;

/// SQL parameter types passed to a query.
///
/// - `Str(&str)` holds a borrowed string reference.
/// - `Null` represents an SQL NULL.
/// - `DateTime` uses [`NaiveDateTime`] (no time zone).
#[derive(Debug)]
pub enum Param<'a> {
    U64(u64),
    Bool(bool),
    Str(&'a str),
    DateTime(NaiveDateTime),
    Bin(&'a [u8]),
    Null,
}

/// Generic owned database value used for row mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    I64(i64),
    U64(u64),
    Bool(bool),
    Str(String),
    DateTime(NaiveDateTime),
    Bin(Vec<u8>),
    Null,
}

/// Represents a single database row (column name → value map).
#[derive(Debug, Clone, Default)]
pub struct Row {
    cols: HashMap<String, Value>,
}

// ------------------------------
// Param conversions (From impls)
// ------------------------------

impl<'a> From<u64> for Param<'a> {
    fn from(x: u64) -> Self {
        Param::U64(x)
    }
}

impl<'a> From<bool> for Param<'a> {
    fn from(x: bool) -> Self {
        Param::Bool(x)
    }
}

impl<'a> From<&'a str> for Param<'a> {
    fn from(x: &'a str) -> Self {
        Param::Str(x)
    }
}

impl<'a> From<&'a String> for Param<'a> {
    fn from(x: &'a String) -> Self {
        Param::Str(x.as_str())
    }
}

impl<'a> From<Option<&'a str>> for Param<'a> {
    fn from(x: Option<&'a str>) -> Self {
        x.map_or(Param::Null, Param::Str)
    }
}

impl<'a> From<NaiveDateTime> for Param<'a> {
    fn from(x: NaiveDateTime) -> Self {
        Param::DateTime(x)
    }
}

impl<'a> From<Option<NaiveDateTime>> for Param<'a> {
    fn from(x: Option<NaiveDateTime>) -> Self {
        x.map_or(Param::Null, Param::DateTime)
    }
}

impl<'a> From<&'a [u8]> for Param<'a> {
    fn from(x: &'a [u8]) -> Self {
        Param::Bin(x)
    }
}

/// UUIDs are bound as `BINARY(16)`.
impl<'a> From<&'a Uuid> for Param<'a> {
    fn from(u: &'a Uuid) -> Self {
        Param::Bin(u.as_bytes())
    }
}

// ------------------------------------
// params! macro
// ------------------------------------

/// Builds a `Vec<Param>` for SQL queries.
///
/// # Example
/// ```rust
/// use wzs_mailer::db::port::Param;
/// use wzs_mailer::params;
///
/// let subject = "Alice";
/// let note: Option<&str> = None; // becomes NULL
///
/// let ps = params![7u64, subject, true, note];
/// assert!(matches!(ps[0], Param::U64(7)));
/// assert!(matches!(ps[1], Param::Str("Alice")));
/// assert!(matches!(ps[2], Param::Bool(true)));
/// assert!(matches!(ps[3], Param::Null));
/// ```
#[macro_export]
macro_rules! params {
    ($($x:expr),* $(,)?) => {{
        let mut v = Vec::<$crate::db::port::Param>::new();
        $( v.push($crate::db::port::Param::from($x)); )*
        v
    }};
}

// ------------------------------
// Row helper methods
// ------------------------------

impl Row {
    /// Inserts a new column (used internally by DB adapters).
    pub fn insert(&mut self, key: impl Into<String>, val: Value) {
        self.cols.insert(key.into(), val);
    }

    /// Returns a `bool`.
    ///
    /// Accepts:
    /// - `Bool` directly
    /// - Numeric values (`I64`, `U64`) where non-zero = `true`
    /// - Strings `"0"` or `"1"`
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        match self.cols.get(key) {
            Some(Value::Bool(v)) => Ok(*v),
            Some(Value::I64(v)) => Ok(*v != 0),
            Some(Value::U64(v)) => Ok(*v != 0),
            Some(Value::Str(s)) if s == "0" || s == "1" => Ok(s != "0"),
            _ => bail!("column `{key}` is not Bool"),
        }
    }

    /// Returns a `String` (only for `Value::Str`).
    pub fn get_string(&self, key: &str) -> Result<String> {
        match self.cols.get(key) {
            Some(Value::Str(s)) => Ok(s.clone()),
            _ => bail!("column `{key}` is not String"),
        }
    }

    /// Returns an optional `String` (`NULL` → `None`).
    pub fn get_string_opt(&self, key: &str) -> Result<Option<String>> {
        match self.cols.get(key) {
            Some(Value::Str(s)) => Ok(Some(s.clone())),
            Some(Value::Null) => Ok(None),
            Some(_) => bail!("column `{key}` is not String/NULL"),
            None => bail!("column `{key}` not found"),
        }
    }

    /// Returns the raw bytes of a binary column.
    ///
    /// A `Str` value is accepted too, since drivers may hand back
    /// valid-UTF-8 binary data as text.
    pub fn get_bin(&self, key: &str) -> Result<Vec<u8>> {
        match self.cols.get(key) {
            Some(Value::Bin(b)) => Ok(b.clone()),
            Some(Value::Str(s)) => Ok(s.as_bytes().to_vec()),
            _ => bail!("column `{key}` is not Bin"),
        }
    }

    /// Returns a [`Uuid`] from a BINARY(16) column.
    pub fn get_uuid(&self, key: &str) -> Result<Uuid> {
        let b = self.get_bin(key)?;
        Uuid::from_slice(&b).map_err(|_| anyhow::anyhow!("column `{key}` is not valid UUID bytes"))
    }

    /// Returns an optional [`NaiveDateTime`] (`NULL` → `None`).
    pub fn get_datetime_opt(&self, key: &str) -> Result<Option<NaiveDateTime>> {
        match self.cols.get(key) {
            Some(Value::DateTime(dt)) => Ok(Some(*dt)),
            Some(Value::Null) => Ok(None),
            Some(_) => bail!("column `{key}` is not DateTime/NULL"),
            None => bail!("column `{key}` not found"),
        }
    }
}

/// Database abstraction (synchronous).
#[cfg_attr(test, mockall::automock)]
pub trait Db: Send + Sync + 'static {
    fn fetch_one<'p>(&self, sql: &str, params: &[Param<'p>]) -> Result<Option<Row>>;

    fn fetch_all<'p>(&self, sql: &str, params: &[Param<'p>]) -> Result<Vec<Row>>;

    /// Execute a write operation (`INSERT`, `UPDATE`, `DELETE`).
    ///
    /// Returns affected row count.
    fn exec<'p>(&self, sql: &str, params: &[Param<'p>]) -> Result<u64>;
}
