//! # MySQL Database Adapter
//!
//! An implementation of the [`Db`] port using the [`mysql`] driver crate.
//!
//! ## Responsibilities
//! - Convert generic [`Param`] values into [`mysql::Value`]
//! - Convert [`mysql::Row`] into a generic [`Row`]
//! - Implement `fetch_one`, `fetch_all` and `exec` using `mysql::Pool`
//!
//! SQL text and parameter counts are logged at `debug`; driver failures at
//! `warn`. Parameter values are never logged since they carry addresses.
//!
//! ## Testing Policy
//! Unit tests cover the pure conversion functions only. Query execution
//! needs a live server.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use mysql::{Error as MyError, Params, Value as My, prelude::*};
use tracing::{debug, warn};

use crate::config::db::DbPool;
use crate::db::port::{Db, Param, Row as GRow, Value};

/// Character set id MySQL reports for `BINARY`/`VARBINARY`/`BLOB` columns.
const BINARY_CHARSET: u16 = 63;

fn mysql_err_summary(e: &MyError) -> String {
    match e {
        MyError::MySqlError(me) => format!(
            "code={}, state={}, message={}",
            me.code, me.state, me.message
        ),
        MyError::DriverError(de) => format!("driver={de:?}"),
        MyError::UrlError(ue) => format!("url={ue:?}"),
        MyError::IoError(ioe) => format!("io={ioe}"),
        MyError::CodecError(ce) => format!("codec={ce:?}"),
        MyError::FromValueError(fve) => format!("from_value={fve:?}"),
        MyError::FromRowError(fre) => format!("from_row={fre:?}"),
        #[allow(unreachable_patterns)]
        other => other.to_string(),
    }
}

/// MySQL implementation of the [`Db`] port.
///
/// - Wraps a connection pool (`mysql::Pool`) for query execution.
/// - Propagates errors as [`anyhow::Error`].
#[derive(Clone)]
pub struct MySqlDb {
    pool: DbPool,
}

impl MySqlDb {
    /// Creates a new adapter instance using the provided connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Converts a single [`Param`] into a [`mysql::Value`].
    ///
    /// Mapping conventions:
    /// - `Bool(true)` → `Int(1)` / `Bool(false)` → `Int(0)`
    /// - `Str` and `Bin` → `Bytes`
    /// - `DateTime` → `Value::Date` (Y, M, D, H, M, S, μs)
    /// - `Null` → `NULL`
    fn to_mysql_value(p: &Param) -> My {
        match p {
            Param::U64(x) => My::UInt(*x),
            Param::Bool(b) => My::Int(i64::from(*b)),
            Param::Str(s) => My::Bytes(s.as_bytes().to_vec()),
            Param::DateTime(dt) => {
                let d = dt.date();
                let t = dt.time();
                My::Date(
                    d.year() as u16,
                    d.month() as u8,
                    d.day() as u8,
                    t.hour() as u8,
                    t.minute() as u8,
                    t.second() as u8,
                    t.nanosecond() / 1_000,
                )
            }
            Param::Bin(b) => My::Bytes(b.to_vec()),
            Param::Null => My::NULL,
        }
    }

    /// Converts a slice of [`Param`] into a positional [`Params`].
    fn to_mysql_params(params_in: &[Param]) -> Params {
        if params_in.is_empty() {
            return Params::Empty;
        }
        Params::Positional(params_in.iter().map(Self::to_mysql_value).collect())
    }

    /// Converts a driver value into a generic [`Value`].
    ///
    /// `binary` marks columns with the binary character set, whose bytes are
    /// kept as-is instead of being decoded as text. Floats and `TIME`
    /// values are stringified.
    fn value_from_mysql(v: My, binary: bool) -> Value {
        match v {
            My::NULL => Value::Null,
            My::Int(i) => Value::I64(i),
            My::UInt(u) => Value::U64(u),
            My::Float(f) => Value::Str(f.to_string()),
            My::Double(f) => Value::Str(f.to_string()),
            My::Bytes(b) if binary => Value::Bin(b),
            My::Bytes(b) => match String::from_utf8(b) {
                Ok(s) => Value::Str(s),
                Err(e) => Value::Bin(e.into_bytes()),
            },
            My::Date(y, m, d, hh, mm, ss, micro) => {
                let date = NaiveDate::from_ymd_opt(y.into(), m.into(), d.into())
                    .unwrap_or_default();
                let time = NaiveTime::from_hms_micro_opt(hh.into(), mm.into(), ss.into(), micro)
                    .unwrap_or_default();
                Value::DateTime(NaiveDateTime::new(date, time))
            }
            My::Time(neg, days, hh, mm, ss, micro) => {
                let sign = if neg { "-" } else { "" };
                Value::Str(format!("{sign}{days:03} {hh:02}:{mm:02}:{ss:02}.{micro:06}"))
            }
        }
    }

    /// Converts a [`mysql::Row`] into a generic [`Row`].
    fn row_from_mysql(mut r: mysql::Row) -> GRow {
        // copy column metadata first; `take_opt` borrows the row mutably
        let columns: Vec<(String, bool)> = r
            .columns_ref()
            .iter()
            .map(|c| (c.name_str().to_string(), c.character_set() == BINARY_CHARSET))
            .collect();

        let mut out = GRow::default();
        for (idx, (name, binary)) in columns.into_iter().enumerate() {
            let v = r
                .take_opt::<My, _>(idx)
                .unwrap_or(Ok(My::NULL))
                .unwrap_or(My::NULL);
            out.insert(name, Self::value_from_mysql(v, binary));
        }
        out
    }

    fn conn(&self) -> Result<mysql::PooledConn> {
        self.pool.get_conn().context("get_conn failed")
    }
}

fn log_failure<T>(op: &str, sql: &str, res: &std::result::Result<T, MyError>) {
    if let Err(e) = res {
        warn!("{op} failed: {} (sql: {sql})", mysql_err_summary(e));
    }
}

impl Db for MySqlDb {
    fn fetch_one<'p>(&self, sql: &str, params_in: &[Param<'p>]) -> Result<Option<GRow>> {
        debug!("fetch_one: {sql} ({} params)", params_in.len());
        let mut conn = self.conn()?;

        let res: std::result::Result<Option<mysql::Row>, MyError> =
            conn.exec_first(sql, Self::to_mysql_params(params_in));
        log_failure("exec_first", sql, &res);
        let row_opt = res.context("exec_first failed")?;
        debug!("fetch_one: row_present={}", row_opt.is_some());

        Ok(row_opt.map(Self::row_from_mysql))
    }

    fn fetch_all<'p>(&self, sql: &str, params_in: &[Param<'p>]) -> Result<Vec<GRow>> {
        debug!("fetch_all: {sql} ({} params)", params_in.len());
        let mut conn = self.conn()?;

        let res: std::result::Result<Vec<mysql::Row>, MyError> =
            conn.exec(sql, Self::to_mysql_params(params_in));
        log_failure("exec (fetch_all)", sql, &res);
        let rows = res.context("exec (fetch_all) failed")?;
        debug!("fetch_all: rows={}", rows.len());

        Ok(rows.into_iter().map(Self::row_from_mysql).collect())
    }

    fn exec<'p>(&self, sql: &str, params_in: &[Param<'p>]) -> Result<u64> {
        debug!("exec: {sql} ({} params)", params_in.len());
        let mut conn = self.conn()?;

        let res: std::result::Result<(), MyError> =
            conn.exec_drop(sql, Self::to_mysql_params(params_in));
        log_failure("exec_drop", sql, &res);
        res.context("exec_drop failed")?;

        let n = conn.affected_rows();
        debug!("affected_rows = {n}");
        Ok(n)
    }
}
