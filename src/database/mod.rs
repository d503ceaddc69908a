//! Database module
//!
//! One shared connection, parameterized statement execution, and
//! row-to-object mapping behind a single handle:
//!
//! ```text
//! database/
//! ├── connection  # SQLite connection open/configuration
//! ├── bind        # positional/named statement parameters
//! ├── statement   # executed statement handles
//! └── row         # row-to-object field binding
//! ```
//!
//! Every failure on this path — connection construction, statement
//! preparation, execution, row mapping — is logged at CRITICAL with its
//! cause before the [`FailurePolicy`] decides what happens next. There is no
//! silent failure mode.

mod bind;
mod connection;
mod row;
mod statement;

pub use bind::BindValues;
pub use row::{bind as bind_field, FromRow};
pub use statement::StatementHandle;

/// Scalar column and parameter value, re-exported from the driver.
pub use rusqlite::types::Value;

use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use anyhow::{anyhow, Error, Result};
use rusqlite::Connection;
use serde_json::json;
use tracing::info;

use crate::config::QuarryConfig;
use crate::logger::Logger;

static DATABASE: OnceLock<Database> = OnceLock::new();

/// What happens after a failure has been logged at CRITICAL.
///
/// The policy is a single injection point: every failure in the database
/// path funnels through it, so the terminate-vs-propagate choice is made
/// once per instance, never per call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Terminate the process. The policy of the process-wide instance.
    #[default]
    Exit,
    /// Return the error to the caller.
    Propagate,
}

/// The single shared database.
///
/// Owns exactly one live connection for the life of the instance. Statement
/// execution is serialized on an internal mutex, so two concurrent
/// executions never interleave on the underlying handle. The connection is
/// never explicitly closed; it is released when the process exits.
pub struct Database {
    conn: Mutex<Connection>,
    logger: Arc<Logger>,
    policy: FailurePolicy,
}

impl Database {
    /// Open the database at `path`.
    ///
    /// Construction failure is logged at CRITICAL with the underlying cause
    /// before the failure policy applies.
    pub fn open(path: &str, logger: Arc<Logger>, policy: FailurePolicy) -> Result<Database> {
        Self::build(Some(path), logger, policy)
    }

    /// Open an in-memory database. Mainly for tests and ephemeral work.
    pub fn open_in_memory(logger: Arc<Logger>, policy: FailurePolicy) -> Result<Database> {
        Self::build(None, logger, policy)
    }

    fn build(path: Option<&str>, logger: Arc<Logger>, policy: FailurePolicy) -> Result<Database> {
        match connection::open(path) {
            Ok(conn) => Ok(Database {
                conn: Mutex::new(conn),
                logger,
                policy,
            }),
            Err(e) => Err(fail(
                &logger,
                policy,
                "could not create database connection",
                e,
            )),
        }
    }

    /// Process-wide shared database, created lazily from the default
    /// configuration on first use. Concurrent first access constructs the
    /// instance exactly once.
    ///
    /// Construction failure here follows the fatal policy: a CRITICAL record
    /// with the cause, then process termination.
    pub fn global() -> &'static Database {
        DATABASE.get_or_init(|| {
            let logger = Logger::global();
            let config = QuarryConfig::new(&None).unwrap_or_else(|e| {
                logger.critical(
                    "could not load database configuration",
                    json!({ "cause": e.to_string() }),
                );
                std::process::exit(1);
            });
            match Database::open(&config.db_path, logger, FailurePolicy::Exit) {
                Ok(db) => {
                    info!(path = config.db_path.as_str(), "opened process-wide database");
                    db
                }
                // the Exit policy terminates inside `open`; this arm cannot run
                Err(_) => std::process::exit(1),
            }
        })
    }

    // =========================================================================
    // Statement execution
    // =========================================================================

    /// Execute `sql` with `values` bound, returning the boolean execution
    /// outcome.
    pub fn execute(&self, sql: &str, values: BindValues) -> Result<bool> {
        match self.run(sql, &values) {
            Ok(_) => Ok(true),
            Err(e) => self.failed("could not execute query", e),
        }
    }

    /// Execute `sql` and return the executed-statement handle for further
    /// inspection.
    pub fn query(&self, sql: &str, values: BindValues) -> Result<StatementHandle> {
        match self.run(sql, &values) {
            Ok(handle) => Ok(handle),
            Err(e) => self.failed("could not execute query", e),
        }
    }

    /// Number of rows `sql` yields, or affects for statements without a
    /// result set.
    pub fn row_count(&self, sql: &str, values: BindValues) -> Result<usize> {
        Ok(self.query(sql, values)?.row_count())
    }

    /// Rowid generated by the most recent successful insert on this
    /// connection.
    ///
    /// Only meaningful immediately after that insert; the value after any
    /// unrelated statement, or with no prior insert on the connection, is
    /// unspecified.
    pub fn last_insert_id(&self) -> i64 {
        self.lock().last_insert_rowid()
    }

    // =========================================================================
    // Row mapping
    // =========================================================================

    /// Map every row of `sql` onto `T`.
    ///
    /// A zero-row result returns an empty vec before any instance is
    /// constructed. Result columns `T` has no field for are dropped
    /// silently; fields that no column names keep their default value.
    pub fn fetch<T: FromRow>(&self, sql: &str, values: BindValues) -> Result<Vec<T>> {
        self.fetch_rows(sql, values, false)
    }

    /// Map rows onto `T`, rejecting any result column `T` has no field for.
    pub fn fetch_strict<T: FromRow>(&self, sql: &str, values: BindValues) -> Result<Vec<T>> {
        self.fetch_rows(sql, values, true)
    }

    fn fetch_rows<T: FromRow>(
        &self,
        sql: &str,
        values: BindValues,
        strict: bool,
    ) -> Result<Vec<T>> {
        let handle = self.query(sql, values)?;
        if handle.row_count() == 0 {
            return Ok(Vec::new());
        }

        let mut out = Vec::with_capacity(handle.rows().len());
        for row in handle.rows() {
            let mut instance = T::default();
            for (column, value) in handle.columns().iter().zip(row) {
                let matched = instance.bind_column(column, value);
                if strict && !matched {
                    return self.failed(
                        "could not map result row",
                        anyhow!("No field matches result column '{}'", column),
                    );
                }
            }
            out.push(instance);
        }
        Ok(out)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn run(&self, sql: &str, values: &BindValues) -> Result<StatementHandle> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| anyhow!("Failed to prepare statement: {}", e))?;
        StatementHandle::run(&mut stmt, values)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // a poisoned lock means another execution panicked mid-statement;
        // the connection itself is still usable
        match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn failed<T>(&self, what: &str, cause: Error) -> Result<T> {
        Err(fail(&self.logger, self.policy, what, cause))
    }
}

/// Log a failure at CRITICAL with its cause, then apply the policy.
fn fail(logger: &Logger, policy: FailurePolicy, what: &str, cause: Error) -> Error {
    logger.critical(what, json!({ "cause": cause.to_string() }));
    match policy {
        FailurePolicy::Exit => std::process::exit(1),
        FailurePolicy::Propagate => cause,
    }
}
