#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! Quarry - a minimal synchronous data-access layer
//!
//! Quarry owns one shared SQLite connection per process, executes
//! parameterized SQL against it, maps result rows onto plain Rust types, and
//! reports every failure through a severity-routed multi-channel logger.
//! There is no pooling, no transactions, no query builder: SQL text in,
//! plain values out.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - **[`database`]**: connection lifecycle, statement execution, row mapping
//!   - `connection`: SQLite connection open/configuration
//!   - `bind`: positional/named statement parameters
//!   - `statement`: executed statement handles
//!   - `row`: row-to-object field binding
//!
//! - **[`logger`]**: multi-channel logging
//!   - `severity`: ordered DEBUG..EMERGENCY level set
//!   - `sink`: stderr, file, and mail channel sinks
//!
//! - **[`config`]**: configuration management
//!
//! # Quick Start Examples
//!
//! ## Shared process-wide database
//!
//! ```rust,ignore
//! use quarry::{BindValues, Database, Value};
//!
//! let db = Database::global();
//! db.execute(
//!     "UPDATE users SET name = ?1 WHERE id = ?2",
//!     BindValues::positional(vec![Value::Text("Bob".into()), Value::Integer(5)]),
//! )?;
//! ```
//!
//! Any failure on the shared instance is logged at CRITICAL and terminates
//! the process; the successful path returns plain values.
//!
//! ## Mapping rows onto types
//!
//! ```rust,ignore
//! use quarry::{bind_field, BindValues, Database, FromRow, Value};
//!
//! #[derive(Debug, Default)]
//! struct User {
//!     id: i64,
//!     name: String,
//! }
//!
//! impl FromRow for User {
//!     fn bind_column(&mut self, column: &str, value: &Value) -> bool {
//!         match column {
//!             "id" => bind_field(&mut self.id, value),
//!             "name" => bind_field(&mut self.name, value),
//!             _ => false,
//!         }
//!     }
//! }
//!
//! let users: Vec<User> = Database::global().fetch(
//!     "SELECT id, name FROM users WHERE id = ?1",
//!     BindValues::positional(vec![Value::Integer(5)]),
//! )?;
//! ```
//!
//! ## Isolated instances
//!
//! Embedders that want their own wiring (and tests) construct instances
//! directly and choose what a failure does:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use quarry::{Database, FailurePolicy, Logger, QuarryConfig};
//!
//! let config = QuarryConfig::new(&None)?;
//! let logger = Arc::new(Logger::with_config(&config)?);
//! let db = Database::open(&config.db_path, logger, FailurePolicy::Propagate)?;
//! ```

pub mod config;
pub mod database;
pub mod logger;

pub use config::QuarryConfig;

pub use database::{
    bind_field, BindValues, Database, FailurePolicy, FromRow, StatementHandle, Value,
};

pub use logger::{
    ChannelSink, FileSink, LogMessage, Logger, MailSink, MailTransport, SendmailTransport,
    Severity, StderrSink,
};
