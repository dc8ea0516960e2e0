//! # sql_dump
//!
//! Portable SQL text dumps of a live database, with safe dump file handling.
//!
//! ## Features
//!
//! - **Time based names**: `backup-20060102150405` becomes `backup-20240305101530.sql`
//! - **No overwrite**: a dump never replaces an existing file
//! - **Explicit lifecycle**: a [`Session`](dump::session::Session) owns the connection
//!   and the output sink and releases both on close
//! - **Any sink**: dump into a new file or into any caller supplied writer
//!
//! ## Quick Start
//!
//! ```no_run
//! use rusqlite::Connection;
//! use sql_dump::dump::session::Session;
//! use sql_dump::dump::writer::sqlite::SqliteDumpWriter;
//!
//! let connection = Connection::open("app.db")?;
//! let mut session = Session::file_backed(
//!     connection,
//!     SqliteDumpWriter::default(),
//!     "/var/backups",
//!     "app-20060102150405",
//! )?;
//! session.dump()?;
//! session.close()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod dump;
