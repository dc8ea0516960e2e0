//! Validation functions for configuration values.
//!
//! Provides custom validation functions for dump directories, dump name
//! formats and source database files.

use rusqlite::{Connection, OpenFlags};
use sanitize_filename::{is_sanitized, sanitize};
use validator::ValidationError;

use std::path::Path;
use std::result;

pub fn validate_dump_format<S: AsRef<str>>(format: S) -> Result<(), ValidationError> {
    let format = format.as_ref();
    if format.is_empty() {
        return Err(ValidationError::new("InvalidDumpFormat")
            .with_message("Dump format must not be empty".into()));
    }
    if !is_sanitized(format) {
        return Err(ValidationError::new("InvalidDumpFormat").with_message(
            format!(
                "Invalid file name, try sanitizing like {:?}",
                sanitize(format)
            )
            .into(),
        ));
    }

    Ok(())
}

pub fn validate_dir_exist<P: AsRef<Path>>(dir: P) -> Result<(), ValidationError> {
    let dir = dir.as_ref();
    match std::fs::metadata(dir) {
        Ok(md) if md.is_dir() => Ok(()),
        Ok(_) => Err(ValidationError::new("InvalidDirectory")
            .with_message(format!("{:?} is not a directory", dir).into())),
        Err(e) => Err(ValidationError::new("InvalidDirectory")
            .with_message(format!("{:?} not found: {}", dir, e).into())),
    }
}

pub fn validate_sql_file<P: AsRef<Path>>(path: P) -> result::Result<(), ValidationError> {
    let path = path.as_ref();
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map(|_| ())
    .map_err(|e| {
        ValidationError::new("InvalidSqlFile")
            .with_message(format!("cannot open sql file {:?}: {}", path, e).into())
    })
}
