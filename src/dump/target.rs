//! Resolution of the file a dump is written to.

use crate::dump::naming::resolve_name;
use crate::dump::result_error::error::Error;
use crate::dump::result_error::result::Result;
use crate::dump::validate::validate_dir_exist;
use chrono::{DateTime, Local, TimeZone};
use getset::Getters;
use std::fmt::Display;
use std::fs::File;
use std::io::ErrorKind;
use std::path::{is_separator, Component, Path, PathBuf};
use tracing::debug;

pub static DUMP_FILE_EXT: &str = "sql";

/// A freshly created, empty dump file.
#[derive(Debug, Getters)]
#[getset(get = "pub")]
pub struct ResolvedTarget {
    path: PathBuf,
    file: File,
}

impl ResolvedTarget {
    pub fn into_parts(self) -> (PathBuf, File) {
        (self.path, self.file)
    }
}

/// Computes `<dir>/<name>.sql`.
///
/// The rendered file name must be a single plain path component, so the
/// target always lives directly inside `dir`.
pub fn target_path<P, Tz>(dir: P, format: &str, now: &DateTime<Tz>) -> Result<PathBuf>
where
    P: AsRef<Path>,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let file_name = format!("{}.{}", resolve_name(format, now), DUMP_FILE_EXT);
    let mut components = Path::new(&file_name).components();
    let single_component = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single_component || file_name.contains(is_separator) {
        return Err(std::io::Error::new(
            ErrorKind::InvalidInput,
            format!("Dump file name {file_name:?} must not contain a path"),
        )
        .into());
    }
    Ok(dir.as_ref().join(file_name))
}

pub fn resolve_target<P: AsRef<Path>>(dir: P, format: &str) -> Result<ResolvedTarget> {
    resolve_target_at(dir, format, &Local::now())
}

/// Creates `<dir>/<name>.sql`, where the name comes from `format` rendered at `now`.
///
/// Fails with [`Error::InvalidDirectory`] before touching the filesystem when
/// `dir` is not an existing directory, and with [`Error::TargetAlreadyExists`]
/// when anything already lives at the computed path. An existing file is never
/// truncated.
pub fn resolve_target_at<P, Tz>(dir: P, format: &str, now: &DateTime<Tz>) -> Result<ResolvedTarget>
where
    P: AsRef<Path>,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let dir = dir.as_ref();
    validate_dir_exist(dir)
        .map_err(|e| Error::invalid_directory(dir, e.to_string()))?;

    let path = target_path(dir, format, now)?;
    // symlink_metadata so a dangling link still counts as taken
    if path.symlink_metadata().is_ok() {
        return Err(Error::TargetAlreadyExists { path });
    }

    let file = File::create_new(&path).map_err(|e| match e.kind() {
        ErrorKind::AlreadyExists => Error::TargetAlreadyExists { path: path.clone() },
        _ => Error::from(e),
    })?;
    debug!("Created dump target {:?}", &path);

    Ok(ResolvedTarget { path, file })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    fn example_now() -> DateTime<chrono::Utc> {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(10, 15, 30)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn test_missing_dir_is_invalid() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing");

        for format in ["backup", "backup-20060102150405", ""] {
            let err = resolve_target(&missing, format).unwrap_err();
            assert!(matches!(err, Error::InvalidDirectory { .. }), "{err}");
        }
        assert!(!missing.exists());
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_file_as_dir_is_invalid() {
        let tmp = tempfile::tempdir().unwrap();
        let not_dir = tmp.path().join("plain");
        std::fs::write(&not_dir, b"x").unwrap();

        let err = resolve_target(&not_dir, "backup").unwrap_err();
        assert!(matches!(err, Error::InvalidDirectory { .. }));
    }

    #[test]
    fn test_creates_empty_file() {
        let tmp = tempfile::tempdir().unwrap();
        let target = resolve_target_at(tmp.path(), "backup-20060102150405", &example_now()).unwrap();

        assert_eq!(target.path(), &tmp.path().join("backup-20240305101530.sql"));
        assert_eq!(std::fs::metadata(target.path()).unwrap().len(), 0);
    }

    #[test]
    fn test_created_file_is_writable() {
        let tmp = tempfile::tempdir().unwrap();
        let (path, mut file) = resolve_target(tmp.path(), "literal").unwrap().into_parts();
        file.write_all(b"SELECT 1;\n").unwrap();
        drop(file);

        assert_eq!(path, tmp.path().join("literal.sql"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "SELECT 1;\n");
    }

    #[test]
    fn test_same_second_collides() {
        let tmp = tempfile::tempdir().unwrap();
        let now = example_now();
        resolve_target_at(tmp.path(), "backup-20060102150405", &now).unwrap();

        let err = resolve_target_at(tmp.path(), "backup-20060102150405", &now).unwrap_err();
        match err {
            Error::TargetAlreadyExists { path } => {
                assert_eq!(path, tmp.path().join("backup-20240305101530.sql"))
            }
            e => panic!("Expected TargetAlreadyExists, got {e}"),
        }
    }

    #[test]
    fn test_existing_file_untouched() {
        let tmp = tempfile::tempdir().unwrap();
        let existing = tmp.path().join("nightly.sql");
        std::fs::write(&existing, b"-- previous dump\n").unwrap();

        let err = resolve_target(tmp.path(), "nightly").unwrap_err();
        assert!(matches!(err, Error::TargetAlreadyExists { .. }));
        assert_eq!(std::fs::read(&existing).unwrap(), b"-- previous dump\n");
    }

    #[test]
    fn test_existing_dir_at_path_collides() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("taken.sql")).unwrap();

        let err = resolve_target(tmp.path(), "taken").unwrap_err();
        assert!(matches!(err, Error::TargetAlreadyExists { .. }));
    }

    #[test]
    fn test_name_cannot_leave_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("dumps");
        std::fs::create_dir(&dir).unwrap();
        let outside = tmp.path().join("outside");

        for format in [
            outside.to_str().unwrap(),
            "../outside",
            "nested/dump",
            "./dump",
            "/",
        ] {
            match resolve_target(&dir, format).unwrap_err() {
                Error::Io(e) => assert_eq!(e.kind(), ErrorKind::InvalidInput, "{format}"),
                e => panic!("Expected Io error for {format:?}, got {e}"),
            }
        }
        assert!(!tmp.path().join("outside.sql").exists());
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_dots_inside_name_allowed() {
        let tmp = tempfile::tempdir().unwrap();
        let target = resolve_target(tmp.path(), "app..v2").unwrap();
        assert_eq!(target.path(), &tmp.path().join("app..v2.sql"));
        assert!(target.path().starts_with(tmp.path()));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_collides() {
        let tmp = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(tmp.path().join("nowhere"), tmp.path().join("link.sql")).unwrap();

        let err = resolve_target(tmp.path(), "link").unwrap_err();
        assert!(matches!(err, Error::TargetAlreadyExists { .. }));
        assert!(!tmp.path().join("nowhere").exists());
    }
}
