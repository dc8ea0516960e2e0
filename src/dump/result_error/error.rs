use crate::dump::result_error::{WithDebugObjectAndFnName, WithMsg};
use std::fmt::Debug;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Rusqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    ValidationError(#[from] validator::ValidationErrors),
    #[error(transparent)]
    SerdeYml(#[from] serde_yml::Error),
    #[error("Invalid directory {dir:?}: {reason}")]
    InvalidDirectory { dir: PathBuf, reason: String },
    #[error("Dump {path:?} already exists")]
    TargetAlreadyExists { path: PathBuf },
    /// Error produced by a [`DumpWriter`](crate::dump::writer::DumpWriter), kept as is.
    #[error(transparent)]
    DumpFailed(Box<Error>),
    #[error("Dump session is already closed")]
    SessionClosed,
    #[error("{}:\n{}", msg, indent::indent_all_with("  ", error.to_string()))]
    WithMsg { msg: String, error: Box<Error> },
    #[error("{:?} {} failed:\n{}", obj_debug, fn_name, indent::indent_all_with("  ", error.to_string()))]
    WithDebugObjAndFnName {
        error: Box<Error>,
        obj_debug: Box<dyn Debug + Send>,
        fn_name: String,
    },
}

impl<S: Into<String>, O: Debug + Send + 'static> WithDebugObjectAndFnName<S, O> for Error {
    fn with_debug_object_and_fn_name(self, obj: O, fn_name: S) -> Self {
        Error::WithDebugObjAndFnName {
            error: Box::new(self),
            obj_debug: Box::new(obj),
            fn_name: fn_name.into(),
        }
    }
}

impl<S: Into<String>> WithMsg<S> for Error {
    fn with_msg(self, msg: S) -> Self {
        Self::WithMsg {
            msg: msg.into(),
            error: Box::new(self),
        }
    }
}

impl Error {
    pub(crate) fn invalid_directory<P: Into<PathBuf>, S: Into<String>>(dir: P, reason: S) -> Self {
        Error::InvalidDirectory {
            dir: dir.into(),
            reason: reason.into(),
        }
    }

    /// Looks through context wrappers for the error that caused this one.
    pub fn root(&self) -> &Error {
        match self {
            Error::WithMsg { error, .. } | Error::WithDebugObjAndFnName { error, .. } => {
                error.root()
            }
            e => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::from(io_error);

        match error {
            Error::Io(_) => (),
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_error_with_msg() {
        let error = Error::SessionClosed.with_msg("Custom message");

        match error {
            Error::WithMsg { msg, .. } => assert_eq!(msg, "Custom message"),
            _ => panic!("Expected WithMsg error"),
        }
    }

    #[test]
    fn test_error_with_debug_object_and_fn_name_display() {
        let error = Error::TargetAlreadyExists {
            path: "dumps/a.sql".into(),
        }
        .with_debug_object_and_fn_name(42, "resolve_target");
        let error_str = error.to_string();

        assert!(error_str.contains("resolve_target"));
        assert!(error_str.contains("failed"));
        assert!(error_str.contains("a.sql"));
    }

    #[test]
    fn test_root_unwraps_context() {
        let error = Error::invalid_directory("/nope", "not found")
            .with_msg("outer")
            .with_debug_object_and_fn_name("obj", "fn");
        assert!(matches!(error.root(), Error::InvalidDirectory { .. }));
    }

    #[test]
    fn test_dump_failed_is_transparent() {
        let inner = Error::Io(std::io::Error::other("disk full"));
        let error = Error::DumpFailed(Box::new(inner));
        assert_eq!(error.to_string(), "disk full");
    }
}
