use crate::dump::function_path;
use crate::dump::result_error::result::Result;
use crate::dump::result_error::{WithDebugObjectAndFnName, WithMsg};
use crate::dump::session::{dump_to_stream, Session};
use crate::dump::validate::{validate_dir_exist, validate_dump_format, validate_sql_file};
use crate::dump::writer::sqlite::SqliteDumpWriter;
use bon::Builder;
use function_name::named;
use getset::{CopyGetters, Getters};
use rusqlite::{Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use validator::{Validate, ValidationError};

/// Where to read the database from and where to put its dump.
#[derive(Clone, Serialize, Deserialize, Debug, Validate, Builder, Getters, CopyGetters)]
#[serde(deny_unknown_fields)]
pub struct DumpConfig {
    /// SQLite database file, opened read-only.
    #[validate(custom(function = validate_database))]
    #[builder(into)]
    #[getset(get = "pub")]
    database: Arc<Path>,
    /// Existing directory receiving the `.sql` files.
    #[validate(custom(function = validate_out_dir))]
    #[builder(into)]
    #[getset(get = "pub")]
    out_dir: Arc<Path>,
    /// Literal file stem or reference-time layout, see [`crate::dump::naming`].
    #[validate(custom(function = validate_format))]
    #[builder(into)]
    #[getset(get = "pub")]
    format: Arc<str>,
    #[serde(default = "default_include_data")]
    #[builder(default = true)]
    #[getset(get_copy = "pub")]
    include_data: bool,
}

fn default_include_data() -> bool {
    true
}

fn validate_database(path: &Arc<Path>) -> std::result::Result<(), ValidationError> {
    validate_sql_file(path)
}

fn validate_out_dir(dir: &Arc<Path>) -> std::result::Result<(), ValidationError> {
    validate_dir_exist(dir)
}

fn validate_format(format: &Arc<str>) -> std::result::Result<(), ValidationError> {
    validate_dump_format(format)
}

impl DumpConfig {
    pub fn open_connection(&self) -> Result<Connection> {
        Ok(Connection::open_with_flags(
            self.database.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?)
    }

    fn dump_writer(&self) -> SqliteDumpWriter {
        SqliteDumpWriter::builder()
            .include_data(self.include_data)
            .build()
    }

    /// Dumps the database into a new file under `out_dir` and returns its path.
    #[named]
    pub fn run(&self) -> Result<PathBuf> {
        let connection = self
            .open_connection()
            .with_msg(format!("Open database failed: {:?}", self.database))?;
        let mut session = Session::file_backed(
            connection,
            self.dump_writer(),
            &self.out_dir,
            &self.format,
        )
        .with_debug_object_and_fn_name(self.clone(), function_path!())?;
        let path = session.path().map(Path::to_path_buf).unwrap_or_default();

        session
            .dump()
            .with_msg(format!("Dump to {:?} failed", &path))?;
        session.close()?;
        info!("Created dump file: {:?}", &path);
        Ok(path)
    }

    /// Dumps the database into `out` instead of a file.
    pub fn run_to<W: Write + Send>(&self, out: W) -> Result<()> {
        let connection = self
            .open_connection()
            .with_msg(format!("Open database failed: {:?}", self.database))?;
        dump_to_stream(connection, self.dump_writer(), out)
    }
}
