//! Lifecycle of a single dump: one connection, one sink, one explicit close.

use crate::dump::connection::DumpConnection;
use crate::dump::result_error::error::Error;
use crate::dump::result_error::result::{first_error, Result};
use crate::dump::sink::Sink;
use crate::dump::target::{resolve_target_at, ResolvedTarget};
use crate::dump::writer::DumpWriter;
use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

enum State<'a, C> {
    Open { connection: C, sink: Sink<'a> },
    Closed,
}

/// Owns the source connection and the output sink of one dump.
///
/// A session moves from open to closed exactly once. [`Session::close`] always
/// attempts to release both resources, and calling it again is a no-op. Any
/// dump after that fails with [`Error::SessionClosed`]. An open session is
/// closed on drop.
pub struct Session<'a, C: DumpConnection, D: DumpWriter<C>> {
    writer: D,
    path: Option<PathBuf>,
    state: State<'a, C>,
}

impl<C: DumpConnection, D: DumpWriter<C>> Session<'static, C, D> {
    /// Creates a new `<dir>/<name>.sql` file and a session writing into it.
    ///
    /// Target resolution errors are returned unchanged, and `connection` is
    /// dropped with the failed construction.
    pub fn file_backed<P: AsRef<Path>>(
        connection: C,
        writer: D,
        dir: P,
        format: &str,
    ) -> Result<Self> {
        Self::file_backed_at(connection, writer, dir, format, &Local::now())
    }

    pub fn file_backed_at<P, Tz>(
        connection: C,
        writer: D,
        dir: P,
        format: &str,
        now: &DateTime<Tz>,
    ) -> Result<Self>
    where
        P: AsRef<Path>,
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let (path, file) = resolve_target_at(dir, format, now).map(ResolvedTarget::into_parts)?;
        Ok(Self {
            writer,
            path: Some(path),
            state: State::Open {
                connection,
                sink: file.into(),
            },
        })
    }
}

impl<'a, C: DumpConnection, D: DumpWriter<C>> Session<'a, C, D> {
    /// Wraps a caller supplied sink. Nothing is created on the filesystem.
    pub fn stream_backed<S: Into<Sink<'a>>>(connection: C, writer: D, sink: S) -> Self {
        Self {
            writer,
            path: None,
            state: State::Open {
                connection,
                sink: sink.into(),
            },
        }
    }

    /// File the session writes to, if it is file backed.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, State::Closed)
    }

    /// Runs the dump writer against the connection and flushes the sink.
    pub fn dump(&mut self) -> Result<()> {
        let State::Open { connection, sink } = &mut self.state else {
            return Err(Error::SessionClosed);
        };
        self.writer
            .write_dump(connection, sink)
            .map_err(|e| Error::DumpFailed(Box::new(e)))?;
        sink.flush()?;
        info!("Dump written to {}", self.describe_target());
        Ok(())
    }

    /// Releases the sink (when closable) and then the connection.
    ///
    /// Both releases are attempted even if the first fails; the first error is
    /// returned. The session is closed afterwards either way.
    pub fn close(&mut self) -> Result<()> {
        let State::Open { connection, sink } = std::mem::replace(&mut self.state, State::Closed)
        else {
            return Ok(());
        };
        let sink_closable = sink.is_closable();
        let res = first_error([sink.release().map_err(Error::from), connection.close()], |e| {
            warn!("Additional error while closing dump session: {e}")
        });
        debug!(
            "Closed dump session for {} (sink released: {sink_closable})",
            self.describe_target()
        );
        res
    }

    fn describe_target(&self) -> String {
        match &self.path {
            Some(path) => format!("{:?}", path),
            None => "stream".to_string(),
        }
    }
}

impl<C: DumpConnection, D: DumpWriter<C>> Drop for Session<'_, C, D> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Closing dump session on drop failed: {e}");
        }
    }
}

/// Dumps `connection` into `out` through a stream backed session, then closes it.
///
/// A dump error takes precedence over a close error.
pub fn dump_to_stream<C, D, W>(connection: C, writer: D, out: W) -> Result<()>
where
    C: DumpConnection,
    D: DumpWriter<C>,
    W: Write + Send,
{
    let mut session = Session::stream_backed(connection, writer, Sink::stream(out));
    let dump_res = session.dump();
    let close_res = session.close();
    dump_res.and(close_res)
}
