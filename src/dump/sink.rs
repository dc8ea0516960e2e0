//! Output side of a dump session.

use derive_more::From;
use io_enum::Write;
use std::fs::File;
use std::io;
use std::io::{BufWriter, IntoInnerError, Write};
use std::net::{Shutdown, TcpStream};

/// Explicit release of a writer, beyond dropping it.
pub trait Close {
    fn close(&mut self) -> io::Result<()>;
}

pub trait ClosableWrite: Write + Close + Send {}

impl<T: Write + Close + Send> ClosableWrite for T {}

impl Close for File {
    fn close(&mut self) -> io::Result<()> {
        self.sync_all()
    }
}

impl Close for TcpStream {
    fn close(&mut self) -> io::Result<()> {
        self.shutdown(Shutdown::Write)
    }
}

impl<W: Write + Close> Close for BufWriter<W> {
    fn close(&mut self) -> io::Result<()> {
        self.flush()?;
        self.get_mut().close()
    }
}

/// Destination of the generated SQL.
///
/// Whether the sink has to be released on close is fixed by its variant when
/// the session is built.
#[derive(Write, From)]
pub enum Sink<'a> {
    /// Dump file created by the target resolver.
    File(BufWriter<File>),
    /// Caller writer that is only flushed, never closed.
    Stream(Box<dyn Write + Send + 'a>),
    /// Caller writer that is closed with the session.
    ClosableStream(Box<dyn ClosableWrite + 'a>),
}

impl<'a> Sink<'a> {
    pub fn stream<W: Write + Send + 'a>(writer: W) -> Self {
        Sink::Stream(Box::new(writer))
    }

    pub fn closable<W: Write + Close + Send + 'a>(writer: W) -> Self {
        Sink::ClosableStream(Box::new(writer))
    }

    pub fn is_closable(&self) -> bool {
        !matches!(self, Sink::Stream(_))
    }

    /// Releases the sink if its variant supports it; a plain stream is just dropped.
    pub fn release(self) -> io::Result<()> {
        match self {
            Sink::File(writer) => writer
                .into_inner()
                .map_err(IntoInnerError::into_error)?
                .close(),
            Sink::Stream(_) => Ok(()),
            Sink::ClosableStream(mut writer) => writer.close(),
        }
    }
}

impl From<File> for Sink<'_> {
    fn from(file: File) -> Self {
        Sink::File(BufWriter::new(file))
    }
}

impl std::fmt::Debug for Sink<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sink::File(w) => f.debug_tuple("File").field(w.get_ref()).finish(),
            Sink::Stream(_) => f.write_str("Stream"),
            Sink::ClosableStream(_) => f.write_str("ClosableStream"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct FailingClose;

    impl Write for FailingClose {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Close for FailingClose {
        fn close(&mut self) -> io::Result<()> {
            Err(io::Error::other("Test failure"))
        }
    }

    #[test]
    fn test_capability() {
        let mut buf = Vec::new();
        assert!(!Sink::stream(&mut buf).is_closable());
        assert!(Sink::closable(FailingClose).is_closable());
        assert!(Sink::from(tempfile::tempfile().unwrap()).is_closable());
    }

    #[test]
    fn test_from_buffered_file() {
        let sink = Sink::from(BufWriter::new(tempfile::tempfile().unwrap()));
        assert!(matches!(sink, Sink::File(_)));
    }

    #[test]
    fn test_stream_release_is_noop() {
        let mut buf = Cursor::new(Vec::new());
        let mut sink = Sink::stream(&mut buf);
        sink.write_all(b"SELECT 1;").unwrap();
        assert!(sink.release().is_ok());
        assert_eq!(buf.get_ref(), b"SELECT 1;");
    }

    #[test]
    fn test_closable_release_surfaces_error() {
        let err = Sink::closable(FailingClose).release().unwrap_err();
        assert_eq!(err.to_string(), "Test failure");
    }

    #[test]
    fn test_file_release_flushes() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.sql");
        let mut sink = Sink::from(File::create_new(&path).unwrap());
        sink.write_all(b"COMMIT;\n").unwrap();
        sink.release().unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"COMMIT;\n");
    }

    #[test]
    fn test_buf_writer_close_flushes_inner() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.sql");
        let mut writer = BufWriter::new(File::create_new(&path).unwrap());
        writer.write_all(b"BEGIN;").unwrap();
        writer.close().unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"BEGIN;");
    }
}
