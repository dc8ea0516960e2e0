use crate::dump::result_error::error::Error;
use crate::dump::result_error::result::Result;
use rusqlite::Connection;

/// Database handle owned by a dump session.
///
/// `close` consumes the handle, so a released connection can never be reused.
pub trait DumpConnection {
    fn close(self) -> Result<()>;
}

impl DumpConnection for Connection {
    fn close(self) -> Result<()> {
        // on failure rusqlite hands the handle back; dropping it finalizes the close
        Connection::close(self).map_err(|(_, e)| Error::from(e))
    }
}
