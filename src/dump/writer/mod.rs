pub mod sqlite;

use crate::dump::result_error::result::Result;
use std::io::Write;

/// Generates the SQL statements of a dump.
///
/// Implementations only write through `out`; the session owns and releases both
/// the connection and the sink.
pub trait DumpWriter<C> {
    fn write_dump(&self, connection: &C, out: &mut dyn Write) -> Result<()>;
}

impl<C, F> DumpWriter<C> for F
where
    F: Fn(&C, &mut dyn Write) -> Result<()>,
{
    fn write_dump(&self, connection: &C, out: &mut dyn Write) -> Result<()> {
        self(connection, out)
    }
}
