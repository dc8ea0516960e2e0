use crate::dump::result_error::error::Error;
use crate::dump::result_error::{WithDebugObjectAndFnName, WithMsg};
use std::fmt::Debug;

pub type Result<T> = std::result::Result<T, Error>;

impl<S: Into<String>, O: Debug + Send + 'static, R> WithDebugObjectAndFnName<S, O> for Result<R> {
    fn with_debug_object_and_fn_name(self, obj: O, fn_name: S) -> Self {
        self.map_err(|e| e.with_debug_object_and_fn_name(obj, fn_name))
    }
}

impl<R, S: Into<String>> WithMsg<S> for Result<R> {
    fn with_msg(self, msg: S) -> Self {
        self.map_err(|e| e.with_msg(msg))
    }
}

/// Keeps the first error of a best-effort sequence, handing every later one to `rest`.
pub fn first_error<I, F>(results: I, mut rest: F) -> Result<()>
where
    I: IntoIterator<Item = Result<()>>,
    F: FnMut(Error),
{
    let mut first = None;
    for err in results.into_iter().filter_map(|r| r.err()) {
        match first {
            None => first = Some(err),
            Some(_) => rest(err),
        }
    }
    first.map_or(Ok(()), Err)
}
