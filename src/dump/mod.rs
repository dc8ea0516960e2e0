pub mod connection;
pub mod dump_config;
pub mod naming;
pub mod result_error;
pub mod session;
pub mod sink;
pub mod target;
pub mod validate;
pub mod writer;

macro_rules! function_path {
    () => {
        concat!(module_path!(), "::", function_name!(), " ", file!(), ":", line!())
    };
}

pub(crate) use function_path;
