mod error;
mod parse;
mod runner;
mod writer;

pub use error::ExecError;
pub use parse::parse_key_values;
pub use runner::{CommandRunner, CommandSpec, ProcessRunner};
pub use writer::{WriteMode, write_lines};
