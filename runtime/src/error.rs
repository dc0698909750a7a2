use farm_exec::ExecError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("container already exists: {0}")]
    AlreadyExists(String),

    #[error("failed to inspect container {name}: {source}")]
    Inspect {
        name: String,
        #[source]
        source: ExecError,
    },

    #[error("failed to {op} container {name}: {source}")]
    Command {
        op: &'static str,
        name: String,
        #[source]
        source: ExecError,
    },

    #[error("config write failed: {0}")]
    Config(#[from] ExecError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
