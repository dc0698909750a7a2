use thiserror::Error;

#[derive(Error, Debug)]
pub enum GuestError {
    #[error("runtime error: {0}")]
    Runtime(#[from] farm_runtime::RuntimeError),

    #[error("guest file write failed: {0}")]
    Write(#[from] farm_exec::ExecError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
