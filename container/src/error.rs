use farm_guest::GuestError;
use farm_runtime::{InvalidAddress, InvalidInterfaceKind, RuntimeError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContainerError {
    #[error(transparent)]
    InvalidInterfaceKind(#[from] InvalidInterfaceKind),

    #[error(transparent)]
    InvalidAddress(#[from] InvalidAddress),

    #[error("external interface requires a host link")]
    MissingLink,

    #[error("container must have exactly one internal interface, found {0}")]
    InternalInterfaceCount(usize),

    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("guest error: {0}")]
    Guest(#[from] GuestError),
}

impl ContainerError {
    /// True when the caller supplied invalid input and nothing was changed.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            ContainerError::InvalidInterfaceKind(_)
                | ContainerError::InvalidAddress(_)
                | ContainerError::MissingLink
                | ContainerError::InternalInterfaceCount(_)
        )
    }
}
