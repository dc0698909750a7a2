mod alpine;
mod config;
mod error;
mod ifupdown;
mod persona;

pub use alpine::AlpinePersona;
pub use config::AlpineConfig;
pub use error::GuestError;
pub use persona::{BuildSpec, GuestPersona, shell_quote};
