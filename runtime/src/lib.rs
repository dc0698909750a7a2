mod backend;
mod config;
mod config_file;
mod error;
mod lxc;
mod state;
mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use backend::RuntimeBackend;
pub use config::LxcConfig;
pub use config_file::{parse_config, veth_pair_name};
pub use error::RuntimeError;
pub use lxc::LxcBackend;
pub use state::State;
pub use types::*;
