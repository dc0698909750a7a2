//! In-memory stand-in for the `lxc-*` tools.
//!
//! Tracks container states, records every command, and creates the
//! directories the real tools would create under the `-P` path so config
//! writes land on disk.

use async_trait::async_trait;
use farm_exec::{CommandRunner, CommandSpec, ExecError};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
struct FakeState {
    containers: HashMap<String, String>,
    calls: Vec<CommandSpec>,
    failures: HashMap<String, String>,
}

#[derive(Default)]
pub struct FakeLxc {
    state: Mutex<FakeState>,
    create_delay: Option<Duration>,
}

impl FakeLxc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `lxc-create` sleep, widening the window for racing callers.
    pub fn with_create_delay(mut self, delay: Duration) -> Self {
        self.create_delay = Some(delay);
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn add_container(&self, name: &str, state: &str) {
        self.lock()
            .containers
            .insert(name.to_string(), state.to_string());
    }

    /// Every later invocation of `tool` fails with `stderr`.
    pub fn fail_tool(&self, tool: &str, stderr: &str) {
        self.lock()
            .failures
            .insert(tool.to_string(), stderr.to_string());
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.lock().calls.clone()
    }

    pub fn calls_for(&self, tool: &str) -> Vec<CommandSpec> {
        self.calls()
            .into_iter()
            .filter(|c| c.program == tool)
            .collect()
    }

    pub fn count(&self, tool: &str) -> usize {
        self.calls_for(tool).len()
    }

    /// Argument vectors run inside `name` via `lxc-attach`.
    pub fn attached(&self, name: &str) -> Vec<Vec<String>> {
        self.calls_for("lxc-attach")
            .into_iter()
            .filter(|c| c.flag_value("-n") == Some(name))
            .filter_map(|c| {
                let pos = c.args.iter().position(|a| a == "--")?;
                Some(c.args[pos + 1..].to_vec())
            })
            .collect()
    }

    fn fail(command: &CommandSpec, stderr: String) -> ExecError {
        ExecError::CommandFailed {
            command: command.to_string(),
            code: Some(1),
            stderr,
        }
    }

    fn make_dir(command: &CommandSpec, path: PathBuf) -> Result<(), ExecError> {
        std::fs::create_dir_all(&path)
            .map_err(|e| Self::fail(command, format!("mkdir {:?}: {}", path, e)))
    }

    fn apply(&self, command: &CommandSpec) -> Result<Vec<u8>, ExecError> {
        let mut state = self.lock();
        state.calls.push(command.clone());

        if let Some(stderr) = state.failures.get(&command.program) {
            return Err(Self::fail(command, stderr.clone()));
        }

        let lxc_path = PathBuf::from(command.flag_value("-P").unwrap_or("/var/lib/lxc"));
        let name = command.flag_value("-n").unwrap_or_default().to_string();
        let missing = || Self::fail(command, format!("{} doesn't exist", name));

        match command.program.as_str() {
            "lxc-info" => {
                let current = state.containers.get(&name).ok_or_else(missing)?;
                Ok(format!("Name:           {}\nState:          {}\n", name, current).into_bytes())
            }
            "lxc-start" => {
                let current = state.containers.get_mut(&name).ok_or_else(missing)?;
                *current = "RUNNING".to_string();
                Ok(Vec::new())
            }
            "lxc-stop" => {
                let current = state.containers.get_mut(&name).ok_or_else(missing)?;
                *current = "STOPPED".to_string();
                Ok(Vec::new())
            }
            "lxc-attach" => match state.containers.get(&name).map(String::as_str) {
                Some("RUNNING") => Ok(Vec::new()),
                Some(_) => Err(Self::fail(command, format!("{} is not running", name))),
                None => Err(missing()),
            },
            "lxc-copy" => {
                let target = command.flag_value("-N").unwrap_or_default().to_string();
                if !state.containers.contains_key(&name) {
                    return Err(missing());
                }
                if state.containers.contains_key(&target) {
                    return Err(Self::fail(command, format!("{} already exists", target)));
                }
                Self::make_dir(command, lxc_path.join(&target).join("overlay").join("delta"))?;
                state.containers.insert(target, "STOPPED".to_string());
                Ok(Vec::new())
            }
            "lxc-create" => {
                if state.containers.contains_key(&name) {
                    return Err(Self::fail(command, format!("{} already exists", name)));
                }
                Self::make_dir(command, lxc_path.join(&name).join("rootfs"))?;
                state.containers.insert(name, "STOPPED".to_string());
                Ok(Vec::new())
            }
            other => Err(Self::fail(command, format!("{}: command not found", other))),
        }
    }
}

#[async_trait]
impl CommandRunner for FakeLxc {
    async fn run(&self, command: &CommandSpec) -> Result<Vec<u8>, ExecError> {
        if command.program == "lxc-create" {
            if let Some(delay) = self.create_delay {
                tokio::time::sleep(delay).await;
            }
        }
        self.apply(command)
    }
}
