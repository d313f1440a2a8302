//! Process configuration

use std::collections::HashMap;
use std::path::PathBuf;

/// Configuration for spawning a process
#[derive(Debug, Clone)]
pub struct ProcessConfig {
    /// Executable name or path
    pub program: String,
    /// Command arguments
    pub args: Vec<String>,
    /// Working directory (None = inherit the parent's)
    pub working_dir: Option<PathBuf>,
    /// Environment variables (added to the inherited environment)
    pub env: HashMap<String, String>,
}

impl ProcessConfig {
    /// Create new process configuration
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: vec![],
            working_dir: None,
            env: HashMap::new(),
        }
    }

    /// Append a single command argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set command arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set working directory
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Add environment variable
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}
