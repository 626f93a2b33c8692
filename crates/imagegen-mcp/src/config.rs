//! Server and process runner configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PROGRAM: &str = "imggen";
pub const DEFAULT_SUBCOMMAND: &str = "generate";
pub const FULL_TIMEOUT: Duration = Duration::from_secs(300);
pub const MINIMAL_TIMEOUT: Duration = Duration::from_secs(60);
pub const PROGRESS_INTERVAL: Duration = Duration::from_secs(3);

/// How the external generator is invoked
#[derive(Clone)]
pub struct RunnerConfig {
    /// Generator executable, resolved through `PATH` when not absolute
    pub program: String,
    /// Arguments placed before the generated flags (normally the subcommand)
    pub base_args: Vec<String>,
    /// Watchdog: the child is killed once this elapses
    pub timeout: Duration,
    /// Heartbeat period; zero falls back to [`PROGRESS_INTERVAL`]
    pub progress_interval: Duration,
    /// Forwarded as `--api-key` when present
    pub api_key: Option<String>,
    pub working_dir: Option<PathBuf>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            base_args: vec![DEFAULT_SUBCOMMAND.to_string()],
            timeout: FULL_TIMEOUT,
            progress_interval: PROGRESS_INTERVAL,
            api_key: None,
            working_dir: None,
        }
    }
}

impl std::fmt::Debug for RunnerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunnerConfig")
            .field("program", &self.program)
            .field("base_args", &self.base_args)
            .field("timeout", &self.timeout)
            .field("progress_interval", &self.progress_interval)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("working_dir", &self.working_dir)
            .finish()
    }
}

impl RunnerConfig {
    pub fn with_program<P: Into<String>>(mut self, program: P) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_base_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    /// Period for the heartbeat ticker, never zero
    pub fn heartbeat_period(&self) -> Duration {
        if self.progress_interval.is_zero() {
            PROGRESS_INTERVAL
        } else {
            self.progress_interval
        }
    }
}

/// Behaviour presets for the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// `output_dir` required and probed, credential forwarded, 5 minute watchdog
    #[default]
    Full,
    /// `output_dir` optional and unchecked, no credential, 60 second watchdog
    Minimal,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Full => "full",
            Profile::Minimal => "minimal",
        }
    }

    pub fn default_timeout(&self) -> Duration {
        match self {
            Profile::Full => FULL_TIMEOUT,
            Profile::Minimal => MINIMAL_TIMEOUT,
        }
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(Profile::Full),
            "minimal" => Ok(Profile::Minimal),
            other => Err(format!("unknown profile '{}', expected 'full' or 'minimal'", other)),
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for the tool dispatcher
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub runner: RunnerConfig,
    /// Whether `output_dir` is mandatory, absolute and probed for writability
    pub require_output_dir: bool,
}

impl ServerConfig {
    /// Build a configuration from a profile. The runner's timeout and
    /// credential are overwritten to match the profile.
    pub fn for_profile(profile: Profile, runner: RunnerConfig) -> Self {
        let mut runner = runner.with_timeout(profile.default_timeout());
        let require_output_dir = match profile {
            Profile::Full => true,
            Profile::Minimal => {
                runner.api_key = None;
                false
            }
        };
        Self { runner, require_output_dir }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.runner.timeout = timeout;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::for_profile(Profile::Full, RunnerConfig::default())
    }
}
