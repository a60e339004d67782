//! Config - taskmate.toml の読み込み
//!
//! 優先順位（高い順）
//! 1. 環境変数 `TASKMATE_*`
//! 2. 指定されたファイル（`load_default` では ./taskmate.toml）
//! 3. 既定値

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app::reconciler::ReconcileMode;
use crate::domain::{Session, TaskStatus, UserId};

pub const DEFAULT_CONFIG_FILE: &str = "taskmate.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskMateConfig {
    #[serde(default)]
    pub board: BoardConfig,

    #[serde(default)]
    pub reconcile: ReconcileConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Column used by the "Add task" button in the header.
    #[serde(default)]
    pub default_status: TaskStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconcileConfig {
    #[serde(default)]
    pub mode: ReconcileMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// EnvFilter string, e.g. "info" or "taskmate_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,
}

fn default_logging_level() -> String {
    "info".to_string()
}

fn default_logging_console() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_logging_level(),
            console: default_logging_console(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Signed-in user. Unset means anonymous.
    #[serde(default)]
    pub user_id: Option<String>,
}

impl TaskMateConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(path)?;
        Self::from_toml(&s)
    }

    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str::<TaskMateConfig>(s)?)
    }

    /// ./taskmate.toml if present, else defaults; then environment overrides.
    pub fn load_default() -> Result<Self, ConfigError> {
        let local = Path::new(DEFAULT_CONFIG_FILE);
        let mut cfg = if local.exists() {
            Self::load(local)?
        } else {
            Self::default()
        };
        cfg.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// Apply `TASKMATE_*` overrides. Blank values are ignored.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("TASKMATE_USER_ID") {
            self.session.user_id = Some(v.trim().to_string());
        }
        if let Some(v) = get("TASKMATE_DEFAULT_STATUS") {
            self.board.default_status = v.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "TASKMATE_DEFAULT_STATUS",
                value: v.clone(),
            })?;
        }
        if let Some(v) = get("TASKMATE_RECONCILE_MODE") {
            self.reconcile.mode = match v.trim() {
                "always_write" => ReconcileMode::AlwaysWrite,
                "skip_unchanged" => ReconcileMode::SkipUnchanged,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "TASKMATE_RECONCILE_MODE",
                        value: v,
                    });
                }
            };
        }
        if let Some(v) = get("TASKMATE_LOG") {
            self.logging.level = v;
        }
        Ok(())
    }

    pub fn session(&self) -> Session {
        match self.session.user_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => Session::signed_in(UserId::new(id)),
            _ => Session::anonymous(),
        }
    }
}
