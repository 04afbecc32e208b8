use std::path::PathBuf;
use std::time::Duration;

use super::{env_optional, env_u32, env_u64, interpreter_override};

pub(crate) const DEFAULT_INTERPRETER: &str = "osascript";
pub(crate) const DEFAULT_SCRIPT_TIMEOUT_SECS: u64 = 120;
pub(crate) const DEFAULT_MAX_RETRIES: u32 = 3;
pub(crate) const DEFAULT_BACKOFF_SECS: u64 = 2;

/// Process-wide settings, read from the environment once at startup.
#[derive(Debug, Clone)]
pub(crate) struct RuntimeConfig {
    /// Free-text user preferences appended to every tool description so the
    /// calling agent sees them alongside the catalog.
    pub(crate) preferences: Option<String>,
    /// Interpreter command; `MAILPILOT_OSASCRIPT` can replace or wrap it
    /// (e.g. `ssh mac osascript` for a remote Mail host).
    pub(crate) interpreter: Vec<String>,
    pub(crate) script_timeout: Duration,
    pub(crate) max_retries: u32,
    pub(crate) backoff_base: Duration,
    /// JSONL invocation log directory; unset disables the log.
    pub(crate) log_dir: Option<PathBuf>,
}

impl RuntimeConfig {
    pub(crate) fn from_env() -> Result<RuntimeConfig, Box<dyn std::error::Error>> {
        let interpreter = interpreter_override("MAILPILOT_OSASCRIPT")
            .unwrap_or_else(|| vec![DEFAULT_INTERPRETER.to_string()]);
        Ok(RuntimeConfig {
            preferences: env_optional("MAILPILOT_EMAIL_PREFERENCES"),
            interpreter,
            script_timeout: Duration::from_secs(env_u64(
                "MAILPILOT_SCRIPT_TIMEOUT_SECS",
                DEFAULT_SCRIPT_TIMEOUT_SECS,
            )?),
            max_retries: env_u32("MAILPILOT_MAX_RETRIES", DEFAULT_MAX_RETRIES)?.max(1),
            backoff_base: Duration::from_secs(DEFAULT_BACKOFF_SECS),
            log_dir: env_optional("MAILPILOT_LOG_DIR").map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_env() {
        let cfg = RuntimeConfig::from_env().expect("config");
        assert_eq!(cfg.interpreter, vec!["osascript"]);
        assert_eq!(cfg.script_timeout, Duration::from_secs(120));
        assert_eq!(cfg.max_retries, 3);
        assert_eq!(cfg.backoff_base, Duration::from_secs(2));
        assert!(cfg.log_dir.is_none());
    }
}
