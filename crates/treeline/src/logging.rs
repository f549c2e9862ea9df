//! Opt-in file logging.
//!
//! Nothing is installed unless `TREELINE_LOG` holds a filter such as
//! `debug` or `walk=trace,editor=debug`. Events go to `TREELINE_LOG_FILE`
//! or `<tmp>/treeline.log` and never to the terminal being edited.

use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const LOG_FILTER_VAR: &str = "TREELINE_LOG";
pub const LOG_FILE_VAR: &str = "TREELINE_LOG_FILE";

/// Where logs go when `TREELINE_LOG_FILE` is unset.
pub fn log_path() -> PathBuf {
    env::var_os(LOG_FILE_VAR)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| env::temp_dir().join("treeline.log"))
}

/// Install the global subscriber. Returns whether logging is active.
pub fn init_logging() -> bool {
    let Some(filter) = env::var(LOG_FILTER_VAR)
        .ok()
        .filter(|value| !value.trim().is_empty())
    else {
        return false;
    };
    let filter = match EnvFilter::try_new(&filter) {
        Ok(filter) => filter,
        Err(err) => {
            eprintln!("treeline: ignoring {LOG_FILTER_VAR}={filter}: {err}");
            return false;
        }
    };
    let path = log_path();
    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("treeline: cannot open log file {}: {err}", path.display());
            return false;
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{env_lock, EnvVarGuard};

    #[test]
    fn log_path_prefers_override() {
        let _guard = env_lock();
        let _file = EnvVarGuard::set(LOG_FILE_VAR, "/tmp/custom-treeline.log".to_string());
        assert_eq!(log_path(), PathBuf::from("/tmp/custom-treeline.log"));
    }

    #[test]
    fn log_path_defaults_to_temp_dir() {
        let _guard = env_lock();
        let _file = EnvVarGuard::set(LOG_FILE_VAR, String::new());
        assert_eq!(log_path(), env::temp_dir().join("treeline.log"));
    }

    #[test]
    fn disabled_without_filter() {
        let _guard = env_lock();
        let _filter = EnvVarGuard::set(LOG_FILTER_VAR, "  ".to_string());
        assert!(!init_logging());
    }
}
