//! Configuration loading and merging.
//!
//! Config is loaded from two sources with the project taking precedence:
//! 1. User-level: `<config dir>/treeline/config.toml`
//! 2. Project-level: `<root>/.treeline/config.toml`
//!
//! Covers prompt styling, history size, listing colours and the help key.
//! Missing or unparsable files fall back to the defaults.

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::keymap::DEFAULT_HELP_KEY;

const DEFAULT_PROMPT_COLOR: &str = "bright-green";
const DEFAULT_CANDIDATE_COLOR: &str = "bright-blue";
const DEFAULT_HINT_COLOR: &str = "bright-cyan";
const CONFIG_DIR_NAME: &str = "treeline";
const PROJECT_DIR_NAME: &str = ".treeline";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub prompt: PromptConfig,
    pub history: HistoryConfig,
    pub completion: CompletionConfig,
    pub keymap: KeymapConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptConfig {
    pub color: String,
    pub bold: bool,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            color: DEFAULT_PROMPT_COLOR.to_string(),
            bold: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionConfig {
    pub candidate_color: String,
    pub hint_color: String,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            candidate_color: DEFAULT_CANDIDATE_COLOR.to_string(),
            hint_color: DEFAULT_HINT_COLOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeymapConfig {
    pub help: String,
}

impl Default for KeymapConfig {
    fn default() -> Self {
        Self {
            help: DEFAULT_HELP_KEY.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    prompt: Option<RawPrompt>,
    history: Option<RawHistory>,
    completion: Option<RawCompletion>,
    keymap: Option<RawKeymap>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPrompt {
    color: Option<String>,
    bold: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct RawHistory {
    capacity: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCompletion {
    #[serde(alias = "candidateColor")]
    candidate_color: Option<String>,
    #[serde(alias = "hintColor")]
    hint_color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawKeymap {
    help: Option<String>,
}

fn read_toml(path: &Path) -> Option<RawConfig> {
    let contents = fs::read_to_string(path).ok()?;
    if contents.trim().is_empty() {
        return None;
    }
    match toml::from_str::<RawConfig>(&contents) {
        Ok(config) => Some(config),
        Err(err) => {
            warn!(target: "config", path = %path.display(), error = %err, "ignoring invalid config");
            None
        }
    }
}

fn merge_config(user: Option<RawConfig>, project: Option<RawConfig>) -> Config {
    let defaults = Config::default();

    let project_prompt = project.as_ref().and_then(|c| c.prompt.as_ref());
    let user_prompt = user.as_ref().and_then(|c| c.prompt.as_ref());
    let color = project_prompt
        .and_then(|p| p.color.clone())
        .or_else(|| user_prompt.and_then(|p| p.color.clone()))
        .unwrap_or(defaults.prompt.color);
    let bold = project_prompt
        .and_then(|p| p.bold)
        .or_else(|| user_prompt.and_then(|p| p.bold))
        .unwrap_or(defaults.prompt.bold);

    let capacity = project
        .as_ref()
        .and_then(|c| c.history.as_ref())
        .and_then(|h| h.capacity)
        .or_else(|| {
            user.as_ref()
                .and_then(|c| c.history.as_ref())
                .and_then(|h| h.capacity)
        })
        .unwrap_or(defaults.history.capacity);

    let project_completion = project.as_ref().and_then(|c| c.completion.as_ref());
    let user_completion = user.as_ref().and_then(|c| c.completion.as_ref());
    let candidate_color = project_completion
        .and_then(|c| c.candidate_color.clone())
        .or_else(|| user_completion.and_then(|c| c.candidate_color.clone()))
        .unwrap_or(defaults.completion.candidate_color);
    let hint_color = project_completion
        .and_then(|c| c.hint_color.clone())
        .or_else(|| user_completion.and_then(|c| c.hint_color.clone()))
        .unwrap_or(defaults.completion.hint_color);

    let help = project
        .as_ref()
        .and_then(|c| c.keymap.as_ref())
        .and_then(|k| k.help.clone())
        .or_else(|| {
            user.as_ref()
                .and_then(|c| c.keymap.as_ref())
                .and_then(|k| k.help.clone())
        })
        .unwrap_or(defaults.keymap.help);

    Config {
        prompt: PromptConfig { color, bold },
        history: HistoryConfig { capacity },
        completion: CompletionConfig {
            candidate_color,
            hint_color,
        },
        keymap: KeymapConfig { help },
    }
}

fn project_config_path(root: &Path) -> PathBuf {
    root.join(PROJECT_DIR_NAME).join(CONFIG_FILE_NAME)
}

fn user_config_path() -> Option<PathBuf> {
    let base = env::var_os("XDG_CONFIG_HOME")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::config_dir)
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))?;
    Some(base.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

pub fn load_config(root: &Path) -> Config {
    let project_config = read_toml(&project_config_path(root));
    let user_config = user_config_path().and_then(|path| read_toml(&path));
    merge_config(user_config, project_config)
}
