//! Configuration file parsing for `zappac.toml`.
//!
//! Searches the current directory then its ancestors, falling back to
//! `~/.config/zappac/zappac.toml` if no project-level file is found.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE: &str = "zappac.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid toml in '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("cannot write '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct ZappacConfig {
    #[serde(default)]
    pub repl: ReplSection,
    #[serde(default)]
    pub state: StateSection,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ReplSection {
    pub prompt: String,
    pub color: bool,
    /// Show the result of the line being typed as an inline hint.
    pub preview: bool,
    /// Group the digits of decimal results in thousands (`1,234,567`).
    pub group_digits: bool,
    pub history_path: Option<String>,
}

impl Default for ReplSection {
    fn default() -> Self {
        Self {
            prompt: "zappac>".to_string(),
            color: true,
            preview: true,
            group_digits: false,
            history_path: None,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct StateSection {
    /// Environment snapshot written by `save(name)`, used to seed new sessions.
    pub last_state: String,
}

impl ZappacConfig {
    /// Load config from `zappac.toml`, searching current dir then parents,
    /// and return it with the path it came from. `None` when no file exists.
    pub fn load_with_path() -> Result<Option<(PathBuf, Self)>, ConfigError> {
        let start = std::env::current_dir().ok();
        let home = dirs::home_dir();
        match find(start.as_deref(), home.as_deref()) {
            Some(path) => {
                let cfg = Self::load_from(&path)?;
                Ok(Some((path, cfg)))
            }
            None => Ok(None),
        }
    }

    /// Load config from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a TOML string directly.
    pub fn parse(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Where a user-level config lives: `~/.config/zappac/zappac.toml`.
    pub fn global_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| global_path_in(&home))
    }

    /// Store `snapshot` as `[state] last_state` in the file at `path`.
    ///
    /// The file and its parent directories are created when missing; every
    /// other key already in the file is kept.
    pub fn save_last_state(path: &Path, snapshot: &str) -> Result<(), ConfigError> {
        let mut table = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            content
                .parse::<toml::Table>()
                .map_err(|source| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?
        } else {
            toml::Table::new()
        };

        let state = table
            .entry("state")
            .or_insert(toml::Value::Table(toml::Table::new()));
        if !state.is_table() {
            *state = toml::Value::Table(toml::Table::new());
        }
        if let toml::Value::Table(section) = state {
            section.insert(
                "last_state".to_string(),
                toml::Value::String(snapshot.to_string()),
            );
        }

        let rendered = toml::to_string(&table)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, rendered).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Generate a default `zappac.toml` template.
    pub fn default_template() -> &'static str {
        r#"# Zappac Configuration

[repl]
prompt = "zappac>"
color = true
# Show the result of the current line while typing
preview = true
# Write decimal results as 1,234,567
group_digits = false
# history_path = "~/.zappac/repl_history"

# Written by save(name); seeds the variables of new sessions
[state]
# last_state = ""
"#
    }
}

/// Find the config file: `start` and its ancestors first, then the global
/// location under `home`.
pub fn find(start: Option<&Path>, home: Option<&Path>) -> Option<PathBuf> {
    if let Some(start) = start {
        for dir in start.ancestors() {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    let global = global_path_in(home?);
    global.is_file().then_some(global)
}

fn global_path_in(home: &Path) -> PathBuf {
    home.join(".config").join("zappac").join(CONFIG_FILE)
}
