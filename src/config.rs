use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use devpanel_tui::{KeyCombo, Shortcuts, ThemeKind};
use devpanel_types::MinLevel;

/// Configuration failure surfaced at mount
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("max_log_history must be at least 10, got {0}")]
    HistoryTooSmall(usize),

    #[error("unparsable shortcut: {0:?}")]
    BadShortcut(String),

    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Panel configuration, loadable from a TOML file
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DevPanelConfig {
    /// Maximum retained entries; must be at least 10
    pub max_log_history: usize,

    /// Capture outside debug builds
    pub allow_production: bool,

    /// Mirror appended entries to the real logging backend
    pub forward_to_console: bool,

    pub theme: ThemeKind,
    pub filters: FilterConfig,
    pub shortcuts: ShortcutConfig,
    pub persist: PersistConfig,
}

impl Default for DevPanelConfig {
    fn default() -> Self {
        Self {
            max_log_history: 1000,
            allow_production: false,
            forward_to_console: false,
            theme: ThemeKind::default(),
            filters: FilterConfig::default(),
            shortcuts: ShortcutConfig::default(),
            persist: PersistConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub show_timestamp: bool,
    pub show_log_level: bool,

    /// Pre-seeds the panel's kind filter; absent = show all kinds
    pub min_level: Option<MinLevel>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            show_timestamp: true,
            show_log_level: true,
            min_level: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ShortcutConfig {
    pub toggle: String,
    pub clear: String,
}

impl Default for ShortcutConfig {
    fn default() -> Self {
        Self {
            toggle: "ctrl+shift+d".to_string(),
            clear: "ctrl+l".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct PersistConfig {
    pub enabled: bool,

    /// Store file; defaults to the well-known location under the home dir
    pub path: Option<PathBuf>,
}

impl DevPanelConfig {
    /// Load from a TOML file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate bounds and shortcut strings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_log_history < 10 {
            return Err(ConfigError::HistoryTooSmall(self.max_log_history));
        }
        self.parse_shortcuts()?;
        Ok(())
    }

    /// Parse the configured shortcut strings
    pub fn parse_shortcuts(&self) -> Result<Shortcuts, ConfigError> {
        let toggle = KeyCombo::parse(&self.shortcuts.toggle)
            .ok_or_else(|| ConfigError::BadShortcut(self.shortcuts.toggle.clone()))?;
        let clear = KeyCombo::parse(&self.shortcuts.clear)
            .ok_or_else(|| ConfigError::BadShortcut(self.shortcuts.clear.clone()))?;
        Ok(Shortcuts { toggle, clear })
    }

    /// Whether interception should activate in this build
    pub fn capture_enabled(&self) -> bool {
        cfg!(debug_assertions) || self.allow_production
    }
}
