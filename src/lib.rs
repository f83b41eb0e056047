//! devpanel — an embeddable developer console overlay
//!
//! The host mounts a [`DevPanel`] over its terminal UI: the panel captures
//! the application's log traffic through a `tracing` layer, keeps a bounded
//! history, and renders it as an overlay with severity filtering, tag
//! filtering, and free-text search.
//!
//! ```no_run
//! use devpanel::{DevPanel, DevPanelConfig};
//! use tracing_subscriber::prelude::*;
//!
//! let panel = DevPanel::builder().mount(DevPanelConfig::default()).unwrap();
//! tracing_subscriber::registry().with(panel.capture_layer()).init();
//! ```

mod config;

pub use config::{ConfigError, DevPanelConfig, FilterConfig, PersistConfig, ShortcutConfig};
pub use devpanel_core::{
    CaptureLayer, ConsoleOptions, DevConsole, FilterState, KindCounts, LogSink, LogStore,
    MIN_LOG_HISTORY,
};
pub use devpanel_core::values;
pub use devpanel_tui::{DevPanelOverlay, PanelAction, PanelState, Shortcuts, Theme, ThemeKind};
pub use devpanel_types::{ErrorRecord, LogEntry, LogKind, LogValue, MinLevel};

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;

type InitHook = Box<dyn FnOnce(&mut DevPanelConfig)>;
type ReadyHook = Box<dyn FnOnce(&DevConsole)>;
type EntryHook = Box<dyn Fn(&LogEntry) + Send + Sync>;

/// Builder carrying the host's extension hooks
#[derive(Default)]
pub struct DevPanelBuilder {
    before_init: Option<InitHook>,
    after_init: Option<ReadyHook>,
    entry_hooks: Vec<EntryHook>,
}

impl DevPanelBuilder {
    /// Inspect or adjust the configuration before the buffer starts capturing
    pub fn before_init<F>(mut self, hook: F) -> Self
    where
        F: FnOnce(&mut DevPanelConfig) + 'static,
    {
        self.before_init = Some(Box::new(hook));
        self
    }

    /// Run once the console is constructed, before returning from mount
    pub fn after_init<F>(mut self, hook: F) -> Self
    where
        F: FnOnce(&DevConsole) + 'static,
    {
        self.after_init = Some(Box::new(hook));
        self
    }

    /// Invoked once per appended entry (external log shipping)
    pub fn on_entry<F>(mut self, hook: F) -> Self
    where
        F: Fn(&LogEntry) + Send + Sync + 'static,
    {
        self.entry_hooks.push(Box::new(hook));
        self
    }

    /// Validate the configuration and construct the mounted panel
    pub fn mount(self, mut config: DevPanelConfig) -> Result<DevPanel, ConfigError> {
        if let Some(hook) = self.before_init {
            hook(&mut config);
        }
        config.validate()?;
        let shortcuts = config.parse_shortcuts()?;

        let store = if config.persist.enabled {
            match &config.persist.path {
                Some(path) => Some(LogStore::at(path.clone())),
                None => LogStore::default_location(),
            }
        } else {
            None
        };

        let console = DevConsole::new(ConsoleOptions {
            max_log_history: config.max_log_history,
            forward_to_console: config.forward_to_console,
            store,
        });

        for hook in self.entry_hooks {
            console.on_entry(move |entry| hook(entry));
        }

        if config.capture_enabled() {
            console.intercept();
        }

        if let Some(hook) = self.after_init {
            hook(&console);
        }

        let mut state = PanelState::default();
        if let Some(min) = config.filters.min_level {
            state = state.with_min_level(min);
        }
        state.show_timestamp = config.filters.show_timestamp;
        state.show_log_level = config.filters.show_log_level;

        Ok(DevPanel {
            theme: config.theme.resolve(),
            console,
            state,
            shortcuts,
            config,
            mounted: true,
        })
    }
}

/// A mounted console panel
pub struct DevPanel {
    console: DevConsole,
    state: PanelState,
    theme: Theme,
    shortcuts: Shortcuts,
    config: DevPanelConfig,
    mounted: bool,
}

impl DevPanel {
    pub fn builder() -> DevPanelBuilder {
        DevPanelBuilder::default()
    }

    /// Mount with no hooks
    pub fn mount(config: DevPanelConfig) -> Result<Self, ConfigError> {
        Self::builder().mount(config)
    }

    /// The underlying console context
    pub fn console(&self) -> &DevConsole {
        &self.console
    }

    /// A capture layer for the host's subscriber stack
    pub fn capture_layer(&self) -> CaptureLayer {
        self.console.capture_layer()
    }

    pub fn is_visible(&self) -> bool {
        self.state.visible
    }

    /// Feed a key event to the panel; returns true when consumed
    ///
    /// The configured shortcuts work whether or not the overlay is shown;
    /// everything else is handled only while visible (the overlay is modal).
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if let Some(action) = self.shortcuts.action(key) {
            match action {
                PanelAction::Toggle => self.state.toggle_visible(),
                PanelAction::Clear => {
                    self.console.clear();
                    self.state.scroll = 0;
                }
            }
            return true;
        }

        if !self.state.visible {
            return false;
        }

        if self.state.search_active {
            match key.code {
                KeyCode::Enter => self.state.apply_search(),
                KeyCode::Esc => self.state.cancel_search(),
                KeyCode::Backspace => self.state.search_input_backspace(),
                KeyCode::Char(c) => self.state.search_input_char(c),
                _ => {}
            }
            return true;
        }

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.scroll_down(1),
            KeyCode::Char('k') | KeyCode::Up => self.state.scroll_up(1),
            KeyCode::PageDown => self.state.scroll_down(20),
            KeyCode::PageUp => self.state.scroll_up(20),
            KeyCode::Char('g') => self.state.scroll_to_top(),
            KeyCode::Char('G') => self.state.scroll_to_bottom(),
            KeyCode::Char('f') => self.state.follow = !self.state.follow,
            KeyCode::Char('/') => self.state.start_search(),
            KeyCode::Char('n') => self.state.clear_search(),
            KeyCode::Char('t') => self.state.show_timestamp = !self.state.show_timestamp,
            KeyCode::Char('v') => self.state.show_log_level = !self.state.show_log_level,
            KeyCode::Char('1') => self.state.toggle_kind(LogKind::Log),
            KeyCode::Char('2') => self.state.toggle_kind(LogKind::Info),
            KeyCode::Char('3') => self.state.toggle_kind(LogKind::Warn),
            KeyCode::Char('4') => self.state.toggle_kind(LogKind::Error),
            KeyCode::Char('c') => {
                self.console.clear();
                self.state.scroll = 0;
            }
            KeyCode::Esc => self.state.visible = false,
            _ => {}
        }
        true
    }

    /// Render the overlay into the host's frame
    pub fn render(&mut self, frame: &mut Frame) {
        DevPanelOverlay::render(frame, &mut self.state, &self.console, &self.theme);
    }

    /// Stop capturing and flush the history to the store; idempotent
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.console.restore();
        if self.config.persist.enabled {
            self.console.flush_to_store();
        }
        self.mounted = false;
    }
}

impl Drop for DevPanel {
    fn drop(&mut self) {
        // Best effort teardown on drop
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    #[test]
    fn test_mount_starts_capture_in_debug_builds() {
        let panel = DevPanel::mount(DevPanelConfig::default()).unwrap();
        assert_eq!(panel.console().is_intercepting(), cfg!(debug_assertions));
    }

    #[test]
    fn test_before_init_can_adjust_config() {
        let panel = DevPanel::builder()
            .before_init(|config| config.max_log_history = 50)
            .mount(DevPanelConfig::default())
            .unwrap();
        panel.console().log(values!["x"]);
        assert_eq!(panel.console().len(), 1);
    }

    #[test]
    fn test_mount_rejects_invalid_history() {
        let config = DevPanelConfig {
            max_log_history: 3,
            ..DevPanelConfig::default()
        };
        assert!(DevPanel::mount(config).is_err());
    }

    #[test]
    fn test_entry_hook_ships_entries() {
        use std::sync::{Arc, Mutex};

        let shipped = Arc::new(Mutex::new(Vec::new()));
        let shipped_clone = shipped.clone();
        let panel = DevPanel::builder()
            .on_entry(move |entry| shipped_clone.lock().unwrap().push(entry.message()))
            .mount(DevPanelConfig::default())
            .unwrap();

        panel.console().warn(values!["disk almost full"]);
        assert_eq!(*shipped.lock().unwrap(), vec!["disk almost full".to_string()]);
    }

    #[test]
    fn test_toggle_shortcut_and_modal_keys() {
        let mut panel = DevPanel::mount(DevPanelConfig::default()).unwrap();
        assert!(!panel.is_visible());

        let toggle = KeyEvent::new(
            KeyCode::Char('d'),
            KeyModifiers::CONTROL | KeyModifiers::SHIFT,
        );
        assert!(panel.handle_key(&toggle));
        assert!(panel.is_visible());

        // Plain keys are consumed while visible
        assert!(panel.handle_key(&KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE)));

        // Esc hides; keys then pass through again
        assert!(panel.handle_key(&KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(!panel.is_visible());
        assert!(!panel.handle_key(&KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_clear_shortcut_empties_buffer() {
        let mut panel = DevPanel::mount(DevPanelConfig::default()).unwrap();
        panel.console().info(values!["one"]);
        let clear = KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL);
        assert!(panel.handle_key(&clear));
        assert!(panel.console().is_empty());
    }

    #[test]
    fn test_unmount_is_idempotent() {
        let mut panel = DevPanel::mount(DevPanelConfig::default()).unwrap();
        panel.console().intercept();
        panel.unmount();
        assert!(!panel.console().is_intercepting());
        panel.unmount();
        assert!(!panel.console().is_intercepting());
    }
}
