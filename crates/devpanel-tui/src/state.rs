use devpanel_core::FilterState;
use devpanel_types::{LogKind, MinLevel};

/// View state for the overlay panel
pub struct PanelState {
    /// Whether the overlay is shown
    pub visible: bool,

    /// Scroll offset from the top of the filtered view
    pub scroll: usize,

    /// Follow the newest entry while true
    pub follow: bool,

    /// Search input mode
    pub search_active: bool,
    pub search_input: String,

    /// Active filter over the buffer
    pub filter: FilterState,

    /// Column toggles
    pub show_timestamp: bool,
    pub show_log_level: bool,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            visible: false,
            scroll: 0,
            follow: true,
            search_active: false,
            search_input: String::new(),
            filter: FilterState::new(),
            show_timestamp: true,
            show_log_level: true,
        }
    }
}

impl PanelState {
    /// Seed the filter from the configured minimum severity
    pub fn with_min_level(mut self, min: MinLevel) -> Self {
        self.filter = FilterState::from_min_level(min);
        self
    }

    pub fn toggle_visible(&mut self) {
        self.visible = !self.visible;
    }

    // ------------------------------------------------------------------
    // Scrolling
    // ------------------------------------------------------------------

    pub fn scroll_up(&mut self, n: usize) {
        self.follow = false;
        self.scroll = self.scroll.saturating_sub(n);
    }

    pub fn scroll_down(&mut self, n: usize) {
        // Render clamps to the actual filtered count
        self.scroll = self.scroll.saturating_add(n);
    }

    pub fn scroll_to_top(&mut self) {
        self.follow = false;
        self.scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow = true;
    }

    // ------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------

    pub fn start_search(&mut self) {
        self.search_active = true;
        self.search_input = self.filter.query().to_string();
    }

    pub fn cancel_search(&mut self) {
        self.search_active = false;
        self.search_input.clear();
    }

    pub fn search_input_char(&mut self, c: char) {
        self.search_input.push(c);
    }

    pub fn search_input_backspace(&mut self) {
        self.search_input.pop();
    }

    /// Apply the typed query and leave search mode
    pub fn apply_search(&mut self) {
        self.filter.set_query(self.search_input.clone());
        self.search_active = false;
        self.scroll = 0;
    }

    pub fn clear_search(&mut self) {
        self.filter.set_query(String::new());
        self.search_input.clear();
    }

    // ------------------------------------------------------------------
    // Filter toggles
    // ------------------------------------------------------------------

    pub fn toggle_kind(&mut self, kind: LogKind) {
        self.filter.toggle_kind(kind);
        self.scroll = 0;
    }

    pub fn toggle_tag(&mut self, tag: &str) {
        self.filter.toggle_tag(tag);
        self.scroll = 0;
    }
}
