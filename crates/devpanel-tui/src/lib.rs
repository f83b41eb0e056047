//! Overlay rendering for devpanel
//!
//! This crate provides the in-app panel: view state, shortcut parsing,
//! theming, and the ratatui overlay widget.

mod panel;
mod shortcuts;
mod state;
mod theme;

pub use panel::DevPanelOverlay;
pub use shortcuts::{KeyCombo, PanelAction, Shortcuts};
pub use state::PanelState;
pub use theme::{Theme, ThemeKind};
