//! Terminal UI built on ratatui

pub mod animations;
pub mod app;
pub mod layout;
pub mod theme;
pub mod view;

pub use animations::{Spinner, StatusIndicator, StatusState};
pub use app::VoiceQueryApp;
pub use theme::Theme;
pub use view::{Banner, Picker, ViewState};
