//! Core types for the TUI application.

use plugwatch_protocol::Granularity;

/// Actions that can be performed in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    ToggleHelp,
    NextGranularity,
    PrevGranularity,
    SetGranularity(Granularity),
    Refresh,
    None,
}

/// Current view/screen of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppView {
    Main,
    Help,
}
