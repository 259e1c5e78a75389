use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use plugwatch_protocol::GRANULARITIES;

use crate::app::{Action, App, AppView};

pub fn handle_key(app: &App, key: KeyEvent) -> Action {
    match app.view {
        AppView::Main => handle_main_keys(key),
        AppView::Help => handle_help_keys(key),
    }
}

fn handle_main_keys(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
        KeyCode::Char('?') | KeyCode::Char('/') => Action::ToggleHelp,
        KeyCode::Right | KeyCode::Char('l') => Action::NextGranularity,
        KeyCode::Left | KeyCode::Char('h') => Action::PrevGranularity,
        KeyCode::Char('r') => Action::Refresh,
        KeyCode::Char(c @ '1'..='6') => {
            let index = c as usize - '1' as usize;
            Action::SetGranularity(GRANULARITIES[index])
        }
        _ => Action::None,
    }
}

fn handle_help_keys(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => Action::ToggleHelp,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugwatch_protocol::Granularity;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn digits_map_to_granularities_in_selector_order() {
        assert_eq!(
            handle_main_keys(key(KeyCode::Char('1'))),
            Action::SetGranularity(Granularity::Minute)
        );
        assert_eq!(
            handle_main_keys(key(KeyCode::Char('2'))),
            Action::SetGranularity(Granularity::Hourly)
        );
        assert_eq!(
            handle_main_keys(key(KeyCode::Char('6'))),
            Action::SetGranularity(Granularity::Annual)
        );
    }

    #[test]
    fn arrows_cycle_granularity() {
        assert_eq!(handle_main_keys(key(KeyCode::Right)), Action::NextGranularity);
        assert_eq!(handle_main_keys(key(KeyCode::Left)), Action::PrevGranularity);
    }

    #[test]
    fn quit_keys_quit() {
        assert_eq!(handle_main_keys(key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(handle_main_keys(key(KeyCode::Esc)), Action::Quit);
        assert_eq!(
            handle_main_keys(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
    }

    #[test]
    fn unmapped_keys_do_nothing() {
        assert_eq!(handle_main_keys(key(KeyCode::Char('z'))), Action::None);
    }
}
