use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Screen};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    Quit,
    /// Run the address search for the typed term
    SearchAddresses,
    /// Store the highlighted candidate as the entry and start refreshing
    SelectCurrentAddress,
    /// Ask the scheduler for an immediate refresh
    RefreshNow,
    /// Forget the entry and go back to searching
    ChangeAddress,
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Backspace, Char, Down, Enter, Esc, Right, Tab, Up};

    // Global quit shortcuts
    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    match app.screen {
        Screen::AddressSearch => match key.code {
            Esc => Action::Quit,
            Up => {
                app.candidate_index = app.candidate_index.saturating_sub(1);
                Action::None
            }
            Down => {
                if app.candidate_index + 1 < app.candidates.len() {
                    app.candidate_index += 1;
                }
                Action::None
            }
            Char(character) => {
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT)
                {
                    app.address_input.push(character);
                }
                Action::None
            }
            Backspace => {
                app.address_input.pop();
                Action::None
            }
            Enter => Action::SearchAddresses,
            Right | Tab => Action::SelectCurrentAddress,
            _ => Action::None,
        },

        Screen::DatesView => match key.code {
            Char('q') | Esc => Action::Quit,
            Char('r') => Action::RefreshNow,
            Char('c') => Action::ChangeAddress,
            _ => Action::None,
        },
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use binbuddy_core::model::{AddressCandidate, LocationId};
    use binbuddy_provider_blacktown::{Endpoints, plugin};
    use reqwest::Client;

    use super::*;
    use crate::config::EntryStore;

    fn app() -> App {
        App::new(
            plugin(Client::new(), Endpoints::default()),
            EntryStore::new(PathBuf::from("unused/entry.json")),
        )
    }

    fn press(app: &mut App, code: KeyCode) -> Action {
        handle_key_event(KeyEvent::new(code, KeyModifiers::NONE), app)
    }

    #[test]
    fn typing_then_enter_searches() {
        let mut app = app();

        for character in "1 Test St".chars() {
            assert_eq!(press(&mut app, KeyCode::Char(character)), Action::None);
        }
        press(&mut app, KeyCode::Backspace);

        assert_eq!(app.address_input, "1 Test S");
        assert_eq!(press(&mut app, KeyCode::Enter), Action::SearchAddresses);
    }

    #[test]
    fn candidate_cursor_stays_in_bounds() {
        let mut app = app();
        app.candidates = ["123", "456"]
            .into_iter()
            .map(|id| AddressCandidate {
                label: format!("{id} Test St"),
                location_id: LocationId(id.to_owned()),
            })
            .collect();

        press(&mut app, KeyCode::Up);
        assert_eq!(app.candidate_index, 0);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.candidate_index, 1);
        assert_eq!(press(&mut app, KeyCode::Tab), Action::SelectCurrentAddress);
    }

    #[test]
    fn dates_view_shortcuts() {
        let mut app = app();
        app.screen = Screen::DatesView;

        assert_eq!(press(&mut app, KeyCode::Char('r')), Action::RefreshNow);
        assert_eq!(press(&mut app, KeyCode::Char('c')), Action::ChangeAddress);
        assert_eq!(press(&mut app, KeyCode::Char('q')), Action::Quit);
    }
}
