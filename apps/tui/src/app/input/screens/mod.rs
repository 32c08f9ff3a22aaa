use crate::app::state::{App, InputState};
use crossterm::event::KeyCode;

mod help;
mod main;

pub fn dispatch_input(app: &mut App, key: KeyCode) {
    if help::handle_help_toggle(app, key) {
        return;
    }

    match app.input_state {
        InputState::Browsing => main::handle_browse_input(app, key),
        InputState::EditingPath => main::handle_path_input(app, key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csv_chart_explorer::config::AppConfig;
    use csv_chart_explorer::UploadClient;

    fn app() -> App {
        let config = AppConfig::from_lookup(|_| None);
        let client = UploadClient::new(&config.server_url)
            .unwrap_or_else(|e| panic!("default server URL should be valid: {e}"));
        App::new(client, &config)
    }

    #[test]
    fn help_swallows_keys_until_closed() {
        let mut app = app();

        dispatch_input(&mut app, KeyCode::F(1));
        dispatch_input(&mut app, KeyCode::Char('q'));
        assert!(app.show_help);
        assert!(app.running);

        dispatch_input(&mut app, KeyCode::Esc);
        dispatch_input(&mut app, KeyCode::Char('q'));
        assert!(!app.show_help);
        assert!(!app.running);
    }

    #[test]
    fn typed_path_is_not_treated_as_commands() {
        let mut app = app();

        dispatch_input(&mut app, KeyCode::Char('o'));
        for c in "quota.csv".chars() {
            dispatch_input(&mut app, KeyCode::Char(c));
        }
        dispatch_input(&mut app, KeyCode::Backspace);

        assert!(app.running);
        assert_eq!(app.current_input, "quota.cs");
        assert_eq!(app.input_state, InputState::EditingPath);

        dispatch_input(&mut app, KeyCode::Esc);
        assert_eq!(app.input_state, InputState::Browsing);
    }
}
