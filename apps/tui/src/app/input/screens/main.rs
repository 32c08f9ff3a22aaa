use crate::app::state::App;
use crossterm::event::KeyCode;

pub fn handle_browse_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Char('o') => app.begin_path_entry(),
        KeyCode::Char('u') => app.submit_upload(),
        KeyCode::Char('e') => app.export_current_charts(),
        KeyCode::Left => app.previous_chart(),
        KeyCode::Right => app.next_chart(),
        KeyCode::Up => app.scroll_docs_up(),
        KeyCode::Down => app.scroll_docs_down(),
        KeyCode::Char('q') => {
            app.running = false;
        }
        _ => {}
    }
}

pub fn handle_path_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Char(c) => app.current_input.push(c),
        KeyCode::Backspace => {
            app.current_input.pop();
        }
        KeyCode::Enter => app.select_path(),
        KeyCode::Esc => app.cancel_path_entry(),
        _ => {}
    }
}
