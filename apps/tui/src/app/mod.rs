// App module for csv-chart-explorer
// Handles terminal session state and the side effects behind key presses

pub mod actions;
pub mod input;
pub mod state;

pub use input::handle_input;
pub use state::{App, InputState};
