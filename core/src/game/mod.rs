pub mod collision;
pub mod game_state;
pub mod grid;
pub mod settings;
pub mod snake;
pub mod types;
