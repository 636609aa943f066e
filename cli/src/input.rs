use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use tokio::sync::mpsc::UnboundedSender;

use snake_game_core::Direction;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Steer(Direction),
    Restart,
    Quit,
    Resize(u16, u16),
}

/// Maps a raw key to a logical action. Unrecognized keys are silently
/// ignored.
pub fn map_key(key: &KeyEvent) -> Option<InputEvent> {
    match key.code {
        KeyCode::Char('w') | KeyCode::Up => Some(InputEvent::Steer(Direction::Up)),
        KeyCode::Char('s') | KeyCode::Down => Some(InputEvent::Steer(Direction::Down)),
        KeyCode::Char('a') | KeyCode::Left => Some(InputEvent::Steer(Direction::Left)),
        KeyCode::Char('d') | KeyCode::Right => Some(InputEvent::Steer(Direction::Right)),
        KeyCode::Char('r') => Some(InputEvent::Restart),
        KeyCode::Char('q') | KeyCode::Esc => Some(InputEvent::Quit),
        _ => None,
    }
}

/// Blocking terminal event loop; runs on its own thread and forwards
/// actions to the async side. Exits when the receiver is gone.
pub fn read_loop(tx: UnboundedSender<InputEvent>) {
    loop {
        match event::poll(Duration::from_millis(100)) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(_) => return,
        }
        let forwarded = match event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => map_key(&key),
            Ok(Event::Resize(cols, rows)) => Some(InputEvent::Resize(cols, rows)),
            Ok(_) => None,
            Err(_) => return,
        };
        if let Some(event) = forwarded
            && tx.send(event).is_err()
        {
            return;
        }
    }
}
