use std::io::{self, Write, stdout};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{execute, queue};
use tokio::sync::mpsc::UnboundedSender;

use snake_game_core::{CellRect, GameEndReason, RenderFrame, RenderSink, log};

#[derive(Clone, Copy, Debug)]
pub enum UiEvent {
    GameOver { score: u32, reason: GameEndReason },
}

/// Puts the terminal into raw mode for the lifetime of the game and
/// restores it on drop, including on error paths.
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), Hide, Clear(ClearType::All))?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        execute!(stdout(), ResetColor, Show).ok();
        terminal::disable_raw_mode().ok();
    }
}

/// Paints frames onto the terminal and forwards the game-over event to the
/// main loop.
#[derive(Clone)]
pub struct TerminalSink {
    board_rows: u16,
    score: Arc<AtomicU32>,
    events: UnboundedSender<UiEvent>,
}

impl TerminalSink {
    pub fn new(board_rows: u16, events: UnboundedSender<UiEvent>) -> Self {
        Self {
            board_rows,
            score: Arc::new(AtomicU32::new(0)),
            events,
        }
    }

    /// Clears the cached score line for a fresh session.
    pub fn reset(&self) {
        self.score.store(0, Ordering::Relaxed);
    }
}

impl RenderSink for TerminalSink {
    async fn frame(&self, frame: RenderFrame) {
        let score = self.score.load(Ordering::Relaxed);
        if let Err(err) = draw_frame(&frame, self.board_rows, score) {
            log!("render error: {}", err);
        }
    }

    async fn score_changed(&self, new_score: u32) {
        self.score.store(new_score, Ordering::Relaxed);
    }

    async fn game_over(&self, final_score: u32, reason: GameEndReason) {
        let _ = self.events.send(UiEvent::GameOver {
            score: final_score,
            reason,
        });
    }
}

fn cell_position(rect: &CellRect) -> (u16, u16) {
    // One terminal column per grid column; the rects carry render-space
    // coordinates, so divide the size back out.
    let col = (rect.x / rect.size).round() as u16;
    let row = (rect.y / rect.size).round() as u16;
    (col, row)
}

fn draw_frame(frame: &RenderFrame, board_rows: u16, score: u32) -> io::Result<()> {
    let mut out = stdout();
    queue!(out, Clear(ClearType::All))?;

    if let Some(apple) = frame.apple {
        let (col, row) = cell_position(&apple);
        queue!(out, MoveTo(col, row), SetForegroundColor(Color::Red), Print('*'))?;
    }

    let tail_color = hue_color(frame.tail_hue);
    for rect in &frame.tail {
        let (col, row) = cell_position(rect);
        queue!(out, MoveTo(col, row), SetForegroundColor(tail_color), Print('o'))?;
    }

    let (col, row) = cell_position(&frame.head);
    queue!(out, MoveTo(col, row), SetForegroundColor(Color::Blue), Print('O'))?;

    queue!(
        out,
        ResetColor,
        MoveTo(0, board_rows),
        Print(format!("Score: {}", score))
    )?;
    out.flush()
}

pub fn draw_game_over(board_rows: u16, score: u32, reason: GameEndReason) -> io::Result<()> {
    let message = match reason {
        GameEndReason::BoardFull => format!("You win! Final score: {}", score),
        GameEndReason::WallCollision | GameEndReason::SelfCollision => {
            format!("Game over! Final score: {}", score)
        }
    };
    let mut out = stdout();
    queue!(
        out,
        MoveTo(0, board_rows + 1),
        Clear(ClearType::CurrentLine),
        Print(message),
        MoveTo(0, board_rows + 2),
        Print("Press r to restart, q to quit")
    )?;
    out.flush()
}

/// Maps the frame's tail hue to a terminal RGB color, at 50% saturation
/// and lightness.
fn hue_color(hue: f32) -> Color {
    let (r, g, b) = hsl_to_rgb(hue / 360.0, 0.5, 0.5);
    Color::Rgb { r, g, b }
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (u8, u8, u8) {
    fn channel(p: f32, q: f32, mut t: f32) -> f32 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 1.0 / 2.0 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    (
        (channel(p, q, h + 1.0 / 3.0) * 255.0) as u8,
        (channel(p, q, h) * 255.0) as u8,
        (channel(p, q, h - 1.0 / 3.0) * 255.0) as u8,
    )
}
