pub mod broadcaster;
pub mod config;
pub mod game;
pub mod logger;
pub mod session;
pub mod session_rng;

pub use broadcaster::{CellRect, RenderFrame, RenderSink};
pub use config::{GameConfig, Validate};
pub use game::game_state::{GameState, NoFreeCell, TickOutcome};
pub use game::grid::{Cell, Grid, GridError};
pub use game::settings::{DifficultyTier, SessionSettings};
pub use game::snake::Snake;
pub use game::types::{Direction, GameEndReason, GameStatus, MoveClass};
pub use session::{Session, SessionController, SessionState};
pub use session_rng::SessionRng;
