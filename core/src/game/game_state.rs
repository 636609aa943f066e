use std::fmt;

use crate::broadcaster::{CellRect, RenderFrame};
use crate::log;
use crate::session_rng::SessionRng;
use super::collision;
use super::grid::Grid;
use super::settings::SessionSettings;
use super::snake::Snake;
use super::types::{Direction, GameEndReason, GameStatus, MoveClass};

/// Apple placement found no unoccupied cell: the board is full.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoFreeCell;

impl fmt::Display for NoFreeCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no free cell left on the board")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TickOutcome {
    Continue {
        frame: RenderFrame,
        score_changed: Option<u32>,
    },
    Finished {
        reason: GameEndReason,
        final_score: u32,
    },
}

/// One game session's state: grid, snake, score, status. Mutated only by
/// `tick`; created fresh on every (re)start.
#[derive(Clone, Debug)]
pub struct GameState {
    grid: Grid,
    snake: Snake,
    score: u32,
    status: GameStatus,
    end_reason: Option<GameEndReason>,
}

impl GameState {
    pub fn new(settings: &SessionSettings, rng: &mut SessionRng) -> Self {
        let start = settings.start_index();
        let mut grid = Grid::new(settings.grid_side, settings.canvas_size);
        grid.set_occupied(start, true);

        let mut state = Self {
            grid,
            snake: Snake::new(start, Direction::Down),
            score: 0,
            status: GameStatus::Running,
            end_reason: None,
        };
        state
            .place_apple(rng)
            .expect("a fresh board always has a free cell");
        state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn end_reason(&self) -> Option<GameEndReason> {
        self.end_reason
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    /// Buffers a heading change from the input layer. No-op once the
    /// session is over or when the change would reverse the heading.
    pub fn buffer_direction(&mut self, direction: Direction) {
        if self.status == GameStatus::Running {
            self.snake.buffer_heading(direction);
        }
    }

    /// Re-derives render geometry. Callers serialize this against `tick`,
    /// so it never observes a half-updated board.
    pub fn resize(&mut self, canvas_size: f32) {
        self.grid.resize(canvas_size);
    }

    /// Advances the simulation by one step.
    pub fn tick(&mut self, rng: &mut SessionRng) -> TickOutcome {
        if self.status == GameStatus::GameOver {
            return TickOutcome::Finished {
                reason: self
                    .end_reason
                    .expect("a finished session always has an end reason"),
                final_score: self.score,
            };
        }

        self.snake.adopt_pending_heading();

        let previous = self.snake.head();
        let side = self.grid.side();
        let proposed = previous as i64 + self.snake.heading().index_delta(side);
        let vacated = self.snake.vacating_cell();

        // Classification runs against pre-tick occupancy; nothing is
        // mutated before the move is known to be safe.
        let class = collision::classify(proposed, previous, side, &self.grid, vacated);

        match class {
            MoveClass::WallCollision => self.finish(GameEndReason::WallCollision),
            MoveClass::SelfCollision => self.finish(GameEndReason::SelfCollision),
            MoveClass::AppleHit | MoveClass::Clear => {
                let new_head = proposed as usize;
                self.snake.advance(new_head);

                let mut score_changed = None;
                if class == MoveClass::AppleHit {
                    // The tail keeps the vacated snapshot: the snake grows.
                    self.grid.set_apple(new_head, false);
                    self.grid.set_occupied(new_head, true);
                    self.score += 1;
                    score_changed = Some(self.score);
                    log!("ate apple at cell {}, score {}", new_head, self.score);

                    if self.place_apple(rng).is_err() {
                        return self.finish(GameEndReason::BoardFull);
                    }
                } else {
                    // Free the tail end before occupying the new head, so
                    // a move onto the vacated cell keeps the head marked.
                    let freed = self.snake.shrink_tail();
                    self.grid.set_occupied(freed, false);
                    self.grid.set_occupied(new_head, true);
                }

                TickOutcome::Continue {
                    frame: self.render_frame(),
                    score_changed,
                }
            }
        }
    }

    fn finish(&mut self, reason: GameEndReason) -> TickOutcome {
        self.status = GameStatus::GameOver;
        self.end_reason = Some(reason);
        TickOutcome::Finished {
            reason,
            final_score: self.score,
        }
    }

    /// Marks a uniformly random unoccupied cell as the apple.
    fn place_apple(&mut self, rng: &mut SessionRng) -> Result<usize, NoFreeCell> {
        let free = self.grid.free_cells();
        if free.is_empty() {
            return Err(NoFreeCell);
        }
        let index = free[rng.random_range(0..free.len())];
        self.grid.set_apple(index, true);
        log!("apple placed at cell {}", index);
        Ok(index)
    }

    fn render_frame(&self) -> RenderFrame {
        let size = self.grid.cell_size();
        let rect = |index: usize| {
            let cell = self
                .grid
                .cell(index)
                .expect("snake and apple cells are always in bounds");
            CellRect { x: cell.x, y: cell.y, size }
        };

        RenderFrame {
            head: rect(self.snake.head()),
            tail: self.snake.tail().map(rect).collect(),
            tail_hue: self.snake.tail_len() as f32 / 30.0 * 100.0,
            apple: self.grid.apple_index().map(rect),
        }
    }

    #[cfg(test)]
    pub(crate) fn force_apple(&mut self, index: usize) {
        if let Some(current) = self.grid.apple_index() {
            self.grid.set_apple(current, false);
        }
        self.grid.set_apple(index, true);
    }

    #[cfg(test)]
    pub(crate) fn with_layout(
        settings: &SessionSettings,
        head: usize,
        tail: Vec<usize>,
        heading: Direction,
    ) -> Self {
        let mut grid = Grid::new(settings.grid_side, settings.canvas_size);
        grid.set_occupied(head, true);
        for segment in &tail {
            grid.set_occupied(*segment, true);
        }
        Self {
            grid,
            snake: Snake::from_parts(head, tail, heading),
            score: 0,
            status: GameStatus::Running,
            end_reason: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(grid_side: usize) -> SessionSettings {
        SessionSettings {
            grid_side,
            canvas_size: 800.0,
            tick_interval: std::time::Duration::from_millis(300),
        }
    }

    fn new_state(grid_side: usize, seed: u64) -> (GameState, SessionRng) {
        let mut rng = SessionRng::new(seed);
        let state = GameState::new(&settings(grid_side), &mut rng);
        (state, rng)
    }

    /// Ticks once with the apple parked on a cell the move cannot reach.
    fn tick_without_apple(state: &mut GameState, rng: &mut SessionRng) -> TickOutcome {
        let side = state.grid.side();
        state.force_apple(side * side - 1);
        state.tick(rng)
    }

    #[test]
    fn test_new_state_occupies_start_and_places_one_apple() {
        let (state, _) = new_state(20, 42);
        assert_eq!(state.snake().head(), 30);
        assert_eq!(state.snake().tail_len(), 0);
        assert_eq!(state.snake().heading(), Direction::Down);
        assert!(state.grid().is_occupied(30));
        assert_eq!(state.grid().apple_count(), 1);
        assert_ne!(state.grid().apple_index(), Some(30));
    }

    #[test]
    fn test_moving_up_decrements_by_side_until_wall() {
        let (mut state, mut rng) = new_state(20, 42);
        state.buffer_direction(Direction::Right);
        assert!(matches!(
            tick_without_apple(&mut state, &mut rng),
            TickOutcome::Continue { .. }
        ));
        state.buffer_direction(Direction::Up);

        // Head is at 31 after the right step; one up step per tick.
        let mut expected = 31;
        loop {
            let outcome = tick_without_apple(&mut state, &mut rng);
            match outcome {
                TickOutcome::Continue { .. } => {
                    expected -= 20;
                    assert_eq!(state.snake().head(), expected);
                }
                TickOutcome::Finished { reason, final_score } => {
                    // The wall hit happens where the index would go negative.
                    assert_eq!(expected, 11);
                    assert_eq!(reason, GameEndReason::WallCollision);
                    assert_eq!(final_score, 0);
                    break;
                }
            }
        }
        assert_eq!(state.status(), GameStatus::GameOver);
    }

    #[test]
    fn test_direction_reversal_is_rejected() {
        let (mut state, mut rng) = new_state(20, 42);
        state.buffer_direction(Direction::Up);
        let before = state.snake().head();
        tick_without_apple(&mut state, &mut rng);
        // Heading Down + buffered Up leaves the heading unchanged.
        assert_eq!(state.snake().head(), before + 20);
        assert_eq!(state.snake().heading(), Direction::Down);
    }

    #[test]
    fn test_eating_apple_grows_tail_and_score() {
        let (mut state, mut rng) = new_state(20, 42);
        state.force_apple(50);

        let outcome = state.tick(&mut rng);
        let TickOutcome::Continue { frame, score_changed } = outcome else {
            panic!("apple move must continue the session");
        };

        assert_eq!(score_changed, Some(1));
        assert_eq!(state.score(), 1);
        assert_eq!(state.snake().head(), 50);
        assert_eq!(state.snake().tail_len(), 1);
        assert_eq!(state.snake().tail_segment(0), Some(30));
        assert!(state.grid().is_occupied(30));
        assert!(state.grid().is_occupied(50));

        // Exactly one fresh apple, somewhere else.
        assert_eq!(state.grid().apple_count(), 1);
        assert_ne!(state.grid().apple_index(), Some(50));
        assert_eq!(frame.tail.len(), 1);
    }

    #[test]
    fn test_apple_count_stays_one_across_many_ticks() {
        let (mut state, mut rng) = new_state(20, 7);
        for step in 0..6 {
            // Zig-zag down the board, eating on every other tick.
            if step % 2 == 0 {
                state.force_apple(state.snake().head() + 20);
            } else {
                state.force_apple(399);
            }
            let outcome = state.tick(&mut rng);
            assert!(matches!(outcome, TickOutcome::Continue { .. }));
            assert_eq!(state.grid().apple_count(), 1);
        }
        assert_eq!(state.score(), 3);
        assert_eq!(state.snake().tail_len(), 3);
    }

    #[test]
    fn test_self_collision_ends_game_without_scoring() {
        let (mut state, mut rng) = new_state(20, 42);

        // Grow a four-segment tail straight down the middle column.
        for target in [50, 70, 90, 110] {
            state.force_apple(target);
            state.tick(&mut rng);
        }
        assert_eq!(state.score(), 4);
        assert_eq!(state.snake().tail_len(), 4);

        // Hook back into the body: left, up, then right into cell 90.
        for direction in [Direction::Left, Direction::Up] {
            state.buffer_direction(direction);
            let outcome = tick_without_apple(&mut state, &mut rng);
            assert!(matches!(outcome, TickOutcome::Continue { .. }));
        }
        state.buffer_direction(Direction::Right);
        let outcome = tick_without_apple(&mut state, &mut rng);

        assert_eq!(
            outcome,
            TickOutcome::Finished {
                reason: GameEndReason::SelfCollision,
                final_score: 4,
            }
        );
        assert_eq!(state.score(), 4);
        assert_eq!(state.status(), GameStatus::GameOver);
    }

    #[test]
    fn test_right_edge_wrap_is_wall_collision() {
        let mut state = GameState::with_layout(&settings(20), 19, vec![], Direction::Right);
        let mut rng = SessionRng::new(42);
        state.force_apple(399);

        let outcome = state.tick(&mut rng);
        assert_eq!(
            outcome,
            TickOutcome::Finished {
                reason: GameEndReason::WallCollision,
                final_score: 0,
            }
        );
    }

    #[test]
    fn test_left_edge_wrap_is_wall_collision() {
        let mut state = GameState::with_layout(&settings(20), 20, vec![], Direction::Left);
        let mut rng = SessionRng::new(42);
        state.force_apple(399);

        let outcome = state.tick(&mut rng);
        assert_eq!(
            outcome,
            TickOutcome::Finished {
                reason: GameEndReason::WallCollision,
                final_score: 0,
            }
        );
    }

    #[test]
    fn test_marching_down_to_the_apple() {
        let (mut state, mut rng) = new_state(20, 42);
        let k = 5;
        let apple = 30 + 20 * k;
        state.force_apple(apple);

        for step in 1..k {
            let outcome = state.tick(&mut rng);
            assert!(matches!(outcome, TickOutcome::Continue { .. }));
            assert_eq!(state.snake().head(), 30 + 20 * step);
            assert_eq!(state.score(), 0);
        }

        let outcome = state.tick(&mut rng);
        assert!(matches!(outcome, TickOutcome::Continue { .. }));
        assert_eq!(state.snake().head(), apple);
        assert_eq!(state.score(), 1);
        assert_eq!(state.snake().tail_len(), 1);
        assert_eq!(state.snake().tail_segment(0), Some(30 + 20 * (k - 1)));
    }

    #[test]
    fn test_moving_onto_vacated_tail_cell_is_clear() {
        // Head 4 with tail 1 <- 0 <- 3 on a 3x3 board; moving left onto 3
        // lands exactly on the cell the tail end frees this tick.
        let mut state =
            GameState::with_layout(&settings(3), 4, vec![1, 0, 3], Direction::Down);
        let mut rng = SessionRng::new(42);
        state.force_apple(8);
        state.buffer_direction(Direction::Left);

        let outcome = state.tick(&mut rng);
        assert!(matches!(outcome, TickOutcome::Continue { .. }));
        assert_eq!(state.snake().head(), 3);
        assert!(state.grid().is_occupied(3));
        assert_eq!(state.snake().tail_segment(0), Some(4));
    }

    #[test]
    fn test_filling_the_board_ends_with_win() {
        // 3x3 board, eight cells of snake, apple on the last free cell.
        // History: 6 up 3 up 0, right 1 right 2, down 5 down 8, left 7.
        let mut state = GameState::with_layout(
            &settings(3),
            7,
            vec![8, 5, 2, 1, 0, 3, 6],
            Direction::Left,
        );
        let mut rng = SessionRng::new(42);
        state.force_apple(4);
        state.buffer_direction(Direction::Up);

        let outcome = state.tick(&mut rng);
        assert_eq!(
            outcome,
            TickOutcome::Finished {
                reason: GameEndReason::BoardFull,
                final_score: 1,
            }
        );
        assert_eq!(state.snake().tail_len(), 8);
    }

    #[test]
    fn test_tick_after_game_over_is_terminal_noop() {
        let mut state = GameState::with_layout(&settings(20), 19, vec![], Direction::Right);
        let mut rng = SessionRng::new(42);
        state.force_apple(399);
        state.tick(&mut rng);

        let again = state.tick(&mut rng);
        assert_eq!(
            again,
            TickOutcome::Finished {
                reason: GameEndReason::WallCollision,
                final_score: 0,
            }
        );
    }

    #[test]
    fn test_frame_reports_hue_and_apple_rect() {
        let (mut state, mut rng) = new_state(20, 42);
        state.force_apple(50);
        let TickOutcome::Continue { frame, .. } = state.tick(&mut rng) else {
            panic!("apple move must continue the session");
        };

        let cell_size = 800.0 / 20.0;
        assert_eq!(frame.head.size, cell_size);
        // Head is at cell 50: row 2, column 10.
        assert_eq!(frame.head.x, 10.0 * cell_size);
        assert_eq!(frame.head.y, 2.0 * cell_size);
        assert_eq!(frame.tail_hue, 1.0 / 30.0 * 100.0);
        assert!(frame.apple.is_some());
    }
}
