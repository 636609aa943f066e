use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::interval;

use crate::broadcaster::RenderSink;
use crate::config::GameConfig;
use crate::game::game_state::{GameState, TickOutcome};
use crate::game::settings::{DifficultyTier, SessionSettings};
use crate::game::types::Direction;
use crate::log;
use crate::session_rng::SessionRng;

#[derive(Clone)]
pub struct SessionState {
    pub game: Arc<Mutex<GameState>>,
    pub tick: Arc<Mutex<u64>>,
    pub rng: Arc<Mutex<SessionRng>>,
    pub tick_interval: Duration,
}

impl SessionState {
    pub fn create(settings: &SessionSettings, seed: u64) -> Self {
        let mut rng = SessionRng::new(seed);
        let game = GameState::new(settings, &mut rng);
        Self {
            game: Arc::new(Mutex::new(game)),
            tick: Arc::new(Mutex::new(0u64)),
            rng: Arc::new(Mutex::new(rng)),
            tick_interval: settings.tick_interval,
        }
    }
}

pub struct Session;

impl Session {
    /// Drives the session to completion: one simulation step per interval
    /// firing, outcomes forwarded to the sink. Returns the final score.
    /// Leaving this loop is the only way the periodic timer stops.
    pub async fn run(state: SessionState, sink: impl RenderSink) -> u32 {
        let mut tick_timer = interval(state.tick_interval);

        loop {
            tick_timer.tick().await;

            let outcome = {
                let mut game = state.game.lock().await;
                let mut rng = state.rng.lock().await;
                game.tick(&mut rng)
            };

            let mut tick_value = state.tick.lock().await;
            *tick_value += 1;
            drop(tick_value);

            match outcome {
                TickOutcome::Continue { frame, score_changed } => {
                    if let Some(score) = score_changed {
                        sink.score_changed(score).await;
                    }
                    sink.frame(frame).await;
                }
                TickOutcome::Finished { reason, final_score } => {
                    log!("session over: {:?}, final score {}", reason, final_score);
                    sink.game_over(final_score, reason).await;
                    return final_score;
                }
            }
        }
    }

    /// Buffers a direction change from the input layer. The slot is read,
    /// not consumed, by the next tick; reversals are rejected inside.
    pub async fn handle_direction(state: &SessionState, direction: Direction) {
        let mut game = state.game.lock().await;
        game.buffer_direction(direction);
    }

    /// Re-derives render geometry. Taking the state lock serializes this
    /// against the tick loop, so it can never corrupt an in-flight tick.
    pub async fn handle_resize(state: &SessionState, canvas_size: f32) {
        let mut game = state.game.lock().await;
        game.resize(canvas_size);
    }
}

/// Session control surface: owns at most one live session task. Starting a
/// new session invalidates the previous one.
pub struct SessionController {
    config: GameConfig,
    current: Option<(SessionState, JoinHandle<u32>)>,
}

impl SessionController {
    pub fn new(config: GameConfig) -> Self {
        Self { config, current: None }
    }

    pub fn start<S: RenderSink>(
        &mut self,
        tier: DifficultyTier,
        seed: u64,
        sink: S,
    ) -> Result<SessionState, String> {
        let settings = SessionSettings::for_tier(&self.config, tier);
        settings.validate()?;

        self.reset();
        log!("starting {:?} session, seed {}", tier, seed);

        let state = SessionState::create(&settings, seed);
        let handle = tokio::spawn(Session::run(state.clone(), sink));
        self.current = Some((state.clone(), handle));
        Ok(state)
    }

    /// Tears down the current session, cancelling its timer task.
    pub fn reset(&mut self) {
        if let Some((_, handle)) = self.current.take() {
            handle.abort();
        }
    }

    pub fn state(&self) -> Option<&SessionState> {
        self.current.as_ref().map(|(state, _)| state)
    }
}
