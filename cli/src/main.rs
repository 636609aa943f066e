mod input;
mod render;

use clap::{Parser, ValueEnum};

use snake_game_core::{
    DifficultyTier, GameConfig, Session, SessionController, SessionRng, logger,
};
use input::InputEvent;
use render::{TerminalGuard, TerminalSink, UiEvent};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DifficultyArg {
    Easy,
    Normal,
    Hard,
}

impl From<DifficultyArg> for DifficultyTier {
    fn from(arg: DifficultyArg) -> Self {
        match arg {
            DifficultyArg::Easy => DifficultyTier::Easy,
            DifficultyArg::Normal => DifficultyTier::Normal,
            DifficultyArg::Hard => DifficultyTier::Hard,
        }
    }
}

#[derive(Parser)]
#[command(name = "snake_game")]
struct Args {
    /// Difficulty tier; defaults to the config file's value.
    #[arg(long, value_enum)]
    difficulty: Option<DifficultyArg>,

    #[arg(long, default_value = "snake_game.yaml")]
    config: String,

    /// Fixed RNG seed for reproducible sessions.
    #[arg(long)]
    seed: Option<u64>,

    /// Log to stderr; redirect with 2>snake.log to keep the board clean.
    #[arg(long)]
    verbose: bool,

    #[arg(long)]
    use_log_prefix: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.verbose {
        let prefix = args.use_log_prefix.then(|| "snake".to_string());
        logger::init_logger(prefix);
    }

    let config = GameConfig::load_or_default(&args.config).map_err(std::io::Error::other)?;
    let tier = args
        .difficulty
        .map(DifficultyTier::from)
        .unwrap_or(config.default_difficulty);

    let (ui_tx, mut ui_rx) = tokio::sync::mpsc::unbounded_channel();
    let (input_tx, mut input_rx) = tokio::sync::mpsc::unbounded_channel();

    let _guard = TerminalGuard::enter()?;
    std::thread::spawn(move || input::read_loop(input_tx));

    let sink = TerminalSink::new(config.grid_side as u16, ui_tx);
    let mut controller = SessionController::new(config.clone());
    let seed = args.seed.unwrap_or_else(|| SessionRng::from_random().seed());
    controller
        .start(tier, seed, sink.clone())
        .map_err(std::io::Error::other)?;

    loop {
        tokio::select! {
            Some(event) = input_rx.recv() => match event {
                InputEvent::Steer(direction) => {
                    if let Some(state) = controller.state() {
                        Session::handle_direction(state, direction).await;
                    }
                }
                InputEvent::Restart => {
                    let seed = args.seed.unwrap_or_else(|| SessionRng::from_random().seed());
                    sink.reset();
                    controller
                        .start(tier, seed, sink.clone())
                        .map_err(std::io::Error::other)?;
                }
                InputEvent::Resize(cols, rows) => {
                    if let Some(state) = controller.state() {
                        let canvas_size = f32::from(cols.min(rows));
                        Session::handle_resize(state, canvas_size).await;
                    }
                }
                InputEvent::Quit => break,
            },
            Some(UiEvent::GameOver { score, reason }) = ui_rx.recv() => {
                render::draw_game_over(config.grid_side as u16, score, reason)?;
            }
            else => break,
        }
    }

    controller.reset();
    Ok(())
}
