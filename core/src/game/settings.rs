use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    Easy,
    Normal,
    Hard,
}

impl DifficultyTier {
    pub fn tick_interval(&self) -> Duration {
        match self {
            DifficultyTier::Easy => Duration::from_millis(500),
            DifficultyTier::Normal => Duration::from_millis(300),
            DifficultyTier::Hard => Duration::from_millis(100),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SessionSettings {
    pub grid_side: usize,
    pub canvas_size: f32,
    pub tick_interval: Duration,
}

impl SessionSettings {
    pub fn for_tier(config: &GameConfig, tier: DifficultyTier) -> Self {
        Self {
            grid_side: config.grid_side,
            canvas_size: config.canvas_size,
            tick_interval: tier.tick_interval(),
        }
    }

    /// Starting head cell: second row, middle column.
    pub fn start_index(&self) -> usize {
        self.grid_side + self.grid_side / 2
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.grid_side < 2 || self.grid_side > 100 {
            return Err("Grid side must be between 2 and 100".to_string());
        }
        if self.canvas_size <= 0.0 {
            return Err("Canvas size must be positive".to_string());
        }
        if self.tick_interval < Duration::from_millis(50)
            || self.tick_interval > Duration::from_millis(5000)
        {
            return Err("Tick interval must be between 50ms and 5000ms".to_string());
        }
        Ok(())
    }
}
