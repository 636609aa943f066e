use std::io::ErrorKind;

use serde::{Deserialize, Serialize};

use crate::game::settings::DifficultyTier;

pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub grid_side: usize,
    pub canvas_size: f32,
    pub default_difficulty: DifficultyTier,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_side: 20,
            canvas_size: 800.0,
            default_difficulty: DifficultyTier::Normal,
        }
    }
}

impl Validate for GameConfig {
    fn validate(&self) -> Result<(), String> {
        if self.grid_side < 2 || self.grid_side > 100 {
            return Err("Grid side must be between 2 and 100".to_string());
        }
        if self.canvas_size <= 0.0 {
            return Err("Canvas size must be positive".to_string());
        }
        Ok(())
    }
}

impl GameConfig {
    /// Loads the YAML config file, falling back to defaults when the file
    /// does not exist. Unreadable or invalid content is an error.
    pub fn load_or_default(path: &str) -> Result<Self, String> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let config: GameConfig = serde_yaml_ng::from_str(&content)
                    .map_err(|e| format!("Failed to deserialize config: {}", e))?;
                config
                    .validate()
                    .map_err(|e| format!("Config validation error: {}", e))?;
                Ok(config)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(format!("Failed to read config file: {}", err)),
        }
    }
}
