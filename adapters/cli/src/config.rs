//! TOML game configuration with command-line overrides.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use arcade_core::{
    puzzle::MAX_BOARD_DIMENSION,
    tank::{LayoutError, LevelLayout, DEFAULT_LEVEL},
};
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading or validating the configuration file.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config file is not valid TOML")]
    Parse(#[from] toml::de::Error),
    #[error("`{field}` {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
    #[error("tank level is invalid")]
    Level(#[from] LayoutError),
}

/// Top-level configuration shared by both games.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) seed: Option<u64>,
    pub(crate) puzzle: PuzzleConfig,
    pub(crate) tank: TankConfig,
}

/// Settings for the falling-block puzzle.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PuzzleConfig {
    pub(crate) columns: u32,
    pub(crate) rows: u32,
    pub(crate) cell_length: f32,
    pub(crate) fall_interval_ms: u64,
    pub(crate) game_over_delay_ms: u64,
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            columns: 10,
            rows: 20,
            cell_length: 30.0,
            fall_interval_ms: 500,
            game_over_delay_ms: 2_000,
        }
    }
}

impl PuzzleConfig {
    pub(crate) fn fall_interval(&self) -> Duration {
        Duration::from_millis(self.fall_interval_ms)
    }

    pub(crate) fn game_over_delay(&self) -> Duration {
        Duration::from_millis(self.game_over_delay_ms)
    }
}

/// Settings for the tank chase.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct TankConfig {
    pub(crate) tick_ms: u64,
    pub(crate) cell_length: f32,
    pub(crate) pursuers: usize,
    pub(crate) level: Option<Vec<String>>,
}

impl Default for TankConfig {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            cell_length: 32.0,
            pursuers: 4,
            level: None,
        }
    }
}

impl TankConfig {
    pub(crate) fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Parses the configured level, falling back to the built-in maze.
    pub(crate) fn layout(&self) -> Result<LevelLayout, ConfigError> {
        let layout = match &self.level {
            Some(rows) => LevelLayout::parse(rows)?,
            None => LevelLayout::parse(&DEFAULT_LEVEL)?,
        };
        Ok(layout)
    }
}

impl GameConfig {
    /// Reads, parses and validates a configuration file.
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub(crate) fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let puzzle = &self.puzzle;
        if !is_board_length(puzzle.columns) {
            return Err(invalid("puzzle.columns", "must be between 1 and 64"));
        }
        if !is_board_length(puzzle.rows) {
            return Err(invalid("puzzle.rows", "must be between 1 and 64"));
        }
        if !is_positive_length(puzzle.cell_length) {
            return Err(invalid("puzzle.cell_length", "must be a positive number"));
        }
        if puzzle.fall_interval_ms == 0 {
            return Err(invalid("puzzle.fall_interval_ms", "must be positive"));
        }

        let tank = &self.tank;
        if tank.tick_ms == 0 {
            return Err(invalid("tank.tick_ms", "must be positive"));
        }
        if !is_positive_length(tank.cell_length) {
            return Err(invalid("tank.cell_length", "must be a positive number"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &'static str) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

fn is_board_length(length: u32) -> bool {
    (1..=MAX_BOARD_DIMENSION).contains(&length)
}

fn is_positive_length(length: f32) -> bool {
    length.is_finite() && length > 0.0
}
