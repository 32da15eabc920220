use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{env, str::FromStr};

use crate::{game::TurnPolicy, models::Slot};

/// Smallest and largest supported board edge
pub const MIN_BOARD_SIZE: usize = 4;
pub const MAX_BOARD_SIZE: usize = 16;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub game: GameConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Abandon an unfinished game when a seated player's socket closes
    pub reset_on_disconnect: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    pub rows: usize,
    pub columns: usize,
    pub starting_turn: StartingTurn,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartingTurn {
    /// Player 1 always opens
    Fixed,
    /// Coin flip each game
    Random,
}

impl FromStr for StartingTurn {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "fixed" => Ok(StartingTurn::Fixed),
            "random" => Ok(StartingTurn::Random),
            other => bail!("unknown starting turn policy '{}'", other),
        }
    }
}

impl GameConfig {
    pub fn turn_policy(&self) -> TurnPolicy {
        match self.starting_turn {
            StartingTurn::Fixed => TurnPolicy::fixed(Slot::One),
            StartingTurn::Random => TurnPolicy::random(self.seed),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5034,
                reset_on_disconnect: false,
            },
            game: GameConfig {
                rows: 6,
                columns: 7,
                starting_turn: StartingTurn::Fixed,
                seed: None,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build from any key lookup; missing keys fall back to defaults
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server = ServerConfig {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: var("PORT")
                .unwrap_or_else(|| "5034".to_string())
                .parse()
                .context("PORT must be a number")?,
            reset_on_disconnect: var("RESET_ON_DISCONNECT")
                .unwrap_or_else(|| "false".to_string())
                .parse()
                .context("RESET_ON_DISCONNECT must be true or false")?,
        };

        let game = GameConfig {
            rows: var("BOARD_ROWS")
                .unwrap_or_else(|| "6".to_string())
                .parse()
                .context("BOARD_ROWS must be a number")?,
            columns: var("BOARD_COLUMNS")
                .unwrap_or_else(|| "7".to_string())
                .parse()
                .context("BOARD_COLUMNS must be a number")?,
            starting_turn: var("STARTING_TURN")
                .unwrap_or_else(|| "fixed".to_string())
                .parse()
                .context("STARTING_TURN must be 'fixed' or 'random'")?,
            seed: var("GAME_SEED")
                .map(|seed| seed.parse::<u64>())
                .transpose()
                .context("GAME_SEED must be an unsigned integer")?,
        };

        for (name, value) in [("BOARD_ROWS", game.rows), ("BOARD_COLUMNS", game.columns)] {
            if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&value) {
                bail!(
                    "{} must be between {} and {}, got {}",
                    name,
                    MIN_BOARD_SIZE,
                    MAX_BOARD_SIZE,
                    value
                );
            }
        }

        Ok(Config { server, game })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
