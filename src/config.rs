//////////////////////////
// config.rs
//////////////////////////

use log::warn;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::store::PlayerId;
use crate::types::PieceType;

pub const DEFAULT_CONFIG_FILE: &str = "chess_turns.json";
pub const DEFAULT_STORE_FILE: &str = "match_history.json";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Keep kings off attacked squares (the check-aware rules variant).
    pub king_safety: bool,
    /// Used when a promotion answer is not one of queen/rook/bishop/knight.
    pub default_promotion: PieceType,
    pub store_path: PathBuf,
    pub white_player: PlayerId,
    pub black_player: PlayerId,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            king_safety: true,
            default_promotion: PieceType::Queen,
            store_path: PathBuf::from(DEFAULT_STORE_FILE),
            // local play: one account sits on both sides
            white_player: PlayerId(1),
            black_player: PlayerId(1),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let mut file = File::open(path.as_ref())?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Config::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Config, ConfigError> {
        let config: Config = serde_json::from_str(contents)?;
        if !config.default_promotion.is_promotion_choice() {
            return Err(ConfigError::InvalidDefaultPromotion(config.default_promotion));
        }
        Ok(config)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Config {
        match Config::load(path.as_ref()) {
            Ok(config) => config,
            Err(e) => {
                warn!("No usable config at {}, using defaults: {}", path.as_ref().display(), e);
                Config::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = Config::from_json(r#"{ "king_safety": false }"#).unwrap();
        assert!(!config.king_safety);
        assert_eq!(config.default_promotion, PieceType::Queen);
        assert_eq!(config.store_path, PathBuf::from(DEFAULT_STORE_FILE));
    }

    #[test]
    fn rejects_king_as_default_promotion() {
        assert!(matches!(
            Config::from_json(r#"{ "default_promotion": "King" }"#),
            Err(ConfigError::InvalidDefaultPromotion(PieceType::King))
        ));
    }

    #[test]
    fn unreadable_file_falls_back() {
        let config = Config::load_or_default("/definitely/not/here.json");
        assert_eq!(config, Config::default());
    }
}
