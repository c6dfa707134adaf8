//! Run configuration, loaded from JSON.
//!
//! ```
//! use ai_2048_core::config::Config;
//! let cfg = Config::from_json_str(r#"{ "boardSize": 5, "searchDepth": 3 }"#).unwrap();
//! assert_eq!(cfg.board_size, 5);
//! assert_eq!(cfg.target_tile, 2048);
//! assert_eq!(cfg.search_config().depth, 3);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::rules::{self, DEFAULT_BOARD_SIZE, DEFAULT_TARGET_TILE, MAX_BOARD_SIZE, MAX_TILE_VALUE, MIN_BOARD_SIZE, MIN_TILE_VALUE};
use crate::error::ConfigError;
use crate::expectimax::{ExpectimaxConfig, HeuristicWeights, DEFAULT_DEPTH};

/// Named weight presets for the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HeuristicPreset {
    #[default]
    Expectimax,
    Corner,
    Simple,
}

impl HeuristicPreset {
    pub fn weights(self) -> HeuristicWeights {
        match self {
            HeuristicPreset::Expectimax => HeuristicWeights::expectimax(),
            HeuristicPreset::Corner => HeuristicWeights::corner(),
            HeuristicPreset::Simple => HeuristicWeights::simple(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub board_size: usize,
    pub target_tile: u32,
    pub search_depth: u32,
    /// Empty cells expanded per chance node; `None` expands all of them.
    pub empty_cell_sample_cap: Option<usize>,
    pub cache_enabled: bool,
    pub heuristic: HeuristicPreset,
    /// Explicit weights; take precedence over `heuristic` when present.
    pub weights: Option<HeuristicWeights>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            board_size: DEFAULT_BOARD_SIZE,
            target_tile: DEFAULT_TARGET_TILE,
            search_depth: DEFAULT_DEPTH,
            empty_cell_sample_cap: None,
            cache_enabled: true,
            heuristic: HeuristicPreset::default(),
            weights: None,
        }
    }
}

impl Config {
    /// Read and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path.as_ref())?;
        let cfg = Self::from_json_str(&text)?;
        log::debug!("loaded config from {}: {:?}", path.as_ref().display(), cfg);
        Ok(cfg)
    }

    /// Parse and validate. Missing keys take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: Config = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !rules::is_valid_board_size(self.board_size) {
            return Err(ConfigError::Invalid(format!(
                "boardSize {} outside {}..={}",
                self.board_size, MIN_BOARD_SIZE, MAX_BOARD_SIZE
            )));
        }
        if !rules::is_valid_tile_value(i64::from(self.target_tile)) || self.target_tile == 0 {
            return Err(ConfigError::Invalid(format!(
                "targetTile {} must be a power of two in {}..={}",
                self.target_tile, MIN_TILE_VALUE, MAX_TILE_VALUE
            )));
        }
        if self.search_depth == 0 {
            return Err(ConfigError::Invalid("searchDepth must be at least 1".into()));
        }
        if self.empty_cell_sample_cap == Some(0) {
            return Err(ConfigError::Invalid("emptyCellSampleCap must be at least 1".into()));
        }
        Ok(())
    }

    /// Evaluator weights: explicit `weights`, else the named preset.
    pub fn weights(&self) -> HeuristicWeights { self.weights.clone().unwrap_or_else(|| self.heuristic.weights()) }

    pub fn search_config(&self) -> ExpectimaxConfig {
        ExpectimaxConfig {
            depth: self.search_depth,
            empty_cell_cap: self.empty_cell_sample_cap,
            cache_enabled: self.cache_enabled,
            weights: self.weights(),
            ..ExpectimaxConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.board_size, 4);
        assert_eq!(cfg.target_tile, 2048);
        assert_eq!(cfg.search_depth, 4);
        assert_eq!(cfg.empty_cell_sample_cap, None);
        assert!(cfg.validate().is_ok());
        assert_eq!(Config::from_json_str("{}").unwrap(), cfg);
    }

    #[test]
    fn rejects_out_of_range_values() {
        for text in [
            r#"{"boardSize": 2}"#,
            r#"{"boardSize": 9}"#,
            r#"{"targetTile": 1000}"#,
            r#"{"targetTile": 1}"#,
            r#"{"targetTile": 0}"#,
            r#"{"targetTile": 262144}"#,
            r#"{"searchDepth": 0}"#,
            r#"{"emptyCellSampleCap": 0}"#,
        ] {
            assert!(matches!(Config::from_json_str(text), Err(ConfigError::Invalid(_))), "{text}");
        }
    }

    #[test]
    fn target_tile_accepts_full_tile_range() {
        for target in [2, 4, 2048, 131_072] {
            let cfg = Config { target_tile: target, ..Config::default() };
            assert!(cfg.validate().is_ok(), "{target}");
        }
    }

    #[test]
    fn parse_errors_are_reported() {
        assert!(matches!(Config::from_json_str("{ not json"), Err(ConfigError::Parse(_))));
        assert!(matches!(Config::from_json_str(r#"{"boardSize": "big"}"#), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn config_surface_is_camel_case() {
        let cfg = Config::from_json_str(
            r#"{"heuristic": "simple", "weights": {"preferredCorner": "topLeft", "emptyScaling": "quadratic"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.heuristic, HeuristicPreset::Simple);
        assert_eq!(cfg.weights().preferred_corner, crate::expectimax::Corner::TopLeft);
        assert!(Config::from_json_str(r#"{"weights": {"preferredCorner": "top_left"}}"#).is_err());
        let json = serde_json::to_value(Config::default()).unwrap();
        assert_eq!(json["emptyCellSampleCap"], serde_json::Value::Null);
        assert_eq!(json["heuristic"], "expectimax");
    }

    #[test]
    fn preset_and_explicit_weights() {
        let cfg = Config::from_json_str(r#"{"heuristic": "corner"}"#).unwrap();
        assert_eq!(cfg.weights(), HeuristicWeights::corner());
        let cfg = Config::from_json_str(r#"{"heuristic": "corner", "weights": {"empty": 1.0}}"#).unwrap();
        assert_eq!(cfg.weights().empty, 1.0);
        assert_eq!(cfg.weights().corner, HeuristicWeights::expectimax().corner);
    }

    #[test]
    fn search_config_carries_cap() {
        let cfg = Config { empty_cell_sample_cap: Some(6), search_depth: 2, ..Config::default() };
        let sc = cfg.search_config();
        assert_eq!(sc.depth, 2);
        assert_eq!(sc.empty_cell_cap, Some(6));
        assert!(sc.cache_enabled);
    }

    #[test]
    fn load_from_file() {
        let path = std::env::temp_dir().join(format!("ai2048-config-{}.json", std::process::id()));
        let mut f = fs::File::create(&path).unwrap();
        write!(f, r#"{{"boardSize": 6, "targetTile": 4096}}"#).unwrap();
        drop(f);
        let cfg = Config::load(&path).unwrap();
        assert_eq!((cfg.board_size, cfg.target_tile), (6, 4096));
        fs::remove_file(&path).unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Io(_))));
    }
}
