//! Configuration loading from grademap.toml.
//!
//! ## Example
//!
//! ```toml
//! dataset = "data/grademap.json"
//!
//! [ranking]
//! exact = 100.0
//! substring = 60.0
//! token = 40.0
//! fuzzy = 20.0
//! fuzzy-threshold = 0.7
//! ```
//!
//! Ranking weights are deliberately configuration rather than contract:
//! any partial `[ranking]` table is merged over the defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::rank::RankWeights;

/// grademap configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Source file for this config (for display).
    pub source: Option<PathBuf>,

    /// Path to the dataset JSON file.
    pub dataset: Option<PathBuf>,

    /// Keyword-scoring weights for the ranking engine.
    pub ranking: RankWeights,
}

/// Raw config as deserialized from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawConfig {
    dataset: Option<String>,
    ranking: Option<RankWeights>,
}

impl Config {
    /// Load configuration from the given directory.
    ///
    /// Search order:
    /// 1. grademap.toml in the directory
    /// 2. Walk up parent directories for a grademap.toml
    /// 3. Default config if nothing found
    pub fn load(directory: &Path) -> Self {
        let mut current = Some(directory.to_path_buf());
        while let Some(dir) = current {
            let candidate = dir.join("grademap.toml");
            if candidate.exists() {
                if let Some(config) = Self::load_file(&candidate) {
                    return config;
                }
            }
            current = dir.parent().map(Path::to_path_buf);
        }
        Self::default()
    }

    fn load_file(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        let raw: RawConfig = toml::from_str(&content).ok()?;
        Some(Self::from_raw(raw, path.to_path_buf()))
    }

    fn from_raw(raw: RawConfig, source: PathBuf) -> Self {
        // Relative dataset paths are anchored at the config file.
        let base = source.parent().map(Path::to_path_buf).unwrap_or_default();
        Self {
            source: Some(source),
            dataset: raw.dataset.map(|d| {
                let path = PathBuf::from(d);
                if path.is_absolute() {
                    path
                } else {
                    base.join(path)
                }
            }),
            ranking: raw.ranking.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path());
        assert!(config.source.is_none());
        assert!(config.dataset.is_none());
        assert_eq!(config.ranking.exact, RankWeights::default().exact);
    }

    #[test]
    fn test_load_with_partial_ranking_table() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("grademap.toml"),
            "dataset = \"data/grades.json\"\n\n[ranking]\nexact = 200.0\n",
        )
        .unwrap();

        let config = Config::load(dir.path());
        assert_eq!(
            config.dataset.as_deref(),
            Some(dir.path().join("data/grades.json").as_path())
        );
        // Overridden field takes, the rest keep their defaults.
        assert_eq!(config.ranking.exact, 200.0);
        assert_eq!(config.ranking.substring, RankWeights::default().substring);
    }

    #[test]
    fn test_walks_up_to_parent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("grademap.toml"), "dataset = \"g.json\"\n").unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();

        let config = Config::load(&nested);
        assert!(config.dataset.is_some());
    }
}
