// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

use anyhow::{Context, Result};
use dotflow_core::SchedulerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::Level;

/// Environment variable naming a default configuration file
pub const CONFIG_ENV: &str = "DOTFLOW_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// One of trace, debug, info, warn, error
    pub log_level: String,

    pub scheduler: SchedulerConfig,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            scheduler: SchedulerConfig::default(),
        }
    }
}

impl ToolsConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&content).with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// CLI path first, then $DOTFLOW_CONFIG, then defaults
    pub fn resolve_config(cli_config: Option<PathBuf>) -> Result<Self> {
        if let Some(config_path) = cli_config {
            Self::load_from_file(config_path)
        } else if let Ok(env_config) = std::env::var(CONFIG_ENV) {
            Self::load_from_file(env_config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn level(&self) -> Result<Level> {
        self.log_level.parse::<Level>().with_context(|| format!("Invalid log level '{}'", self.log_level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotflow_core::SchedulingStrategy;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ToolsConfig = toml::from_str(
            r#"
            [scheduler]
            strategy = "non-slotted"
            seed = 9
            "#,
        )
        .unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.scheduler.strategy, SchedulingStrategy::NonSlotted);
        assert_eq!(config.scheduler.seed, Some(9));
        assert_eq!(config.scheduler.idle_time, 10);
    }

    #[test]
    fn test_config_file_round_trip() {
        let path = std::env::temp_dir().join(format!("dotflow-config-{}.toml", std::process::id()));
        let mut config = ToolsConfig::default();
        config.log_level = "debug".to_string();
        config.scheduler.idle_time = 3;
        config.save_to_file(&path).unwrap();

        let loaded = ToolsConfig::resolve_config(Some(path.clone())).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.level().unwrap(), Level::DEBUG);
    }

    #[test]
    fn test_bad_log_level() {
        let config = ToolsConfig {
            log_level: "loud".to_string(),
            ..Default::default()
        };
        assert!(config.level().is_err());
    }
}
