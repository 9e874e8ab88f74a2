//! `--config` file: rack dimensions and editor tuning in one TOML table.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shelfplan::editor::EditorConfig;
use shelfplan::RackSpec;

/// Planner settings. Missing sections and fields keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Rack unit dimensions.
    pub rack: RackSpec,
    /// Floor-plan editor tuning.
    pub editor: EditorConfig,
}

impl PlannerConfig {
    /// Load and validate a config file, or the defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                Self::from_toml(&text)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => Self::default(),
        };
        config.rack.validate()?;
        config.editor.validate()?;
        Ok(config)
    }

    fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}
