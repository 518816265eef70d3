use std::path::Path;

use log::warn;
use serde::Deserialize;

pub const CONFIG_FILE: &str = "plenary-junit.toml";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub report: ReportConfig,
}

/// Controls how the transcript is mapped onto the report.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Attach console text printed before an outcome line as `system-out`.
    pub capture_output: bool,
    /// Drop a trailing `_spec` from the suite name (`foo/bar_spec.lua` -> `foo.bar`).
    pub strip_spec_suffix: bool,
    /// Name of the record built from output printed before the suite started.
    /// Example: "nvim startup"
    pub startup_case_name: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            capture_output: true,
            strip_spec_suffix: true,
            startup_case_name: "nvim startup".into(),
        }
    }
}

impl Config {
    /// Load `plenary-junit.toml` from `dir`, falling back to defaults if absent or invalid.
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(CONFIG_FILE);
        let Ok(content) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        toml::from_str(&content).unwrap_or_else(|e| {
            warn!("ignoring invalid {}: {}", path.display(), e);
            Self::default()
        })
    }
}
