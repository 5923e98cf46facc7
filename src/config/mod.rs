//! Configuration loading and merge logic for `policy-report`.
//!
//! Global config and project-local config are merged with project values taking precedence.

mod overlay;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use policy_report_markdown::ReportFormat;
use serde::{Deserialize, Serialize};

use self::overlay::ConfigOverlay;

/// Default table layout.
pub const DEFAULT_FORMAT: ReportFormat = ReportFormat::TransitiveGuidance;

/// Top-level runtime configuration for report rendering.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicyReportConfig {
    /// Table layout used for rendered reports.
    pub format: ReportFormat,
    /// Headline the report as a failing check when the CLI does not say otherwise.
    pub fail_on_violation: bool,
    /// Where the rendered report is delivered.
    pub output: OutputConfig,
}

/// Output destination settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// File receiving the report; stdout when unset.
    pub path: Option<PathBuf>,
    /// Append to `path` instead of truncating it.
    pub append: bool,
}

impl Default for PolicyReportConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_FORMAT,
            fail_on_violation: false,
            output: OutputConfig::default(),
        }
    }
}

impl PolicyReportConfig {
    /// Loads and merges global + project configuration from default paths.
    ///
    /// # Errors
    ///
    /// Returns an error if any discovered config file cannot be read or parsed.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_with_paths(global_config_path(), project_config_path())
    }

    #[cfg(test)]
    fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        Self::load_with_paths(Some(path.to_path_buf()), None)
    }

    fn load_with_paths(global: Option<PathBuf>, project: Option<PathBuf>) -> anyhow::Result<Self> {
        let mut config = Self::default();
        if let Some(path) = global {
            config.merge_from_path(&path)?;
        }
        if let Some(path) = project {
            config.merge_from_path(&path)?;
        }
        Ok(config)
    }

    fn merge_from_path(&mut self, path: &Path) -> anyhow::Result<()> {
        if !path.exists() {
            return Ok(());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file at {}", path.display()))?;
        let overlay: ConfigOverlay = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file at {}", path.display()))?;
        tracing::debug!(path = %path.display(), "merged config file");
        self.apply_overlay(overlay);
        Ok(())
    }

    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        if let Some(value) = overlay.format {
            self.format = value;
        }
        if let Some(value) = overlay.fail_on_violation {
            self.fail_on_violation = value;
        }
        if let Some(value) = overlay.output {
            if let Some(path) = value.path {
                self.output.path = Some(path);
            }
            if let Some(append) = value.append {
                self.output.append = append;
            }
        }
    }
}

fn global_config_path() -> Option<PathBuf> {
    if let Some(explicit) = env::var_os("POLICY_REPORT_CONFIG_GLOBAL_PATH") {
        return Some(PathBuf::from(explicit));
    }

    let home = env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .map(PathBuf::from)?;

    Some(home.join(".config").join("policy-report").join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    if let Some(explicit) = env::var_os("POLICY_REPORT_CONFIG_PROJECT_PATH") {
        return Some(PathBuf::from(explicit));
    }

    let cwd = env::current_dir().ok()?;
    Some(cwd.join(".policy-report.toml"))
}

#[cfg(test)]
#[path = "../tests/config.rs"]
mod tests;
