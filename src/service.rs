//! Shared application service for rendering and delivering policy reports.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use policy_report_core::ComponentReportSource;
use policy_report_markdown::{ReportFormat, build_report};
use tokio::io::AsyncWriteExt;

use crate::config::PolicyReportConfig;
use crate::source::{PrebuiltReports, read_component_reports};

/// Per-invocation overrides of configured values.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub will_fail: Option<bool>,
    pub format: Option<ReportFormat>,
}

/// Per-invocation overrides of the configured output destination.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeliveryOptions<'a> {
    pub path: Option<&'a Path>,
    pub append: Option<bool>,
}

/// Core runtime service for report rendering.
#[derive(Clone)]
pub struct ReportService {
    config: Arc<PolicyReportConfig>,
}

impl ReportService {
    /// Creates a service using config discovered from default paths.
    ///
    /// # Errors
    ///
    /// Returns an error if config loading fails.
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self::with_config(PolicyReportConfig::load()?))
    }

    pub fn with_config(config: PolicyReportConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &PolicyReportConfig {
        self.config.as_ref()
    }

    /// Renders `violations` through `source` using configured defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when the source fails to build component reports.
    pub async fn render_with_source<S>(
        &self,
        source: &S,
        violations: &[S::Violation],
        options: RenderOptions,
    ) -> anyhow::Result<String>
    where
        S: ComponentReportSource + ?Sized,
    {
        let will_fail = options.will_fail.unwrap_or(self.config.fail_on_violation);
        let format = options.format.unwrap_or(self.config.format);
        let report = build_report(source, violations, will_fail, format)
            .await
            .context("failed to build policy violation report")?;
        Ok(report)
    }

    /// Renders component reports read from a JSON file or stdin (`-`).
    ///
    /// # Errors
    ///
    /// Returns an error when the input cannot be read or parsed.
    pub async fn render_input(
        &self,
        input: &str,
        options: RenderOptions,
    ) -> anyhow::Result<String> {
        let reports = read_component_reports(input)
            .await
            .with_context(|| format!("failed to load component reports from {input}"))?;
        self.render_with_source(&PrebuiltReports, &reports, options)
            .await
    }

    /// Writes `report` to the configured output file, or stdout when none is set.
    ///
    /// # Errors
    ///
    /// Returns an error when the output file cannot be opened or written.
    pub async fn deliver(&self, report: &str, options: DeliveryOptions<'_>) -> anyhow::Result<()> {
        let path = options.path.or(self.config.output.path.as_deref());
        let Some(path) = path else {
            println!("{report}");
            return Ok(());
        };

        let append = options.append.unwrap_or(self.config.output.append);
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(path)
            .await
            .with_context(|| format!("failed to open report output at {}", path.display()))?;
        file.write_all(report.as_bytes())
            .await
            .with_context(|| format!("failed to write report output at {}", path.display()))?;
        file.write_all(b"\n").await?;
        file.flush().await?;
        tracing::info!(path = %path.display(), append, "wrote policy violation report");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/service.rs"]
mod tests;
