//! Component report inputs for the CLI.

use std::path::PathBuf;

use async_trait::async_trait;
use policy_report_core::{ComponentReport, ComponentReportSource, SourceError};
use tokio::io::AsyncReadExt;

/// Input argument naming stdin instead of a file.
pub const STDIN_INPUT: &str = "-";

/// Source for violations that already arrive as component reports.
pub struct PrebuiltReports;

#[async_trait]
impl ComponentReportSource for PrebuiltReports {
    type Violation = ComponentReport;

    async fn component_reports(
        &self,
        violations: &[ComponentReport],
    ) -> Result<Vec<ComponentReport>, SourceError> {
        Ok(violations.to_vec())
    }
}

/// Reads a JSON array of component reports from a file path or stdin (`-`).
///
/// # Errors
///
/// Returns [`SourceError::Read`] when the input cannot be read and
/// [`SourceError::Parse`] when it is not a JSON array of component reports.
pub async fn read_component_reports(input: &str) -> Result<Vec<ComponentReport>, SourceError> {
    let raw = if input == STDIN_INPUT {
        let mut raw = String::new();
        tokio::io::stdin()
            .read_to_string(&mut raw)
            .await
            .map_err(|source| SourceError::Read {
                path: PathBuf::from("<stdin>"),
                source,
            })?;
        raw
    } else {
        tokio::fs::read_to_string(input)
            .await
            .map_err(|source| SourceError::Read {
                path: PathBuf::from(input),
                source,
            })?
    };

    parse_component_reports(&raw)
}

pub fn parse_component_reports(raw: &str) -> Result<Vec<ComponentReport>, SourceError> {
    let reports: Vec<ComponentReport> =
        serde_json::from_str(raw).map_err(|err| SourceError::Parse {
            message: err.to_string(),
        })?;
    tracing::debug!(count = reports.len(), "loaded component reports");
    Ok(reports)
}
