use std::fmt;

use policy_report_core::{
    ComponentReport, LicenseReport, TransitiveUpgradeGuidance, UpgradeGuidance, UpgradeReport,
    VulnerabilityReport,
};
use thiserror::Error;

use crate::format::ReportFormat;

const LINE_BREAK: &str = "<br/>";
const TREE_SEPARATOR: &str = "<br/>&rarr;";
const VIOLATION_MARKER: &str = ":x: &nbsp; ";

/// Why a component could not be rendered into a row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("component field '{field}' is missing")]
    MissingField { field: &'static str },
    #[error("transitive upgrade guidance entry {index} has no {term} guidance")]
    MissingGuidance { index: usize, term: &'static str },
}

/// Rendered cells of one table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    cells: Vec<String>,
}

impl TableRow {
    /// A row with every cell empty, sized for `format`.
    pub fn blank(format: ReportFormat) -> Self {
        Self {
            cells: vec![String::new(); format.column_count()],
        }
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn render(&self) -> String {
        format!("| {} |", self.cells.join(" | "))
    }
}

impl fmt::Display for TableRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Result of rendering one component through [`format_rows`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Rendered(TableRow),
    Failed {
        component: String,
        cause: RowError,
        row: TableRow,
    },
}

impl RowOutcome {
    /// The row to print; blank when rendering failed.
    pub fn row(&self) -> &TableRow {
        match self {
            Self::Rendered(row) => row,
            Self::Failed { row, .. } => row,
        }
    }

    pub fn line(&self) -> String {
        self.row().render()
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Renders every component in order, substituting a blank row for any
/// component that fails. Always yields one outcome per component.
pub fn format_rows(components: &[ComponentReport], format: ReportFormat) -> Vec<RowOutcome> {
    components
        .iter()
        .map(|component| format_row_isolated(component, format))
        .collect()
}

fn format_row_isolated(component: &ComponentReport, format: ReportFormat) -> RowOutcome {
    trace_component(component);
    match format_row(component, format) {
        Ok(row) => RowOutcome::Rendered(row),
        Err(cause) => {
            tracing::warn!(
                component = %component.name,
                error = %cause,
                "failed to render component row; emitting blank row"
            );
            RowOutcome::Failed {
                component: component.name.clone(),
                cause,
                row: TableRow::blank(format),
            }
        }
    }
}

fn trace_component(component: &ComponentReport) {
    tracing::debug!(component = %component.name, "rendering component row");
    if let Some(policies) = &component.violated_policies {
        let names = policies
            .iter()
            .map(|policy| policy.policy_name.as_str())
            .collect::<Vec<_>>();
        tracing::debug!(policies = %names.join(","), "violated policies");
    }
    if let Some(licenses) = &component.licenses {
        let names = licenses
            .iter()
            .map(|license| license.name.as_str())
            .collect::<Vec<_>>();
        tracing::debug!(licenses = %names.join(","), "licenses");
    }
    if let Some(vulnerabilities) = &component.vulnerabilities {
        let names = vulnerabilities
            .iter()
            .map(|vulnerability| vulnerability.name.as_str())
            .collect::<Vec<_>>();
        tracing::debug!(vulnerabilities = %names.join(","), "vulnerabilities");
    }
}

/// Renders one component under `format`.
///
/// # Errors
///
/// Returns [`RowError`] when a required list is absent or a transitive
/// guidance entry lacks one of its terms.
pub fn format_row(
    component: &ComponentReport,
    format: ReportFormat,
) -> Result<TableRow, RowError> {
    let cells = match format {
        ReportFormat::TransitiveGuidance => transitive_guidance_cells(component)?,
        ReportFormat::UpgradeObject => upgrade_object_cells(component)?,
    };
    debug_assert_eq!(cells.len(), format.column_count());
    Ok(TableRow { cells })
}

fn transitive_guidance_cells(component: &ComponentReport) -> Result<Vec<String>, RowError> {
    let policies = policies_cell(component)?;
    let licenses = licenses_cell(component)?;
    let vulnerabilities = vulnerabilities_cell(component)?;

    let mut dependency = identity(component);
    if let Some(trees) = component
        .dependency_trees
        .as_deref()
        .filter(|trees| !trees.is_empty())
    {
        let path = trees
            .iter()
            .map(|node| escape_text(node))
            .collect::<Vec<_>>()
            .join(TREE_SEPARATOR);
        dependency.push_str(&format!("{LINE_BREAK}({path})"));
    }

    let (transient_short, transient_long) =
        transient_cells(component.transitive_upgrade_guidance.as_deref())?;

    Ok(vec![
        policies,
        dependency,
        transient_short,
        transient_long,
        licenses,
        vulnerabilities,
        guidance_link(component.short_term_upgrade_guidance.as_ref()),
        guidance_link(component.long_term_upgrade_guidance.as_ref()),
    ])
}

fn upgrade_object_cells(component: &ComponentReport) -> Result<Vec<String>, RowError> {
    let policies = policies_cell(component)?;
    let licenses = licenses_cell(component)?;
    let vulnerabilities = vulnerabilities_cell(component)?;

    let mut dependency = identity(component);
    if let Some(external_id) = &component.external_id {
        dependency.push_str(&format!(" ({})", escape_text(external_id)));
    }

    Ok(vec![
        policies,
        dependency,
        licenses,
        vulnerabilities,
        upgrade_link(component.short_term_upgrade.as_ref()),
        upgrade_link(component.long_term_upgrade.as_ref()),
    ])
}

fn required<'a, T>(value: Option<&'a [T]>, field: &'static str) -> Result<&'a [T], RowError> {
    value.ok_or(RowError::MissingField { field })
}

fn policies_cell(component: &ComponentReport) -> Result<String, RowError> {
    let policies = required(component.violated_policies.as_deref(), "violatedPolicies")?;
    Ok(policies
        .iter()
        .map(|policy| escape_text(&policy.policy_name))
        .collect::<Vec<_>>()
        .join(LINE_BREAK))
}

fn licenses_cell(component: &ComponentReport) -> Result<String, RowError> {
    let licenses = required(component.licenses.as_deref(), "licenses")?;
    Ok(licenses
        .iter()
        .map(license_entry)
        .collect::<Vec<_>>()
        .join(LINE_BREAK))
}

fn vulnerabilities_cell(component: &ComponentReport) -> Result<String, RowError> {
    let vulnerabilities = required(component.vulnerabilities.as_deref(), "vulnerabilities")?;
    Ok(vulnerabilities
        .iter()
        .map(vulnerability_entry)
        .collect::<Vec<_>>()
        .join(LINE_BREAK))
}

fn identity(component: &ComponentReport) -> String {
    match component.href.as_deref().filter(|href| !href.is_empty()) {
        Some(href) => link(&component.name, href),
        None => escape_text(&component.name),
    }
}

fn license_entry(license: &LicenseReport) -> String {
    format!(
        "{}{}",
        violation_marker(license.violates_policy),
        link(&license.name, &license.href)
    )
}

fn vulnerability_entry(vulnerability: &VulnerabilityReport) -> String {
    let mut entry = format!(
        "{}{}",
        violation_marker(vulnerability.violates_policy),
        link(&vulnerability.name, &vulnerability.href)
    );
    let score = vulnerability.cvss_score.filter(|score| *score != 0.0);
    let severity = vulnerability
        .severity
        .as_deref()
        .filter(|severity| !severity.is_empty());
    if let (Some(score), Some(severity)) = (score, severity) {
        entry.push_str(&format!(" {}: CVSS {score}", escape_text(severity)));
    }
    entry
}

fn transient_cells(
    guidance: Option<&[TransitiveUpgradeGuidance]>,
) -> Result<(String, String), RowError> {
    let Some(entries) = guidance else {
        return Ok((String::new(), String::new()));
    };

    let mut short_term = Vec::with_capacity(entries.len());
    let mut long_term = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let short = entry
            .short_term_upgrade_guidance
            .as_ref()
            .ok_or(RowError::MissingGuidance {
                index,
                term: "short-term",
            })?;
        let long = entry
            .long_term_upgrade_guidance
            .as_ref()
            .ok_or(RowError::MissingGuidance {
                index,
                term: "long-term",
            })?;
        short_term.push(escape_text(&short.external_id));
        long_term.push(escape_text(&long.external_id));
    }

    Ok((short_term.join(LINE_BREAK), long_term.join(LINE_BREAK)))
}

fn guidance_link(guidance: Option<&UpgradeGuidance>) -> String {
    guidance
        .map(|guidance| link(&guidance.external_id, &guidance.version))
        .unwrap_or_default()
}

fn upgrade_link(upgrade: Option<&UpgradeReport>) -> String {
    upgrade
        .map(|upgrade| {
            format!(
                "{} ({} known vulnerabilities)",
                link(&upgrade.name, &upgrade.href),
                upgrade.vulnerability_count
            )
        })
        .unwrap_or_default()
}

fn violation_marker(violates_policy: bool) -> &'static str {
    if violates_policy { VIOLATION_MARKER } else { "" }
}

fn link(text: &str, target: &str) -> String {
    format!("[{}]({})", escape_text(text), escape_text(target))
}

/// Keeps a value inside its table cell: pipes are escaped and raw line
/// breaks become `<br/>`.
fn escape_text(raw: &str) -> String {
    raw.replace('|', "\\|")
        .replace("\r\n", LINE_BREAK)
        .replace(['\r', '\n'], LINE_BREAK)
}
