use policy_report_core::{ComponentReport, ComponentReportSource, SourceError};

use crate::format::ReportFormat;
use crate::row::{RowOutcome, format_rows};

pub const NO_VIOLATIONS_MESSAGE: &str =
    "# :white_check_mark: None of your dependencies violate policy!";
pub const LINE_SEPARATOR: &str = "\r\n";

const FAILURE_SYMBOL: &str = ":x:";
const WARNING_SYMBOL: &str = ":warning:";

/// Headline announcing violations, followed by a blank line.
pub fn violation_headline(will_fail: bool) -> String {
    let symbol = if will_fail {
        FAILURE_SYMBOL
    } else {
        WARNING_SYMBOL
    };
    format!("# {symbol} Found dependencies violating policy!{LINE_SEPARATOR}{LINE_SEPARATOR}")
}

/// Renders already-built component reports.
///
/// An empty slice yields [`NO_VIOLATIONS_MESSAGE`] with no table.
pub fn render_report(
    components: &[ComponentReport],
    will_fail: bool,
    format: ReportFormat,
) -> String {
    if components.is_empty() {
        return NO_VIOLATIONS_MESSAGE.to_string();
    }
    render_violations(components, will_fail, format)
}

/// Builds component reports for `violations` through `source` and renders them.
///
/// The source is not consulted when there are no violations.
///
/// # Errors
///
/// Returns the source's error unchanged.
pub async fn build_report<S>(
    source: &S,
    violations: &[S::Violation],
    will_fail: bool,
    format: ReportFormat,
) -> Result<String, SourceError>
where
    S: ComponentReportSource + ?Sized,
{
    if violations.is_empty() {
        return Ok(NO_VIOLATIONS_MESSAGE.to_string());
    }

    let components = source.component_reports(violations).await?;
    tracing::debug!(
        violations = violations.len(),
        components = components.len(),
        %format,
        "rendering policy violation report"
    );
    Ok(render_violations(&components, will_fail, format))
}

fn render_violations(
    components: &[ComponentReport],
    will_fail: bool,
    format: ReportFormat,
) -> String {
    let outcomes = format_rows(components, format);
    let failed = outcomes.iter().filter(|outcome| outcome.is_failed()).count();
    if failed > 0 {
        tracing::warn!(failed, total = outcomes.len(), "some component rows were left blank");
    }

    let body = outcomes
        .iter()
        .map(RowOutcome::line)
        .collect::<Vec<_>>()
        .join(LINE_SEPARATOR);

    let mut message = violation_headline(will_fail);
    message.push_str(format.header());
    message.push_str(&body);
    message
}
