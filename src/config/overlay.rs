use std::path::PathBuf;

use policy_report_markdown::ReportFormat;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct ConfigOverlay {
    pub format: Option<ReportFormat>,
    pub fail_on_violation: Option<bool>,
    pub output: Option<OutputOverlay>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub(super) struct OutputOverlay {
    pub path: Option<PathBuf>,
    pub append: Option<bool>,
}
