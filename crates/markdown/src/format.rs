use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const TRANSITIVE_GUIDANCE_HEADER: &str = "| Policies Violated | Dependency | Transient Short Term Upgrade | Transient Long Term Upgrade | License(s) | Vulnerabilities | Direct Short Term Recommended Upgrade | Direct Long Term Recommended Upgrade |\r\n|-|-|-|-|-|-|-|-|\r\n";

const UPGRADE_OBJECT_HEADER: &str = "| Policies Violated | Dependency | License(s) | Vulnerabilities | Short Term Recommended Upgrade | Long Term Recommended Upgrade |\r\n|-|-|-|-|-|-|\r\n";

/// Table layout used for the violations report.
///
/// Each variant owns its column header and its row builder, so rows always
/// match the header they are rendered under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportFormat {
    /// Eight columns: dependency tree under the name, transient and direct upgrade guidance.
    #[default]
    TransitiveGuidance,
    /// Six columns: external id next to the name, upgrade components with vulnerability counts.
    UpgradeObject,
}

impl ReportFormat {
    pub const ALL: [ReportFormat; 2] = [Self::TransitiveGuidance, Self::UpgradeObject];

    pub fn key(self) -> &'static str {
        match self {
            Self::TransitiveGuidance => "transitive-guidance",
            Self::UpgradeObject => "upgrade-object",
        }
    }

    /// Column titles plus the alignment row, each terminated by `\r\n`.
    pub fn header(self) -> &'static str {
        match self {
            Self::TransitiveGuidance => TRANSITIVE_GUIDANCE_HEADER,
            Self::UpgradeObject => UPGRADE_OBJECT_HEADER,
        }
    }

    pub fn column_count(self) -> usize {
        match self {
            Self::TransitiveGuidance => 8,
            Self::UpgradeObject => 6,
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown report format '{value}' (expected one of: transitive-guidance, upgrade-object)")]
pub struct UnknownFormat {
    pub value: String,
}

impl FromStr for ReportFormat {
    type Err = UnknownFormat;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|format| format.key() == normalized)
            .ok_or_else(|| UnknownFormat {
                value: raw.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_columns(header: &str) -> usize {
        let titles = header.split("\r\n").next().expect("title row");
        titles.matches('|').count() - 1
    }

    #[test]
    fn headers_declare_their_column_counts() {
        for format in ReportFormat::ALL {
            assert_eq!(header_columns(format.header()), format.column_count());
            let alignment = format.header().split("\r\n").nth(1).expect("alignment row");
            assert_eq!(alignment.matches('-').count(), format.column_count());
        }
    }

    #[test]
    fn headers_end_with_line_separator() {
        for format in ReportFormat::ALL {
            assert!(format.header().ends_with("|\r\n"));
        }
    }

    #[test]
    fn transitive_guidance_is_the_default() {
        assert_eq!(ReportFormat::default(), ReportFormat::TransitiveGuidance);
    }

    #[test]
    fn parses_keys_case_and_separator_insensitively() {
        assert_eq!(
            "upgrade-object".parse::<ReportFormat>(),
            Ok(ReportFormat::UpgradeObject)
        );
        assert_eq!(
            " Transitive_Guidance ".parse::<ReportFormat>(),
            Ok(ReportFormat::TransitiveGuidance)
        );
    }

    #[test]
    fn rejects_unknown_format() {
        let err = "html".parse::<ReportFormat>().expect_err("unknown format");
        assert_eq!(err.value, "html");
        assert!(err.to_string().contains("transitive-guidance"));
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for format in ReportFormat::ALL {
            assert_eq!(format.to_string().parse::<ReportFormat>(), Ok(format));
        }
    }
}
