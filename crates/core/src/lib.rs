use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// One dependency flagged by a policy scan.
///
/// The list fields are `Option` because upstream records can omit them. The
/// row formatter treats a missing list as a row-level fault.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentReport {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default)]
    pub violated_policies: Option<Vec<ViolatedPolicy>>,
    #[serde(default)]
    pub licenses: Option<Vec<LicenseReport>>,
    #[serde(default)]
    pub vulnerabilities: Option<Vec<VulnerabilityReport>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_term_upgrade: Option<UpgradeReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_term_upgrade: Option<UpgradeReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_term_upgrade_guidance: Option<UpgradeGuidance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_term_upgrade_guidance: Option<UpgradeGuidance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transitive_upgrade_guidance: Option<Vec<TransitiveUpgradeGuidance>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_trees: Option<Vec<String>>,
}

impl ComponentReport {
    /// Creates a report with empty policy, license and vulnerability lists.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            violated_policies: Some(Vec::new()),
            licenses: Some(Vec::new()),
            vulnerabilities: Some(Vec::new()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolatedPolicy {
    pub policy_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseReport {
    pub name: String,
    pub href: String,
    #[serde(default)]
    pub violates_policy: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VulnerabilityReport {
    pub name: String,
    pub href: String,
    #[serde(default)]
    pub violates_policy: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cvss_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

/// Recommended replacement component, with its own known vulnerability count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeReport {
    pub name: String,
    pub href: String,
    pub vulnerability_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeGuidance {
    pub external_id: String,
    pub version: String,
}

/// Guidance for a direct dependency that pulls in the violating component.
///
/// Both terms are expected; an entry missing either cannot be rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitiveUpgradeGuidance {
    #[serde(default)]
    pub short_term_upgrade_guidance: Option<UpgradeGuidance>,
    #[serde(default)]
    pub long_term_upgrade_guidance: Option<UpgradeGuidance>,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read component reports from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse component reports: {message}")]
    Parse { message: String },
    #[error("component reports unavailable: {message}")]
    Unavailable { message: String },
}

/// Builds the ordered component reports for a set of policy violations.
///
/// Implementations own any I/O or remote lookups; callers only await the
/// result and propagate failures.
#[async_trait]
pub trait ComponentReportSource: Send + Sync {
    type Violation: Send + Sync;

    async fn component_reports(
        &self,
        violations: &[Self::Violation],
    ) -> Result<Vec<ComponentReport>, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoSource;

    #[async_trait]
    impl ComponentReportSource for EchoSource {
        type Violation = String;

        async fn component_reports(
            &self,
            violations: &[String],
        ) -> Result<Vec<ComponentReport>, SourceError> {
            Ok(violations
                .iter()
                .map(|name| ComponentReport::new(name.as_str()))
                .collect())
        }
    }

    #[test]
    fn new_component_has_empty_required_lists() {
        let component = ComponentReport::new("left-pad");
        assert_eq!(component.name, "left-pad");
        assert_eq!(component.violated_policies, Some(Vec::new()));
        assert_eq!(component.licenses, Some(Vec::new()));
        assert_eq!(component.vulnerabilities, Some(Vec::new()));
        assert!(component.href.is_none());
        assert!(component.transitive_upgrade_guidance.is_none());
    }

    #[test]
    fn deserializes_camel_case_wire_names() {
        let raw = r#"{
            "name": "lodash",
            "href": "https://example.test/lodash",
            "externalId": "npmjs:lodash/4.17.20",
            "violatedPolicies": [{"policyName": "No High Vulns"}],
            "licenses": [{"name": "MIT", "href": "https://example.test/mit", "violatesPolicy": false}],
            "vulnerabilities": [{
                "name": "CVE-2021-23337",
                "href": "https://example.test/cve",
                "violatesPolicy": true,
                "cvssScore": 7.2,
                "severity": "HIGH"
            }],
            "shortTermUpgradeGuidance": {"externalId": "lodash/4.17.21", "version": "4.17.21"},
            "transitiveUpgradeGuidance": [{
                "shortTermUpgradeGuidance": {"externalId": "a/1", "version": "1"},
                "longTermUpgradeGuidance": {"externalId": "a/2", "version": "2"}
            }],
            "dependencyTrees": ["app", "lodash"]
        }"#;

        let component: ComponentReport = serde_json::from_str(raw).expect("component json");
        assert_eq!(component.external_id.as_deref(), Some("npmjs:lodash/4.17.20"));
        assert_eq!(
            component.violated_policies.as_ref().map(Vec::len),
            Some(1)
        );
        let vulnerability = &component.vulnerabilities.as_ref().expect("vulns")[0];
        assert!(vulnerability.violates_policy);
        assert_eq!(vulnerability.cvss_score, Some(7.2));
        assert_eq!(vulnerability.severity.as_deref(), Some("HIGH"));
        assert_eq!(
            component
                .short_term_upgrade_guidance
                .as_ref()
                .map(|g| g.version.as_str()),
            Some("4.17.21")
        );
        assert!(component.long_term_upgrade_guidance.is_none());
        assert_eq!(
            component.dependency_trees,
            Some(vec!["app".to_string(), "lodash".to_string()])
        );
    }

    #[test]
    fn missing_and_null_lists_deserialize_as_absent() {
        let component: ComponentReport =
            serde_json::from_str(r#"{"name": "demo", "licenses": null}"#).expect("json");
        assert!(component.violated_policies.is_none());
        assert!(component.licenses.is_none());
        assert!(component.vulnerabilities.is_none());
    }

    #[test]
    fn source_error_messages_name_the_failure() {
        let err = SourceError::Read {
            path: PathBuf::from("/tmp/missing.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let text = err.to_string();
        assert!(text.contains("/tmp/missing.json"));
        assert!(text.contains("no such file"));
    }

    #[tokio::test]
    async fn sources_map_violations_in_order() {
        let reports = EchoSource
            .component_reports(&["a".to_string(), "b".to_string()])
            .await
            .expect("reports");
        let names = reports.iter().map(|r| r.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["a", "b"]);
    }
}
