use super::*;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time")
        .as_nanos();
    std::env::temp_dir().join(format!("policy-report-{nanos}-{file_name}"))
}

#[test]
fn missing_config_uses_defaults() {
    let path = unique_temp_path("missing-config.toml");
    let config = PolicyReportConfig::load_from_path(&path).expect("default config");

    assert_eq!(config.format, DEFAULT_FORMAT);
    assert!(!config.fail_on_violation);
    assert!(config.output.path.is_none());
    assert!(!config.output.append);
}

#[test]
fn parses_config_values() {
    let path = unique_temp_path("config.toml");
    let raw = r#"
format = "upgrade-object"
fail_on_violation = true

[output]
path = "reports/policy.md"
append = true
"#;
    fs::write(&path, raw).expect("write config");

    let config = PolicyReportConfig::load_from_path(&path).expect("parsed config");
    let _ = fs::remove_file(path);

    assert_eq!(config.format, ReportFormat::UpgradeObject);
    assert!(config.fail_on_violation);
    assert_eq!(
        config.output.path.as_deref(),
        Some(Path::new("reports/policy.md"))
    );
    assert!(config.output.append);
}

#[test]
fn project_overrides_global_config() {
    let global_path = unique_temp_path("global-config.toml");
    let project_path = unique_temp_path("project-config.toml");
    fs::write(
        &global_path,
        r#"
format = "upgrade-object"
fail_on_violation = true

[output]
path = "/tmp/global.md"
"#,
    )
    .expect("write global config");
    fs::write(
        &project_path,
        r#"
fail_on_violation = false

[output]
append = true
"#,
    )
    .expect("write project config");

    let config = PolicyReportConfig::load_with_paths(
        Some(global_path.clone()),
        Some(project_path.clone()),
    )
    .expect("merged config");

    let _ = fs::remove_file(global_path);
    let _ = fs::remove_file(project_path);

    assert_eq!(config.format, ReportFormat::UpgradeObject);
    assert!(!config.fail_on_violation);
    assert_eq!(config.output.path.as_deref(), Some(Path::new("/tmp/global.md")));
    assert!(config.output.append);
}

#[test]
fn unknown_format_is_a_parse_error() {
    let path = unique_temp_path("bad-format.toml");
    fs::write(&path, "format = \"html\"\n").expect("write config");

    let err = PolicyReportConfig::load_from_path(&path).expect_err("invalid format");
    let _ = fs::remove_file(&path);

    assert!(err.to_string().contains("failed to parse config file"));
}

#[test]
fn invalid_toml_reports_path() {
    let path = unique_temp_path("broken.toml");
    fs::write(&path, "format = [").expect("write config");

    let err = PolicyReportConfig::load_from_path(&path).expect_err("invalid toml");
    let text = err.to_string();
    let _ = fs::remove_file(&path);

    assert!(text.contains("broken.toml"));
}
