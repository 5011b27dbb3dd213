use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::ConfigError;

/// The resolved availability search: which venue and activity to query, over
/// how many days, and how to reach the booking API.
#[derive(Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub days: u32,
    pub venue_name: String,
    pub activity_name: String,
    /// URL template carrying `{venue_name}` and `{activity_name}` placeholders.
    pub base_url: String,
    pub headers: BTreeMap<String, String>,
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let header_names: Vec<&str> = self.headers.keys().map(String::as_str).collect();
        f.debug_struct("SearchConfig")
            .field("days", &self.days)
            .field("venue_name", &self.venue_name)
            .field("activity_name", &self.activity_name)
            .field("base_url", &self.base_url)
            .field("headers", &header_names)
            .finish()
    }
}

/// On-disk layout: two sections that are merged into one flat parameter set.
#[derive(Debug, Deserialize)]
struct SearchFile {
    search_params: serde_yaml::Mapping,
    better_api: serde_yaml::Mapping,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FlatParams {
    days: i64,
    venue_name: String,
    activity_name: String,
    base_url: String,
    #[serde(default)]
    headers: BTreeMap<String, String>,
}

/// Load and validate the search configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_search_config(path: &Path) -> Result<SearchConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ConfigFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_search_config(&content)
}

/// Parse and validate search configuration from YAML text.
///
/// Keys under `better_api` override keys of the same name under
/// `search_params`. Unknown keys are rejected.
///
/// # Errors
///
/// Returns `ConfigError::ConfigFileParse` for malformed YAML, missing
/// sections, missing or unknown keys, and `ConfigError::Validation` for
/// values outside their allowed range.
pub fn parse_search_config(content: &str) -> Result<SearchConfig, ConfigError> {
    let file: SearchFile = serde_yaml::from_str(content)?;

    let mut merged = file.search_params;
    for (key, value) in file.better_api {
        merged.insert(key, value);
    }

    let flat: FlatParams = serde_yaml::from_value(serde_yaml::Value::Mapping(merged))?;
    validate(flat)
}

fn validate(flat: FlatParams) -> Result<SearchConfig, ConfigError> {
    let days = u32::try_from(flat.days).map_err(|_| {
        ConfigError::Validation(format!(
            "days must be a non-negative count, got {}",
            flat.days
        ))
    })?;

    for (field, value) in [
        ("venue_name", &flat.venue_name),
        ("activity_name", &flat.activity_name),
        ("base_url", &flat.base_url),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "{field} must be non-empty"
            )));
        }
    }

    Ok(SearchConfig {
        days,
        venue_name: flat.venue_name,
        activity_name: flat.activity_name,
        base_url: flat.base_url,
        headers: flat.headers,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const VALID: &str = r#"
search_params:
  days: 7
  venue_name: islington-tennis-centre
  activity_name: tennis-court-outdoor
better_api:
  base_url: "https://better-admin.org.uk/api/activities/venue/{venue_name}/activity/{activity_name}/times"
  headers:
    Origin: https://bookings.better.org.uk
    Authorization: Bearer secret-token
"#;

    #[test]
    fn parses_merged_sections() {
        let cfg = parse_search_config(VALID).unwrap();
        assert_eq!(cfg.days, 7);
        assert_eq!(cfg.venue_name, "islington-tennis-centre");
        assert_eq!(cfg.activity_name, "tennis-court-outdoor");
        assert!(cfg.base_url.contains("{venue_name}"));
        assert_eq!(
            cfg.headers.get("Origin").map(String::as_str),
            Some("https://bookings.better.org.uk")
        );
    }

    #[test]
    fn better_api_overrides_search_params() {
        let yaml = r"
search_params:
  days: 3
  venue_name: a
  activity_name: b
better_api:
  days: 5
  base_url: https://example.com/{venue_name}/{activity_name}
";
        let cfg = parse_search_config(yaml).unwrap();
        assert_eq!(cfg.days, 5);
        assert!(cfg.headers.is_empty());
    }

    #[test]
    fn rejects_negative_days() {
        let yaml = VALID.replace("days: 7", "days: -1");
        let err = parse_search_config(&yaml).unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(ref msg) if msg.contains("non-negative")),
            "got: {err:?}"
        );
    }

    #[test]
    fn accepts_zero_days() {
        let yaml = VALID.replace("days: 7", "days: 0");
        let cfg = parse_search_config(&yaml).unwrap();
        assert_eq!(cfg.days, 0);
    }

    #[test]
    fn rejects_missing_key() {
        let yaml = VALID.replace("  venue_name: islington-tennis-centre\n", "");
        let err = parse_search_config(&yaml).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigFileParse(_)), "got: {err:?}");
        assert!(err.to_string().contains("venue_name"), "got: {err}");
    }

    #[test]
    fn rejects_unknown_key() {
        let yaml = VALID.replace("days: 7", "days: 7\n  court_number: 3");
        let err = parse_search_config(&yaml).unwrap_err();
        assert!(err.to_string().contains("court_number"), "got: {err}");
    }

    #[test]
    fn rejects_missing_section() {
        let yaml = "search_params:\n  days: 1\n";
        let err = parse_search_config(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigFileParse(_)), "got: {err:?}");
    }

    #[test]
    fn rejects_blank_venue() {
        let yaml = VALID.replace("venue_name: islington-tennis-centre", "venue_name: \"  \"");
        let err = parse_search_config(&yaml).unwrap_err();
        assert!(err.to_string().contains("venue_name must be non-empty"));
    }

    #[test]
    fn debug_redacts_header_values() {
        let cfg = parse_search_config(VALID).unwrap();
        let rendered = format!("{cfg:?}");
        assert!(rendered.contains("Authorization"));
        assert!(!rendered.contains("secret-token"));
    }

    #[test]
    fn load_search_config_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(VALID.as_bytes()).unwrap();
        let cfg = load_search_config(file.path()).unwrap();
        assert_eq!(cfg.days, 7);
    }

    #[test]
    fn load_search_config_reports_missing_file() {
        let err = load_search_config(Path::new("/nonexistent/courtwatch.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigFileIo { .. }), "got: {err:?}");
    }
}
