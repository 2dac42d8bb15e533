//! Rule-set files.
//!
//! A rule set is a JSON array of rules, saved with the `.htkrules`
//! extension. Exports are named `HTTPToolkit_<YYYY-MM-DD_HH-mm>.htkrules`.

use crate::error::{Result, RulesError};
use crate::rule::MockRule;
use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing::info;

pub const RULESET_EXTENSION: &str = "htkrules";

/// MIME types accepted when importing.
pub const RULESET_MIME_TYPES: [&str; 2] = ["application/json", "application/htkrules+json"];

/// Extensions accepted when importing.
pub const RULESET_FILE_EXTENSIONS: [&str; 2] = [RULESET_EXTENSION, "json"];

/// A serialized rule set ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSetExport {
    pub filename: String,
    pub contents: String,
}

pub fn is_ruleset_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            RULESET_FILE_EXTENSIONS
                .iter()
                .any(|accepted| accepted.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

pub fn is_ruleset_mime(mime: &str) -> bool {
    let essence = mime.split(';').next().unwrap_or("").trim();
    RULESET_MIME_TYPES
        .iter()
        .any(|accepted| accepted.eq_ignore_ascii_case(essence))
}

/// Whether a file may be imported: either its extension is accepted, or
/// the caller knows its MIME type and that type is accepted.
pub fn is_ruleset_file(path: &Path, mime: Option<&str>) -> bool {
    is_ruleset_path(path) || mime.is_some_and(is_ruleset_mime)
}

pub fn parse_rules(content: &str) -> Result<Vec<MockRule>> {
    serde_json::from_str(content).map_err(RulesError::Parse)
}

pub fn serialize_rules(rules: &[MockRule]) -> Result<String> {
    serde_json::to_string_pretty(rules).map_err(RulesError::Serialize)
}

pub fn export_filename<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "HTTPToolkit_{}.{}",
        at.format("%Y-%m-%d_%H-%M"),
        RULESET_EXTENSION
    )
}

pub fn export_rules<Tz>(rules: &[MockRule], at: &DateTime<Tz>) -> Result<RuleSetExport>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    Ok(RuleSetExport {
        filename: export_filename(at),
        contents: serialize_rules(rules)?,
    })
}

/// Read a rule-set file. `mime` is the file's content type when known,
/// which admits files whose name lacks an accepted extension.
pub fn read_rules_file(path: &Path, mime: Option<&str>) -> Result<Vec<MockRule>> {
    if !is_ruleset_file(path, mime) {
        return Err(RulesError::UnsupportedFile {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path).map_err(|source| RulesError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rules = parse_rules(&content)?;
    info!(path = %path.display(), rules = rules.len(), "read rule set");
    Ok(rules)
}

/// Write an export into `dir`, returning the file's path.
pub fn write_export(dir: &Path, export: &RuleSetExport) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|source| RulesError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(&export.filename);
    std::fs::write(&path, &export.contents).map_err(|source| RulesError::Io {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), "wrote rule set");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Handler;
    use crate::matcher::{HttpMethod, Matcher};
    use chrono::{NaiveDate, Utc};

    fn sample_rules() -> Vec<MockRule> {
        vec![
            MockRule::new()
                .with_matchers(vec![
                    Matcher::Method {
                        method: HttpMethod::Get,
                    },
                    Matcher::SimplePath {
                        path: "/api/users".to_string(),
                    },
                ])
                .with_handler(Handler::StaticResponse {
                    status: 200,
                    status_message: None,
                    headers: Default::default(),
                    body: Some("[]".to_string()),
                }),
            MockRule::new().with_title("catch-all"),
        ]
    }

    #[test]
    fn test_export_filename_format() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(7, 9, 41)
            .unwrap()
            .and_utc();
        assert_eq!(
            export_filename(&at),
            "HTTPToolkit_2024-03-05_07-09.htkrules"
        );
    }

    #[test]
    fn test_accepted_paths_and_mime_types() {
        assert!(is_ruleset_path(Path::new("rules.htkrules")));
        assert!(is_ruleset_path(Path::new("RULES.JSON")));
        assert!(!is_ruleset_path(Path::new("rules.yaml")));
        assert!(!is_ruleset_path(Path::new("rules")));
        assert!(is_ruleset_mime("application/htkrules+json"));
        assert!(is_ruleset_mime("application/json; charset=utf-8"));
        assert!(!is_ruleset_mime("text/plain"));
        assert!(is_ruleset_file(Path::new("rules"), Some("application/json")));
        assert!(!is_ruleset_file(Path::new("rules"), None));
    }

    #[test]
    fn test_malformed_content_is_a_parse_error() {
        assert!(matches!(parse_rules("{\"not\": \"an array\"}"), Err(RulesError::Parse(_))));
        assert!(matches!(parse_rules("[{]"), Err(RulesError::Parse(_))));
    }

    #[test]
    fn test_write_then_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let rules = sample_rules();
        let export = export_rules(&rules, &Utc::now()).unwrap();

        let path = write_export(dir.path(), &export).unwrap();
        assert_eq!(path.file_name().unwrap().to_str().unwrap(), export.filename);
        assert_eq!(read_rules_file(&path, None).unwrap(), rules);
    }

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.txt");
        std::fs::write(&path, "[]").unwrap();
        assert!(matches!(
            read_rules_file(&path, None),
            Err(RulesError::UnsupportedFile { .. })
        ));
        assert!(matches!(
            read_rules_file(&path, Some("text/plain")),
            Err(RulesError::UnsupportedFile { .. })
        ));
    }

    #[test]
    fn test_mime_type_admits_file_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("downloaded-rules");
        let rules = sample_rules();
        std::fs::write(&path, serialize_rules(&rules).unwrap()).unwrap();

        assert!(matches!(
            read_rules_file(&path, None),
            Err(RulesError::UnsupportedFile { .. })
        ));
        assert_eq!(
            read_rules_file(&path, Some("application/htkrules+json")).unwrap(),
            rules
        );
    }
}
