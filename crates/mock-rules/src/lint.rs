//! Rule-set linting.
//!
//! Checks rule-set content before it is imported, reporting every problem
//! found rather than stopping at the first one like [`parse_rules`] does.
//!
//! [`parse_rules`]: crate::ruleset::parse_rules

use crate::handler::Handler;
use crate::matcher::Matcher;
use crate::rule::{MockRule, RuleId};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

/// Severity level of a lint issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The rule set cannot be imported.
    Error,
    /// The rule set imports but probably does not do what was meant.
    Warning,
    Info,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintIssue {
    pub severity: Severity,
    /// Issue code (e.g., "E001", "W002").
    pub code: &'static str,
    pub message: String,
    /// Location within the rule set (e.g., "rules[0].matchers[1]").
    pub location: Option<String>,
    pub suggestion: Option<String>,
}

impl LintIssue {
    fn new(severity: Severity, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            location: None,
            suggestion: None,
        }
    }

    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    pub fn warning(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    pub fn info(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, code, message)
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// All issues found in one rule set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LintReport {
    pub issues: Vec<LintIssue>,
    pub rules_checked: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl LintReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_issue(&mut self, issue: LintIssue) {
        match issue.severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Info => {}
        }
        self.issues.push(issue);
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    /// Whether the rule set can be imported.
    pub fn is_valid(&self) -> bool {
        self.errors == 0
    }

    fn has_location_prefix(&self, prefix: &str) -> bool {
        self.issues.iter().any(|issue| {
            issue
                .location
                .as_deref()
                .is_some_and(|location| location.starts_with(prefix))
        })
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.issues.iter().any(|issue| issue.code == code)
    }

    /// One-line summary for the status bar.
    pub fn summary(&self) -> String {
        if self.errors == 0 && self.warnings == 0 {
            return format!("{} rules OK", self.rules_checked);
        }
        let mut parts = Vec::new();
        if self.errors > 0 {
            parts.push(format!(
                "{} error{}",
                self.errors,
                if self.errors == 1 { "" } else { "s" }
            ));
        }
        if self.warnings > 0 {
            parts.push(format!(
                "{} warning{}",
                self.warnings,
                if self.warnings == 1 { "" } else { "s" }
            ));
        }
        parts.join(", ")
    }
}

/// Lint serialized rule-set content.
pub fn lint_ruleset_json(content: &str) -> LintReport {
    let mut report = LintReport::new();

    let root: Value = match serde_json::from_str(content) {
        Ok(value) => value,
        Err(e) => {
            report.add_issue(
                LintIssue::error("E001", format!("Invalid JSON: {e}"))
                    .with_suggestion("Check the file is an exported rule set"),
            );
            return report;
        }
    };

    let Some(entries) = root.as_array() else {
        report.add_issue(
            LintIssue::error("E002", "Rule set must be a JSON array of rules")
                .with_suggestion("Wrap the rules in [ ... ]"),
        );
        return report;
    };

    let mut ids = HashSet::new();
    for (idx, entry) in entries.iter().enumerate() {
        report.rules_checked += 1;
        lint_rule_value(entry, idx, &mut ids, &mut report);
    }
    report
}

/// Lint rules that already parsed.
pub fn lint_rules(rules: &[MockRule]) -> LintReport {
    let mut report = LintReport::new();
    let mut ids = HashSet::new();
    for (idx, rule) in rules.iter().enumerate() {
        report.rules_checked += 1;
        check_rule(rule, idx, &mut ids, &mut report);
    }
    report
}

fn lint_rule_value(
    entry: &Value,
    idx: usize,
    ids: &mut HashSet<RuleId>,
    report: &mut LintReport,
) {
    let location = format!("rules[{idx}]");

    if let Some(matchers) = entry.get("matchers").and_then(|v| v.as_array()) {
        for (matcher_idx, matcher) in matchers.iter().enumerate() {
            if let Err(e) = serde_json::from_value::<Matcher>(matcher.clone()) {
                let kind = matcher
                    .get("type")
                    .and_then(|v| v.as_str())
                    .unwrap_or("<missing>");
                report.add_issue(
                    LintIssue::error("E004", format!("Invalid matcher of type {kind}: {e}"))
                        .with_location(format!("{location}.matchers[{matcher_idx}]")),
                );
            }
        }
    }

    match serde_json::from_value::<MockRule>(entry.clone()) {
        Ok(rule) => check_rule(&rule, idx, ids, report),
        Err(e) => {
            if !report.has_location_prefix(&format!("{location}.")) {
                report.add_issue(
                    LintIssue::error("E003", format!("Invalid rule: {e}"))
                        .with_location(location)
                        .with_suggestion("Each rule needs an id, a matchers list and a handler"),
                );
            }
        }
    }
}

fn check_rule(rule: &MockRule, idx: usize, ids: &mut HashSet<RuleId>, report: &mut LintReport) {
    let location = format!("rules[{idx}]");

    if !ids.insert(rule.id) {
        report.add_issue(
            LintIssue::warning("W001", format!("Duplicate rule id {}", rule.id))
                .with_location(location.clone())
                .with_suggestion("Only the first rule with this id will be editable"),
        );
    }

    if rule.matchers.is_empty() {
        report.add_issue(
            LintIssue::warning("W002", "Rule has no matchers and will never match")
                .with_location(location.clone()),
        );
    }

    for (matcher_idx, matcher) in rule.matchers.iter().enumerate() {
        let matcher_location = format!("{location}.matchers[{matcher_idx}]");
        match matcher {
            Matcher::RegexPath { regex_source } => {
                if let Err(e) = regex::Regex::new(regex_source) {
                    report.add_issue(
                        LintIssue::error("E005", format!("Invalid regex /{regex_source}/: {e}"))
                            .with_location(matcher_location),
                    );
                }
            }
            Matcher::Callback { name } => {
                report.add_issue(
                    LintIssue::info("I001", format!("Callback matcher {name} cannot be edited"))
                        .with_location(matcher_location),
                );
            }
            _ => {}
        }
    }

    let status = match &rule.handler {
        Handler::StaticResponse { status, .. } | Handler::FromFile { status, .. } => Some(*status),
        _ => None,
    };
    if let Some(status) = status {
        if !(100..=599).contains(&status) {
            report.add_issue(
                LintIssue::error("E006", format!("Status {status} is out of range (100-599)"))
                    .with_location(format!("{location}.handler")),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lint(value: Value) -> LintReport {
        lint_ruleset_json(&value.to_string())
    }

    fn rule_json(id: &str, matchers: Value) -> Value {
        json!({
            "id": id,
            "matchers": matchers,
            "handler": { "type": "passthrough" }
        })
    }

    const ID_A: &str = "6a2f41a3-c54c-fce8-32d2-0324e1c32e22";
    const ID_B: &str = "0a9a3b5c-1d2e-4f60-8a7b-9c0d1e2f3a4b";

    #[test]
    fn test_valid_rule_set() {
        let report = lint(json!([
            rule_json(ID_A, json!([{ "type": "wildcard" }])),
            rule_json(ID_B, json!([{ "type": "simple-path", "path": "/api" }])),
        ]));
        assert!(report.is_valid());
        assert!(report.issues.is_empty());
        assert_eq!(report.summary(), "2 rules OK");
    }

    #[test]
    fn test_invalid_json() {
        let report = lint_ruleset_json("[{");
        assert!(report.has_code("E001"));
        assert!(!report.is_valid());
    }

    #[test]
    fn test_root_must_be_array() {
        let report = lint(json!({ "rules": [] }));
        assert!(report.has_code("E002"));
    }

    #[test]
    fn test_invalid_rule_structure() {
        let report = lint(json!([{ "id": ID_A }]));
        assert!(report.has_code("E003"));
        assert_eq!(report.issues[0].location.as_deref(), Some("rules[0]"));
    }

    #[test]
    fn test_unknown_matcher_type_is_located() {
        let report = lint(json!([rule_json(
            ID_A,
            json!([{ "type": "wildcard" }, { "type": "teapot" }])
        )]));
        assert!(report.has_code("E004"));
        assert!(!report.has_code("E003"));
        assert_eq!(
            report.issues[0].location.as_deref(),
            Some("rules[0].matchers[1]")
        );
    }

    #[test]
    fn test_invalid_regex() {
        let report = lint(json!([rule_json(
            ID_A,
            json!([{ "type": "regex-path", "regexSource": "(" }])
        )]));
        assert!(report.has_code("E005"));
    }

    #[test]
    fn test_status_out_of_range() {
        let report = lint(json!([{
            "id": ID_A,
            "matchers": [{ "type": "wildcard" }],
            "handler": { "type": "static-response", "status": 42 }
        }]));
        assert!(report.has_code("E006"));
    }

    #[test]
    fn test_duplicate_ids_and_empty_matchers_warn() {
        let report = lint(json!([
            rule_json(ID_A, json!([])),
            rule_json(ID_A, json!([{ "type": "wildcard" }])),
        ]));
        assert!(report.is_valid());
        assert!(report.has_code("W001"));
        assert!(report.has_code("W002"));
        assert_eq!(report.summary(), "2 warnings");
    }

    #[test]
    fn test_callback_is_informational() {
        let rule = MockRule::new().with_matchers(vec![Matcher::Callback {
            name: "check".to_string(),
        }]);
        let report = lint_rules(&[rule]);
        assert!(report.has_code("I001"));
        assert!(report.is_valid());
        assert_eq!(report.warnings, 0);
    }
}
