//! Mock rules: ordered matchers plus one handler, under a stable identity.

use crate::handler::Handler;
use crate::matcher::Matcher;
use crate::registry::is_initial_matcher_kind;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable rule identity, preserved across edits, saves and reorders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(Uuid);

impl RuleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RuleId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for RuleId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockRule {
    pub id: RuleId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub matchers: Vec<Matcher>,
    pub handler: Handler,
}

impl MockRule {
    /// A fresh rule: no matchers, default handler.
    pub fn new() -> Self {
        Self {
            id: RuleId::new(),
            title: None,
            matchers: Vec::new(),
            handler: Handler::default(),
        }
    }

    pub fn with_matchers(mut self, matchers: Vec<Matcher>) -> Self {
        self.matchers = matchers;
        self
    }

    pub fn with_handler(mut self, handler: Handler) -> Self {
        self.handler = handler;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// The first matcher, when it is one the initial matcher selector
    /// offers. A rule may start with a narrowing matcher instead, after
    /// an import or when matchers were added before choosing a trigger.
    pub fn initial_matcher(&self) -> Option<&Matcher> {
        initial_matcher(&self.matchers)
    }

    /// Index of the first matcher after the initial one.
    pub fn additional_matchers_start(&self) -> usize {
        usize::from(self.initial_matcher().is_some())
    }
}

impl Default for MockRule {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn initial_matcher(matchers: &[Matcher]) -> Option<&Matcher> {
    matchers
        .first()
        .filter(|matcher| is_initial_matcher_kind(matcher.kind()))
}

/// Rules catching everything and passing it through, used when no rule set
/// is configured as the default.
pub fn builtin_default_rules() -> Vec<MockRule> {
    vec![MockRule::new()
        .with_title("Default passthrough")
        .with_matchers(vec![Matcher::Wildcard])
        .with_handler(Handler::Passthrough)]
}
