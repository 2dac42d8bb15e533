//! Mock rule editing for HTTP interception.
//!
//! A mock rule pairs an ordered list of request [`Matcher`]s with a
//! [`Handler`]. This crate models rules, explains them in plain English,
//! provides the row editors that build matcher lists, and drives a page of
//! rules through [`MockPage`] on top of a [`RuleStore`].
//!
//! # Example
//!
//! ```
//! use mock_rules::{MemoryRuleStore, MockPage, PageConfig, builtin_default_rules};
//! use mock_rules::{HttpMethod, Matcher, MatcherKind, summarize_rule};
//! use std::time::Instant;
//!
//! let store = MemoryRuleStore::new(builtin_default_rules());
//! let mut page = MockPage::new(store, PageConfig::default());
//!
//! let id = page.add_rule(Instant::now());
//! page.set_initial_matcher(id, MatcherKind::Method(HttpMethod::Get)).unwrap();
//! page.add_matcher(id, Matcher::SimplePath { path: "/api".into() }).unwrap();
//!
//! let summary = summarize_rule(&page.rules()[0]);
//! assert_eq!(summary.matchers, "GET requests for /api");
//! ```

pub mod describe;
pub mod editor;
pub mod error;
pub mod events;
pub mod form;
pub mod handler;
pub mod lint;
pub mod matcher;
pub mod page;
pub mod registry;
pub mod rule;
pub mod ruleset;
pub mod store;

pub use describe::{describe_handler, describe_rule, summarize_rule, RuleSummary};
pub use editor::{
    ExistingMatcherRow, InitialMatcherSelector, NewMatcherRow, NewMatcherState, RowFocus,
    SelectorOption,
};
pub use error::{FormError, Result, RulesError};
pub use events::{EventBus, StoreEvent, Subscriber};
pub use handler::{Handler, HandlerKind};
pub use lint::{lint_rules, lint_ruleset_json, LintIssue, LintReport, Severity};
pub use matcher::{HttpMethod, Matcher, MatcherKind};
pub use page::{CollapsedState, MockPage, PageConfig};
pub use registry::{describe_matcher_kind, matcher_kind_from_key, matcher_kind_key};
pub use rule::{builtin_default_rules, MockRule, RuleId};
pub use ruleset::RuleSetExport;
pub use store::{MemoryRuleStore, RuleStore};
