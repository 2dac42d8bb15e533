//! Matcher kind registry.
//!
//! Maps every [`MatcherKind`] to a stable key (used to identify options in
//! selectors; for non-method kinds it equals the serialized `type` tag) and,
//! for kinds the editor offers, a short phrase for dropdowns.
//! Lookups are pure and total over [`MatcherKind::all`].

use crate::matcher::{HttpMethod, MatcherKind};

/// Stable key for a kind.
pub fn matcher_kind_key(kind: MatcherKind) -> &'static str {
    match kind {
        MatcherKind::Wildcard => "wildcard",
        MatcherKind::Method(method) => method.as_str(),
        MatcherKind::SimplePath => "simple-path",
        MatcherKind::RegexPath => "regex-path",
        MatcherKind::Host => "host",
        MatcherKind::Query => "query",
        MatcherKind::ExactQuery => "exact-query",
        MatcherKind::Header => "header",
        MatcherKind::Cookie => "cookie",
        MatcherKind::FormData => "form-data",
        MatcherKind::RawBody => "raw-body",
        MatcherKind::RawBodyIncludes => "raw-body-includes",
        MatcherKind::JsonBody => "json-body",
        MatcherKind::JsonBodyFlexible => "json-body-flexible",
        MatcherKind::Callback => "callback",
    }
}

/// Inverse of [`matcher_kind_key`].
pub fn matcher_kind_from_key(key: &str) -> Option<MatcherKind> {
    MatcherKind::all()
        .into_iter()
        .find(|kind| matcher_kind_key(*kind) == key)
}

/// Dropdown phrase for a kind, or `None` if the kind must not be offered.
pub fn describe_matcher_kind(kind: MatcherKind) -> Option<&'static str> {
    let description = match kind {
        MatcherKind::Wildcard => "Any requests",
        MatcherKind::Method(method) => match method {
            HttpMethod::Get => "GET requests",
            HttpMethod::Post => "POST requests",
            HttpMethod::Put => "PUT requests",
            HttpMethod::Patch => "PATCH requests",
            HttpMethod::Delete => "DELETE requests",
            HttpMethod::Head => "HEAD requests",
            HttpMethod::Options => "OPTIONS requests",
        },
        MatcherKind::SimplePath => "For a URL",
        MatcherKind::RegexPath => "For URLs matching",
        MatcherKind::Host => "For a host",
        MatcherKind::Query => "With query parameters including",
        MatcherKind::ExactQuery => "With exact query string",
        MatcherKind::Header => "Including headers",
        MatcherKind::Cookie => "With cookies including",
        MatcherKind::FormData => "With form data including",
        MatcherKind::RawBody => "With exact body",
        MatcherKind::RawBodyIncludes => "With body including",
        MatcherKind::JsonBody => "With exact JSON body",
        MatcherKind::JsonBodyFlexible => "With JSON body including",
        MatcherKind::Callback => return None,
    };
    Some(description)
}

/// Kinds offered as a rule's primary trigger.
pub fn initial_matcher_kinds() -> Vec<MatcherKind> {
    let mut kinds = vec![MatcherKind::Wildcard];
    kinds.extend(HttpMethod::ALL.into_iter().map(MatcherKind::Method));
    kinds
}

/// Whether a kind can stand as a rule's primary trigger.
pub fn is_initial_matcher_kind(kind: MatcherKind) -> bool {
    matches!(kind, MatcherKind::Wildcard | MatcherKind::Method(_))
}

/// Kinds offered as additional, narrowing matchers.
pub fn additional_matcher_kinds() -> Vec<MatcherKind> {
    vec![
        MatcherKind::SimplePath,
        MatcherKind::RegexPath,
        MatcherKind::Host,
        MatcherKind::Query,
        MatcherKind::ExactQuery,
        MatcherKind::Header,
        MatcherKind::Cookie,
        MatcherKind::FormData,
        MatcherKind::RawBody,
        MatcherKind::RawBodyIncludes,
        MatcherKind::JsonBody,
        MatcherKind::JsonBodyFlexible,
    ]
}

/// Drop kinds without a description from an option list.
pub fn describable(
    kinds: impl IntoIterator<Item = MatcherKind>,
) -> Vec<(MatcherKind, &'static str)> {
    kinds
        .into_iter()
        .filter_map(|kind| describe_matcher_kind(kind).map(|d| (kind, d)))
        .collect()
}
