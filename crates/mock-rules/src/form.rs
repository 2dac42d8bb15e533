//! Matcher configuration forms.
//!
//! Each matcher kind is configured from a single line of text. A form turns
//! that text into the matchers it describes: usually one, none while the
//! input is still empty, and sometimes more (a path with a query string
//! becomes a path matcher plus an exact query matcher).
//!
//! Input formats:
//!
//! | kind | input |
//! |------|-------|
//! | path | `/users/1` or `https://host/users/1?page=2` |
//! | regex path | `^/users/\d+$` |
//! | query, form data | `a=1&b=2` |
//! | exact query | `?a=1&b=2` (leading `?` optional) |
//! | headers | `Name: value; Other: value` |
//! | cookies | `a=1; b=2` |
//! | bodies | raw text, or JSON for the JSON kinds |
//!
//! Handlers that need a value use the same single-line forms: a target host
//! for forwarding, `STATUS [body]` for fixed responses and `STATUS path` for
//! file responses.

use crate::error::FormError;
use crate::handler::{Handler, HandlerKind};
use crate::matcher::{HttpMethod, Matcher, MatcherKind};
use regex::Regex;
use std::collections::BTreeMap;

/// Parse form input for `kind` into the matchers it configures.
pub fn configure(kind: MatcherKind, input: &str) -> Result<Vec<Matcher>, FormError> {
    match kind {
        MatcherKind::Wildcard => Ok(vec![Matcher::Wildcard]),
        MatcherKind::Method(default_method) => {
            let trimmed = input.trim();
            let method = if trimmed.is_empty() {
                default_method
            } else {
                HttpMethod::parse(trimmed)
                    .ok_or_else(|| FormError::UnknownMethod(trimmed.to_string()))?
            };
            Ok(vec![Matcher::Method { method }])
        }
        MatcherKind::SimplePath => configure_path(input.trim()),
        MatcherKind::RegexPath => {
            let source = input.trim();
            if source.is_empty() {
                return Ok(Vec::new());
            }
            Regex::new(source).map_err(|e| FormError::Regex(e.to_string()))?;
            Ok(vec![Matcher::RegexPath {
                regex_source: source.to_string(),
            }])
        }
        MatcherKind::Host => {
            let host = input.trim();
            if host.is_empty() {
                return Ok(Vec::new());
            }
            Ok(vec![Matcher::Host {
                host: host.to_string(),
            }])
        }
        MatcherKind::Query => {
            let query = parse_pairs(input, &['&', '\n'], '=')?;
            Ok(non_empty(query, |query| Matcher::Query { query }))
        }
        MatcherKind::ExactQuery => {
            let trimmed = input.trim();
            if trimmed.is_empty() {
                return Ok(Vec::new());
            }
            let query = if trimmed.starts_with('?') {
                trimmed.to_string()
            } else {
                format!("?{}", trimmed)
            };
            Ok(vec![Matcher::ExactQuery { query }])
        }
        MatcherKind::Header => {
            let headers = parse_pairs(input, &[';', '\n'], ':')?
                .into_iter()
                .map(|(name, value)| (name.to_ascii_lowercase(), value))
                .collect();
            Ok(non_empty(headers, |headers| Matcher::Header { headers }))
        }
        MatcherKind::Cookie => {
            let cookies = parse_pairs(input, &[';', '\n'], '=')?;
            Ok(non_empty(cookies, |cookies| Matcher::Cookie { cookies }))
        }
        MatcherKind::FormData => {
            let form_data = parse_pairs(input, &['&', '\n'], '=')?;
            Ok(non_empty(form_data, |form_data| Matcher::FormData {
                form_data,
            }))
        }
        MatcherKind::RawBody => Ok(raw_body(input, |content| Matcher::RawBody { content })),
        MatcherKind::RawBodyIncludes => Ok(raw_body(input, |content| {
            Matcher::RawBodyIncludes { content }
        })),
        MatcherKind::JsonBody => parse_json(input).map(|body| {
            body.map(|body| Matcher::JsonBody { body })
                .into_iter()
                .collect()
        }),
        MatcherKind::JsonBodyFlexible => parse_json(input).map(|body| {
            body.map(|body| Matcher::JsonBodyFlexible { body })
                .into_iter()
                .collect()
        }),
        MatcherKind::Callback => Err(FormError::NotConfigurable),
    }
}

/// Render a committed matcher back into form input for its kind.
///
/// `configure(m.kind(), &render_input(&m))` yields `m` again for every
/// matcher the editor can create.
pub fn render_input(matcher: &Matcher) -> String {
    match matcher {
        Matcher::Wildcard => String::new(),
        Matcher::Method { method } => method.to_string(),
        Matcher::SimplePath { path } => path.clone(),
        Matcher::RegexPath { regex_source } => regex_source.clone(),
        Matcher::Host { host } => host.clone(),
        Matcher::Query { query } => join_pairs(query, "=", "&"),
        Matcher::ExactQuery { query } => query.clone(),
        Matcher::Header { headers } => join_pairs(headers, ": ", "; "),
        Matcher::Cookie { cookies } => join_pairs(cookies, "=", "; "),
        Matcher::FormData { form_data } => join_pairs(form_data, "=", "&"),
        Matcher::RawBody { content } | Matcher::RawBodyIncludes { content } => content.clone(),
        Matcher::JsonBody { body } | Matcher::JsonBodyFlexible { body } => body.to_string(),
        Matcher::Callback { name } => name.clone(),
    }
}

/// Placeholder text shown in an empty form.
pub fn input_hint(kind: MatcherKind) -> &'static str {
    match kind {
        MatcherKind::Wildcard => "",
        MatcherKind::Method(_) => "GET",
        MatcherKind::SimplePath => "/path or https://host/path",
        MatcherKind::RegexPath => r"^/users/\d+$",
        MatcherKind::Host => "example.com:8080",
        MatcherKind::Query | MatcherKind::FormData => "name=value&other=value",
        MatcherKind::ExactQuery => "?name=value",
        MatcherKind::Header => "Name: value; Other: value",
        MatcherKind::Cookie => "name=value; other=value",
        MatcherKind::RawBody | MatcherKind::RawBodyIncludes => "body text",
        MatcherKind::JsonBody | MatcherKind::JsonBodyFlexible => r#"{"key": "value"}"#,
        MatcherKind::Callback => "",
    }
}

fn configure_path(input: &str) -> Result<Vec<Matcher>, FormError> {
    if input.is_empty() {
        return Ok(Vec::new());
    }
    let is_absolute_url = input.contains("://");
    if !input.starts_with('/') && !is_absolute_url {
        return Err(FormError::RelativePath);
    }

    let (path, query) = match input.split_once('?') {
        Some((path, query)) => (path, query),
        None => (input, ""),
    };

    let mut matchers = vec![Matcher::SimplePath {
        path: path.to_string(),
    }];
    if !query.is_empty() {
        matchers.push(Matcher::ExactQuery {
            query: format!("?{}", query),
        });
    }
    Ok(matchers)
}

fn parse_pairs(
    input: &str,
    separators: &[char],
    assignment: char,
) -> Result<BTreeMap<String, String>, FormError> {
    let mut pairs = BTreeMap::new();
    for entry in input.split(separators) {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let (name, value) = entry
            .split_once(assignment)
            .ok_or_else(|| FormError::MalformedPair {
                line: entry.to_string(),
                separator: assignment,
            })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(FormError::MalformedPair {
                line: entry.to_string(),
                separator: assignment,
            });
        }
        pairs.insert(name.to_string(), value.trim().to_string());
    }
    Ok(pairs)
}

fn join_pairs(pairs: &BTreeMap<String, String>, assignment: &str, separator: &str) -> String {
    pairs
        .iter()
        .map(|(name, value)| format!("{}{}{}", name, assignment, value))
        .collect::<Vec<_>>()
        .join(separator)
}

fn non_empty(
    pairs: BTreeMap<String, String>,
    build: impl FnOnce(BTreeMap<String, String>) -> Matcher,
) -> Vec<Matcher> {
    if pairs.is_empty() {
        Vec::new()
    } else {
        vec![build(pairs)]
    }
}

fn raw_body(input: &str, build: impl FnOnce(String) -> Matcher) -> Vec<Matcher> {
    if input.is_empty() {
        Vec::new()
    } else {
        vec![build(input.to_string())]
    }
}

fn parse_json(input: &str) -> Result<Option<serde_json::Value>, FormError> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(input)
        .map(Some)
        .map_err(|e| FormError::Json(e.to_string()))
}

// ============================================================================
// Handler forms
// ============================================================================

/// Whether a handler kind is configured from form input at all.
pub fn handler_takes_input(kind: HandlerKind) -> bool {
    matches!(
        kind,
        HandlerKind::ForwardTo | HandlerKind::StaticResponse | HandlerKind::FromFile
    )
}

/// Parse form input for a handler kind.
///
/// Headers are not part of the form; they are carried over from `current`
/// when it is a handler of the same shape.
pub fn configure_handler(
    kind: HandlerKind,
    input: &str,
    current: &Handler,
) -> Result<Handler, FormError> {
    let input = input.trim();
    let headers = match current {
        Handler::StaticResponse { headers, .. } | Handler::FromFile { headers, .. } => {
            headers.clone()
        }
        _ => BTreeMap::new(),
    };
    match kind {
        HandlerKind::ForwardTo => {
            if input.is_empty() {
                return Err(FormError::Empty);
            }
            Ok(Handler::ForwardTo {
                target: input.to_string(),
            })
        }
        HandlerKind::StaticResponse => {
            let (status, rest) = split_status(input)?;
            let status_message = match current {
                Handler::StaticResponse {
                    status: previous,
                    status_message,
                    ..
                } if *previous == status => status_message.clone(),
                _ => None,
            };
            Ok(Handler::StaticResponse {
                status,
                status_message,
                headers,
                body: (!rest.is_empty()).then(|| rest.to_string()),
            })
        }
        HandlerKind::FromFile => {
            let (status, path) = split_status(input)?;
            if path.is_empty() {
                return Err(FormError::Empty);
            }
            Ok(Handler::FromFile {
                status,
                headers,
                path: path.to_string(),
            })
        }
        other => Ok(Handler::default_for(other)),
    }
}

/// Render a handler back into its form input.
pub fn render_handler_input(handler: &Handler) -> String {
    match handler {
        Handler::ForwardTo { target } => target.clone(),
        Handler::StaticResponse { status, body, .. } => match body {
            Some(body) => format!("{} {}", status, body),
            None => status.to_string(),
        },
        Handler::FromFile { status, path, .. } => format!("{} {}", status, path),
        _ => String::new(),
    }
}

pub fn handler_input_hint(kind: HandlerKind) -> &'static str {
    match kind {
        HandlerKind::ForwardTo => "https://other-host:8443",
        HandlerKind::StaticResponse => "200 response body",
        HandlerKind::FromFile => "200 /path/to/body.json",
        _ => "",
    }
}

fn split_status(input: &str) -> Result<(u16, &str), FormError> {
    if input.is_empty() {
        return Err(FormError::Empty);
    }
    let (status, rest) = input.split_once(char::is_whitespace).unwrap_or((input, ""));
    let parsed = status
        .parse::<u16>()
        .ok()
        .filter(|code| (100..=599).contains(code))
        .ok_or_else(|| FormError::InvalidStatus(status.to_string()))?;
    Ok((parsed, rest.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_with_query_expands_to_two_matchers() {
        let matchers = configure(MatcherKind::SimplePath, "/search?q=rust").unwrap();
        assert_eq!(
            matchers,
            vec![
                Matcher::SimplePath {
                    path: "/search".to_string()
                },
                Matcher::ExactQuery {
                    query: "?q=rust".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_path_accepts_absolute_urls() {
        let matchers = configure(MatcherKind::SimplePath, "https://example.com/a").unwrap();
        assert_eq!(
            matchers,
            vec![Matcher::SimplePath {
                path: "https://example.com/a".to_string()
            }]
        );
    }

    #[test]
    fn test_relative_path_is_invalid() {
        assert_eq!(
            configure(MatcherKind::SimplePath, "users"),
            Err(FormError::RelativePath)
        );
    }

    #[test]
    fn test_empty_input_yields_no_matchers() {
        for kind in [
            MatcherKind::SimplePath,
            MatcherKind::RegexPath,
            MatcherKind::Header,
            MatcherKind::Query,
            MatcherKind::JsonBody,
            MatcherKind::RawBody,
        ] {
            assert_eq!(configure(kind, "").unwrap(), Vec::new(), "{kind:?}");
        }
    }

    #[test]
    fn test_invalid_regex_is_reported() {
        let err = configure(MatcherKind::RegexPath, "^/users/(\\d+$").unwrap_err();
        assert!(matches!(err, FormError::Regex(_)));
    }

    #[test]
    fn test_headers_are_lowercased() {
        let matchers = configure(MatcherKind::Header, "Content-Type: application/json; X-A: 1")
            .unwrap();
        let expected = BTreeMap::from([
            ("content-type".to_string(), "application/json".to_string()),
            ("x-a".to_string(), "1".to_string()),
        ]);
        assert_eq!(matchers, vec![Matcher::Header { headers: expected }]);
    }

    #[test]
    fn test_malformed_pair() {
        let err = configure(MatcherKind::Query, "a=1&broken").unwrap_err();
        assert_eq!(
            err,
            FormError::MalformedPair {
                line: "broken".to_string(),
                separator: '='
            }
        );
    }

    #[test]
    fn test_json_body() {
        let matchers = configure(MatcherKind::JsonBodyFlexible, r#"{"user": {"id": 1}}"#).unwrap();
        assert_eq!(
            matchers,
            vec![Matcher::JsonBodyFlexible {
                body: json!({"user": {"id": 1}})
            }]
        );
        assert!(matches!(
            configure(MatcherKind::JsonBody, "{not json"),
            Err(FormError::Json(_))
        ));
    }

    #[test]
    fn test_exact_query_gets_leading_question_mark() {
        assert_eq!(
            configure(MatcherKind::ExactQuery, "a=1").unwrap(),
            vec![Matcher::ExactQuery {
                query: "?a=1".to_string()
            }]
        );
    }

    #[test]
    fn test_callback_cannot_be_configured() {
        assert_eq!(
            configure(MatcherKind::Callback, "anything"),
            Err(FormError::NotConfigurable)
        );
    }

    #[test]
    fn test_render_input_feeds_back_into_configure() {
        let matchers = vec![
            Matcher::Method {
                method: HttpMethod::Patch,
            },
            Matcher::Header {
                headers: BTreeMap::from([("accept".to_string(), "*/*".to_string())]),
            },
            Matcher::Cookie {
                cookies: BTreeMap::from([("session".to_string(), "abc".to_string())]),
            },
            Matcher::JsonBody {
                body: json!({"a": [1, 2]}),
            },
        ];
        for matcher in matchers {
            let text = render_input(&matcher);
            assert_eq!(configure(matcher.kind(), &text).unwrap(), vec![matcher]);
        }
    }

    #[test]
    fn test_static_response_form() {
        let handler =
            configure_handler(HandlerKind::StaticResponse, "404 not here", &Handler::Passthrough)
                .unwrap();
        assert_eq!(
            handler,
            Handler::StaticResponse {
                status: 404,
                status_message: None,
                headers: BTreeMap::new(),
                body: Some("not here".to_string()),
            }
        );
        assert_eq!(render_handler_input(&handler), "404 not here");
    }

    #[test]
    fn test_handler_form_rejects_bad_status() {
        assert_eq!(
            configure_handler(HandlerKind::StaticResponse, "abc", &Handler::Passthrough),
            Err(FormError::InvalidStatus("abc".to_string()))
        );
        assert_eq!(
            configure_handler(HandlerKind::FromFile, "700 /x", &Handler::Passthrough),
            Err(FormError::InvalidStatus("700".to_string()))
        );
        assert_eq!(
            configure_handler(HandlerKind::FromFile, "200", &Handler::Passthrough),
            Err(FormError::Empty)
        );
        assert_eq!(
            configure_handler(HandlerKind::ForwardTo, " ", &Handler::Passthrough),
            Err(FormError::Empty)
        );
    }

    #[test]
    fn test_handler_form_keeps_headers() {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        let current = Handler::StaticResponse {
            status: 200,
            status_message: Some("OK".to_string()),
            headers: headers.clone(),
            body: None,
        };
        let updated =
            configure_handler(HandlerKind::FromFile, "201 /tmp/body.json", &current).unwrap();
        assert_eq!(
            updated,
            Handler::FromFile {
                status: 201,
                headers,
                path: "/tmp/body.json".to_string(),
            }
        );
        assert!(!handler_takes_input(HandlerKind::Timeout));
    }
}
