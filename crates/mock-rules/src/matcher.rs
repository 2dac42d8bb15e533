//! Request matchers.
//!
//! A [`Matcher`] is one condition a request must satisfy for a rule to apply.
//! The variant is the matcher's kind; the fields are its configuration.
//! Matchers are plain values: editing a matcher means replacing it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// HTTP methods that have a dedicated method matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Head,
        HttpMethod::Options,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }

    /// Parse a method name, ignoring case.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of a matcher, without its configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MatcherKind {
    Wildcard,
    Method(HttpMethod),
    SimplePath,
    RegexPath,
    Host,
    Query,
    ExactQuery,
    Header,
    Cookie,
    FormData,
    RawBody,
    RawBodyIncludes,
    JsonBody,
    JsonBodyFlexible,
    Callback,
}

impl MatcherKind {
    /// Every kind, in registry order.
    pub fn all() -> Vec<MatcherKind> {
        let mut kinds = vec![MatcherKind::Wildcard];
        kinds.extend(HttpMethod::ALL.into_iter().map(MatcherKind::Method));
        kinds.extend([
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
            MatcherKind::Callback,
        ]);
        kinds
    }
}

/// A single request condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Matcher {
    Wildcard,
    Method {
        method: HttpMethod,
    },
    SimplePath {
        path: String,
    },
    RegexPath {
        regex_source: String,
    },
    Host {
        host: String,
    },
    Query {
        query: BTreeMap<String, String>,
    },
    /// Matches the raw query string, including the leading `?`.
    ExactQuery {
        query: String,
    },
    Header {
        headers: BTreeMap<String, String>,
    },
    Cookie {
        cookies: BTreeMap<String, String>,
    },
    FormData {
        form_data: BTreeMap<String, String>,
    },
    RawBody {
        content: String,
    },
    RawBodyIncludes {
        content: String,
    },
    JsonBody {
        body: serde_json::Value,
    },
    JsonBodyFlexible {
        body: serde_json::Value,
    },
    /// A programmatic matcher defined outside the editor. It can be imported
    /// and displayed but never created from the UI.
    Callback {
        name: String,
    },
}

impl Matcher {
    /// Construct the default-configured matcher of a kind.
    pub fn default_for(kind: MatcherKind) -> Matcher {
        match kind {
            MatcherKind::Wildcard => Matcher::Wildcard,
            MatcherKind::Method(method) => Matcher::Method { method },
            MatcherKind::SimplePath => Matcher::SimplePath {
                path: String::new(),
            },
            MatcherKind::RegexPath => Matcher::RegexPath {
                regex_source: String::new(),
            },
            MatcherKind::Host => Matcher::Host {
                host: String::new(),
            },
            MatcherKind::Query => Matcher::Query {
                query: BTreeMap::new(),
            },
            MatcherKind::ExactQuery => Matcher::ExactQuery {
                query: String::new(),
            },
            MatcherKind::Header => Matcher::Header {
                headers: BTreeMap::new(),
            },
            MatcherKind::Cookie => Matcher::Cookie {
                cookies: BTreeMap::new(),
            },
            MatcherKind::FormData => Matcher::FormData {
                form_data: BTreeMap::new(),
            },
            MatcherKind::RawBody => Matcher::RawBody {
                content: String::new(),
            },
            MatcherKind::RawBodyIncludes => Matcher::RawBodyIncludes {
                content: String::new(),
            },
            MatcherKind::JsonBody => Matcher::JsonBody {
                body: serde_json::Value::Object(Default::default()),
            },
            MatcherKind::JsonBodyFlexible => Matcher::JsonBodyFlexible {
                body: serde_json::Value::Object(Default::default()),
            },
            MatcherKind::Callback => Matcher::Callback {
                name: String::new(),
            },
        }
    }

    pub fn kind(&self) -> MatcherKind {
        match self {
            Matcher::Wildcard => MatcherKind::Wildcard,
            Matcher::Method { method } => MatcherKind::Method(*method),
            Matcher::SimplePath { .. } => MatcherKind::SimplePath,
            Matcher::RegexPath { .. } => MatcherKind::RegexPath,
            Matcher::Host { .. } => MatcherKind::Host,
            Matcher::Query { .. } => MatcherKind::Query,
            Matcher::ExactQuery { .. } => MatcherKind::ExactQuery,
            Matcher::Header { .. } => MatcherKind::Header,
            Matcher::Cookie { .. } => MatcherKind::Cookie,
            Matcher::FormData { .. } => MatcherKind::FormData,
            Matcher::RawBody { .. } => MatcherKind::RawBody,
            Matcher::RawBodyIncludes { .. } => MatcherKind::RawBodyIncludes,
            Matcher::JsonBody { .. } => MatcherKind::JsonBody,
            Matcher::JsonBodyFlexible { .. } => MatcherKind::JsonBodyFlexible,
            Matcher::Callback { .. } => MatcherKind::Callback,
        }
    }

    /// Self-description, phrased to follow "Match requests ...".
    pub fn explain(&self) -> String {
        match self {
            Matcher::Wildcard => "for anything".to_string(),
            Matcher::Method { method } => format!("{} requests", method),
            Matcher::SimplePath { path } => format!("for {}", path),
            Matcher::RegexPath { regex_source } => format!("matching /{}/", regex_source),
            Matcher::Host { host } => format!("for host {}", host),
            Matcher::Query { query } => format!("with a query including {}", to_json(query)),
            Matcher::ExactQuery { query } => {
                format!("with a query exactly matching `{}`", query)
            }
            Matcher::Header { headers } => {
                format!("with headers including {}", to_json(headers))
            }
            Matcher::Cookie { cookies } => {
                format!("with cookies including {}", to_json(cookies))
            }
            Matcher::FormData { form_data } => {
                format!("with form data including {}", to_json(form_data))
            }
            Matcher::RawBody { content } => format!("with body '{}'", content),
            Matcher::RawBodyIncludes { content } => {
                format!("with a body including '{}'", content)
            }
            Matcher::JsonBody { body } => format!("with {} as a JSON body", body),
            Matcher::JsonBodyFlexible { body } => {
                format!("with JSON body including {}", body)
            }
            Matcher::Callback { name } => format!("matching a custom callback ({})", name),
        }
    }
}

fn to_json(map: &BTreeMap<String, String>) -> String {
    serde_json::to_string(map).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_parse_ignores_case() {
        assert_eq!(HttpMethod::parse("post"), Some(HttpMethod::Post));
        assert_eq!(HttpMethod::parse(" Options "), Some(HttpMethod::Options));
        assert_eq!(HttpMethod::parse("TRACE"), None);
    }

    #[test]
    fn test_default_matcher_has_requested_kind() {
        for kind in MatcherKind::all() {
            assert_eq!(Matcher::default_for(kind).kind(), kind);
        }
    }

    #[test]
    fn test_explain_texts() {
        assert_eq!(
            Matcher::Method {
                method: HttpMethod::Get
            }
            .explain(),
            "GET requests"
        );
        assert_eq!(
            Matcher::SimplePath {
                path: "/api".to_string()
            }
            .explain(),
            "for /api"
        );
        let headers = BTreeMap::from([("accept".to_string(), "text/html".to_string())]);
        assert_eq!(
            Matcher::Header { headers }.explain(),
            r#"with headers including {"accept":"text/html"}"#
        );
        assert_eq!(
            Matcher::JsonBody {
                body: json!({"a": 1})
            }
            .explain(),
            r#"with {"a":1} as a JSON body"#
        );
    }

    #[test]
    fn test_matcher_serializes_with_type_tag() {
        let matcher = Matcher::RegexPath {
            regex_source: "^/users/\\d+$".to_string(),
        };
        let value = serde_json::to_value(&matcher).unwrap();
        assert_eq!(
            value,
            json!({"type": "regex-path", "regexSource": "^/users/\\d+$"})
        );

        let method: Matcher = serde_json::from_value(json!({"type": "method", "method": "DELETE"}))
            .unwrap();
        assert_eq!(
            method,
            Matcher::Method {
                method: HttpMethod::Delete
            }
        );
    }
}
