//! Human-readable rule summaries.

use crate::handler::Handler;
use crate::matcher::Matcher;
use crate::rule::MockRule;
use std::fmt;

/// Describe a rule's matchers as one phrase.
///
/// Two matchers are joined by a plain space; three or more get an Oxford
/// comma before the last one.
pub fn describe_rule(matchers: &[Matcher]) -> String {
    let explanations: Vec<String> = matchers.iter().map(Matcher::explain).collect();
    join_explanations(&explanations)
}

fn join_explanations(parts: &[String]) -> String {
    match parts {
        [] => "Never".to_string(),
        [only] => only.clone(),
        [first, second] => format!("{} {}", first, second),
        [first, middle @ .., last] => {
            format!("{} {}, and {}", first, middle.join(", "), last)
        }
    }
}

/// Describe a handler, capitalised for use as a standalone sentence.
pub fn describe_handler(handler: &Handler) -> String {
    capitalize(&handler.explain())
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The two halves of a rule's description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSummary {
    /// What the rule matches, e.g. `GET requests for /api`.
    pub matchers: String,
    /// What it then does, capitalised.
    pub handler: String,
}

impl fmt::Display for RuleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.matchers, self.handler)
    }
}

pub fn summarize_rule(rule: &MockRule) -> RuleSummary {
    RuleSummary {
        matchers: describe_rule(&rule.matchers),
        handler: describe_handler(&rule.handler),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::HttpMethod;
    use proptest::prelude::*;

    fn path(p: &str) -> Matcher {
        Matcher::SimplePath {
            path: p.to_string(),
        }
    }

    fn host(h: &str) -> Matcher {
        Matcher::Host {
            host: h.to_string(),
        }
    }

    fn get() -> Matcher {
        Matcher::Method {
            method: HttpMethod::Get,
        }
    }

    #[test]
    fn test_no_matchers_never_match() {
        assert_eq!(describe_rule(&[]), "Never");
    }

    #[test]
    fn test_single_matcher_uses_own_explanation() {
        let matchers = [get()];
        assert_eq!(describe_rule(&matchers), matchers[0].explain());
    }

    #[test]
    fn test_two_matchers_joined_without_comma() {
        assert_eq!(describe_rule(&[get(), path("/a")]), "GET requests for /a");
    }

    #[test]
    fn test_three_matchers_use_oxford_comma() {
        assert_eq!(
            describe_rule(&[get(), path("/a"), host("example.com")]),
            "GET requests for /a, and for host example.com"
        );
    }

    #[test]
    fn test_four_matchers() {
        assert_eq!(
            describe_rule(&[get(), path("/a"), host("b.com"), path("/c")]),
            "GET requests for /a, for host b.com, and for /c"
        );
    }

    #[test]
    fn test_describe_handler_capitalizes() {
        assert_eq!(
            describe_handler(&Handler::CloseConnection),
            "Close the connection"
        );
    }

    #[test]
    fn test_summary_display() {
        let rule = MockRule::new()
            .with_matchers(vec![get(), path("/health")])
            .with_handler(Handler::Timeout);
        let summary = summarize_rule(&rule);
        assert_eq!(summary.matchers, "GET requests for /health");
        assert_eq!(summary.handler, "Time out (never respond)");
        assert_eq!(
            summary.to_string(),
            "GET requests for /health → Time out (never respond)"
        );
    }

    proptest! {
        #[test]
        fn prop_join_grammar(parts in proptest::collection::vec("[a-z]{1,6}", 0..6)) {
            let joined = join_explanations(&parts);
            match parts.len() {
                0 => prop_assert_eq!(joined, "Never"),
                1 => prop_assert_eq!(&joined, &parts[0]),
                2 => prop_assert_eq!(joined, format!("{} {}", parts[0], parts[1])),
                n => {
                    let expected = format!(
                        "{} {}, and {}",
                        parts[0],
                        parts[1..n - 1].join(", "),
                        parts[n - 1]
                    );
                    prop_assert_eq!(joined, expected);
                }
            }
        }

        #[test]
        fn prop_capitalize_only_touches_first_char(text in "[a-z][a-zA-Z ]{0,20}") {
            let capitalized = capitalize(&text);
            prop_assert_eq!(&capitalized[1..], &text[1..]);
            prop_assert_eq!(
                capitalized.chars().next(),
                text.chars().next().map(|c| c.to_ascii_uppercase())
            );
        }
    }
}
