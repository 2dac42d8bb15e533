//! Rule handlers: what happens to a request once every matcher matched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Handler {
    /// Let the request continue to its original destination.
    #[default]
    Passthrough,
    /// Send the request to a different host.
    ForwardTo { target: String },
    StaticResponse {
        status: u16,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status_message: Option<String>,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        headers: BTreeMap<String, String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        body: Option<String>,
    },
    FromFile {
        status: u16,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        headers: BTreeMap<String, String>,
        path: String,
    },
    CloseConnection,
    ResetConnection,
    Timeout,
}

/// Handler kinds offered when picking a handler for a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    Passthrough,
    ForwardTo,
    StaticResponse,
    FromFile,
    CloseConnection,
    ResetConnection,
    Timeout,
}

impl HandlerKind {
    pub const ALL: [HandlerKind; 7] = [
        HandlerKind::Passthrough,
        HandlerKind::ForwardTo,
        HandlerKind::StaticResponse,
        HandlerKind::FromFile,
        HandlerKind::CloseConnection,
        HandlerKind::ResetConnection,
        HandlerKind::Timeout,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            HandlerKind::Passthrough => "Pass the request on to its destination",
            HandlerKind::ForwardTo => "Forward the request to a different host",
            HandlerKind::StaticResponse => "Return a fixed response",
            HandlerKind::FromFile => "Return a response from a file",
            HandlerKind::CloseConnection => "Close the connection immediately",
            HandlerKind::ResetConnection => "Forcibly reset the connection",
            HandlerKind::Timeout => "Time out with no response",
        }
    }
}

impl Handler {
    /// Default handler of a kind, used when the user switches handler type.
    pub fn default_for(kind: HandlerKind) -> Handler {
        match kind {
            HandlerKind::Passthrough => Handler::Passthrough,
            HandlerKind::ForwardTo => Handler::ForwardTo {
                target: String::new(),
            },
            HandlerKind::StaticResponse => Handler::StaticResponse {
                status: 200,
                status_message: None,
                headers: BTreeMap::new(),
                body: None,
            },
            HandlerKind::FromFile => Handler::FromFile {
                status: 200,
                headers: BTreeMap::new(),
                path: String::new(),
            },
            HandlerKind::CloseConnection => Handler::CloseConnection,
            HandlerKind::ResetConnection => Handler::ResetConnection,
            HandlerKind::Timeout => Handler::Timeout,
        }
    }

    pub fn kind(&self) -> HandlerKind {
        match self {
            Handler::Passthrough => HandlerKind::Passthrough,
            Handler::ForwardTo { .. } => HandlerKind::ForwardTo,
            Handler::StaticResponse { .. } => HandlerKind::StaticResponse,
            Handler::FromFile { .. } => HandlerKind::FromFile,
            Handler::CloseConnection => HandlerKind::CloseConnection,
            Handler::ResetConnection => HandlerKind::ResetConnection,
            Handler::Timeout => HandlerKind::Timeout,
        }
    }

    /// Lower-case self-description, phrased to follow "then ...".
    pub fn explain(&self) -> String {
        match self {
            Handler::Passthrough => "pass the request through to the target host".to_string(),
            Handler::ForwardTo { target } => format!("forward the request to {}", target),
            Handler::StaticResponse {
                status,
                status_message,
                headers,
                body,
            } => {
                let mut text = format!("respond with status {}", status);
                if let Some(message) = status_message {
                    text.push_str(&format!(" ({})", message));
                }
                if !headers.is_empty() {
                    text.push_str(&format!(" and headers {}", headers_json(headers)));
                }
                if let Some(body) = body {
                    text.push_str(&format!(" and body \"{}\"", body));
                }
                text
            }
            Handler::FromFile {
                status,
                headers,
                path,
            } => {
                let mut text = format!("respond with status {}", status);
                if !headers.is_empty() {
                    text.push_str(&format!(" and headers {}", headers_json(headers)));
                }
                text.push_str(&format!(" and body from file {}", path));
                text
            }
            Handler::CloseConnection => "close the connection".to_string(),
            Handler::ResetConnection => "reset the connection".to_string(),
            Handler::Timeout => "time out (never respond)".to_string(),
        }
    }
}

fn headers_json(headers: &BTreeMap<String, String>) -> String {
    serde_json::to_string(headers).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_response_explain() {
        let handler = Handler::StaticResponse {
            status: 404,
            status_message: Some("Not Found".to_string()),
            headers: BTreeMap::from([("x-mock".to_string(), "1".to_string())]),
            body: Some("missing".to_string()),
        };
        assert_eq!(
            handler.explain(),
            r#"respond with status 404 (Not Found) and headers {"x-mock":"1"} and body "missing""#
        );
    }

    #[test]
    fn test_file_handler_explain() {
        let handler = Handler::FromFile {
            status: 200,
            headers: BTreeMap::new(),
            path: "/tmp/body.json".to_string(),
        };
        assert_eq!(
            handler.explain(),
            "respond with status 200 and body from file /tmp/body.json"
        );
    }

    #[test]
    fn test_default_handler_kinds_round_trip() {
        for kind in HandlerKind::ALL {
            assert_eq!(Handler::default_for(kind).kind(), kind);
        }
        assert_eq!(Handler::default(), Handler::Passthrough);
    }

    #[test]
    fn test_handler_json_shape() {
        let handler: Handler = serde_json::from_str(r#"{"type":"static-response","status":201}"#)
            .unwrap();
        assert_eq!(handler, Handler::default_for(HandlerKind::StaticResponse).with_status(201));
    }

    impl Handler {
        fn with_status(mut self, new_status: u16) -> Self {
            if let Handler::StaticResponse { status, .. } = &mut self {
                *status = new_status;
            }
            self
        }
    }
}
