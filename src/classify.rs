//! Presentation-facing labels for invocation results.

use std::fmt;

use serde::Serialize;

use crate::executor::InvocationResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Failure => f.write_str("failure"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub label: Outcome,
    /// e.g. "200 OK", "0 Error"
    pub display_status: String,
}

pub fn classify(result: &InvocationResult) -> Classification {
    let label = if result.succeeded {
        Outcome::Success
    } else {
        Outcome::Failure
    };
    let display_status = if result.status_text.is_empty() {
        result.status_code.to_string()
    } else {
        format!("{} {}", result.status_code, result.status_text)
    };
    Classification {
        label,
        display_status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(status_code: u16, status_text: &str, succeeded: bool) -> InvocationResult {
        InvocationResult {
            status_code,
            status_text: status_text.to_string(),
            payload: json!({}),
            succeeded,
        }
    }

    #[test]
    fn classify_success() {
        let c = classify(&result(201, "Created", true));
        assert_eq!(c.label, Outcome::Success);
        assert_eq!(c.display_status, "201 Created");
    }

    #[test]
    fn classify_follows_succeeded_flag_not_status() {
        let c = classify(&result(200, "OK", false));
        assert_eq!(c.label, Outcome::Failure);
    }

    #[test]
    fn classify_transport_failure() {
        let c = classify(&InvocationResult::transport_failure("connection refused"));
        assert_eq!(c.label, Outcome::Failure);
        assert_eq!(c.display_status, "0 Error");
    }

    #[test]
    fn classify_without_reason_phrase() {
        let c = classify(&result(599, "", false));
        assert_eq!(c.display_status, "599");
    }
}
