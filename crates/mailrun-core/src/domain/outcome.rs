//! Outcome model: the result of one delivery attempt.
//!
//! A dispatch never returns an error to the caller. Whatever went wrong on the
//! way to the SMTP server is folded into `Failed(reason)`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryOutcome {
    Delivered,
    Failed(String),
}

impl DeliveryOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Delivered => None,
            Self::Failed(reason) => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serializes_as_tagged_enum() {
        let v = serde_json::to_value(DeliveryOutcome::failed("535 auth")).unwrap();
        assert_eq!(v["kind"], "FAILED");
        assert_eq!(v["reason"], "535 auth");

        let v = serde_json::to_value(DeliveryOutcome::Delivered).unwrap();
        assert_eq!(v["kind"], "DELIVERED");
    }

    #[test]
    fn reason_is_only_present_on_failure() {
        assert_eq!(DeliveryOutcome::Delivered.reason(), None);
        assert!(DeliveryOutcome::Delivered.is_delivered());

        let failed = DeliveryOutcome::failed("connection refused");
        assert_eq!(failed.reason(), Some("connection refused"));
        assert!(!failed.is_delivered());
    }
}
