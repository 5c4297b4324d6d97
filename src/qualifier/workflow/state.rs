// SPDX-License-Identifier: MIT

//! Per-request workflow state and the partial updates steps return

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

use crate::llm::error::{QualifierError, Result};

/// Dot-atom local part (RFC 5322) and a dotted hostname. Letters and digits
/// outside ASCII are accepted on both sides (RFC 6531).
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    let atom = r"[\p{L}\p{N}!#$%\&'*+/=?\^_`{|}\~\-]+";
    let label = r"[\p{L}\p{N}](?:[\p{L}\p{N}\-]*[\p{L}\p{N}])?";
    Regex::new(&format!(r"^{atom}(?:\.{atom})*@{label}(?:\.{label})+$"))
        .expect("email regex is valid")
});

/// A submitted lead from the contact form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadInput {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl LeadInput {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    /// Reject leads whose email is not a plausible `local@domain.tld`
    pub fn validate(&self) -> Result<()> {
        if !EMAIL_RE.is_match(&self.email) {
            return Err(QualifierError::malformed_input(format!(
                "value is not a valid email address: '{}'",
                self.email
            )));
        }
        Ok(())
    }
}

/// Lead intent category
///
/// Only the exact lowercase tokens map onto the named variants. Anything
/// else the classifier returns is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Classification {
    SalesQuery,
    CustomerSupport,
    JobApplication,
    Spam,
    Other(String),
}

impl Classification {
    pub fn as_str(&self) -> &str {
        match self {
            Classification::SalesQuery => "sales_query",
            Classification::CustomerSupport => "customer_support",
            Classification::JobApplication => "job_application",
            Classification::Spam => "spam",
            Classification::Other(s) => s,
        }
    }

    pub fn is_sales(&self) -> bool {
        matches!(self, Classification::SalesQuery)
    }
}

impl From<&str> for Classification {
    fn from(s: &str) -> Self {
        match s {
            "sales_query" => Classification::SalesQuery,
            "customer_support" => Classification::CustomerSupport,
            "job_application" => Classification::JobApplication,
            "spam" => Classification::Spam,
            other => Classification::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Classification {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Classification {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Classification::from(s.as_str()))
    }
}

/// Workflow steps, in the order they can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Classify,
    Enrich,
    ScoreAndDraft,
}

/// Partial state returned by a step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub classification: Option<Classification>,
    pub company_title: Option<String>,
    pub score: Option<u8>,
    pub drafted_reply: Option<String>,
}

/// State threaded through one qualification run
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowState {
    pub run_id: Uuid,
    pub lead_input: LeadInput,
    pub classification: Option<Classification>,
    pub company_title: Option<String>,
    pub score: Option<u8>,
    pub drafted_reply: Option<String>,
    /// Steps that have run, in order
    pub trace: Vec<Step>,
}

impl WorkflowState {
    pub fn new(lead_input: LeadInput) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            lead_input,
            classification: None,
            company_title: None,
            score: None,
            drafted_reply: None,
            trace: Vec::new(),
        }
    }

    /// Merge a step's update into a new state. Fields left `None` in the
    /// update keep their current value.
    pub fn merge(mut self, step: Step, update: StateUpdate) -> Self {
        if let Some(c) = update.classification {
            self.classification = Some(c);
        }
        if let Some(t) = update.company_title {
            self.company_title = Some(t);
        }
        if let Some(s) = update.score {
            self.score = Some(s);
        }
        if let Some(r) = update.drafted_reply {
            self.drafted_reply = Some(r);
        }
        self.trace.push(step);
        self
    }

    pub fn is_sales_lead(&self) -> bool {
        self.classification
            .as_ref()
            .is_some_and(Classification::is_sales)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead() -> LeadInput {
        LeadInput::new("Ada", "ada@example.com", "hello")
    }

    #[test]
    fn test_classification_exact_tokens() {
        assert_eq!(Classification::from("sales_query"), Classification::SalesQuery);
        assert_eq!(
            Classification::from("customer_support"),
            Classification::CustomerSupport
        );
        assert_eq!(
            Classification::from("job_application"),
            Classification::JobApplication
        );
        assert_eq!(Classification::from("spam"), Classification::Spam);
    }

    #[test]
    fn test_classification_case_variants_are_other() {
        let c = Classification::from("Sales_Query");
        assert_eq!(c, Classification::Other("Sales_Query".to_string()));
        assert!(!c.is_sales());
        assert_eq!(c.as_str(), "Sales_Query");

        assert!(!Classification::from(" sales_query").is_sales());
    }

    #[test]
    fn test_classification_serde_uses_tokens() {
        let json = serde_json::to_string(&Classification::JobApplication).unwrap();
        assert_eq!(json, "\"job_application\"");
        let back: Classification = serde_json::from_str("\"partnership\"").unwrap();
        assert_eq!(back, Classification::Other("partnership".into()));
    }

    #[test]
    fn test_validate_email() {
        for good in [
            "ada@example.com",
            "first.last+tag@sub.acme.co.uk",
            "a!b@example.com",
            "user=tag@example.com",
            "x#y@example.com",
            "o'brien@example.com",
            "{weird}|~`^@example.com",
            "josé@example.com",
            "ada@bücher.de",
        ] {
            let res = LeadInput::new("a", good, "m").validate();
            assert!(res.is_ok(), "expected '{}' to be accepted", good);
        }

        for bad in [
            "",
            "no-at-sign",
            "two@@example.com",
            "x@localhost",
            "a b@example.com",
            "@example.com",
            "a..b@example.com",
            ".ada@example.com",
            "ada.@example.com",
            "ada@-acme.com",
            "ada@acme..com",
        ] {
            let err = LeadInput::new("a", bad, "m").validate().err();
            assert!(err.is_some(), "expected '{}' to be rejected", bad);
        }
    }

    #[test]
    fn test_merge_only_overwrites_present_fields() {
        let state = WorkflowState::new(lead())
            .merge(
                Step::Classify,
                StateUpdate {
                    classification: Some(Classification::SalesQuery),
                    ..Default::default()
                },
            )
            .merge(
                Step::Enrich,
                StateUpdate {
                    company_title: Some("Example Domain".into()),
                    ..Default::default()
                },
            )
            .merge(Step::ScoreAndDraft, StateUpdate::default());

        assert_eq!(state.classification, Some(Classification::SalesQuery));
        assert_eq!(state.company_title.as_deref(), Some("Example Domain"));
        assert_eq!(state.score, None);
        assert_eq!(state.drafted_reply, None);
        assert_eq!(
            state.trace,
            vec![Step::Classify, Step::Enrich, Step::ScoreAndDraft]
        );
    }

    #[test]
    fn test_new_state_is_blank() {
        let state = WorkflowState::new(lead());
        assert!(!state.is_sales_lead());
        assert!(state.trace.is_empty());
        assert!(state.classification.is_none());
    }
}
