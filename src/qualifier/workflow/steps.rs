// SPDX-License-Identifier: MIT

//! Workflow steps and the capabilities they call
//!
//! Each step reads the current [`WorkflowState`] and returns a
//! [`StateUpdate`]; the executor does the merging. The reasoning calls sit
//! behind [`LeadClassifier`] and [`LeadScorer`] so tests can swap in fakes.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::prompts::{
    classification_prompt, scoring_prompt, CLASSIFICATION_SCHEMA, SCORE_SCHEMA,
};
use super::state::{Classification, LeadInput, StateUpdate, WorkflowState};
use crate::llm::error::{QualifierError, Result};
use crate::llm::model::{Content, GenerationConfig, Model};
use crate::qualifier::tools::website::TitleLookup;

/// Score and reply produced for a sales lead. Either may be missing when the
/// model omits the key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreAndDraft {
    pub score: Option<u8>,
    pub drafted_reply: Option<String>,
}

/// Assigns an intent category to a lead message
#[async_trait]
pub trait LeadClassifier: Send + Sync {
    async fn classify(&self, message: &str) -> Result<Classification>;
}

/// Scores a sales lead and drafts a reply
#[async_trait]
pub trait LeadScorer: Send + Sync {
    async fn score_and_draft(&self, lead: &LeadInput, company_title: &str)
        -> Result<ScoreAndDraft>;
}

/// Strip markdown code fences some models wrap JSON in
fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Parse classifier output. Anything unusable becomes `Spam`.
pub fn parse_classification(text: &str) -> Classification {
    let parsed: Value = match serde_json::from_str(strip_code_blocks(text)) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("Classifier returned non-JSON output ({}), defaulting to spam", e);
            return Classification::Spam;
        }
    };

    match parsed.get("classification").and_then(Value::as_str) {
        Some(label) => Classification::from(label),
        None => {
            log::warn!(
                "Classifier output has no string 'classification' key, defaulting to spam: {}",
                parsed
            );
            Classification::Spam
        }
    }
}

/// Read a score out of whatever numeric shape the model produced
fn score_from_value(value: &Value) -> Option<u8> {
    let raw = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    Some(raw.clamp(0, 100) as u8)
}

/// Parse scorer output. Missing or ill-typed keys stay `None`.
pub fn parse_score_and_draft(text: &str) -> ScoreAndDraft {
    let parsed: Value = match serde_json::from_str(strip_code_blocks(text)) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("Scorer returned non-JSON output: {}", e);
            return ScoreAndDraft::default();
        }
    };

    let score = parsed.get("score").and_then(score_from_value);
    let drafted_reply = parsed
        .get("drafted_reply")
        .and_then(Value::as_str)
        .map(str::to_string);

    if score.is_none() || drafted_reply.is_none() {
        log::warn!("Scorer output is missing fields: {}", parsed);
    }

    ScoreAndDraft {
        score,
        drafted_reply,
    }
}

/// Domain part of an email address (second `@`-separated segment)
pub fn email_domain(email: &str) -> Result<&str> {
    email
        .split('@')
        .nth(1)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| {
            QualifierError::malformed_input(format!("email '{}' has no domain part", email))
        })
}

/// Classifier backed by a reasoning model
pub struct LlmClassifier {
    model: Arc<dyn Model>,
    config: GenerationConfig,
}

impl LlmClassifier {
    pub fn new(model: Arc<dyn Model>) -> Self {
        Self {
            model,
            config: GenerationConfig::json(Some(CLASSIFICATION_SCHEMA.clone())),
        }
    }
}

#[async_trait]
impl LeadClassifier for LlmClassifier {
    async fn classify(&self, message: &str) -> Result<Classification> {
        let history = [Content::user(classification_prompt(message))];
        let response = self
            .model
            .generate_content(&history, Some(&self.config))
            .await?;
        Ok(parse_classification(&response.text()))
    }
}

/// Scorer backed by a reasoning model
pub struct LlmScorer {
    model: Arc<dyn Model>,
    config: GenerationConfig,
}

impl LlmScorer {
    pub fn new(model: Arc<dyn Model>) -> Self {
        Self {
            model,
            config: GenerationConfig::json(Some(SCORE_SCHEMA.clone())),
        }
    }
}

#[async_trait]
impl LeadScorer for LlmScorer {
    async fn score_and_draft(
        &self,
        lead: &LeadInput,
        company_title: &str,
    ) -> Result<ScoreAndDraft> {
        let prompt = scoring_prompt(&lead.name, company_title, &lead.message);
        let history = [Content::user(prompt)];
        let response = self
            .model
            .generate_content(&history, Some(&self.config))
            .await?;
        Ok(parse_score_and_draft(&response.text()))
    }
}

/// Classification step
pub async fn classify_lead(
    classifier: &dyn LeadClassifier,
    state: &WorkflowState,
) -> Result<StateUpdate> {
    log::info!("[{}] NODE: classifying lead", state.run_id);
    let classification = classifier.classify(&state.lead_input.message).await?;
    log::info!("[{}] Classification result: {}", state.run_id, classification);

    Ok(StateUpdate {
        classification: Some(classification),
        ..Default::default()
    })
}

/// Enrichment step (sales path only)
pub async fn enrich_lead(lookup: &dyn TitleLookup, state: &WorkflowState) -> Result<StateUpdate> {
    log::info!("[{}] NODE: enriching lead", state.run_id);
    let domain = email_domain(&state.lead_input.email)?;
    let title = lookup.lookup_title(domain).await;
    log::info!("[{}] Enrichment result: {}", state.run_id, title);

    Ok(StateUpdate {
        company_title: Some(title),
        ..Default::default()
    })
}

/// Scoring and drafting step (sales path only)
pub async fn score_and_draft(
    scorer: &dyn LeadScorer,
    state: &WorkflowState,
) -> Result<StateUpdate> {
    log::info!("[{}] NODE: scoring and drafting", state.run_id);
    let company_title = state.company_title.as_deref().unwrap_or_default();
    let result = scorer
        .score_and_draft(&state.lead_input, company_title)
        .await?;
    log::info!(
        "[{}] Scoring result: score={:?}, reply={} chars",
        state.run_id,
        result.score,
        result.drafted_reply.as_ref().map_or(0, String::len)
    );

    Ok(StateUpdate {
        score: result.score,
        drafted_reply: result.drafted_reply,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qualifier::workflow::state::Step;
    use serde_json::json;
    use std::sync::Mutex;

    /// Model that replays one canned reply and records the prompt it saw
    struct CannedModel {
        reply: String,
        seen: Mutex<Vec<String>>,
    }

    impl CannedModel {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Model for CannedModel {
        fn name(&self) -> &str {
            "canned"
        }

        async fn generate_content(
            &self,
            history: &[Content],
            config: Option<&GenerationConfig>,
        ) -> Result<Content> {
            assert!(config.is_some_and(|c| c.json_mode));
            self.seen.lock().unwrap().push(history[0].text());
            Ok(Content::model(self.reply.clone()))
        }
    }

    struct FixedLookup(&'static str);

    #[async_trait]
    impl TitleLookup for FixedLookup {
        async fn lookup_title(&self, domain: &str) -> String {
            format!("{} ({})", self.0, domain)
        }
    }

    #[test]
    fn test_parse_classification_valid() {
        assert_eq!(
            parse_classification(r#"{"classification": "sales_query"}"#),
            Classification::SalesQuery
        );
        assert_eq!(
            parse_classification(r#"{"classification": "customer_support"}"#),
            Classification::CustomerSupport
        );
    }

    #[test]
    fn test_parse_classification_defaults_to_spam() {
        assert_eq!(parse_classification("I think this is sales"), Classification::Spam);
        assert_eq!(parse_classification(""), Classification::Spam);
        assert_eq!(parse_classification(r#"{"category": "sales_query"}"#), Classification::Spam);
        assert_eq!(parse_classification(r#"{"classification": 3}"#), Classification::Spam);
        assert_eq!(parse_classification("[1, 2]"), Classification::Spam);
    }

    #[test]
    fn test_parse_classification_keeps_unknown_labels() {
        assert_eq!(
            parse_classification(r#"{"classification": "Sales_Query"}"#),
            Classification::Other("Sales_Query".into())
        );
    }

    #[test]
    fn test_parse_classification_strips_code_fence() {
        let text = "```json\n{\"classification\": \"job_application\"}\n```";
        assert_eq!(parse_classification(text), Classification::JobApplication);
    }

    #[test]
    fn test_parse_score_and_draft() {
        let r = parse_score_and_draft(r#"{"score": 85, "drafted_reply": "Hi Ada"}"#);
        assert_eq!(r.score, Some(85));
        assert_eq!(r.drafted_reply.as_deref(), Some("Hi Ada"));
    }

    #[test]
    fn test_parse_score_leaves_missing_fields_unset() {
        let r = parse_score_and_draft(r#"{"drafted_reply": "Hello"}"#);
        assert_eq!(r.score, None);
        assert_eq!(r.drafted_reply.as_deref(), Some("Hello"));

        let r = parse_score_and_draft(r#"{"score": 40}"#);
        assert_eq!(r.score, Some(40));
        assert_eq!(r.drafted_reply, None);

        assert_eq!(parse_score_and_draft("not json"), ScoreAndDraft::default());
    }

    #[test]
    fn test_score_shapes_and_clamping() {
        assert_eq!(score_from_value(&json!(150)), Some(100));
        assert_eq!(score_from_value(&json!(-5)), Some(0));
        assert_eq!(score_from_value(&json!(72.6)), Some(73));
        assert_eq!(score_from_value(&json!("64")), Some(64));
        assert_eq!(score_from_value(&json!("high")), None);
        assert_eq!(score_from_value(&json!(null)), None);
        assert_eq!(score_from_value(&json!([90])), None);
    }

    #[test]
    fn test_email_domain() {
        assert_eq!(email_domain("ada@acme.io").unwrap(), "acme.io");
        assert!(matches!(
            email_domain("no-at-sign"),
            Err(QualifierError::MalformedInput(_))
        ));
        assert!(email_domain("trailing@").is_err());
    }

    #[tokio::test]
    async fn test_llm_classifier_sends_message_in_prompt() {
        let model = CannedModel::new(r#"{"classification": "spam"}"#);
        let classifier = LlmClassifier::new(model.clone());
        let c = classifier.classify("Buy cheap watches").await.unwrap();
        assert_eq!(c, Classification::Spam);
        let seen = model.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains("Buy cheap watches"));
    }

    #[tokio::test]
    async fn test_llm_scorer_uses_company_title() {
        let model = CannedModel::new(r#"{"score": 90, "drafted_reply": "Thanks!"}"#);
        let scorer = LlmScorer::new(model.clone());
        let lead = LeadInput::new("Ada", "ada@acme.io", "Pricing for 500 seats?");
        let r = scorer.score_and_draft(&lead, "Acme Inc").await.unwrap();
        assert_eq!(r.score, Some(90));
        assert!(model.seen.lock().unwrap()[0].contains("Acme Inc"));
    }

    #[tokio::test]
    async fn test_enrich_step_uses_email_domain() {
        let state = WorkflowState::new(LeadInput::new("Ada", "ada@acme.io", "hi"));
        let update = enrich_lead(&FixedLookup("Acme"), &state).await.unwrap();
        assert_eq!(update.company_title.as_deref(), Some("Acme (acme.io)"));
        assert!(update.classification.is_none());
    }

    #[tokio::test]
    async fn test_enrich_step_rejects_email_without_at() {
        let state = WorkflowState::new(LeadInput::new("Ada", "ada.acme.io", "hi"));
        let err = enrich_lead(&FixedLookup("Acme"), &state).await.err().unwrap();
        assert!(matches!(err, QualifierError::MalformedInput(_)));
    }

    #[tokio::test]
    async fn test_score_step_update_only_touches_score_fields() {
        let model = CannedModel::new(r#"{"score": 55}"#);
        let scorer = LlmScorer::new(model);
        let state = WorkflowState::new(LeadInput::new("Ada", "ada@acme.io", "hi")).merge(
            Step::Enrich,
            StateUpdate {
                company_title: Some("Acme".into()),
                ..Default::default()
            },
        );
        let update = score_and_draft(&scorer, &state).await.unwrap();
        assert_eq!(update.score, Some(55));
        assert_eq!(update.drafted_reply, None);
        assert_eq!(update.company_title, None);
    }
}
