// SPDX-License-Identifier: MIT

//! Prompt text and output schemas for the two reasoning calls

use once_cell::sync::Lazy;
use schemars::JsonSchema;
use serde_json::Value;

/// Shape the classifier is asked to return
#[derive(Debug, JsonSchema)]
pub struct ClassificationOutput {
    /// One of sales_query, customer_support, job_application, spam
    pub classification: String,
}

/// Shape the scorer is asked to return
#[derive(Debug, JsonSchema)]
pub struct ScoreOutput {
    /// Lead quality from 0 to 100
    pub score: i64,
    /// Personalised email reply
    pub drafted_reply: String,
}

pub static CLASSIFICATION_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::to_value(schemars::schema_for!(ClassificationOutput)).unwrap_or(Value::Null)
});

pub static SCORE_SCHEMA: Lazy<Value> =
    Lazy::new(|| serde_json::to_value(schemars::schema_for!(ScoreOutput)).unwrap_or(Value::Null));

pub fn classification_prompt(message: &str) -> String {
    format!(
        r#"You are a lead classification expert. Based on the user's message, classify it into ONE of the following categories:
'sales_query', 'customer_support', 'job_application', 'spam'.

User's message: "{message}"

Return a single JSON object with one key, "classification", and the category as the value."#
    )
}

pub fn scoring_prompt(name: &str, company_title: &str, message: &str) -> String {
    format!(
        r#"You are a senior partner at an AI consultancy. A new lead has been enriched.
Your task is to score this lead from 0 to 100 and draft a personalized reply.

LEAD DETAILS:
- Name: {name}
- Company Website Title: {company_title}
- Message: {message}

CRITERIA:
- High Score (80-100): Clear business need for AI services, mentions budget/timeline, from a relevant industry.
- Medium Score (50-79): Vague business need, but seems professional.
- Low Score (0-49): Unprofessional, spam, job-seeker, no clear need.

RESPONSE FORMAT:
Return a single JSON object with two keys: "score" (an integer) and "drafted_reply" (a string for the email)."#
    )
}
