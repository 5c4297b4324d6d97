// SPDX-License-Identifier: MIT

//! Append-only lead store

pub mod sqlite;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::llm::error::Result;
use crate::qualifier::workflow::WorkflowState;

pub use sqlite::SqliteLeadStore;

/// Flattened copy of a finished workflow, ready to insert
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewLead {
    pub name: String,
    pub email: String,
    pub message: String,
    pub company_title: Option<String>,
    pub classification: String,
    pub score: Option<i64>,
    pub drafted_reply: Option<String>,
}

impl From<&WorkflowState> for NewLead {
    fn from(state: &WorkflowState) -> Self {
        Self {
            name: state.lead_input.name.clone(),
            email: state.lead_input.email.clone(),
            message: state.lead_input.message.clone(),
            company_title: state.company_title.clone(),
            classification: state
                .classification
                .as_ref()
                .map(|c| c.as_str().to_string())
                .unwrap_or_default(),
            score: state.score.map(i64::from),
            drafted_reply: state.drafted_reply.clone(),
        }
    }
}

/// A persisted lead row
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct LeadRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub message: String,
    pub company_title: Option<String>,
    pub classification: String,
    pub score: Option<i64>,
    pub drafted_reply: Option<String>,
    pub timestamp: NaiveDateTime,
}

/// Storage for processed leads. Rows are only ever inserted.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Insert a lead and return its id
    async fn add_lead(&self, lead: &NewLead) -> Result<i64>;

    /// Most recent leads first
    async fn recent(&self, limit: u32) -> Result<Vec<LeadRecord>>;

    async fn count(&self) -> Result<i64>;
}
