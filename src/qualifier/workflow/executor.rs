// SPDX-License-Identifier: MIT

//! Qualification workflow executor
//!
//! Runs `classify -> route -> (enrich -> score_and_draft)?`. Each step runs
//! at most once per call to [`QualificationWorkflow::run`].

use std::sync::Arc;

use super::router::{decide_next_step, Route};
use super::state::{LeadInput, Step, WorkflowState};
use super::steps::{
    classify_lead, enrich_lead, score_and_draft, LeadClassifier, LeadScorer, LlmClassifier,
    LlmScorer,
};
use crate::llm::error::Result;
use crate::llm::model::Model;
use crate::qualifier::tools::website::TitleLookup;

/// The lead qualification workflow
pub struct QualificationWorkflow {
    classifier: Arc<dyn LeadClassifier>,
    scorer: Arc<dyn LeadScorer>,
    lookup: Arc<dyn TitleLookup>,
}

impl QualificationWorkflow {
    pub fn new(
        classifier: Arc<dyn LeadClassifier>,
        scorer: Arc<dyn LeadScorer>,
        lookup: Arc<dyn TitleLookup>,
    ) -> Self {
        Self {
            classifier,
            scorer,
            lookup,
        }
    }

    /// Use one reasoning model for both classification and scoring
    pub fn from_model(model: Arc<dyn Model>, lookup: Arc<dyn TitleLookup>) -> Self {
        Self::new(
            Arc::new(LlmClassifier::new(model.clone())),
            Arc::new(LlmScorer::new(model)),
            lookup,
        )
    }

    /// Run one lead through the workflow and return the terminal state
    pub async fn run(&self, lead: LeadInput) -> Result<WorkflowState> {
        let state = WorkflowState::new(lead);
        log::info!(
            "[{}] Qualifying lead from {}",
            state.run_id,
            state.lead_input.name
        );

        let update = classify_lead(self.classifier.as_ref(), &state).await?;
        let state = state.merge(Step::Classify, update);

        if decide_next_step(&state) == Route::End {
            return Ok(state);
        }

        let update = enrich_lead(self.lookup.as_ref(), &state).await?;
        let state = state.merge(Step::Enrich, update);

        let update = score_and_draft(self.scorer.as_ref(), &state).await?;
        let state = state.merge(Step::ScoreAndDraft, update);

        log::info!("[{}] Workflow finished: {:?}", state.run_id, state.trace);
        Ok(state)
    }
}
