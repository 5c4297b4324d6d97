// SPDX-License-Identifier: MIT

//! Lead qualification workflow
//!
//! A fixed three-step sequence with one branch:
//! classify, then (for sales leads only) enrich and score.

pub mod executor;
pub mod prompts;
pub mod router;
pub mod state;
pub mod steps;

pub use executor::QualificationWorkflow;
pub use router::{route, Route};
pub use state::{Classification, LeadInput, StateUpdate, Step, WorkflowState};
pub use steps::{LeadClassifier, LeadScorer, LlmClassifier, LlmScorer, ScoreAndDraft};
