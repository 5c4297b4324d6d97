// SPDX-License-Identifier: MIT

//! The single branch in the qualification workflow

use super::state::{Classification, WorkflowState};

/// Where to go after classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Enrich,
    End,
}

/// Route on the classification alone. Only `SalesQuery` continues.
pub fn route(classification: &Classification) -> Route {
    match classification {
        Classification::SalesQuery => Route::Enrich,
        Classification::CustomerSupport
        | Classification::JobApplication
        | Classification::Spam
        | Classification::Other(_) => Route::End,
    }
}

/// Decide the next step from the state after classification
pub fn decide_next_step(state: &WorkflowState) -> Route {
    let next = state.classification.as_ref().map_or(Route::End, route);
    match next {
        Route::Enrich => log::info!(
            "[{}] Lead is a sales query, proceeding to enrichment",
            state.run_id
        ),
        Route::End => log::info!(
            "[{}] Lead is '{}', ending process",
            state.run_id,
            state
                .classification
                .as_ref()
                .map(Classification::as_str)
                .unwrap_or("unclassified")
        ),
    }
    next
}
