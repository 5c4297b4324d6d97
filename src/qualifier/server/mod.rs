// SPDX-License-Identifier: MIT

//! HTTP API: `GET /` and `POST /qualify-lead`

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::llm::error::{QualifierError, Result};
use crate::llm::factory::create_model;
use crate::qualifier::config::Settings;
use crate::qualifier::store::{LeadStore, NewLead};
use crate::qualifier::tools::website::HttpTitleLookup;
use crate::qualifier::workflow::{Classification, LeadInput, QualificationWorkflow, WorkflowState};

pub const STATUS_SALES: &str = "SUCCESS - SALES LEAD PROCESSED";
pub const STATUS_NON_SALES: &str = "SUCCESS - NON-SALES LEAD";
pub const NON_SALES_REPLY: &str =
    "N/A - This lead was classified as non-sales and not processed further.";

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<QualificationWorkflow>,
    pub store: Arc<dyn LeadStore>,
    pub persist_non_sales: bool,
}

impl AppState {
    /// Wire the real model, website lookup and store from settings
    pub fn from_settings(settings: &Settings, store: Arc<dyn LeadStore>) -> Result<Self> {
        let model = create_model(&settings.model)?;
        let lookup = Arc::new(HttpTitleLookup::new(settings.website_timeout)?);

        Ok(Self {
            workflow: Arc::new(QualificationWorkflow::from_model(model, lookup)),
            store,
            persist_non_sales: settings.persist_non_sales,
        })
    }
}

/// Response body for `POST /qualify-lead`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadOutput {
    pub status: String,
    pub classification: Classification,
    pub score: Option<u8>,
    pub company_title: Option<String>,
    pub drafted_reply: Option<String>,
}

impl LeadOutput {
    /// Map a terminal workflow state onto the API response
    pub fn from_state(state: &WorkflowState) -> Self {
        let classification = state
            .classification
            .clone()
            .unwrap_or(Classification::Spam);

        if !classification.is_sales() {
            return Self {
                status: STATUS_NON_SALES.to_string(),
                classification,
                score: Some(0),
                company_title: Some("N/A".to_string()),
                drafted_reply: Some(NON_SALES_REPLY.to_string()),
            };
        }

        Self {
            status: STATUS_SALES.to_string(),
            classification,
            score: state.score,
            company_title: state.company_title.clone(),
            drafted_reply: state.drafted_reply.clone(),
        }
    }
}

/// Error response with a FastAPI-style `{"detail": ...}` body
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: Value,
}

impl ApiError {
    fn new(status: StatusCode, detail: impl Into<Value>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl From<QualifierError> for ApiError {
    fn from(err: QualifierError) -> Self {
        let status = match &err {
            QualifierError::MalformedInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            e if e.is_upstream() => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            log::error!("Request failed: {}", err);
        }
        Self::new(status, err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match &rejection {
            JsonRejection::JsonDataError(_)
            | JsonRejection::JsonSyntaxError(_)
            | JsonRejection::MissingJsonContentType(_) => StatusCode::UNPROCESSABLE_ENTITY,
            other => other.status(),
        };
        Self::new(status, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(read_root))
        .route("/qualify-lead", post(qualify_lead))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let app = router(state);

    log::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn read_root() -> Json<Value> {
    Json(json!({ "status": "API is online and ready." }))
}

/// Run the workflow, persist per policy, and build the response
pub async fn process_lead(state: &AppState, lead: LeadInput) -> Result<LeadOutput> {
    lead.validate()?;

    let final_state = state.workflow.run(lead).await?;

    if final_state.is_sales_lead() || state.persist_non_sales {
        state.store.add_lead(&NewLead::from(&final_state)).await?;
    }

    Ok(LeadOutput::from_state(&final_state))
}

async fn qualify_lead(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LeadInput>, JsonRejection>,
) -> std::result::Result<Json<LeadOutput>, ApiError> {
    let Json(lead) = payload?;
    log::info!("New lead received: {}", lead.name);

    let output = process_lead(&state, lead).await?;
    Ok(Json(output))
}
