use axum::{
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::chain::ChainError;
use crate::few_shots::{few_shots, FewShotExample};
use crate::web::state::AppState;

#[derive(Debug, Deserialize, Clone)]
pub struct AskRequest {
    pub question: String,
}

// System status

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime_seconds: i64,
    pub example_count: usize,
    pub llm_backend: String,
    pub dialect: String,
}

fn status_for(err: &ChainError) -> StatusCode {
    match err {
        ChainError::Llm(_) | ChainError::EmptySql => StatusCode::BAD_GATEWAY,
        ChainError::Database(_) | ChainError::Prompt(_) | ChainError::Config(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Header values cannot carry newlines; multi-line SQL is folded onto one line.
fn single_line(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub async fn ask(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<AskRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    debug!("API question: {}", payload.question);

    if payload.question.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Question must not be empty".to_string(),
        ));
    }

    let chain = app_state.chain_factory.create_chain().map_err(|e| {
        error!("Failed to create chain: {}", e);
        (status_for(&e), e.to_string())
    })?;

    let exchange = chain.run_detailed(&payload.question).await.map_err(|e| {
        error!("Chain failed: {}", e);
        (status_for(&e), e.to_string())
    })?;

    info!(
        "Answered API question in {}ms: {}",
        exchange.elapsed_ms, exchange.question
    );

    let mut headers = HeaderMap::new();
    if let Ok(v) = HeaderValue::from_str(&single_line(&exchange.sql)) {
        headers.insert(HeaderName::from_static("x-generated-sql"), v);
    }

    Ok((headers, Json(exchange)))
}

pub async fn list_examples() -> Json<&'static [FewShotExample]> {
    Json(few_shots())
}

pub async fn system_status(State(app_state): State<Arc<AppState>>) -> Json<SystemStatus> {
    let uptime = chrono::Utc::now() - app_state.startup_time;

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime.num_seconds(),
        example_count: few_shots().len(),
        llm_backend: app_state.chain_factory.backend().to_string(),
        dialect: app_state.config.chain.dialect.clone(),
    })
}
