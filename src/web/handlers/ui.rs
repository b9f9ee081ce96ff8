use axum::{
    extract::{Query, State},
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

use crate::web::state::AppState;
use crate::web::templates::{render_index, render_template};

#[derive(Debug, Deserialize, Default)]
pub struct PageParams {
    #[serde(default)]
    pub question: String,
}

// Main UI entry point: each submission re-renders the whole page
pub async fn index_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> Response {
    let question = params.question;

    if question.is_empty() {
        return Html(render_index(&state.template_env, "", None, None)).into_response();
    }

    info!("Question from UI: {}", question);

    let outcome = match state.chain_factory.create_chain() {
        Ok(chain) => chain.run(&question).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(answer) => {
            Html(render_index(&state.template_env, &question, Some(&answer), None)).into_response()
        }
        Err(e) => {
            error!("Chain failed for '{}': {}", question, e);
            let message = e.to_string();
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render_index(&state.template_env, &question, None, Some(&message))),
            )
                .into_response()
        }
    }
}

pub async fn not_found_handler(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    let mut context = HashMap::new();
    context.insert("status", "404 Not Found".into());
    context.insert("message", format!("Nothing lives at {}", uri.path()).into());

    (
        StatusCode::NOT_FOUND,
        Html(render_template(&state.template_env, "error.html", context)),
    )
        .into_response()
}
