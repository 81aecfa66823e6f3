//! HTTP routes.
//!
//! One route per intent path, all served by the same handler. Generation
//! failures and unreadable query strings are rendered as `{error}`; the
//! status depends on the configured [`ErrorPolicy`].

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::agent::{AgentService, Intent, INTENTS};
use crate::config::{Config, ErrorPolicy};
use crate::llm::GenerationError;

use super::types::{AgentSummary, ErrorResponse, HealthResponse, PromptQuery, WelcomeResponse};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub agents: AgentService,
}

impl AppState {
    pub fn new(config: Config, agents: AgentService) -> Self {
        Self { config, agents }
    }
}

#[derive(Debug)]
enum ApiErrorKind {
    Generation(GenerationError),
    BadQuery(String),
}

/// A request failure bound to the policy that decides its status.
#[derive(Debug)]
struct ApiError {
    kind: ApiErrorKind,
    policy: ErrorPolicy,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.kind {
            ApiErrorKind::Generation(e) => (e.status_code(), e.to_string()),
            ApiErrorKind::BadQuery(message) => (StatusCode::BAD_REQUEST, message),
        };
        let status = match self.policy {
            ErrorPolicy::Status => status,
            ErrorPolicy::InBody => StatusCode::OK,
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Build the router over an already-initialized state.
pub fn router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/", get(welcome))
        .route("/health", get(health))
        .route("/agents", get(list_agents));

    for profile in INTENTS.iter() {
        let intent = profile.intent;
        for route in profile.routes {
            router = router.route(
                route,
                get(
                    move |state: State<Arc<AppState>>,
                          query: Result<Query<Vec<(String, String)>>, QueryRejection>| {
                        answer(intent, state, query)
                    },
                ),
            );
        }
    }

    let dev_mode = state.config.dev_mode;
    let router = router.with_state(state).layer(TraceLayer::new_for_http());
    if dev_mode {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

async fn answer(
    intent: Intent,
    State(state): State<Arc<AppState>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    let policy = state.config.error_policy;
    let pairs = match query {
        Ok(Query(pairs)) => pairs,
        Err(rejection) => {
            tracing::debug!(intent = intent.id(), error = %rejection, "Rejected query string");
            return ApiError {
                kind: ApiErrorKind::BadQuery(rejection.body_text()),
                policy,
            }
            .into_response();
        }
    };

    let query = PromptQuery::from_pairs(intent, pairs);
    match state.agents.handle(intent, query.prompt).await {
        Ok(reply) => Json(reply).into_response(),
        Err(error) => ApiError {
            kind: ApiErrorKind::Generation(error),
            policy,
        }
        .into_response(),
    }
}

async fn welcome() -> Json<WelcomeResponse> {
    let routes = INTENTS
        .iter()
        .flat_map(|p| p.routes.iter().copied())
        .collect::<Vec<_>>()
        .join(", ");
    Json(WelcomeResponse {
        message: format!(
            "Bienvenue sur l'assistant de l'Université Bordeaux Montaigne. Points d'entrée disponibles : {}",
            routes
        ),
    })
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn list_agents(State(state): State<Arc<AppState>>) -> Json<Vec<AgentSummary>> {
    let documents = state.agents.documents();
    let agents = INTENTS
        .iter()
        .map(|p| AgentSummary {
            id: p.id,
            routes: p.routes,
            default_prompt: p.default_prompt,
            grounded: p
                .grounding_agent
                .is_some_and(|agent| !documents.lookup(agent).is_empty()),
        })
        .collect();
    Json(agents)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn render(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, serde_json::from_slice(&bytes).expect("json"))
    }

    #[tokio::test]
    async fn bad_query_is_json_under_both_policies() {
        let (status, body) = render(ApiError {
            kind: ApiErrorKind::BadQuery("Failed to deserialize query string".to_string()),
            policy: ErrorPolicy::Status,
        })
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Failed to deserialize query string");

        let (status, body) = render(ApiError {
            kind: ApiErrorKind::BadQuery("bad".to_string()),
            policy: ErrorPolicy::InBody,
        })
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"], "bad");
    }

    #[tokio::test]
    async fn generation_error_status_follows_policy() {
        let (status, body) = render(ApiError {
            kind: ApiErrorKind::Generation(GenerationError::MissingAssistantReply),
            policy: ErrorPolicy::Status,
        })
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Generation output contains no assistant reply");
    }
}
