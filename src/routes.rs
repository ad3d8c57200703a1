use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::aggregator::Aggregator;
use crate::config::ALL_SOURCES;
use crate::item::Item;

pub struct AppState {
    pub aggregator: Aggregator,
}

// Template structs
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub items: Vec<Item>,
    pub sources: Vec<String>,
    pub current_source: String,
}

#[derive(Template)]
#[template(path = "article.html")]
pub struct ArticleTemplate {
    pub article: Option<Item>,
    pub source: String,
}

#[derive(Serialize)]
pub struct RefreshPayload {
    pub articles: Vec<Item>,
}

// Wrapper for HTML responses
struct HtmlTemplate<T>(T);

impl<T: Template> IntoResponse for HtmlTemplate<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

#[derive(Deserialize)]
pub struct SourceQuery {
    #[serde(default = "all_sources")]
    pub source: String,
}

fn all_sources() -> String {
    ALL_SOURCES.to_string()
}

#[derive(Deserialize)]
pub struct ArticleQuery {
    pub link: Option<String>,
    pub source: Option<String>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/article", get(article))
        .route("/refresh", get(refresh))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Route handlers
pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SourceQuery>,
) -> impl IntoResponse {
    let items = state.aggregator.list_items(&query.source).await;
    let sources = std::iter::once(ALL_SOURCES.to_string())
        .chain(state.aggregator.config().source_names().map(str::to_string))
        .collect();

    HtmlTemplate(IndexTemplate {
        items,
        sources,
        current_source: query.source,
    })
}

pub async fn article(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ArticleQuery>,
) -> impl IntoResponse {
    let source = query
        .source
        .unwrap_or_else(|| state.aggregator.config().default_source.clone());

    // No link means nothing to find, same as a link that matches no entry
    let article = match query.link.as_deref() {
        Some(link) => state.aggregator.get_item(&source, link).await,
        None => None,
    };

    HtmlTemplate(ArticleTemplate { article, source })
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SourceQuery>,
) -> Json<RefreshPayload> {
    let articles = state.aggregator.refresh(&query.source).await;
    Json(RefreshPayload { articles })
}

pub async fn health() -> &'static str {
    "OK"
}
