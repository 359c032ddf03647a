use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use polyfeed_core::{ContentEntry, Language};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Read-only feed routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/languages", get(list_languages))
        .route("/v1/feeds/{language}", get(list_feed))
        .route("/v1/feeds/{language}/{slug}", get(get_entry))
}

#[derive(Debug, Serialize)]
struct LanguageInfo {
    code: Language,
    label: &'static str,
}

async fn list_languages() -> Json<Vec<LanguageInfo>> {
    Json(
        Language::ALL
            .iter()
            .map(|language| LanguageInfo {
                code: *language,
                label: language.label(),
            })
            .collect(),
    )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FeedResponse {
    language: Language,
    label: &'static str,
    entries: Vec<ContentEntry>,
}

/// Entries for one language, most recent first.
async fn list_feed(
    State(state): State<AppState>,
    Path(language): Path<String>,
) -> ApiResult<Json<FeedResponse>> {
    let language = parse_language(&language)?;
    let entries = state.store().list_entries(language).await?;

    Ok(Json(FeedResponse {
        language,
        label: language.label(),
        entries,
    }))
}

async fn get_entry(
    State(state): State<AppState>,
    Path((language, slug)): Path<(String, String)>,
) -> ApiResult<Json<ContentEntry>> {
    let language = parse_language(&language)?;

    state
        .store()
        .get_entry(language, &slug)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("no {language} entry with slug {slug:?}")))
}

fn parse_language(raw: &str) -> ApiResult<Language> {
    raw.parse().map_err(|err| ApiError::NotFound(format!("{err}")))
}
