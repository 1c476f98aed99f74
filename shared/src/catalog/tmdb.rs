//! TMDB (The Movie Database) API v3 client and response projections.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{CatalogSource, ContentKind};
use crate::error::AppError;
use crate::types::{
    Episode, EpisodeDetails, MovieDetails, Season, SeasonDetails, ShowDetails, Suggestion,
    Thumbnail,
};

const BASE_URL: &str = "https://api.themoviedb.org/3";
const IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w185";

pub struct TmdbClient {
    api_key: String,
    client: reqwest::Client,
}

impl TmdbClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }

    async fn get_json(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, AppError> {
        let mut all_params = vec![("api_key", self.api_key.as_str()), ("language", "en-US")];
        all_params.extend_from_slice(params);

        let url = format!("{BASE_URL}{path}");
        debug!(url = %url, "TMDB request");

        let resp = self.client.get(&url).query(&all_params).send().await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound("Content not found".to_string()));
        }
        if !resp.status().is_success() {
            return Err(AppError::Upstream(format!("TMDB returned {}", resp.status())));
        }

        resp.json()
            .await
            .map_err(|e| AppError::Upstream(format!("parse TMDB JSON: {e}")))
    }
}

#[async_trait]
impl CatalogSource for TmdbClient {
    async fn search(&self, kind: ContentKind, query: &str) -> Result<Value, AppError> {
        let path = match kind {
            ContentKind::Movie => "/search/movie",
            ContentKind::Show => "/search/tv",
        };
        self.get_json(
            path,
            &[("query", query), ("page", "1"), ("include_adult", "false")],
        )
        .await
    }

    async fn movie(&self, id: &str) -> Result<Value, AppError> {
        self.get_json(&format!("/movie/{id}"), &[]).await
    }

    async fn show(&self, id: &str) -> Result<Value, AppError> {
        self.get_json(&format!("/tv/{id}"), &[]).await
    }

    async fn season(&self, show_id: &str, season: u32) -> Result<Value, AppError> {
        self.get_json(&format!("/tv/{show_id}/season/{season}"), &[])
            .await
    }

    async fn episode(&self, show_id: &str, season: u32, episode: u32) -> Result<Value, AppError> {
        self.get_json(
            &format!("/tv/{show_id}/season/{season}/episode/{episode}"),
            &[],
        )
        .await
    }
}

/// Sized poster/still URL, or empty when the provider has no image.
fn image_url(path: &Value) -> String {
    path.as_str()
        .filter(|p| !p.is_empty())
        .map(|p| format!("{IMAGE_BASE}{p}"))
        .unwrap_or_default()
}

/// TMDB ids are numeric; the internal shapes carry them as strings.
fn id_string(id: &Value) -> String {
    match id {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        _ => String::new(),
    }
}

fn text(value: &Value) -> String {
    value.as_str().unwrap_or_default().to_string()
}

pub(crate) fn parse_suggestion(kind: ContentKind, category: &str, data: &Value) -> Suggestion {
    let list = data["results"]
        .as_array()
        .map(|results| {
            results
                .iter()
                .map(|r| Thumbnail {
                    id: id_string(&r["id"]),
                    content_type: kind.label().to_string(),
                    url: image_url(&r["poster_path"]),
                })
                .collect()
        })
        .unwrap_or_default();

    Suggestion {
        content_type: kind.label().to_string(),
        category: category.to_string(),
        list,
    }
}

pub(crate) fn parse_movie_details(id: &str, data: &Value) -> MovieDetails {
    let provider_id = id_string(&data["id"]);
    MovieDetails {
        id: if provider_id.is_empty() { id.to_string() } else { provider_id },
        title: text(&data["title"]),
        description: text(&data["overview"]),
        thumbnail_url: image_url(&data["poster_path"]),
        watch_now: Vec::new(),
    }
}

pub(crate) fn parse_show_details(data: &Value) -> ShowDetails {
    let seasons = data["seasons"]
        .as_array()
        .map(|seasons| {
            seasons
                .iter()
                .map(|s| Season {
                    id: id_string(&s["id"]),
                    title: text(&s["name"]),
                    description: text(&s["overview"]),
                    thumbnail_url: image_url(&s["poster_path"]),
                    season_number: s["season_number"].as_i64().unwrap_or(0),
                })
                .collect()
        })
        .unwrap_or_default();

    ShowDetails {
        id: id_string(&data["id"]),
        title: text(&data["name"]),
        description: text(&data["overview"]),
        thumbnail_url: image_url(&data["poster_path"]),
        seasons,
    }
}

pub(crate) fn parse_season_details(data: &Value) -> SeasonDetails {
    let episodes = data["episodes"]
        .as_array()
        .map(|episodes| {
            episodes
                .iter()
                .map(|e| Episode {
                    episode_number: e["episode_number"].as_i64().unwrap_or(0),
                    thumbnail_url: image_url(&e["still_path"]),
                })
                .collect()
        })
        .unwrap_or_default();

    SeasonDetails {
        season_number: data["season_number"].as_i64().unwrap_or(0),
        title: text(&data["name"]),
        description: text(&data["overview"]),
        thumbnail_url: image_url(&data["poster_path"]),
        episodes,
    }
}

pub(crate) fn parse_episode_details(data: &Value) -> EpisodeDetails {
    EpisodeDetails {
        id: id_string(&data["id"]),
        title: text(&data["name"]),
        description: text(&data["overview"]),
        thumbnail_url: image_url(&data["still_path"]),
        watch_now: Vec::new(),
    }
}
