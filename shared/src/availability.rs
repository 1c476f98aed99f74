//! GuideBox where-to-watch lookups.
//!
//! GuideBox keys content by its own ids, so callers holding a TMDB id go
//! through [`GuideBoxClient::search_by_tmdb_id`] first. Sources are collected
//! for the android platform across the free, subscription and purchase
//! categories, in that order.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::catalog::ContentKind;
use crate::error::AppError;
use crate::types::{EpisodeSource, SeasonSources, Source};

const BASE_URL: &str = "http://api-public.guidebox.com/v2";

#[derive(Debug, Deserialize, Default)]
struct SourceLists {
    #[serde(default)]
    free_android_sources: Vec<Source>,
    #[serde(default)]
    subscription_android_sources: Vec<Source>,
    #[serde(default)]
    purchase_android_sources: Vec<Source>,
}

impl SourceLists {
    fn into_sources(self) -> Vec<Source> {
        let mut sources = self.free_android_sources;
        sources.extend(self.subscription_android_sources);
        sources.extend(self.purchase_android_sources);
        sources
    }
}

#[derive(Debug, Deserialize)]
struct EpisodeResult {
    #[serde(default)]
    id: i64,
    #[serde(default)]
    themoviedb: i64,
    #[serde(default)]
    episode_number: i64,
    #[serde(flatten)]
    sources: SourceLists,
}

#[derive(Debug, Deserialize)]
struct EpisodesResponse {
    #[serde(default)]
    results: Vec<EpisodeResult>,
}

pub struct GuideBoxClient {
    api_key: String,
    client: reqwest::Client,
}

impl GuideBoxClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }

    async fn get_json(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, AppError> {
        let mut all_params = vec![("api_key", self.api_key.as_str())];
        all_params.extend_from_slice(params);

        let url = format!("{BASE_URL}{path}");
        debug!(url = %url, "GuideBox request");

        let resp = self.client.get(&url).query(&all_params).send().await?;

        if !resp.status().is_success() {
            return Err(AppError::Upstream(format!(
                "GuideBox returned {}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map_err(|e| AppError::Upstream(format!("parse GuideBox JSON: {e}")))
    }

    /// Translate a TMDB id into the GuideBox id for the same title.
    pub async fn search_by_tmdb_id(
        &self,
        kind: ContentKind,
        tmdb_id: &str,
    ) -> Result<String, AppError> {
        let search_type = match kind {
            ContentKind::Movie => "movie",
            ContentKind::Show => "show",
        };
        let data = self
            .get_json(
                "/search",
                &[
                    ("type", search_type),
                    ("field", "id"),
                    ("id_type", "themoviedb"),
                    ("query", tmdb_id),
                ],
            )
            .await?;
        parse_search_id(&data)
    }

    pub async fn find_movie_sources(&self, id: &str) -> Result<Vec<Source>, AppError> {
        let data = self.get_json(&format!("/movies/{id}"), &[]).await?;
        parse_movie_sources(data)
    }

    pub async fn find_episode_sources(
        &self,
        show_id: &str,
        season: u32,
    ) -> Result<SeasonSources, AppError> {
        let season = season.to_string();
        let data = self
            .get_json(
                &format!("/shows/{show_id}/episodes"),
                &[("include_links", "android"), ("season", season.as_str())],
            )
            .await?;
        parse_season_sources(&season, data)
    }
}

fn parse_search_id(data: &Value) -> Result<String, AppError> {
    data["id"]
        .as_i64()
        .filter(|id| *id > 0)
        .map(|id| id.to_string())
        .ok_or_else(|| AppError::NotFound("No availability listing for this title".to_string()))
}

fn parse_movie_sources(data: Value) -> Result<Vec<Source>, AppError> {
    let lists: SourceLists = serde_json::from_value(data)?;
    Ok(lists.into_sources())
}

fn parse_season_sources(season: &str, data: Value) -> Result<SeasonSources, AppError> {
    let resp: EpisodesResponse = serde_json::from_value(data)?;
    Ok(SeasonSources {
        season: season.to_string(),
        episode_sources: resp
            .results
            .into_iter()
            .map(|r| EpisodeSource {
                id: r.id,
                tmdb_id: r.themoviedb,
                episode_number: r.episode_number,
                sources: r.sources.into_sources(),
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_id() {
        assert_eq!(parse_search_id(&json!({ "id": 14244, "title": "The Matrix" })).unwrap(), "14244");

        // GuideBox answers an empty object when nothing matches
        let err = parse_search_id(&json!({})).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_movie_sources_order() {
        let data = json!({
            "id": 14244,
            "title": "The Matrix",
            "purchase_android_sources": [
                { "source": "google_play", "display_name": "Google Play", "link": "https://play.google.com/m",
                  "formats": [{ "price": "3.99", "format": "HD", "type": "rent", "pre_order": false }] }
            ],
            "free_android_sources": [
                { "source": "tubi", "display_name": "Tubi", "link": "https://tubitv.com/m" }
            ],
            "subscription_android_sources": [
                { "source": "hbo_max", "display_name": "HBO Max", "link": "https://hbomax.com/m" }
            ],
            "free_web_sources": [
                { "source": "ignored" }
            ]
        });

        let sources = parse_movie_sources(data).unwrap();
        let names: Vec<&str> = sources.iter().map(|s| s.source.as_str()).collect();
        assert_eq!(names, vec!["tubi", "hbo_max", "google_play"]);
        assert_eq!(sources[2].formats[0].price, "3.99");
    }

    #[test]
    fn test_movie_without_sources() {
        let sources = parse_movie_sources(json!({ "id": 1 })).unwrap();
        assert!(sources.is_empty());
    }

    #[test]
    fn test_season_sources() {
        let data = json!({
            "total_results": 2,
            "results": [
                { "id": 1, "themoviedb": 62085, "episode_number": 1,
                  "subscription_android_sources": [{ "source": "netflix", "link": "https://netflix.com/e1" }] },
                { "id": 2, "themoviedb": 62086, "episode_number": 2 }
            ]
        });

        let season = parse_season_sources("1", data).unwrap();
        assert_eq!(season.season, "1");
        assert_eq!(season.episode_sources.len(), 2);
        assert_eq!(season.episode_sources[0].tmdb_id, 62085);
        assert_eq!(season.episode_sources[0].sources[0].source, "netflix");
        assert!(season.episode_sources[1].sources.is_empty());
    }
}
