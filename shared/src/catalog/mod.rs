pub mod tmdb;

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use serde_json::Value;

use crate::error::AppError;
use crate::types::{EpisodeDetails, MovieDetails, SeasonDetails, ShowDetails, Suggestion};

pub use tmdb::TmdbClient;

/// Browse categories, in display order.
pub const CATEGORIES: [&str; 4] = ["Action", "Comedy", "Family", "Science Fiction"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Movie,
    Show,
}

impl ContentKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Movie => "Movie",
            Self::Show => "TV",
        }
    }
}

/// One outbound fetch per call; returns the provider's JSON body as-is.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// First page of search results for `query`.
    async fn search(&self, kind: ContentKind, query: &str) -> Result<Value, AppError>;

    async fn movie(&self, id: &str) -> Result<Value, AppError>;

    async fn show(&self, id: &str) -> Result<Value, AppError>;

    async fn season(&self, show_id: &str, season: u32) -> Result<Value, AppError>;

    async fn episode(&self, show_id: &str, season: u32, episode: u32) -> Result<Value, AppError>;
}

/// Stateless lookups that reshape provider responses into details and
/// suggestion shapes. Every call re-fetches.
#[derive(Clone)]
pub struct Catalog {
    source: Arc<dyn CatalogSource>,
}

impl Catalog {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self { source }
    }

    pub async fn find_movie_suggestions(&self) -> Result<Vec<Suggestion>, AppError> {
        self.find_suggestions(ContentKind::Movie).await
    }

    pub async fn find_show_suggestions(&self) -> Result<Vec<Suggestion>, AppError> {
        self.find_suggestions(ContentKind::Show).await
    }

    /// Movie suggestions followed by show suggestions.
    pub async fn find_all_suggestions(&self) -> Result<Vec<Suggestion>, AppError> {
        let (mut movies, shows) = futures::try_join!(
            self.find_suggestions(ContentKind::Movie),
            self.find_suggestions(ContentKind::Show),
        )?;
        movies.extend(shows);
        Ok(movies)
    }

    /// Categories are fetched concurrently but returned in [`CATEGORIES`]
    /// order. The first failure fails the whole call; no partial results.
    async fn find_suggestions(&self, kind: ContentKind) -> Result<Vec<Suggestion>, AppError> {
        try_join_all(CATEGORIES.iter().map(|category| async move {
            let data = self.source.search(kind, category).await?;
            Ok::<_, AppError>(tmdb::parse_suggestion(kind, category, &data))
        }))
        .await
    }

    pub async fn find_movie_details_by_id(&self, id: &str) -> Result<MovieDetails, AppError> {
        let data = self.source.movie(id).await?;
        Ok(tmdb::parse_movie_details(id, &data))
    }

    pub async fn find_show_details_by_id(&self, id: &str) -> Result<ShowDetails, AppError> {
        let data = self.source.show(id).await?;
        Ok(tmdb::parse_show_details(&data))
    }

    pub async fn find_season_details_by_number(
        &self,
        show_id: &str,
        season: u32,
    ) -> Result<SeasonDetails, AppError> {
        let data = self.source.season(show_id, season).await?;
        Ok(tmdb::parse_season_details(&data))
    }

    pub async fn find_episode_details_by_number(
        &self,
        show_id: &str,
        season: u32,
        episode: u32,
    ) -> Result<EpisodeDetails, AppError> {
        let data = self.source.episode(show_id, season, episode).await?;
        Ok(tmdb::parse_episode_details(&data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Canned provider. Searches return one result named after the query;
    /// `fail_on` makes that query fail.
    #[derive(Default)]
    struct FakeSource {
        fail_on: Option<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CatalogSource for FakeSource {
        async fn search(&self, kind: ContentKind, query: &str) -> Result<Value, AppError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{}:{}", kind.label(), query));
            if self.fail_on == Some(query) {
                return Err(AppError::Upstream("TMDB returned 503".to_string()));
            }
            Ok(json!({
                "page": 1,
                "results": [{ "id": query.len(), "poster_path": format!("/{}.jpg", query) }]
            }))
        }

        async fn movie(&self, id: &str) -> Result<Value, AppError> {
            Ok(json!({ "id": 603, "title": format!("movie {id}"), "poster_path": null }))
        }

        async fn show(&self, id: &str) -> Result<Value, AppError> {
            Ok(json!({ "id": 1396, "name": format!("show {id}"), "seasons": [] }))
        }

        async fn season(&self, _show_id: &str, season: u32) -> Result<Value, AppError> {
            Ok(json!({ "season_number": season, "name": format!("Season {season}"), "episodes": [] }))
        }

        async fn episode(&self, _show_id: &str, _season: u32, episode: u32) -> Result<Value, AppError> {
            Ok(json!({ "id": 62085, "name": format!("Episode {episode}"), "still_path": "/e.jpg" }))
        }
    }

    #[tokio::test]
    async fn test_movie_suggestions_in_category_order() {
        let catalog = Catalog::new(Arc::new(FakeSource::default()));

        let suggestions = catalog.find_movie_suggestions().await.unwrap();
        assert_eq!(suggestions.len(), 4);
        let categories: Vec<&str> = suggestions.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(categories, CATEGORIES);
        assert!(suggestions.iter().all(|s| s.content_type == "Movie"));
        assert_eq!(
            suggestions[3].list[0].url,
            "https://image.tmdb.org/t/p/w185/Science Fiction.jpg"
        );
    }

    #[tokio::test]
    async fn test_all_suggestions_movies_then_shows() {
        let source = Arc::new(FakeSource::default());
        let catalog = Catalog::new(source.clone());

        let suggestions = catalog.find_all_suggestions().await.unwrap();
        assert_eq!(suggestions.len(), 8);
        assert!(suggestions[..4].iter().all(|s| s.content_type == "Movie"));
        assert!(suggestions[4..].iter().all(|s| s.content_type == "TV"));
        assert_eq!(suggestions[4].category, "Action");
        assert_eq!(source.calls.lock().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_one_failed_category_fails_all() {
        let catalog = Catalog::new(Arc::new(FakeSource {
            fail_on: Some("Family"),
            ..Default::default()
        }));

        let err = catalog.find_show_suggestions().await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_details_lookups() {
        let catalog = Catalog::new(Arc::new(FakeSource::default()));

        let movie = catalog.find_movie_details_by_id("603").await.unwrap();
        assert_eq!(movie.title, "movie 603");
        assert_eq!(movie.thumbnail_url, "");

        let show = catalog.find_show_details_by_id("1396").await.unwrap();
        assert_eq!(show.title, "show 1396");

        let season = catalog.find_season_details_by_number("1396", 2).await.unwrap();
        assert_eq!(season.season_number, 2);

        let episode = catalog
            .find_episode_details_by_number("1396", 1, 3)
            .await
            .unwrap();
        assert_eq!(episode.title, "Episode 3");
    }
}
