use serde::{Deserialize, Serialize};

// ========== ACCOUNT ==========
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UserAccount {
    pub id: String,
    pub email: String,
    /// argon2 PHC string, never the raw password
    pub password: String,
    /// Empty when logged out
    #[serde(default)]
    pub token: String,
    pub created_at: String,
    pub last_login: Option<String>,
}

impl UserAccount {
    pub fn is_logged_in(&self) -> bool {
        !self.token.is_empty()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub stream_accounts: Vec<StreamAccount>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub user_id: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

// ========== PROFILE ==========
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct StreamAccount {
    pub id: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct LibraryEntry {
    pub id: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Library {
    pub content_list: Vec<LibraryEntry>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub stream_accounts: Vec<StreamAccount>,
    pub library: Library,
}

/// Fields a caller may change. Absent or empty values keep the stored ones.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub password: Option<String>,
    pub stream_accounts: Option<Vec<StreamAccount>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub email: String,
    pub name: String,
    pub stream_accounts: Vec<StreamAccount>,
    pub library: Library,
}

impl From<UserProfile> for ProfileResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            email: profile.email,
            name: profile.name,
            stream_accounts: profile.stream_accounts,
            library: profile.library,
        }
    }
}

// ========== SUGGESTION ==========
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Thumbnail {
    pub id: String,
    #[serde(rename = "type")]
    pub content_type: String, // Movie | TV
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub content_type: String, // Movie | TV | ""
    pub category: String,
    pub list: Vec<Thumbnail>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<Suggestion>,
}

// ========== DETAILS ==========
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WatchNow {
    #[serde(rename = "serviceId")]
    pub service_id: String,
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MovieDetails {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "thumbnailURL")]
    pub thumbnail_url: String,
    #[serde(rename = "watchNow")]
    pub watch_now: Vec<WatchNow>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Season {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "thumbnailURL")]
    pub thumbnail_url: String,
    pub season_number: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ShowDetails {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "thumbnailURL")]
    pub thumbnail_url: String,
    pub seasons: Vec<Season>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Episode {
    pub episode_number: i64,
    #[serde(rename = "thumbnailURL")]
    pub thumbnail_url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SeasonDetails {
    pub season_number: i64,
    pub title: String,
    pub description: String,
    #[serde(rename = "thumbnailURL")]
    pub thumbnail_url: String,
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EpisodeDetails {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "thumbnailURL")]
    pub thumbnail_url: String,
    #[serde(rename = "watchNow")]
    pub watch_now: Vec<WatchNow>,
}

#[derive(Debug, Serialize)]
pub struct DetailsResponse<T> {
    pub details: T,
}

// ========== AVAILABILITY ==========
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct SourceFormat {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub price: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format: String,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub purchase_type: String,
    #[serde(default)]
    pub pre_order: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Source {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub link: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub app_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub formats: Vec<SourceFormat>,
}

impl From<&Source> for WatchNow {
    fn from(source: &Source) -> Self {
        Self {
            service_id: source.source.clone(),
            url: source.link.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EpisodeSource {
    pub id: i64,
    pub tmdb_id: i64,
    #[serde(rename = "episodeNumber")]
    pub episode_number: i64,
    pub sources: Vec<Source>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SeasonSources {
    pub season: String,
    #[serde(rename = "episodeSources")]
    pub episode_sources: Vec<EpisodeSource>,
}

#[derive(Debug, Serialize)]
pub struct SourcesResponse<T> {
    pub sources: T,
}
