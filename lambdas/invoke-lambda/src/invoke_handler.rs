use lambda_runtime::{Error, LambdaEvent};
use reelscout_shared::{
    error::AppError,
    types::{ProfileResponse, Suggestion},
    AppState,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Plain JSON invocation payload, selected by its `action` field.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
enum InvokeRequest {
    FindAllSuggestions {
        #[serde(default)]
        token: String,
    },
    FindMovieSuggestions {
        #[serde(default)]
        token: String,
    },
    FindShowSuggestions {
        #[serde(default)]
        token: String,
    },
    #[serde(rename = "findMovieDetailsByID")]
    FindMovieDetailsById {
        #[serde(default)]
        token: String,
        id: String,
    },
    #[serde(rename = "findShowDetailsByID")]
    FindShowDetailsById {
        #[serde(default)]
        token: String,
        id: String,
    },
    FindSeasonDetailsByNumber {
        #[serde(default)]
        token: String,
        id: String,
        season: u32,
    },
    FindEpisodeDetailsByNumber {
        #[serde(default)]
        token: String,
        id: String,
        season: u32,
        episode: u32,
    },
    FindUserProfile {
        #[serde(default)]
        token: String,
    },
}

impl InvokeRequest {
    fn token(&self) -> &str {
        match self {
            Self::FindAllSuggestions { token }
            | Self::FindMovieSuggestions { token }
            | Self::FindShowSuggestions { token }
            | Self::FindMovieDetailsById { token, .. }
            | Self::FindShowDetailsById { token, .. }
            | Self::FindSeasonDetailsByNumber { token, .. }
            | Self::FindEpisodeDetailsByNumber { token, .. }
            | Self::FindUserProfile { token } => token,
        }
    }
}

#[derive(Debug, Serialize, Default)]
pub(crate) struct InvokeResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestions: Option<Vec<Suggestion>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<ProfileResponse>,
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl InvokeResponse {
    fn ok() -> Self {
        Self {
            status: 200,
            ..Default::default()
        }
    }

    fn details<T: Serialize>(details: &T) -> Result<Self, AppError> {
        Ok(Self {
            details: Some(serde_json::to_value(details)?),
            ..Self::ok()
        })
    }

    fn suggestions(suggestions: Vec<Suggestion>) -> Self {
        Self {
            suggestions: Some(suggestions),
            ..Self::ok()
        }
    }

    fn failure(err: &AppError) -> Self {
        if err.status_code().is_server_error() {
            tracing::error!("{}: {}", err.client_message(), err);
        } else {
            tracing::error!("Invocation rejected: {}", err);
        }
        Self {
            status: err.status_code().as_u16(),
            message: Some(err.client_message()),
            ..Default::default()
        }
    }
}

/// Failures are reported in the response envelope; the invocation itself
/// always succeeds.
pub(crate) async fn function_handler(
    event: LambdaEvent<Value>,
    state: Arc<AppState>,
) -> Result<InvokeResponse, Error> {
    let action = event.payload["action"].as_str().unwrap_or_default().to_string();
    tracing::info!("Invoke Lambda invoked - Action: {}", action);

    let request = match serde_json::from_value::<InvokeRequest>(event.payload) {
        Ok(request) => request,
        Err(e) => {
            let err = AppError::Validation(format!("Invalid request: {e}"));
            return Ok(InvokeResponse::failure(&err));
        }
    };
    Ok(handle(request, &state)
        .await
        .unwrap_or_else(|e| InvokeResponse::failure(&e)))
}

async fn handle(request: InvokeRequest, state: &AppState) -> Result<InvokeResponse, AppError> {
    let account = state.users.authenticate(request.token()).await?;
    let catalog = &state.catalog;

    match request {
        InvokeRequest::FindAllSuggestions { .. } => Ok(InvokeResponse::suggestions(
            catalog.find_all_suggestions().await?,
        )),
        InvokeRequest::FindMovieSuggestions { .. } => Ok(InvokeResponse::suggestions(
            catalog.find_movie_suggestions().await?,
        )),
        InvokeRequest::FindShowSuggestions { .. } => Ok(InvokeResponse::suggestions(
            catalog.find_show_suggestions().await?,
        )),
        InvokeRequest::FindMovieDetailsById { id, .. } => {
            InvokeResponse::details(&catalog.find_movie_details_by_id(&id).await?)
        }
        InvokeRequest::FindShowDetailsById { id, .. } => {
            InvokeResponse::details(&catalog.find_show_details_by_id(&id).await?)
        }
        InvokeRequest::FindSeasonDetailsByNumber { id, season, .. } => InvokeResponse::details(
            &catalog.find_season_details_by_number(&id, season).await?,
        ),
        InvokeRequest::FindEpisodeDetailsByNumber {
            id,
            season,
            episode,
            ..
        } => InvokeResponse::details(
            &catalog
                .find_episode_details_by_number(&id, season, episode)
                .await?,
        ),
        InvokeRequest::FindUserProfile { .. } => {
            let profile = state.users.get_profile(&account.id).await?;
            Ok(InvokeResponse {
                profile: Some(ProfileResponse::from(profile)),
                ..InvokeResponse::ok()
            })
        }
    }
}
