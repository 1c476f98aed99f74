use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, Response,
};
use reelscout_shared::{
    availability::GuideBoxClient,
    catalog::ContentKind,
    error::AppError,
    response::{cors_preflight, error_response, json_response, message_response, no_content},
    types::{
        DetailsResponse, LoginRequest, LoginResponse, ProfileResponse, SignupRequest,
        SourcesResponse, SuggestionsResponse, UpdateProfileRequest,
    },
    AppState,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route<'a> {
    Signup,
    Login,
    Logout,
    GetProfile,
    UpdateProfile,
    DeleteProfile,
    AllSuggestions,
    MovieSuggestions,
    ShowSuggestions,
    Movie(&'a str),
    MovieSources(&'a str),
    Show(&'a str),
    Season(&'a str, &'a str),
    SeasonSources(&'a str, &'a str),
    Episode(&'a str, &'a str, &'a str),
}

#[derive(Debug, PartialEq, Eq)]
enum RouteMatch<'a> {
    Found(Route<'a>),
    MethodNotAllowed,
    NotFound,
}

/// Successful handler output, rendered by [`function_handler`].
enum Reply {
    Json(Value),
    NoContent,
}

impl Reply {
    fn json<T: Serialize>(data: &T) -> Result<Self, AppError> {
        Ok(Self::Json(serde_json::to_value(data)?))
    }
}

#[derive(Deserialize)]
struct TokenBody {
    #[serde(default)]
    token: String,
}

/// Main Lambda handler - routes API Gateway requests to the account,
/// profile and catalog operations
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method();
    let path = event.uri().path();
    tracing::info!("API Lambda invoked - Method: {} Path: {}", method, path);

    // Handle CORS preflight
    if method == Method::OPTIONS {
        return cors_preflight();
    }

    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let route = match resolve(method, &parts) {
        RouteMatch::Found(route) => route,
        RouteMatch::MethodNotAllowed => {
            return message_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
        }
        RouteMatch::NotFound => return message_response(StatusCode::NOT_FOUND, "Not found"),
    };

    let token = session_token(&event);
    match handle(route, &token, event.body(), &state).await {
        Ok(Reply::Json(data)) => json_response(StatusCode::OK, &data),
        Ok(Reply::NoContent) => no_content(),
        Err(e) => error_response(&e),
    }
}

fn resolve<'a>(method: &Method, parts: &[&'a str]) -> RouteMatch<'a> {
    let candidates = match *parts {
        ["signup"] => vec![(Method::POST, Route::Signup)],
        ["login"] => vec![(Method::POST, Route::Login)],
        ["logout"] => vec![(Method::POST, Route::Logout)],
        ["profile"] => vec![
            (Method::GET, Route::GetProfile),
            (Method::PUT, Route::UpdateProfile),
            (Method::DELETE, Route::DeleteProfile),
        ],
        ["suggestions"] => vec![(Method::GET, Route::AllSuggestions)],
        ["suggestions", "movies"] => vec![(Method::GET, Route::MovieSuggestions)],
        ["suggestions", "shows"] => vec![(Method::GET, Route::ShowSuggestions)],
        ["movies", id] => vec![(Method::GET, Route::Movie(id))],
        ["movies", id, "sources"] => vec![(Method::GET, Route::MovieSources(id))],
        ["shows", id] => vec![(Method::GET, Route::Show(id))],
        ["shows", id, "seasons", season] => vec![(Method::GET, Route::Season(id, season))],
        ["shows", id, "seasons", season, "sources"] => {
            vec![(Method::GET, Route::SeasonSources(id, season))]
        }
        ["shows", id, "seasons", season, "episodes", episode] => {
            vec![(Method::GET, Route::Episode(id, season, episode))]
        }
        _ => return RouteMatch::NotFound,
    };

    candidates
        .into_iter()
        .find(|(m, _)| m == method)
        .map(|(_, route)| RouteMatch::Found(route))
        .unwrap_or(RouteMatch::MethodNotAllowed)
}

/// Bearer token from the Authorization header, else a `token` body field.
fn session_token(event: &Request) -> String {
    event
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .or_else(|| {
            serde_json::from_slice::<TokenBody>(event.body())
                .ok()
                .map(|b| b.token)
        })
        .unwrap_or_default()
}

async fn handle(
    route: Route<'_>,
    token: &str,
    body: &[u8],
    state: &AppState,
) -> Result<Reply, AppError> {
    let users = &state.users;
    let catalog = &state.catalog;

    match route {
        Route::Signup => {
            let req: SignupRequest = parse_body(body)?;
            Reply::json(&users.sign_up(req).await?)
        }
        Route::Login => {
            let req: LoginRequest = parse_body(body)?;
            let token = users.login(&req.email, &req.password).await?;
            Reply::json(&LoginResponse { token })
        }
        Route::Logout => {
            let account = users.authenticate(token).await?;
            users.logout(&account.id).await?;
            Ok(Reply::NoContent)
        }
        Route::GetProfile => {
            let account = users.authenticate(token).await?;
            let profile = users.get_profile(&account.id).await?;
            Reply::json(&ProfileResponse::from(profile))
        }
        Route::UpdateProfile => {
            let req: UpdateProfileRequest = parse_body(body)?;
            users.update_profile(token, req).await?;
            Ok(Reply::NoContent)
        }
        Route::DeleteProfile => {
            let account = users.authenticate(token).await?;
            users.delete_profile(&account.id).await?;
            Ok(Reply::NoContent)
        }
        Route::AllSuggestions => {
            users.authenticate(token).await?;
            let suggestions = catalog.find_all_suggestions().await?;
            Reply::json(&SuggestionsResponse { suggestions })
        }
        Route::MovieSuggestions => {
            users.authenticate(token).await?;
            let suggestions = catalog.find_movie_suggestions().await?;
            Reply::json(&SuggestionsResponse { suggestions })
        }
        Route::ShowSuggestions => {
            users.authenticate(token).await?;
            let suggestions = catalog.find_show_suggestions().await?;
            Reply::json(&SuggestionsResponse { suggestions })
        }
        Route::Movie(id) => {
            users.authenticate(token).await?;
            let details = catalog.find_movie_details_by_id(id).await?;
            Reply::json(&DetailsResponse { details })
        }
        Route::Show(id) => {
            users.authenticate(token).await?;
            let details = catalog.find_show_details_by_id(id).await?;
            Reply::json(&DetailsResponse { details })
        }
        Route::Season(id, season) => {
            users.authenticate(token).await?;
            let season = parse_number(season, "Season number")?;
            let details = catalog.find_season_details_by_number(id, season).await?;
            Reply::json(&DetailsResponse { details })
        }
        Route::Episode(id, season, episode) => {
            users.authenticate(token).await?;
            let season = parse_number(season, "Season number")?;
            let episode = parse_number(episode, "Episode number")?;
            let details = catalog
                .find_episode_details_by_number(id, season, episode)
                .await?;
            Reply::json(&DetailsResponse { details })
        }
        Route::MovieSources(id) => {
            users.authenticate(token).await?;
            let guidebox = availability(state)?;
            let guidebox_id = guidebox.search_by_tmdb_id(ContentKind::Movie, id).await?;
            let sources = guidebox.find_movie_sources(&guidebox_id).await?;
            Reply::json(&SourcesResponse { sources })
        }
        Route::SeasonSources(id, season) => {
            users.authenticate(token).await?;
            let season = parse_number(season, "Season number")?;
            let guidebox = availability(state)?;
            let guidebox_id = guidebox.search_by_tmdb_id(ContentKind::Show, id).await?;
            let sources = guidebox.find_episode_sources(&guidebox_id, season).await?;
            Reply::json(&SourcesResponse { sources })
        }
    }
}

fn availability(state: &AppState) -> Result<&GuideBoxClient, AppError> {
    state
        .availability
        .as_ref()
        .ok_or_else(|| AppError::Upstream("Availability lookup is not configured".to_string()))
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))
}

fn parse_number(value: &str, field: &str) -> Result<u32, AppError> {
    value
        .parse()
        .map_err(|_| AppError::Validation(format!("{field} must be a number")))
}
