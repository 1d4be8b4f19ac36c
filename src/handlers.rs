use crate::{
    AppState,
    auth::CallerIdentity,
    error::ApiError,
    listing::{self, EndpointContext, ListingScope},
    models::{ErrorBody, Video},
};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
};
use serde::Deserialize;
use uuid::Uuid;

// --- Query Structs ---

/// ListingParams
///
/// Query parameters shared by every listing endpoint.
#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListingParams {
    /// `local` or `all-local`. `all-local` requires a moderator or admin.
    pub filter: Option<String>,
}

/// SearchParams
///
/// Query parameters of the video search endpoint.
#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Text matched against video names. Absent matches every video.
    pub search: Option<String>,
    /// `local` or `all-local`. `all-local` requires a moderator or admin.
    pub filter: Option<String>,
}

/// FeedParams
///
/// Query parameters of the syndication feed. At most one of `accountName` and
/// `videoChannelName` may be given.
#[derive(Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(rename_all = "camelCase", parameter_in = Query)]
pub struct FeedParams {
    /// `local` only: the feed never carries credentials.
    pub filter: Option<String>,
    pub account_name: Option<String>,
    pub video_channel_name: Option<String>,
}

/// Unwraps a query extraction, turning axum's rejection into our JSON error.
fn query<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    params
        .map(|Query(params)| params)
        .map_err(|rejection| ApiError::MalformedRequest(rejection.body_text()))
}

/// Same as `query`, for the path segment naming the scope.
fn path<T>(segment: Result<Path<T>, PathRejection>) -> Result<T, ApiError> {
    segment
        .map(|Path(segment)| segment)
        .map_err(|rejection| ApiError::MalformedRequest(rejection.body_text()))
}

/// Shared tail of every handler: run the listing gate and wrap the result.
async fn respond(state: &AppState, ctx: EndpointContext) -> Result<Json<Vec<Video>>, ApiError> {
    let videos = listing::list_videos(state.repo.as_ref(), &state.policy, ctx).await?;
    Ok(Json(videos))
}

// --- Handlers ---

/// list_channel_videos
///
/// Videos published on a channel.
#[utoipa::path(
    get,
    path = "/api/v1/video-channels/{channel}/videos",
    params(("channel" = String, Path, description = "Channel handle"), ListingParams),
    responses(
        (status = 200, description = "Videos of the channel", body = [Video]),
        (status = 400, description = "Unknown filter", body = ErrorBody),
        (status = 401, description = "Unusable credential", body = ErrorBody),
        (status = 403, description = "Filter needs a higher privilege", body = ErrorBody),
        (status = 404, description = "Unknown channel", body = ErrorBody)
    )
)]
pub async fn list_channel_videos(
    caller: CallerIdentity,
    State(state): State<AppState>,
    channel: Result<Path<String>, PathRejection>,
    params: Result<Query<ListingParams>, QueryRejection>,
) -> Result<Json<Vec<Video>>, ApiError> {
    let channel = path(channel)?;
    let params = query(params)?;
    let ctx = EndpointContext::new(ListingScope::Channel(channel), params.filter, caller);
    respond(&state, ctx).await
}

/// list_account_videos
///
/// Videos of every channel owned by an account.
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{account}/videos",
    params(("account" = String, Path, description = "Account name"), ListingParams),
    responses(
        (status = 200, description = "Videos of the account", body = [Video]),
        (status = 400, description = "Unknown filter", body = ErrorBody),
        (status = 401, description = "Unusable credential", body = ErrorBody),
        (status = 403, description = "Filter needs a higher privilege", body = ErrorBody),
        (status = 404, description = "Unknown account", body = ErrorBody)
    )
)]
pub async fn list_account_videos(
    caller: CallerIdentity,
    State(state): State<AppState>,
    account: Result<Path<String>, PathRejection>,
    params: Result<Query<ListingParams>, QueryRejection>,
) -> Result<Json<Vec<Video>>, ApiError> {
    let account = path(account)?;
    let params = query(params)?;
    let ctx = EndpointContext::new(ListingScope::Account(account), params.filter, caller);
    respond(&state, ctx).await
}

/// list_videos
///
/// The global video listing.
#[utoipa::path(
    get,
    path = "/api/v1/videos",
    params(ListingParams),
    responses(
        (status = 200, description = "Videos", body = [Video]),
        (status = 400, description = "Unknown filter", body = ErrorBody),
        (status = 401, description = "Unusable credential", body = ErrorBody),
        (status = 403, description = "Filter needs a higher privilege", body = ErrorBody)
    )
)]
pub async fn list_videos(
    caller: CallerIdentity,
    State(state): State<AppState>,
    params: Result<Query<ListingParams>, QueryRejection>,
) -> Result<Json<Vec<Video>>, ApiError> {
    let params = query(params)?;
    let ctx = EndpointContext::new(ListingScope::Global, params.filter, caller);
    respond(&state, ctx).await
}

/// search_videos
///
/// Videos matching a search text. Ranking is left to the corpus.
#[utoipa::path(
    get,
    path = "/api/v1/search/videos",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching videos", body = [Video]),
        (status = 400, description = "Unknown filter", body = ErrorBody),
        (status = 401, description = "Unusable credential", body = ErrorBody),
        (status = 403, description = "Filter needs a higher privilege", body = ErrorBody)
    )
)]
pub async fn search_videos(
    caller: CallerIdentity,
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<Video>>, ApiError> {
    let params = query(params)?;
    let ctx = EndpointContext::new(ListingScope::Search(params.search), params.filter, caller);
    respond(&state, ctx).await
}

/// list_playlist_videos
///
/// Videos that are elements of a playlist, in playlist order.
#[utoipa::path(
    get,
    path = "/api/v1/video-playlists/{playlist}/videos",
    params(("playlist" = Uuid, Path, description = "Playlist ID"), ListingParams),
    responses(
        (status = 200, description = "Videos of the playlist", body = [Video]),
        (status = 400, description = "Unknown filter or malformed playlist id", body = ErrorBody),
        (status = 401, description = "Unusable credential", body = ErrorBody),
        (status = 403, description = "Filter needs a higher privilege", body = ErrorBody),
        (status = 404, description = "Unknown playlist", body = ErrorBody)
    )
)]
pub async fn list_playlist_videos(
    caller: CallerIdentity,
    State(state): State<AppState>,
    playlist: Result<Path<String>, PathRejection>,
    params: Result<Query<ListingParams>, QueryRejection>,
) -> Result<Json<Vec<Video>>, ApiError> {
    let playlist = path(playlist)?;
    let playlist = Uuid::parse_str(&playlist).map_err(|_| {
        ApiError::MalformedRequest(format!("`{}` is not a valid playlist id", playlist))
    })?;
    let params = query(params)?;
    let ctx = EndpointContext::new(ListingScope::Playlist(playlist), params.filter, caller);
    respond(&state, ctx).await
}

/// get_videos_feed
///
/// [Feed Route] Syndication feed of videos, served as a JSON list.
///
/// *Security*: feed readers cannot send credentials, so the caller is always treated
/// as anonymous. No identity extractor runs here; an `Authorization` header is ignored.
#[utoipa::path(
    get,
    path = "/feeds/videos.json",
    params(FeedParams),
    responses(
        (status = 200, description = "Feed entries", body = [Video]),
        (status = 400, description = "Unknown filter or conflicting scope", body = ErrorBody),
        (status = 403, description = "Filter needs credentials", body = ErrorBody),
        (status = 404, description = "Unknown account or channel", body = ErrorBody)
    )
)]
pub async fn get_videos_feed(
    State(state): State<AppState>,
    params: Result<Query<FeedParams>, QueryRejection>,
) -> Result<Json<Vec<Video>>, ApiError> {
    let params = query(params)?;

    let scope = match (params.account_name, params.video_channel_name) {
        (Some(_), Some(_)) => {
            return Err(ApiError::MalformedRequest(
                "accountName and videoChannelName cannot be combined".to_string(),
            ));
        }
        (Some(account), None) => ListingScope::Account(account),
        (None, Some(channel)) => ListingScope::Channel(channel),
        (None, None) => ListingScope::Global,
    };

    let ctx = EndpointContext::for_feed(scope, params.filter);
    respond(&state, ctx).await
}
