use std::fmt;

use uuid::Uuid;

use crate::{
    auth::CallerIdentity,
    error::ApiError,
    filter,
    models::Video,
    policy::{AuthorizationOutcome, CorpusPredicate, FilterPolicy},
    privilege,
    repository::Repository,
};

/// ListingScope
///
/// Base query of a listing endpoint, before any filter is applied. This is the only
/// thing that differs between the listing endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingScope {
    /// Videos published on a channel, by channel handle.
    Channel(String),
    /// Videos of every channel owned by an account, by account name.
    Account(String),
    /// The whole corpus.
    Global,
    /// Videos whose name matches the search text; no text matches everything.
    Search(Option<String>),
    /// Videos that are elements of a playlist, in playlist order.
    Playlist(Uuid),
}

impl fmt::Display for ListingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingScope::Channel(handle) => write!(f, "channel:{}", handle),
            ListingScope::Account(name) => write!(f, "account:{}", name),
            ListingScope::Global => write!(f, "global"),
            ListingScope::Search(Some(text)) => write!(f, "search:{}", text),
            ListingScope::Search(None) => write!(f, "search"),
            ListingScope::Playlist(id) => write!(f, "playlist:{}", id),
        }
    }
}

/// EndpointContext
///
/// Everything one listing request brings to the gate. Created per request.
#[derive(Debug, Clone)]
pub struct EndpointContext {
    pub scope: ListingScope,
    pub raw_filter: Option<String>,
    pub caller: CallerIdentity,
}

impl EndpointContext {
    pub fn new(scope: ListingScope, raw_filter: Option<String>, caller: CallerIdentity) -> Self {
        Self {
            scope,
            raw_filter,
            caller,
        }
    }

    /// Context for a transport that cannot carry credentials (syndication feeds).
    /// The caller is anonymous whatever the request contained.
    pub fn for_feed(scope: ListingScope, raw_filter: Option<String>) -> Self {
        Self::new(scope, raw_filter, CallerIdentity::Anonymous)
    }
}

/// authorize_listing
///
/// Runs the filter gate: validate the raw filter, classify the caller, then check
/// the filter rule. The first failing step decides the error.
pub fn authorize_listing(
    policy: &FilterPolicy,
    ctx: &EndpointContext,
) -> Result<CorpusPredicate, ApiError> {
    let token = filter::validate(ctx.raw_filter.as_deref())?;
    let level = privilege::classify(&ctx.caller)?;

    match policy.authorize(token, level) {
        AuthorizationOutcome::Authorized { predicate } => Ok(predicate),
        AuthorizationOutcome::Rejected { .. } => Err(ApiError::InsufficientPrivilege {
            filter: token.as_str().unwrap_or("none"),
            required: policy.rule(token).required,
            level,
        }),
    }
}

/// list_videos
///
/// The single listing adapter behind every endpoint. The scope decides which videos
/// are candidates, the authorized predicate narrows them, and the corpus result is
/// returned as-is.
pub async fn list_videos(
    repo: &dyn Repository,
    policy: &FilterPolicy,
    ctx: EndpointContext,
) -> Result<Vec<Video>, ApiError> {
    let predicate = match authorize_listing(policy, &ctx) {
        Ok(predicate) => predicate,
        Err(e) => {
            tracing::warn!(
                scope = %ctx.scope,
                filter = ?ctx.raw_filter,
                reason = ?e.reason(),
                "listing rejected: {}",
                e
            );
            return Err(e);
        }
    };

    tracing::debug!(scope = %ctx.scope, ?predicate, "listing authorized");

    let videos = repo.list_videos(&ctx.scope, &predicate).await?;
    Ok(videos)
}
