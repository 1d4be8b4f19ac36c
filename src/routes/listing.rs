use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Listing Router Module
///
/// The five video listing endpoints. Each handler builds its own `ListingScope` and
/// hands it to the same listing gate, so `filter` behaves identically everywhere.
///
/// No authentication layer is applied: anonymous callers are allowed and the
/// privilege check depends on the requested filter, not on the route.
pub fn listing_routes() -> Router<AppState> {
    Router::new()
        // GET /api/v1/video-channels/{channel}/videos?filter=...
        .route(
            "/api/v1/video-channels/{channel}/videos",
            get(handlers::list_channel_videos),
        )
        // GET /api/v1/accounts/{account}/videos?filter=...
        .route(
            "/api/v1/accounts/{account}/videos",
            get(handlers::list_account_videos),
        )
        // GET /api/v1/videos?filter=...
        .route("/api/v1/videos", get(handlers::list_videos))
        // GET /api/v1/search/videos?search=...&filter=...
        .route("/api/v1/search/videos", get(handlers::search_videos))
        // GET /api/v1/video-playlists/{playlist}/videos?filter=...
        .route(
            "/api/v1/video-playlists/{playlist}/videos",
            get(handlers::list_playlist_videos),
        )
}
