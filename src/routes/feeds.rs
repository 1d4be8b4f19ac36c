use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Feeds Router Module
///
/// Syndication endpoints fetched by feed readers, which cannot authenticate.
///
/// Access Control:
/// The handlers take no identity extractor, so `filter=all-local` is always refused
/// here whatever headers the request carries.
pub fn feed_routes() -> Router<AppState> {
    Router::new()
        // GET /feeds/videos.json?filter=...&accountName=...&videoChannelName=...
        .route("/feeds/videos.json", get(handlers::get_videos_feed))
}
