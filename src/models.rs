use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Corpus Schemas (Mapped to Database) ---

/// User
///
/// Identity record consumed from the `users` table. Only the role matters to the
/// listing gate; accounts, channels and credentials are managed elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    // Free-form role: 'admin', 'moderator', anything else is a plain user.
    pub role: String,
}

/// VideoPrivacy
///
/// Visibility of a single video as stored by the corpus.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type,
)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "video_privacy", rename_all = "lowercase")]
pub enum VideoPrivacy {
    #[default]
    Public,
    Unlisted,
    Private,
    Internal,
}

impl VideoPrivacy {
    pub const ALL: [VideoPrivacy; 4] = [
        VideoPrivacy::Public,
        VideoPrivacy::Unlisted,
        VideoPrivacy::Private,
        VideoPrivacy::Internal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VideoPrivacy::Public => "public",
            VideoPrivacy::Unlisted => "unlisted",
            VideoPrivacy::Private => "private",
            VideoPrivacy::Internal => "internal",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == value)
    }
}

/// Video
///
/// A single record of the video corpus, as returned by every listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Video {
    pub id: Uuid,
    pub name: String,
    pub channel_id: Uuid,
    // Denormalized owner of the channel, so account listings need no join.
    pub account_id: Uuid,
    // Hosted by this instance, as opposed to mirrored from a remote one.
    pub is_local: bool,
    pub privacy: VideoPrivacy,
    // False while the video is still being transcoded or imported.
    pub published: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Account
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
}

/// VideoChannel
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct VideoChannel {
    pub id: Uuid,
    pub handle: String,
    pub account_id: Uuid,
}

/// Playlist
///
/// Membership is kept by the corpus in `video_playlist_elements`; the gate only
/// needs to know the playlist exists.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Playlist {
    pub id: Uuid,
    pub name: String,
}

// --- Error Body (Output) ---

/// ErrorBody
///
/// JSON payload returned with every rejected request. `code` is stable and meant
/// for clients to branch on; `message` is human-readable.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}
