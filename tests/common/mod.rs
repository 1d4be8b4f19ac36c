#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::{sync::Arc, time::SystemTime};
use tower::util::ServiceExt;
use uuid::Uuid;
use video_listing_gate::{
    AppConfig, AppState, MemoryRepository, create_router,
    auth::Claims,
    config::Env,
    models::{Account, ErrorBody, Playlist, User, Video, VideoChannel, VideoPrivacy},
    repository::RepositoryState,
};

// --- Fixture Identifiers ---

pub const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";

pub const ADMIN_ID: Uuid = Uuid::from_u128(1);
pub const MODERATOR_ID: Uuid = Uuid::from_u128(2);
pub const USER_ID: Uuid = Uuid::from_u128(3);
// Never inserted: tokens for it are well-formed but point at nobody.
pub const GHOST_ID: Uuid = Uuid::from_u128(99);

pub const ROOT_ACCOUNT_ID: Uuid = Uuid::from_u128(10);
pub const REMOTE_ACCOUNT_ID: Uuid = Uuid::from_u128(11);
pub const ROOT_CHANNEL_ID: Uuid = Uuid::from_u128(20);
pub const REMOTE_CHANNEL_ID: Uuid = Uuid::from_u128(21);
pub const PLAYLIST_ID: Uuid = Uuid::from_u128(30);

pub const LOCAL_PUBLIC: Uuid = Uuid::from_u128(100);
pub const LOCAL_UNLISTED: Uuid = Uuid::from_u128(101);
pub const LOCAL_PRIVATE: Uuid = Uuid::from_u128(102);
pub const LOCAL_UNPUBLISHED: Uuid = Uuid::from_u128(103);
pub const REMOTE_PUBLIC: Uuid = Uuid::from_u128(104);

/// Caller
///
/// The four kinds of caller every listing endpoint is exercised with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    User,
    Moderator,
    Admin,
}

impl Caller {
    pub const ALL: [Caller; 4] = [
        Caller::Anonymous,
        Caller::User,
        Caller::Moderator,
        Caller::Admin,
    ];

    pub fn token(&self) -> Option<String> {
        let id = match self {
            Caller::Anonymous => return None,
            Caller::User => USER_ID,
            Caller::Moderator => MODERATOR_ID,
            Caller::Admin => ADMIN_ID,
        };
        Some(create_token(id, 3600))
    }
}

// --- Corpus Fixture ---

fn at(offset: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000 + offset, 0).unwrap()
}

#[allow(clippy::too_many_arguments)]
fn video(
    id: Uuid,
    name: &str,
    channel_id: Uuid,
    account_id: Uuid,
    is_local: bool,
    privacy: VideoPrivacy,
    published: bool,
    created: i64,
) -> Video {
    Video {
        id,
        name: name.to_string(),
        channel_id,
        account_id,
        is_local,
        privacy,
        published,
        created_at: at(created),
    }
}

fn user(id: Uuid, role: &str) -> User {
    User {
        id,
        email: format!("{}@example.com", role),
        role: role.to_string(),
    }
}

/// A small instance: one local account/channel (`root`, `root_channel`) with videos
/// of every visibility, one remote account mirrored from another instance, and a
/// public playlist mixing both.
pub fn seeded_repository() -> MemoryRepository {
    MemoryRepository::new()
        .with_user(user(ADMIN_ID, "admin"))
        .with_user(user(MODERATOR_ID, "moderator"))
        .with_user(user(USER_ID, "user"))
        .with_account(Account {
            id: ROOT_ACCOUNT_ID,
            name: "root".to_string(),
        })
        .with_account(Account {
            id: REMOTE_ACCOUNT_ID,
            name: "alice@remote.example".to_string(),
        })
        .with_channel(VideoChannel {
            id: ROOT_CHANNEL_ID,
            handle: "root_channel".to_string(),
            account_id: ROOT_ACCOUNT_ID,
        })
        .with_channel(VideoChannel {
            id: REMOTE_CHANNEL_ID,
            handle: "alice_channel@remote.example".to_string(),
            account_id: REMOTE_ACCOUNT_ID,
        })
        .with_video(video(
            LOCAL_PUBLIC,
            "Rust ownership explained",
            ROOT_CHANNEL_ID,
            ROOT_ACCOUNT_ID,
            true,
            VideoPrivacy::Public,
            true,
            1,
        ))
        .with_video(video(
            LOCAL_UNLISTED,
            "Unlisted rehearsal",
            ROOT_CHANNEL_ID,
            ROOT_ACCOUNT_ID,
            true,
            VideoPrivacy::Unlisted,
            true,
            2,
        ))
        .with_video(video(
            LOCAL_PRIVATE,
            "Private draft about Rust",
            ROOT_CHANNEL_ID,
            ROOT_ACCOUNT_ID,
            true,
            VideoPrivacy::Private,
            true,
            3,
        ))
        .with_video(video(
            LOCAL_UNPUBLISHED,
            "Still transcoding",
            ROOT_CHANNEL_ID,
            ROOT_ACCOUNT_ID,
            true,
            VideoPrivacy::Public,
            false,
            4,
        ))
        .with_video(video(
            REMOTE_PUBLIC,
            "Remote rust meetup",
            REMOTE_CHANNEL_ID,
            REMOTE_ACCOUNT_ID,
            false,
            VideoPrivacy::Public,
            true,
            5,
        ))
        .with_playlist(
            Playlist {
                id: PLAYLIST_ID,
                name: "super playlist".to_string(),
            },
            vec![REMOTE_PUBLIC, LOCAL_PUBLIC, LOCAL_PRIVATE],
        )
}

// --- App Construction ---

pub fn test_config(env: Env) -> AppConfig {
    let mut config = AppConfig::default();
    config.env = env;
    config.jwt_secret = TEST_JWT_SECRET.to_string();
    config
}

pub fn app_with(repo: MemoryRepository, env: Env) -> Router {
    let repo = Arc::new(repo) as RepositoryState;
    create_router(AppState::new(repo, test_config(env)))
}

pub fn app() -> Router {
    app_with(seeded_repository(), Env::Production)
}

// --- Tokens ---

fn now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Token for `user_id` expiring `exp_offset` seconds from now.
pub fn create_token(user_id: Uuid, exp_offset: u64) -> String {
    create_token_with(user_id, now() + exp_offset, TEST_JWT_SECRET)
}

/// Token for `user_id` that expired a minute ago.
pub fn expired_token(user_id: Uuid) -> String {
    create_token_with(user_id, now() - 60, TEST_JWT_SECRET)
}

pub fn create_token_with(user_id: Uuid, exp: u64, secret: &str) -> String {
    let claims = Claims {
        sub: user_id,
        iat: now() as usize,
        exp: exp as usize,
    };
    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

// --- Requests ---

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn videos(&self) -> Vec<Video> {
        serde_json::from_slice(&self.body).expect("body is not a video list")
    }

    pub fn video_ids(&self) -> Vec<Uuid> {
        self.videos().into_iter().map(|v| v.id).collect()
    }

    pub fn error(&self) -> ErrorBody {
        serde_json::from_slice(&self.body).expect("body is not an error")
    }
}

/// Sends a GET through the router, with optional extra headers.
pub async fn send(app: &Router, uri: &str, headers: &[(&str, String)]) -> TestResponse {
    let mut request = Request::builder().method("GET").uri(uri);
    for (name, value) in headers {
        request = request.header(*name, value.as_str());
    }

    let response = app
        .clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();

    TestResponse {
        status,
        headers,
        body,
    }
}

/// GET as the given caller.
pub async fn get_as(app: &Router, uri: &str, caller: Caller) -> TestResponse {
    match caller.token() {
        Some(token) => {
            let bearer = format!("Bearer {}", token);
            send(app, uri, &[(header::AUTHORIZATION.as_str(), bearer)]).await
        }
        None => send(app, uri, &[]).await,
    }
}

/// The five listing endpoints, each pointed at the seeded fixture.
pub fn listing_paths() -> Vec<String> {
    vec![
        "/api/v1/video-channels/root_channel/videos".to_string(),
        "/api/v1/accounts/root/videos".to_string(),
        "/api/v1/videos".to_string(),
        "/api/v1/search/videos".to_string(),
        format!("/api/v1/video-playlists/{}/videos", PLAYLIST_ID),
    ]
}

/// Appends a `filter` query parameter to `path`.
pub fn with_filter(path: &str, filter: &str) -> String {
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{}{}filter={}", path, separator, filter)
}
