use crate::{
    error::CorpusError,
    listing::ListingScope,
    models::{Account, Playlist, User, Video, VideoChannel},
    policy::{CorpusPredicate, Origin},
};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, query_builder::QueryBuilder};
use std::{collections::HashMap, sync::Arc};
use uuid::Uuid;

/// Repository Trait
///
/// The two collaborators the listing gate consumes: the user table (for the role
/// behind a token) and the video corpus (for executing a scoped, filtered listing).
///
/// **Send + Sync + async_trait** keep `Arc<dyn Repository>` usable across Axum's
/// task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- User/Auth ---
    // `Ok(None)` only when the user does not exist; lookup failures are errors.
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, CorpusError>;

    // --- Corpus ---
    // Executes `scope` narrowed by `predicate`. Unknown channel/account/playlist
    // is `ScopeNotFound`, never an empty list.
    async fn list_videos(
        &self,
        scope: &ListingScope,
        predicate: &CorpusPredicate,
    ) -> Result<Vec<Video>, CorpusError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

fn scope_not_found(scope: &ListingScope) -> CorpusError {
    let (kind, id) = match scope {
        ListingScope::Channel(handle) => ("video channel", handle.clone()),
        ListingScope::Account(name) => ("account", name.clone()),
        ListingScope::Playlist(id) => ("video playlist", id.to_string()),
        ListingScope::Global | ListingScope::Search(_) => ("scope", scope.to_string()),
    };
    CorpusError::ScopeNotFound { kind, id }
}

/// PostgresRepository
///
/// The `Repository` backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn scope_exists(&self, scope: &ListingScope) -> Result<bool, CorpusError> {
        let exists = match scope {
            ListingScope::Channel(handle) => {
                sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM video_channels WHERE handle = $1)",
                )
                .bind(handle)
                .fetch_one(&self.pool)
                .await?
            }
            ListingScope::Account(name) => {
                sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM accounts WHERE name = $1)")
                    .bind(name)
                    .fetch_one(&self.pool)
                    .await?
            }
            ListingScope::Playlist(id) => {
                sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM video_playlists WHERE id = $1)",
                )
                .bind(id)
                .fetch_one(&self.pool)
                .await?
            }
            ListingScope::Global | ListingScope::Search(_) => true,
        };
        Ok(exists)
    }
}

/// contains_pattern
///
/// `ILIKE` pattern matching `text` as a literal substring. `\`, `%` and `_` are
/// escaped so the search behaves like the in-memory corpus; pair with `ESCAPE '\'`.
pub fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// push_predicate
///
/// Appends the filter predicate to a query whose `WHERE` clause is already open.
/// Values are always bound, never interpolated.
fn push_predicate(builder: &mut QueryBuilder<'_, Postgres>, predicate: &CorpusPredicate) {
    if predicate.origin == Origin::LocalOnly {
        builder.push(" AND v.is_local = true");
    }

    if !predicate.include_unpublished {
        builder.push(" AND v.published = true");
    }

    if predicate.privacies.is_empty() {
        builder.push(" AND false");
    } else {
        builder.push(" AND v.privacy::text IN (");
        let mut separated = builder.separated(", ");
        for privacy in &predicate.privacies {
            separated.push_bind(privacy.as_str());
        }
        separated.push_unseparated(")");
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    /// get_user
    ///
    /// Retrieves the user (ID, email, role) behind a token subject.
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, CorpusError> {
        let user = sqlx::query_as::<_, User>("SELECT id, email, role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// list_videos
    ///
    /// Builds `scope AND predicate` with QueryBuilder. The scope check runs first so a
    /// missing channel is told apart from a channel with no visible videos.
    async fn list_videos(
        &self,
        scope: &ListingScope,
        predicate: &CorpusPredicate,
    ) -> Result<Vec<Video>, CorpusError> {
        if !self.scope_exists(scope).await? {
            return Err(scope_not_found(scope));
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT
                v.id, v.name, v.channel_id, v.account_id,
                v.is_local, v.privacy, v.published, v.created_at
            FROM videos v
            "#,
        );

        match scope {
            ListingScope::Channel(handle) => {
                builder.push(" JOIN video_channels c ON c.id = v.channel_id WHERE c.handle = ");
                builder.push_bind(handle.clone());
            }
            ListingScope::Account(name) => {
                builder.push(" JOIN accounts a ON a.id = v.account_id WHERE a.name = ");
                builder.push_bind(name.clone());
            }
            ListingScope::Playlist(id) => {
                builder.push(
                    " JOIN video_playlist_elements e ON e.video_id = v.id WHERE e.playlist_id = ",
                );
                builder.push_bind(*id);
            }
            ListingScope::Search(Some(text)) => {
                builder.push(" WHERE v.name ILIKE ");
                builder.push_bind(contains_pattern(text));
                builder.push(" ESCAPE '\\'");
            }
            ListingScope::Global | ListingScope::Search(None) => {
                builder.push(" WHERE true");
            }
        }

        push_predicate(&mut builder, predicate);

        match scope {
            ListingScope::Playlist(_) => builder.push(" ORDER BY e.position ASC"),
            _ => builder.push(" ORDER BY v.created_at DESC"),
        };

        let videos = builder
            .build_query_as::<Video>()
            .fetch_all(&self.pool)
            .await?;

        Ok(videos)
    }
}

/// MemoryRepository
///
/// An in-process corpus with the same scope and predicate semantics as
/// `PostgresRepository`. Used by the integration tests.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    users: HashMap<Uuid, User>,
    accounts: Vec<Account>,
    channels: Vec<VideoChannel>,
    playlists: Vec<(Playlist, Vec<Uuid>)>,
    videos: Vec<Video>,
    /// When true, every query (user lookups included) fails as if the database were
    /// unreachable.
    pub should_fail: bool,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.users.insert(user.id, user);
        self
    }

    pub fn with_account(mut self, account: Account) -> Self {
        self.accounts.push(account);
        self
    }

    pub fn with_channel(mut self, channel: VideoChannel) -> Self {
        self.channels.push(channel);
        self
    }

    /// Adds a playlist whose elements are `video_ids`, in order.
    pub fn with_playlist(mut self, playlist: Playlist, video_ids: Vec<Uuid>) -> Self {
        self.playlists.push((playlist, video_ids));
        self
    }

    pub fn with_video(mut self, video: Video) -> Self {
        self.videos.push(video);
        self
    }

    fn newest_first(mut videos: Vec<Video>) -> Vec<Video> {
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        videos
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, CorpusError> {
        if self.should_fail {
            return Err(CorpusError::Database(sqlx::Error::PoolTimedOut));
        }

        Ok(self.users.get(&id).cloned())
    }

    async fn list_videos(
        &self,
        scope: &ListingScope,
        predicate: &CorpusPredicate,
    ) -> Result<Vec<Video>, CorpusError> {
        if self.should_fail {
            return Err(CorpusError::Database(sqlx::Error::PoolTimedOut));
        }

        let visible = |video: &&Video| predicate.matches(video);

        let videos = match scope {
            ListingScope::Channel(handle) => {
                let channel = self
                    .channels
                    .iter()
                    .find(|c| &c.handle == handle)
                    .ok_or_else(|| scope_not_found(scope))?;
                let in_channel = self
                    .videos
                    .iter()
                    .filter(|v| v.channel_id == channel.id)
                    .filter(visible)
                    .cloned()
                    .collect();
                Self::newest_first(in_channel)
            }
            ListingScope::Account(name) => {
                let account = self
                    .accounts
                    .iter()
                    .find(|a| &a.name == name)
                    .ok_or_else(|| scope_not_found(scope))?;
                let of_account = self
                    .videos
                    .iter()
                    .filter(|v| v.account_id == account.id)
                    .filter(visible)
                    .cloned()
                    .collect();
                Self::newest_first(of_account)
            }
            ListingScope::Global => {
                Self::newest_first(self.videos.iter().filter(visible).cloned().collect())
            }
            ListingScope::Search(text) => {
                let needle = text.as_deref().map(str::to_lowercase);
                let found = self
                    .videos
                    .iter()
                    .filter(|v| match &needle {
                        Some(needle) => v.name.to_lowercase().contains(needle),
                        None => true,
                    })
                    .filter(visible)
                    .cloned()
                    .collect();
                Self::newest_first(found)
            }
            ListingScope::Playlist(id) => {
                let (_, elements) = self
                    .playlists
                    .iter()
                    .find(|(p, _)| &p.id == id)
                    .ok_or_else(|| scope_not_found(scope))?;
                elements
                    .iter()
                    .filter_map(|video_id| self.videos.iter().find(|v| &v.id == video_id))
                    .filter(visible)
                    .cloned()
                    .collect()
            }
        };

        Ok(videos)
    }
}
