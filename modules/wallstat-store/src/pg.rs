// Postgres implementation of GroupStore.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use wallstat_common::{Group, GroupId, NewGroup, NewPost, Post, PostId, PostKey};

use crate::error::{Result, StoreError};
use crate::store::GroupStore;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

/// A row from the groups table.
#[derive(Debug, sqlx::FromRow)]
struct GroupRow {
    id: i64,
    domain: String,
    name: Option<String>,
    subscribers: i64,
    parsed_at: Option<DateTime<Utc>>,
}

impl From<GroupRow> for Group {
    fn from(row: GroupRow) -> Self {
        Group {
            id: row.id,
            domain: row.domain,
            name: row.name,
            subscribers: row.subscribers,
            parsed_at: row.parsed_at,
        }
    }
}

/// A row from the posts table.
#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: i64,
    group_id: i64,
    date: NaiveDate,
    text: String,
    views: i64,
    reactions: i64,
    likes: i64,
    comments: i64,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            group_id: row.group_id,
            date: row.date,
            text: row.text,
            views: row.views,
            reactions: row.reactions,
            likes: row.likes,
            comments: row.comments,
        }
    }
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run the embedded SQL migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl GroupStore for PgStore {
    async fn find_group_by_domain(&self, domain: &str) -> Result<Option<Group>> {
        let row = sqlx::query_as::<_, GroupRow>(
            "SELECT id, domain, name, subscribers, parsed_at FROM groups WHERE domain = $1",
        )
        .bind(domain)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn upsert_group(&self, group: &NewGroup) -> Result<GroupId> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO groups (domain, name, subscribers, parsed_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (domain) DO UPDATE
                SET name = COALESCE(EXCLUDED.name, groups.name),
                    subscribers = EXCLUDED.subscribers,
                    parsed_at = COALESCE(EXCLUDED.parsed_at, groups.parsed_at)
            RETURNING id
            "#,
        )
        .bind(&group.domain)
        .bind(&group.name)
        .bind(group.subscribers)
        .bind(group.parsed_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        let rows = sqlx::query_as::<_, GroupRow>(
            "SELECT id, domain, name, subscribers, parsed_at FROM groups ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_posts_by_group(&self, group_id: GroupId) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, group_id, date, text, views, reactions, likes, comments
            FROM posts
            WHERE group_id = $1
            ORDER BY date DESC, id ASC
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_post_by_key(&self, key: PostKey<'_>) -> Result<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, group_id, date, text, views, reactions, likes, comments
            FROM posts
            WHERE group_id = $1 AND date = $2 AND md5(text) = md5($3) AND text = $3
            LIMIT 1
            "#,
        )
        .bind(key.group_id)
        .bind(key.date)
        .bind(key.text)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn insert_post(&self, post: &NewPost) -> Result<Option<PostId>> {
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO posts (group_id, date, text, views, reactions, likes, comments)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (group_id, date, md5(text)) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(post.group_id)
        .bind(post.date)
        .bind(&post.text)
        .bind(post.views)
        .bind(post.reactions)
        .bind(post.likes)
        .bind(post.comments)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(id) => Ok(id),
            Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => {
                Err(StoreError::UnknownGroup(post.group_id))
            }
            Err(e) => Err(e.into()),
        }
    }
}
