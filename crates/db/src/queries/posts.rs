// crates/db/src/queries/posts.rs
// Blog post CRUD. Public readers only ever see published posts; the admin
// surface sees everything.

use crate::{Database, DbResult};
use folio_core::Post;
use uuid::Uuid;

use super::rows::PostRow;

/// Fields required to create a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub body: String,
    pub tags: Vec<String>,
    pub published: bool,
}

/// Partial update; `None` fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct PostUpdate {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub body: Option<String>,
    pub tags: Option<Vec<String>>,
    pub published: Option<bool>,
}

impl Database {
    pub async fn create_post(&self, new: &NewPost, now: i64) -> DbResult<Post> {
        let post = Post {
            id: Uuid::new_v4().to_string(),
            slug: new.slug.clone(),
            title: new.title.clone(),
            summary: new.summary.clone(),
            body: new.body.clone(),
            tags: new.tags.clone(),
            published: new.published,
            created_at: now,
            updated_at: now,
        };
        let tags = serde_json::to_string(&post.tags).unwrap_or_else(|_| "[]".to_string());

        sqlx::query(
            r#"
            INSERT INTO posts (id, slug, title, summary, body, tags, published, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&post.id)
        .bind(&post.slug)
        .bind(&post.title)
        .bind(&post.summary)
        .bind(&post.body)
        .bind(tags)
        .bind(post.published)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(post)
    }

    pub async fn get_post(&self, id: &str) -> DbResult<Option<Post>> {
        let row: Option<PostRow> = sqlx::query_as("SELECT * FROM posts WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(PostRow::into_post))
    }

    pub async fn get_post_by_slug(&self, slug: &str) -> DbResult<Option<Post>> {
        let row: Option<PostRow> = sqlx::query_as("SELECT * FROM posts WHERE slug = ?1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(PostRow::into_post))
    }

    /// List posts, newest first. `published_only` is the public view.
    pub async fn list_posts(&self, published_only: bool) -> DbResult<Vec<Post>> {
        let sql = if published_only {
            "SELECT * FROM posts WHERE published = 1 ORDER BY created_at DESC"
        } else {
            "SELECT * FROM posts ORDER BY created_at DESC"
        };
        let rows: Vec<PostRow> = sqlx::query_as(sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(PostRow::into_post).collect())
    }

    /// Apply a partial update. Returns the stored post, or `None` when the
    /// id does not exist.
    pub async fn update_post(
        &self,
        id: &str,
        update: &PostUpdate,
        now: i64,
    ) -> DbResult<Option<Post>> {
        let Some(mut post) = self.get_post(id).await? else {
            return Ok(None);
        };

        if let Some(slug) = &update.slug {
            post.slug = slug.clone();
        }
        if let Some(title) = &update.title {
            post.title = title.clone();
        }
        if let Some(summary) = &update.summary {
            post.summary = summary.clone();
        }
        if let Some(body) = &update.body {
            post.body = body.clone();
        }
        if let Some(tags) = &update.tags {
            post.tags = tags.clone();
        }
        if let Some(published) = update.published {
            post.published = published;
        }
        post.updated_at = now;

        let tags = serde_json::to_string(&post.tags).unwrap_or_else(|_| "[]".to_string());
        sqlx::query(
            r#"
            UPDATE posts SET
                slug = ?1, title = ?2, summary = ?3, body = ?4,
                tags = ?5, published = ?6, updated_at = ?7
            WHERE id = ?8
            "#,
        )
        .bind(&post.slug)
        .bind(&post.title)
        .bind(&post.summary)
        .bind(&post.body)
        .bind(tags)
        .bind(post.published)
        .bind(post.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Some(post))
    }

    /// Delete a post and its comments. Returns `false` for an unknown id.
    pub async fn delete_post(&self, id: &str) -> DbResult<bool> {
        sqlx::query("DELETE FROM comments WHERE post_id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        let result = sqlx::query("DELETE FROM posts WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn slug_taken(&self, slug: &str) -> DbResult<bool> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts WHERE slug = ?1")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0 > 0)
    }
}
