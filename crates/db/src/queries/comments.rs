// crates/db/src/queries/comments.rs
// Comments are held for moderation: they come in unapproved and only show
// publicly after an admin approves them.

use crate::{Database, DbResult};
use folio_core::Comment;
use uuid::Uuid;

use super::rows::CommentRow;

impl Database {
    pub async fn create_comment(
        &self,
        post_id: &str,
        author: &str,
        body: &str,
        now: i64,
    ) -> DbResult<Comment> {
        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            post_id: post_id.to_string(),
            author: author.to_string(),
            body: body.to_string(),
            approved: false,
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO comments (id, post_id, author, body, approved, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&comment.id)
        .bind(&comment.post_id)
        .bind(&comment.author)
        .bind(&comment.body)
        .bind(comment.approved)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;

        Ok(comment)
    }

    /// Comments under one post in thread order. `approved_only` is the
    /// public view.
    pub async fn comments_for_post(
        &self,
        post_id: &str,
        approved_only: bool,
    ) -> DbResult<Vec<Comment>> {
        let sql = if approved_only {
            "SELECT * FROM comments WHERE post_id = ?1 AND approved = 1 ORDER BY created_at ASC"
        } else {
            "SELECT * FROM comments WHERE post_id = ?1 ORDER BY created_at ASC"
        };
        let rows: Vec<CommentRow> = sqlx::query_as(sql)
            .bind(post_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(CommentRow::into_comment).collect())
    }

    /// Comments across every post, newest first. `pending_only` narrows to
    /// the moderation queue.
    pub async fn list_comments(&self, pending_only: bool) -> DbResult<Vec<Comment>> {
        let sql = if pending_only {
            "SELECT * FROM comments WHERE approved = 0 ORDER BY created_at DESC"
        } else {
            "SELECT * FROM comments ORDER BY created_at DESC"
        };
        let rows: Vec<CommentRow> = sqlx::query_as(sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(CommentRow::into_comment).collect())
    }

    pub async fn set_comment_approved(&self, id: &str, approved: bool) -> DbResult<bool> {
        let result = sqlx::query("UPDATE comments SET approved = ?1 WHERE id = ?2")
            .bind(approved)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_comment(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
