// crates/db/src/queries/messages.rs
// Contact-form inbox.

use crate::{Database, DbResult};
use folio_core::ContactMessage;
use uuid::Uuid;

use super::rows::MessageRow;

impl Database {
    pub async fn create_message(
        &self,
        name: &str,
        email: &str,
        subject: Option<&str>,
        body: &str,
        now: i64,
    ) -> DbResult<ContactMessage> {
        let message = ContactMessage {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            subject: subject.map(str::to_string),
            body: body.to_string(),
            read: false,
            received_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO messages (id, name, email, subject, body, read, received_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&message.id)
        .bind(&message.name)
        .bind(&message.email)
        .bind(&message.subject)
        .bind(&message.body)
        .bind(message.read)
        .bind(message.received_at)
        .execute(&self.pool)
        .await?;

        Ok(message)
    }

    /// Inbox, newest first.
    pub async fn list_messages(&self, unread_only: bool) -> DbResult<Vec<ContactMessage>> {
        let sql = if unread_only {
            "SELECT * FROM messages WHERE read = 0 ORDER BY received_at DESC"
        } else {
            "SELECT * FROM messages ORDER BY received_at DESC"
        };
        let rows: Vec<MessageRow> = sqlx::query_as(sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(MessageRow::into_message).collect())
    }

    /// The newest few messages, for the dashboard.
    pub async fn recent_messages(&self, limit: i64) -> DbResult<Vec<ContactMessage>> {
        let rows: Vec<MessageRow> =
            sqlx::query_as("SELECT * FROM messages ORDER BY received_at DESC LIMIT ?1")
                .bind(limit)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(MessageRow::into_message).collect())
    }

    pub async fn mark_message_read(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("UPDATE messages SET read = 1 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_message(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM messages WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    #[tokio::test]
    async fn test_create_and_list() {
        let db = crate::Database::new_in_memory().await.expect("open");

        db.create_message("Ada", "ada@example.com", None, "hello", 1_700_000_000)
            .await
            .expect("create");
        db.create_message(
            "Grace",
            "grace@example.com",
            Some("Job offer"),
            "hi there",
            1_700_000_100,
        )
        .await
        .expect("create");

        let inbox = db.list_messages(false).await.expect("list");
        assert_eq!(inbox.len(), 2);
        assert_eq!(inbox[0].name, "Grace", "newest first");
        assert_eq!(inbox[0].subject.as_deref(), Some("Job offer"));
        assert!(!inbox[0].read);
    }

    #[tokio::test]
    async fn test_mark_read_filters_unread_view() {
        let db = crate::Database::new_in_memory().await.expect("open");
        let msg = db
            .create_message("Ada", "ada@example.com", None, "hello", 1_700_000_000)
            .await
            .expect("create");

        assert!(db.mark_message_read(&msg.id).await.expect("mark"));
        assert!(db.list_messages(true).await.expect("unread").is_empty());
        assert_eq!(db.list_messages(false).await.expect("all").len(), 1);
    }

    #[tokio::test]
    async fn test_recent_messages_respects_limit() {
        let db = crate::Database::new_in_memory().await.expect("open");
        for i in 0..8 {
            db.create_message(
                "Ada",
                "ada@example.com",
                None,
                &format!("message {i}"),
                1_700_000_000 + i,
            )
            .await
            .expect("create");
        }

        let recent = db.recent_messages(5).await.expect("recent");
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].body, "message 7");
    }

    #[tokio::test]
    async fn test_delete_message() {
        let db = crate::Database::new_in_memory().await.expect("open");
        let msg = db
            .create_message("Ada", "ada@example.com", None, "bye", 1_700_000_000)
            .await
            .expect("create");

        assert!(db.delete_message(&msg.id).await.expect("delete"));
        assert!(!db.delete_message(&msg.id).await.expect("again"));
    }
}
