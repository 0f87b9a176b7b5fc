// crates/db/src/queries/users.rs
// Admin accounts. Password hashing happens in the server crate; this layer
// only stores and retrieves the salted hash.

use crate::{Database, DbResult};
use sqlx::Row;
use uuid::Uuid;

/// A stored admin account, including credential material. Deliberately not
/// `Serialize`; response shapes are built at the route layer.
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub salt: String,
    pub role: String,
    pub created_at: i64,
}

impl<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> for AdminAccount {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            salt: row.try_get("salt")?,
            role: row.try_get("role")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl Database {
    pub async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        salt: &str,
        now: i64,
    ) -> DbResult<AdminAccount> {
        let account = AdminAccount {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            salt: salt.to_string(),
            role: "admin".to_string(),
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO admin_users (id, username, password_hash, salt, role, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&account.id)
        .bind(&account.username)
        .bind(&account.password_hash)
        .bind(&account.salt)
        .bind(&account.role)
        .bind(account.created_at)
        .execute(&self.pool)
        .await?;

        Ok(account)
    }

    pub async fn find_user(&self, username: &str) -> DbResult<Option<AdminAccount>> {
        let row: Option<AdminAccount> =
            sqlx::query_as("SELECT * FROM admin_users WHERE username = ?1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row)
    }

    pub async fn count_users(&self) -> DbResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM admin_users")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}
