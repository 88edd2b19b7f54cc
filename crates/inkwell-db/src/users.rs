//! User repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use inkwell_core::{
    new_v7, AuthUser, CreateUserRequest, Error, Result, UpdateProfileRequest, User, UserRepository,
};

/// PostgreSQL implementation of UserRepository.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_user_row(row: &sqlx::postgres::PgRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        profile_pic: row.get("profile_pic"),
        created_at_utc: row.get("created_at_utc"),
        updated_at_utc: row.get("updated_at_utc"),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, req: CreateUserRequest) -> Result<User> {
        let id = new_v7();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, created_at_utc, updated_at_utc)
             VALUES ($1, $2, $3, $4, $5, $5)",
        )
        .bind(id)
        .bind(&req.username)
        .bind(&req.email)
        .bind(&req.password_hash)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(User {
            id,
            username: req.username,
            email: req.email,
            profile_pic: None,
            created_at_utc: now,
            updated_at_utc: now,
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AuthUser>> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, profile_pic, created_at_utc, updated_at_utc
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|r| AuthUser {
            password_hash: r.get("password_hash"),
            user: map_user_row(&r),
        }))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, email, profile_pic, created_at_utc, updated_at_utc
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|r| map_user_row(&r)))
    }

    async fn update_profile(&self, id: Uuid, req: UpdateProfileRequest) -> Result<User> {
        if req.is_empty() {
            return Err(Error::InvalidInput("No fields to update".to_string()));
        }

        let mut updates: Vec<String> = vec!["updated_at_utc = $1".to_string()];
        let now = Utc::now();
        // $1 = now, $2 = id, then dynamic params start at $3
        let mut param_idx = 3;

        if req.username.is_some() {
            updates.push(format!("username = ${}", param_idx));
            param_idx += 1;
        }
        if req.email.is_some() {
            updates.push(format!("email = ${}", param_idx));
            param_idx += 1;
        }
        if req.profile_pic.is_some() {
            updates.push(format!("profile_pic = ${}", param_idx));
        }

        let query = format!("UPDATE users SET {} WHERE id = $2", updates.join(", "));

        let mut q = sqlx::query(&query).bind(now).bind(id);
        if let Some(username) = req.username {
            q = q.bind(username);
        }
        if let Some(email) = req.email {
            q = q.bind(email);
        }
        if let Some(profile_pic) = req.profile_pic {
            q = q.bind(profile_pic);
        }

        let result = q.execute(&self.pool).await.map_err(Error::Database)?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("User {} not found", id)));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("User {} not found", id)))
    }
}
