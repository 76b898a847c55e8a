use crate::auth::password::hash_password;
use crate::db::Db;
use crate::error::{AppError, AppResult};
use crate::model::{User, UserSummary};

pub async fn find_by_username(db: &Db, username: &str) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash FROM users WHERE username = ?",
    )
    .bind(username.trim())
    .fetch_optional(db.pool())
    .await?;

    Ok(user)
}

pub async fn list(db: &Db) -> AppResult<Vec<UserSummary>> {
    let users = sqlx::query_as::<_, UserSummary>("SELECT id, username FROM users ORDER BY id")
        .fetch_all(db.pool())
        .await?;

    Ok(users)
}

pub async fn create(db: &Db, username: &str, password: &str) -> AppResult<i64> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(AppError::BadRequest(
            "Username and password are required.".to_string(),
        ));
    }

    let hash = hash_password(password)?;

    let result = sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
        .bind(username)
        .bind(hash)
        .execute(db.pool())
        .await;

    match result {
        Ok(done) => Ok(done.last_insert_rowid()),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
            AppError::BadRequest(format!("Username already exists: {username}")),
        ),
        Err(e) => Err(e.into()),
    }
}

/// Returns `false` when no such user exists.
pub async fn change_password(db: &Db, username: &str, new_password: &str) -> AppResult<bool> {
    if new_password.is_empty() {
        return Err(AppError::BadRequest("Password is required.".to_string()));
    }

    let Some(user) = find_by_username(db, username).await? else {
        return Ok(false);
    };

    let hash = hash_password(new_password)?;
    sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
        .bind(hash)
        .bind(user.id)
        .execute(db.pool())
        .await?;

    Ok(true)
}
