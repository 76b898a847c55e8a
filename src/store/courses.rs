use crate::db::Db;
use crate::error::AppResult;
use crate::model::Course;

pub async fn list(db: &Db) -> AppResult<Vec<Course>> {
    let courses = sqlx::query_as::<_, Course>(
        "SELECT id, name, base_amount FROM courses ORDER BY id DESC",
    )
    .fetch_all(db.pool())
    .await?;

    Ok(courses)
}

pub async fn create(db: &Db, name: &str, base_amount: i64) -> AppResult<i64> {
    let result = sqlx::query("INSERT INTO courses (name, base_amount) VALUES (?, ?)")
        .bind(name.trim())
        .bind(base_amount)
        .execute(db.pool())
        .await?;

    Ok(result.last_insert_rowid())
}

/// Removes the course with every enrollment and payment hanging off it.
pub async fn delete(db: &Db, id: i64) -> AppResult<bool> {
    let mut tx = db.begin_immediate().await?;

    sqlx::query(
        "DELETE FROM payments WHERE enrollment_id IN (SELECT id FROM enrollments WHERE course_id = ?)",
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM enrollments WHERE course_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM courses WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(result.rows_affected() > 0)
}
