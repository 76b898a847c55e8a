use crate::db::Db;
use crate::error::AppResult;
use crate::model::Student;

pub async fn list(db: &Db) -> AppResult<Vec<Student>> {
    let students = sqlx::query_as::<_, Student>(
        "SELECT id, name, email, phone FROM students ORDER BY id DESC",
    )
    .fetch_all(db.pool())
    .await?;

    Ok(students)
}

pub async fn create(db: &Db, name: &str, email: &str, phone: &str) -> AppResult<i64> {
    let result = sqlx::query("INSERT INTO students (name, email, phone) VALUES (?, ?, ?)")
        .bind(name.trim())
        .bind(email.trim())
        .bind(phone.trim())
        .execute(db.pool())
        .await?;

    Ok(result.last_insert_rowid())
}

/// Removes the student with every enrollment and payment hanging off it.
/// Returns whether the student existed.
pub async fn delete(db: &Db, id: i64) -> AppResult<bool> {
    let mut tx = db.begin_immediate().await?;

    sqlx::query(
        "DELETE FROM payments WHERE enrollment_id IN (SELECT id FROM enrollments WHERE student_id = ?)",
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM enrollments WHERE student_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM students WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(result.rows_affected() > 0)
}
