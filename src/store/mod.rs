//! SQL access, one module per table.
//!
//! Handlers and the CLI go through these functions; nothing else
//! writes SQL.

pub mod courses;
pub mod enrollments;
pub mod payments;
pub mod students;
pub mod users;
