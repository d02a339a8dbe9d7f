use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Teacher Router Module
///
/// Pages restricted to the `teacher` role. Mounted under `/teacher`.
pub fn teacher_routes() -> Router<AppState> {
    Router::new()
        // GET /teacher/students.php?search=...
        // The teacher's own courses plus the student list.
        .route("/students.php", get(handlers::teacher_students))
}
