use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// API Router Module
///
/// JSON endpoints. Failures answer with `{"error": ...}` and a 4xx status, never a
/// redirect.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // GET /get_exam_data.php?exam_id=...
        // Exam with decoded questions, only for the teacher who owns the exam's course.
        .route("/get_exam_data.php", get(handlers::get_exam_data))
}
