use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Rows mapped from the database ---

/// User
///
/// A row of the `users` table. `role` is kept as the raw string; the session layer
/// parses it into `auth::Role`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct User {
    pub id: i64,
    pub role: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Course
///
/// A row of the `courses` table, joined with the owning teacher's name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct Course {
    pub id: i64,
    pub teacher_id: i64,
    pub title: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    #[sqlx(default)]
    pub teacher_name: Option<String>,
}

/// CourseOverview
///
/// A teacher's course with the amount of content hanging off it
/// (`course_modules` → `module_materials` → `uploaded_files`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct CourseOverview {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub module_count: i64,
    pub material_count: i64,
    pub file_count: i64,
}

/// Student
///
/// Projection of `users` rows with `role = 'student'` shown on the teacher page.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// ExamRow
///
/// Raw `course_exams` row. `questions` is the serialized JSON text exactly as stored.
#[derive(Debug, Clone, FromRow, Default)]
pub struct ExamRow {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub questions: String,
    pub created_at: DateTime<Utc>,
}

// --- Output schemas ---

/// ExamData
///
/// Response body of `get_exam_data.php`. `questions` carries the decoded structure,
/// or `null` when the stored text is not valid JSON.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ExamData {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    #[schema(value_type = Value)]
    pub questions: serde_json::Value,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl From<ExamRow> for ExamData {
    fn from(row: ExamRow) -> Self {
        let questions = serde_json::from_str(&row.questions).unwrap_or_else(|e| {
            tracing::warn!(exam_id = row.id, "stored exam questions are not valid JSON: {}", e);
            serde_json::Value::Null
        });

        ExamData {
            id: row.id,
            course_id: row.course_id,
            title: row.title,
            questions,
            created_at: row.created_at,
        }
    }
}

/// ErrorBody
///
/// JSON error envelope returned by the API: `{"error": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct ErrorBody {
    pub error: String,
}

/// DashboardStats
///
/// Counters shown at the top of the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DashboardStats {
    pub total_users: i64,
    pub teachers: i64,
    pub students: i64,
    pub courses: i64,
    pub exams: i64,
}
